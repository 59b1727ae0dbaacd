pub mod config;
pub mod filters;
pub mod generator;
pub mod metadata;
pub mod ownership;
pub mod seeds;
pub mod sink;
pub mod source;


pub use config::*;
pub use generator::*;
pub use metadata::*;
pub use source::*;
