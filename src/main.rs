use anyhow::Result;
use clap::Parser;
use std::collections::HashSet;
use std::io;

mod cli;
mod client;
mod config;
mod error;
mod models;
mod playlist;
mod prompt;

#[cfg(test)]
mod playlist_tests;

use crate::cli::{Args, build_run_config, default_playlist_name};
use crate::client::SpotifyClient;
use crate::config::load_config;
use crate::playlist::ownership::OwnershipFilter;
use crate::playlist::seeds::SeedSelection;
use crate::playlist::sink::publish_playlist;
use crate::playlist::{GenerationOutcome, PlaylistGenerator, SeedSource};
use crate::prompt::Prompter;

fn display_banner() {
    let banner = r"
      _
     | |_ ___ _ __ ___  _ __   ___
     | __/ _ \ '_ ` _ \| '_ \ / _ \
     | ||  __/ | | | | | |_) | (_) |
      \__\___|_| |_| |_| .__/ \___/
                       |_|
";
    println!("{banner}");
    println!("Generate Spotify playlists at the tempo you want.\n");
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if !args.quiet {
        display_banner();
    }

    // Fail on a missing token before asking any questions
    let config = load_config()?;

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    let run = build_run_config(&args, &mut prompter)?;
    log::info!("Run configuration: {run:?}");

    let client = SpotifyClient::new(config);
    let user = client.current_user()?;
    if !args.quiet {
        println!(
            "Signed in as {}",
            user.display_name.as_deref().unwrap_or(&user.id)
        );
    }

    // Get all tracks from all user's playlists if necessary
    let owned_ids = if run.exclude_owned {
        println!("Fetching all playlist tracks...");
        let owned = OwnershipFilter::collect_owned_ids(&client, &user.id)?;
        println!("Found {} tracks in your playlists.", owned.len());
        owned
    } else {
        HashSet::new()
    };

    match &run.seed_source {
        SeedSource::TopTracks { .. } => println!("Fetching top tracks..."),
        SeedSource::LikedSongs { .. } => println!("Fetching liked songs..."),
    }
    let seeds = SeedSelection::select(
        &client,
        &run.seed_source,
        &run.settings,
        &mut rand::thread_rng(),
    )?;

    if matches!(run.seed_source, SeedSource::LikedSongs { .. }) {
        if seeds.len() < run.settings.seed_count {
            println!("Not enough liked tracks to seed. Using all {} liked tracks.", seeds.len());
        }
        println!("Selected tracks for seeding:");
        for track in &seeds {
            println!(" - {} by {}", track.name, track.artist_names());
        }
    }
    if seeds.is_empty() {
        eprintln!("Warning: no seed tracks found; recommendations will likely be empty.");
    }

    // Get recommended tracks and filter by tempo
    let generator = PlaylistGenerator::new(run.settings.clone());
    let outcome = generator.generate(
        &client,
        &SeedSelection::seed_ids(&seeds),
        &run.criteria,
        run.exclude_owned,
        &owned_ids,
        |progress| {
            if args.quiet {
                return;
            }
            println!(
                "{} out of {} tracks collected.",
                progress.collected, progress.required
            );
            if args.verbose {
                println!(
                    "  batch {}: {} recommended, {} in tempo, {} new",
                    progress.iteration, progress.batch_size, progress.matched, progress.added
                );
            }
        },
    )?;

    let playlist = match outcome {
        GenerationOutcome::Ready(playlist) => playlist,
        GenerationOutcome::InsufficientResults {
            collected,
            required,
        } => {
            println!(
                "Not enough tracks ({collected} of {required}). Try increasing tempo tolerance and/or reducing playlist length."
            );
            return Ok(());
        }
        GenerationOutcome::NoMatchingTracks => {
            println!("No tracks found with the specified tempo range.");
            return Ok(());
        }
    };

    log::info!("Playlist ready after {} iterations", playlist.iterations);
    let tempo_description = playlist.description();
    println!("Playlist description: {tempo_description}");

    if run.dry_run {
        println!("\nDRY RUN: {} tracks (playlist not created)", playlist.tracks.len());
        for (i, entry) in playlist.tracks.iter().enumerate() {
            println!(
                "  {}. \"{}\" by {} [{:.1} bpm]",
                i + 1,
                entry.track.name,
                entry.track.artist_names(),
                entry.tempo
            );
        }
        return Ok(());
    }

    // Create a new playlist
    let name = match run.playlist_name.clone() {
        Some(name) => name,
        None => prompter.ask_text("Playlist name: ")?,
    };
    let name = if name.is_empty() {
        default_playlist_name(run.criteria.target_tempo, chrono::Local::now().date_naive())
    } else {
        name
    };
    let description = run.description.clone().unwrap_or(tempo_description);

    println!("Creating playlist '{name}'...");
    publish_playlist(&client, &user.id, &name, &description, &playlist.track_ids())?;
    println!(
        "Playlist '{}' created with {} tracks.",
        name,
        playlist.tracks.len()
    );

    Ok(())
}
