use anyhow::Result;
use clap::Parser;

mod client;
mod config;
mod models;
mod schedule;


use crate::client::PlexClient;
use crate::config::load_config;
use crate::schedule::{
    BreakStyle, ChannelConfig, GenerateOptions, HistoryEntry, PlaylistScheduler, Sink,
};

#[derive(Parser)]
#[command(name = "realtv-generator")]
#[command(about = "Pseudo-broadcast TV playlist generator for Plex servers")]
#[command(version)]
struct Args {
    /// Playlist to generate (defaults to the configured default playlist)
    name: Option<String>,

    /// Path to the channel configuration JSON file
    #[arg(short = 'c', long = "config", default_value = "channels.json")]
    config_file: String,

    /// Number of episodes to schedule (overrides the playlist default)
    #[arg(short = 'e', long = "episodes")]
    episodes: Option<usize>,

    /// Reset all show positions in the playlist to S01E01 first
    #[arg(long = "from-start")]
    from_start: bool,

    /// Trigger a Plex scan of the commercial library before generating
    #[arg(long)]
    rescan: bool,

    /// Debug mode - print the lineup to stdout instead of uploading
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Validate that the channel configuration file exists before proceeding
    if !std::path::Path::new(&args.config_file).exists() {
        eprintln!(
            "Error: Channel configuration file '{}' not found.",
            args.config_file
        );
        eprintln!("Please ensure the file exists or specify a different file with --config.");
        return Err(anyhow::anyhow!(
            "Configuration file '{}' not found",
            args.config_file
        ));
    }

    // Load connection settings from .env
    let config = load_config()?;

    // Initialize the Plex client
    let client = PlexClient::new(config);

    // Test connection first
    println!("Testing Plex connection...");
    match client.ping() {
        Ok(machine_id) => println!("✓ Connected to Plex server {machine_id}"),
        Err(e) => {
            eprintln!("✗ Plex connection failed: {e}");
            return Err(e);
        }
    }

    // Load channel configuration
    println!(
        "\nLoading channel configuration from: {}",
        args.config_file
    );
    let mut channels = match ChannelConfig::load_from_file(&args.config_file) {
        Ok(channels) => {
            println!(
                "Loaded {} shows and {} playlists",
                channels.shows.len(),
                channels.playlists.len()
            );
            channels
        }
        Err(e) => {
            eprintln!("Failed to load channel configuration: {e}");
            return Err(anyhow::anyhow!("Failed to load channel configuration: {}", e));
        }
    };

    let playlist_name = match &args.name {
        Some(name) => name.clone(),
        None => channels.default_playlist.clone(),
    };
    if playlist_name.is_empty() {
        return Err(anyhow::anyhow!(
            "No playlist named and no default_playlist configured"
        ));
    }

    if args.rescan {
        println!(
            "\nScanning commercial library '{}'...",
            channels.commercials.library_name
        );
        match client.rescan_library(&channels.commercials.library_name, 120) {
            Ok(total) => println!("✓ Scan complete — {total} commercials indexed"),
            Err(e) => eprintln!("Warning: library scan failed: {e}"),
        }
    }

    // Generate the lineup
    println!("\nGenerating playlist '{playlist_name}'...");
    if args.from_start {
        println!("Resetting all show positions to S01E01.");
    }

    let (result, break_style) = {
        let ChannelConfig {
            shows,
            commercials,
            playlists,
            ..
        } = &mut channels;

        let playlist = playlists
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&playlist_name))
            .ok_or_else(|| anyhow::anyhow!("Playlist '{}' not found", playlist_name))?;

        let scheduler = PlaylistScheduler::new(&client);
        let options = GenerateOptions {
            episode_count: args.episodes,
            from_start: args.from_start,
        };
        let mut rng = rand::thread_rng();
        let mut on_progress = |current: usize, total: usize| {
            print!("\r  Scheduled {current}/{total} episodes");
            use std::io::Write;
            let _ = std::io::stdout().flush();
        };

        let result = scheduler.generate(
            shows,
            commercials,
            playlist,
            &options,
            &mut rng,
            Some(&mut on_progress),
        )?;
        println!();

        let break_style = if playlist.breaks.enabled && playlist.breaks.style != BreakStyle::Disabled
        {
            format!("{:?}", playlist.breaks.style).to_lowercase()
        } else {
            "disabled".to_string()
        };
        (result, break_style)
    };

    if result.playlist_items.is_empty() {
        return Err(anyhow::anyhow!(
            "No items generated. Check your show configuration."
        ));
    }

    // Display generation results
    println!("\n=== GENERATION RESULTS ===");
    println!("{}", playlist_name);
    println!("{}", "=".repeat(playlist_name.len()));

    let episode_total: usize = result.episodes_by_show.values().sum();
    let runtime_mins = result.total_runtime_secs as u64 / 60;
    println!(
        "   Items: {} | Episodes: {} | Runtime: {}h{:02}m",
        result.playlist_items.len(),
        episode_total,
        runtime_mins / 60,
        runtime_mins % 60
    );
    println!(
        "   Breaks: {} ({}) | Commercial time: {}m{:02}s",
        result.commercial_block_count,
        break_style,
        result.commercial_total_secs as u64 / 60,
        result.commercial_total_secs as u64 % 60
    );

    let mut per_show: Vec<_> = result.episodes_by_show.iter().collect();
    per_show.sort_by(|a, b| a.0.cmp(b.0));
    for (show, count) in per_show {
        let position = result
            .show_positions
            .get(show)
            .map(String::as_str)
            .unwrap_or("?");
        println!("   {show}: {count} episodes (next up: {position})");
    }

    if !result.dropped_shows.is_empty() {
        eprintln!("Shows exhausted: {}", result.dropped_shows.join(", "));
    }

    if args.debug {
        // Debug mode: print the lineup instead of uploading
        println!("\n🔍 DEBUG MODE: Playlist '{playlist_name}' (would create via API)");
        for (i, item) in result.playlist_items.iter().enumerate() {
            let secs = item.duration_secs() as u64;
            println!(
                "     {}. {} [{}:{:02}]",
                i + 1,
                item.display_title(),
                secs / 60,
                secs % 60
            );
        }
        println!("\nDebug mode - positions not saved, playlist not uploaded.");
        return Ok(());
    }

    // Push the lineup to Plex
    println!("\n🎬 Creating playlist '{playlist_name}' via API...");
    client.publish(&playlist_name, &result.playlist_items)?;
    println!(
        "✓ Successfully created playlist '{}' with {} items",
        playlist_name,
        result.playlist_items.len()
    );

    // Persist updated positions, backfilled years, and the run history.
    // Only reached after the full run and upload succeeded.
    let mut shows_in_run: Vec<String> = result.episodes_by_show.keys().cloned().collect();
    shows_in_run.sort();
    channels.push_history(HistoryEntry {
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        playlist_name: playlist_name.clone(),
        episode_count: episode_total,
        shows: shows_in_run,
        runtime_secs: result.total_runtime_secs,
    });

    if let Err(e) = channels.save_to_file(&args.config_file) {
        eprintln!("Failed to save updated positions: {e}");
        return Err(anyhow::anyhow!("Failed to save configuration: {}", e));
    }
    println!("Saved updated show positions to {}", args.config_file);

    Ok(())
}
