use std::collections::HashMap;

use anyhow::{bail, Result};
use rand::Rng;

use super::catalog::Catalog;
use super::commercial::{
    build_commercial_block, category_weights, pick_single_commercial, PickHistory,
};
use super::config::{BreakStyle, CommercialSettings, PlaylistDefinition, ShowEntry};
use super::cursor::{sort_show_states, ShowState};
use crate::models::ScheduledItem;

/// Caller-facing knobs for one generation run
#[derive(Debug, Default)]
pub struct GenerateOptions {
    /// How many episodes to schedule; None or 0 falls back to the playlist's default
    pub episode_count: Option<usize>,
    /// Reset every show in the playlist to S01E01 before generating
    pub from_start: bool,
}

/// Everything a generation run produced, plus its statistics
#[derive(Debug)]
pub struct GenerationResult {
    pub playlist_items: Vec<ScheduledItem>,
    pub episodes_by_show: HashMap<String, usize>,
    pub show_positions: HashMap<String, String>,
    pub total_runtime_secs: f64,
    pub commercial_block_count: usize,
    pub commercial_total_secs: f64,
    pub dropped_shows: Vec<String>,
}

/// Round-robin playlist scheduler.
///
/// Owns no state between runs: each call to `generate` builds its own cursor
/// snapshots and commercial history, so concurrent runs against different
/// playlists are independent. Updated positions are written back onto the
/// playlist definition only on success; the caller decides when to persist.
pub struct PlaylistScheduler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> PlaylistScheduler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Generate a round-robin lineup with commercial breaks.
    ///
    /// `shows` is the global pool (read for library/enabled/year; missing
    /// premiere years learned from the catalog are written back to it).
    /// `progress` is invoked once per scheduled episode with
    /// (scheduled so far, target).
    pub fn generate<R: Rng>(
        &self,
        shows: &mut [ShowEntry],
        commercials: &CommercialSettings,
        playlist: &mut PlaylistDefinition,
        options: &GenerateOptions,
        rng: &mut R,
        mut progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<GenerationResult> {
        if playlist.shows.is_empty() {
            bail!(
                "Playlist '{}' has no shows. Add shows to it before generating.",
                playlist.name
            );
        }

        let episode_count = options
            .episode_count
            .filter(|&n| n > 0)
            .unwrap_or(playlist.episodes_per_generation);

        if options.from_start {
            for ps in &mut playlist.shows {
                ps.current_season = 1;
                ps.current_episode = 1;
            }
        }

        // Resolve each membership against the pool and the catalog
        let mut states: Vec<ShowState> = Vec::new();
        for ps in &playlist.shows {
            let Some(entry) = shows
                .iter_mut()
                .find(|s| s.name.eq_ignore_ascii_case(&ps.name))
            else {
                eprintln!(
                    "Warning: '{}' is not in the show pool; skipping.",
                    ps.name
                );
                continue;
            };
            if !entry.enabled {
                continue;
            }

            let handle = match self.catalog.find_show(&entry.name, &entry.library) {
                Ok(handle) => handle,
                Err(e) => {
                    eprintln!("Warning: could not find '{}' in the catalog: {e}", entry.name);
                    continue;
                }
            };

            // Backfill a missing premiere year from the catalog
            if entry.year.is_none() && handle.year.is_some() {
                entry.year = handle.year;
            }

            states.push(ShowState::new(
                entry.name.clone(),
                entry.year,
                handle,
                ps.current_season,
                ps.current_episode,
            ));
        }

        if states.is_empty() {
            bail!("None of the configured shows could be found in the catalog.");
        }

        sort_show_states(&mut states, playlist.sort_by);

        let breaks = playlist.breaks.clone();
        let breaks_active = breaks.enabled && breaks.style != BreakStyle::Disabled;

        let pool = if breaks_active {
            self.catalog.list_commercials(&commercials.library_name)?
        } else {
            Vec::new()
        };
        if breaks_active && pool.is_empty() {
            eprintln!("Warning: no commercials found. Generating without breaks.");
        }

        let weights = category_weights(&commercials.categories);
        let mut history = PickHistory::new(breaks.min_gap);

        let mut playlist_items: Vec<ScheduledItem> = Vec::new();
        let mut dropped_shows: Vec<String> = Vec::new();
        let mut episodes_added = 0usize;
        let mut commercial_block_count = 0usize;
        let mut commercial_total_secs = 0.0;
        let mut total_runtime_secs = 0.0;
        let mut episodes_since_break = 0u32;
        let mut rotation_idx = 0usize;

        while episodes_added < episode_count {
            let active: Vec<usize> = (0..states.len())
                .filter(|&i| !states[i].exhausted)
                .collect();
            if active.is_empty() {
                eprintln!("Warning: all shows exhausted.");
                break;
            }

            let state_idx = active[rotation_idx % active.len()];
            rotation_idx += 1;

            let Some(episode) = states[state_idx].advance(self.catalog)? else {
                dropped_shows.push(states[state_idx].name.clone());
                eprintln!(
                    "Warning: '{}' has no more episodes.",
                    states[state_idx].name
                );
                // Give this turn to the next active show instead of skipping it
                rotation_idx -= 1;
                continue;
            };

            total_runtime_secs += episode.duration_secs;
            playlist_items.push(ScheduledItem::Episode(episode));
            episodes_added += 1;
            states[state_idx].episodes_added += 1;
            episodes_since_break += 1;

            if let Some(cb) = progress.as_deref_mut() {
                cb(episodes_added, episode_count);
            }

            // Break insertion; never after the final episode
            if breaks_active
                && !pool.is_empty()
                && episodes_since_break >= breaks.frequency
                && episodes_added < episode_count
            {
                match breaks.style {
                    BreakStyle::Single => {
                        let (clip, secs) = pick_single_commercial(&pool, &mut history, rng);
                        if let Some(clip) = clip {
                            playlist_items.push(ScheduledItem::Commercial(clip.clone()));
                            commercial_block_count += 1;
                            commercial_total_secs += secs;
                            total_runtime_secs += secs;
                        }
                    }
                    BreakStyle::Block => {
                        let (block, secs) =
                            build_commercial_block(&pool, breaks.block_duration, &weights, rng);
                        if !block.is_empty() {
                            playlist_items
                                .extend(block.into_iter().map(ScheduledItem::Commercial));
                            commercial_block_count += 1;
                            commercial_total_secs += secs;
                            total_runtime_secs += secs;
                        }
                    }
                    BreakStyle::Disabled => {}
                }
                episodes_since_break = 0;
            }
        }

        // Save updated positions back onto the playlist memberships
        for state in &states {
            if let Some(ps) = playlist
                .shows
                .iter_mut()
                .find(|ps| ps.name.eq_ignore_ascii_case(&state.name))
            {
                ps.current_season = state.current_season;
                ps.current_episode = state.current_episode;
            }
        }

        let mut episodes_by_show = HashMap::new();
        let mut show_positions = HashMap::new();
        for state in &states {
            episodes_by_show.insert(state.name.clone(), state.episodes_added);
            show_positions.insert(state.name.clone(), state.position());
        }

        Ok(GenerationResult {
            playlist_items,
            episodes_by_show,
            show_positions,
            total_runtime_secs,
            commercial_block_count,
            commercial_total_secs,
            dropped_shows,
        })
    }
}
