use anyhow::Result;

use super::catalog::Catalog;
use super::config::SortPolicy;
use crate::models::{EpisodeRef, ShowHandle};

/// Mutable traversal state for one show during a generation run.
///
/// The (season, episode) pointer always names the next episode to schedule;
/// `advance` moves it past whatever it returns.
#[derive(Debug, Clone)]
pub struct ShowState {
    pub name: String,
    pub year: Option<u32>,
    pub handle: ShowHandle,
    pub current_season: u32,
    pub current_episode: u32,
    pub exhausted: bool,
    pub episodes_added: usize,
}

impl ShowState {
    pub fn new(name: String, year: Option<u32>, handle: ShowHandle, season: u32, episode: u32) -> Self {
        Self {
            name,
            year,
            handle,
            current_season: season,
            current_episode: episode,
            exhausted: false,
            episodes_added: 0,
        }
    }

    /// Resolve the episode at the cursor and move the cursor past it.
    ///
    /// Falls through to the first episode of the next season when the current
    /// one runs out. Returns None (and marks the show exhausted) when neither
    /// the current position nor any later season has an episode.
    pub fn advance<C: Catalog + ?Sized>(&mut self, catalog: &C) -> Result<Option<EpisodeRef>> {
        if let Some(ep) =
            catalog.find_episode(&self.handle, self.current_season, self.current_episode)?
        {
            self.current_episode += 1;
            return Ok(Some(ep));
        }

        // End of season: jump to the next one, if any
        let Some(next_season) = catalog.next_season_number(&self.handle, self.current_season)?
        else {
            self.exhausted = true;
            return Ok(None);
        };

        self.current_season = next_season;
        self.current_episode = 1;

        match catalog.find_episode(&self.handle, self.current_season, self.current_episode)? {
            Some(ep) => {
                self.current_episode += 1;
                Ok(Some(ep))
            }
            None => {
                // A season with no first episode ends the show too
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    /// Saved-position string, e.g. "S02E07"
    pub fn position(&self) -> String {
        format!("S{:02}E{:02}", self.current_season, self.current_episode)
    }
}

/// Fix the round-robin order among shows. Stable: ties keep config order.
/// Shows without a premiere year sort after dated ones for both year policies.
pub fn sort_show_states(states: &mut [ShowState], policy: SortPolicy) {
    match policy {
        SortPolicy::PremiereYear => {
            states.sort_by_key(|s| (s.year.is_none(), s.year.unwrap_or(0)));
        }
        SortPolicy::PremiereYearDesc => {
            states.sort_by_key(|s| (s.year.is_none(), -(s.year.unwrap_or(0) as i64)));
        }
        SortPolicy::Alphabetical => {
            states.sort_by_key(|s| s.name.to_lowercase());
        }
        SortPolicy::ConfigOrder => {}
    }
}
