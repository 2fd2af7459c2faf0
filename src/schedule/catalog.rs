use anyhow::Result;

use crate::models::{CommercialRef, EpisodeRef, ScheduledItem, ShowHandle};

/// Lookup capabilities the scheduler needs from the media server.
///
/// `find_show` resolves a configured show to a handle (and its premiere year,
/// when the server knows one). Episode and season lookups are positional so
/// the scheduler can walk a show without loading its whole tree.
#[cfg_attr(test, mockall::automock)]
pub trait Catalog {
    /// Resolve a show by exact title within a library. Errors when missing.
    fn find_show(&self, name: &str, library: &str) -> Result<ShowHandle>;

    /// Episode at (season, episode), or None past the end of the season.
    fn find_episode(
        &self,
        show: &ShowHandle,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeRef>>;

    /// Smallest season number greater than `after`, or None when exhausted.
    fn next_season_number(&self, show: &ShowHandle, after: u32) -> Result<Option<u32>>;

    /// Every clip in the commercial library. Empty when the library is missing.
    fn list_commercials(&self, library: &str) -> Result<Vec<CommercialRef>>;
}

/// Destination for a finished lineup. Replaces any playlist with the same name.
pub trait Sink {
    fn publish(&self, name: &str, items: &[ScheduledItem]) -> Result<()>;
}
