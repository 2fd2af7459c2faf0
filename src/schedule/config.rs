use serde::{Deserialize, Serialize};

/// A show in the global pool, shared by every playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowEntry {
    pub name: String,
    #[serde(default = "default_library")]
    pub library: String,
    pub year: Option<u32>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_library() -> String {
    "TV Shows".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-playlist membership: where the next scheduling pass resumes for a show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistShow {
    pub name: String,
    #[serde(default = "default_one")]
    pub current_season: u32,
    #[serde(default = "default_one")]
    pub current_episode: u32,
}

fn default_one() -> u32 {
    1
}

impl PlaylistShow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_season: 1,
            current_episode: 1,
        }
    }
}

/// How commercial breaks are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakStyle {
    Single,
    Block,
    Disabled,
}

/// Min/max duration for block-style breaks, in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockDurationRange {
    pub min: u32,
    pub max: u32,
}

impl Default for BlockDurationRange {
    fn default() -> Self {
        Self { min: 30, max: 120 }
    }
}

/// Commercial break policy for one playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_break_style")]
    pub style: BreakStyle,
    /// Insert a break after every N episodes
    #[serde(default = "default_one")]
    pub frequency: u32,
    /// No-repeat window size for single-style breaks
    #[serde(default = "default_min_gap")]
    pub min_gap: usize,
    #[serde(default)]
    pub block_duration: BlockDurationRange,
}

fn default_break_style() -> BreakStyle {
    BreakStyle::Single
}

fn default_min_gap() -> usize {
    50
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            style: BreakStyle::Single,
            frequency: 1,
            min_gap: 50,
            block_duration: BlockDurationRange::default(),
        }
    }
}

/// Iteration order among shows, fixed before round-robin begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    PremiereYear,
    PremiereYearDesc,
    Alphabetical,
    ConfigOrder,
}

/// One named channel: its shows, break policy, and generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDefinition {
    pub name: String,
    #[serde(default)]
    pub shows: Vec<PlaylistShow>,
    #[serde(default)]
    pub breaks: BreakPolicy,
    #[serde(default = "default_episodes_per_generation")]
    pub episodes_per_generation: usize,
    #[serde(default = "default_sort_by")]
    pub sort_by: SortPolicy,
}

fn default_episodes_per_generation() -> usize {
    30
}

fn default_sort_by() -> SortPolicy {
    SortPolicy::PremiereYear
}

/// A category of commercials with a selection weight for block assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommercialCategory {
    pub name: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Commercial library settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommercialSettings {
    #[serde(default = "default_commercial_library")]
    pub library_name: String,
    #[serde(default)]
    pub categories: Vec<CommercialCategory>,
}

fn default_commercial_library() -> String {
    "RealTV Commercials".to_string()
}

impl Default for CommercialSettings {
    fn default() -> Self {
        Self {
            library_name: default_commercial_library(),
            categories: Vec::new(),
        }
    }
}

/// A record of a past generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub playlist_name: String,
    pub episode_count: usize,
    pub shows: Vec<String>,
    #[serde(default)]
    pub runtime_secs: f64,
}

/// How many past runs to keep in the history log
pub const HISTORY_LIMIT: usize = 5;

/// Root channel configuration persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub shows: Vec<ShowEntry>,
    #[serde(default)]
    pub commercials: CommercialSettings,
    #[serde(default)]
    pub playlists: Vec<PlaylistDefinition>,
    #[serde(default)]
    pub default_playlist: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ChannelConfig {
    /// Load the channel configuration from a JSON file
    pub fn load_from_file(path: &str) -> Result<ChannelConfig, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ChannelConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the channel configuration back to a JSON file
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Find a playlist by name, case-insensitively
    pub fn get_playlist(&self, name: &str) -> Option<&PlaylistDefinition> {
        self.playlists
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Find a pool show by name, case-insensitively
    pub fn get_show(&self, name: &str) -> Option<&ShowEntry> {
        self.shows
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Append a history entry, keeping only the most recent runs
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            let drop = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..drop);
        }
    }

    /// Reject configurations the generator cannot act on sensibly
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut seen_shows = std::collections::HashSet::new();
        for show in &self.shows {
            if !seen_shows.insert(show.name.to_lowercase()) {
                return Err(format!("Duplicate show name: '{}'", show.name).into());
            }
        }

        let mut seen_categories = std::collections::HashSet::new();
        for cat in &self.commercials.categories {
            if !seen_categories.insert(cat.name.to_lowercase()) {
                return Err(format!("Duplicate category name: '{}'", cat.name).into());
            }
            if cat.weight <= 0.0 {
                return Err(format!(
                    "Category '{}' weight must be positive, got {}",
                    cat.name, cat.weight
                )
                .into());
            }
        }

        for playlist in &self.playlists {
            let breaks = &playlist.breaks;
            if breaks.block_duration.min > breaks.block_duration.max {
                return Err(format!(
                    "Playlist '{}': block_duration.min ({}) must be <= max ({})",
                    playlist.name, breaks.block_duration.min, breaks.block_duration.max
                )
                .into());
            }
            if breaks.frequency < 1 {
                return Err(
                    format!("Playlist '{}': break frequency must be >= 1", playlist.name).into(),
                );
            }
            if breaks.min_gap < 1 {
                return Err(
                    format!("Playlist '{}': break min_gap must be >= 1", playlist.name).into(),
                );
            }
            for ps in &playlist.shows {
                if ps.current_season < 1 || ps.current_episode < 1 {
                    return Err(format!(
                        "Playlist '{}': position for '{}' must be at least S01E01",
                        playlist.name, ps.name
                    )
                    .into());
                }
            }
        }

        Ok(())
    }
}
