use serde::Deserialize;

/// A resolved show from the Plex library, carrying what the scheduler needs
#[derive(Debug, Clone)]
pub struct ShowHandle {
    pub rating_key: String,
    pub title: String,
    pub year: Option<u32>,
}

/// A scheduled episode, decoupled from the Plex object model
#[derive(Debug, Clone)]
pub struct EpisodeRef {
    pub rating_key: String,
    pub title: String,
    pub show_title: String,
    pub season: u32,
    pub episode: u32,
    pub duration_secs: f64,
}

/// A commercial clip; the file path is used to infer its category
#[derive(Debug, Clone)]
pub struct CommercialRef {
    pub rating_key: String,
    pub title: String,
    pub file_path: Option<String>,
    pub duration_secs: f64,
}

/// One entry in a generated playlist, type-tagged
#[derive(Debug, Clone)]
pub enum ScheduledItem {
    Episode(EpisodeRef),
    Commercial(CommercialRef),
}

impl ScheduledItem {
    pub fn rating_key(&self) -> &str {
        match self {
            ScheduledItem::Episode(ep) => &ep.rating_key,
            ScheduledItem::Commercial(clip) => &clip.rating_key,
        }
    }

    /// Duration in seconds; 0.0 when the server reported none
    pub fn duration_secs(&self) -> f64 {
        match self {
            ScheduledItem::Episode(ep) => ep.duration_secs,
            ScheduledItem::Commercial(clip) => clip.duration_secs,
        }
    }

    pub fn display_title(&self) -> String {
        match self {
            ScheduledItem::Episode(ep) => format!(
                "{} S{:02}E{:02}: {}",
                ep.show_title, ep.season, ep.episode, ep.title
            ),
            ScheduledItem::Commercial(clip) => clip.title.clone(),
        }
    }
}

/// Response structure for the /identity endpoint
#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: IdentityContainer,
}

#[derive(Debug, Deserialize)]
pub struct IdentityContainer {
    #[serde(rename = "machineIdentifier")]
    pub machine_identifier: String,
}

/// Response structure for /library/sections
#[derive(Debug, Deserialize)]
pub struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: SectionsContainer,
}

#[derive(Debug, Deserialize)]
pub struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<Directory>,
}

#[derive(Debug, Deserialize)]
pub struct Directory {
    pub key: String,
    pub title: String,
    pub refreshing: Option<bool>,
}

/// Response structure for metadata listings (section contents, children, playlists)
#[derive(Debug, Deserialize)]
pub struct MetadataResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: MetadataContainer,
}

#[derive(Debug, Deserialize)]
pub struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<Metadata>,
}

/// A single Plex metadata record; only the fields we read are modelled
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,
    #[serde(default)]
    pub title: String,
    /// Episode or season number
    pub index: Option<u32>,
    #[serde(rename = "grandparentTitle")]
    pub grandparent_title: Option<String>,
    pub year: Option<u32>,
    /// Duration in milliseconds
    pub duration: Option<u64>,
    #[serde(rename = "Media", default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(rename = "Part", default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    pub file: Option<String>,
}

impl Metadata {
    /// Duration in seconds; Plex reports milliseconds
    pub fn duration_secs(&self) -> f64 {
        self.duration.map(|ms| ms as f64 / 1000.0).unwrap_or(0.0)
    }

    /// First on-disk file location, if the server exposes one
    pub fn first_file(&self) -> Option<String> {
        self.media
            .first()
            .and_then(|m| m.parts.first())
            .and_then(|p| p.file.clone())
    }
}
