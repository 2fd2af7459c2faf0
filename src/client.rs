use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use ureq::Agent;
use urlencoding::encode;

use crate::config::Config;
use crate::models::{
    CommercialRef, Directory, EpisodeRef, IdentityResponse, Metadata, MetadataResponse,
    ScheduledItem, SectionsResponse, ShowHandle,
};
use crate::schedule::{Catalog, Sink};

/// Items per playlist write; keeps request URIs under Plex's length limits
const PLAYLIST_CHUNK_SIZE: usize = 200;

/// A Plex HTTP API client using token authentication
pub struct PlexClient {
    agent: Agent,
    base_url: String,
    token: String,
    client_id: String,
}

impl PlexClient {
    /// Create a new client with configuration from environment
    pub fn new(config: Config) -> Self {
        let agent = Agent::new();

        // Plex wants a stable per-installation client identifier
        let client_id = format!(
            "{:x}",
            md5::compute(format!("{}realtv-generator", config.base_url))
        )[..16]
            .to_string();

        PlexClient {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            client_id,
        }
    }

    /// Build a request URL with the auth token and any extra query parameters
    fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{}?X-Plex-Token={}",
            self.base_url,
            path,
            encode(&self.token)
        );
        for (key, value) in params {
            url.push_str(&format!("&{}={}", key, encode(value)));
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .set("X-Plex-Client-Identifier", &self.client_id)
            .set("X-Plex-Product", "realtv-generator")
            .call()
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let response_text = response.into_string()?;
        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))
    }

    /// Test the connection; returns the server's machine identifier
    pub fn ping(&self) -> Result<String> {
        self.machine_identifier()
    }

    fn machine_identifier(&self) -> Result<String> {
        let url = self.url("/identity", &[]);
        let parsed: IdentityResponse = self.get_json(&url)?;
        Ok(parsed.media_container.machine_identifier)
    }

    fn sections(&self) -> Result<Vec<Directory>> {
        let url = self.url("/library/sections", &[]);
        let parsed: SectionsResponse = self.get_json(&url)?;
        Ok(parsed.media_container.directories)
    }

    /// Library section key for a library title. Errors when missing.
    fn section_key(&self, library: &str) -> Result<String> {
        self.sections()?
            .into_iter()
            .find(|d| d.title.eq_ignore_ascii_case(library))
            .map(|d| d.key)
            .ok_or_else(|| anyhow!("Library '{}' not found on server", library))
    }

    fn children(&self, rating_key: &str) -> Result<Vec<Metadata>> {
        let url = self.url(&format!("/library/metadata/{rating_key}/children"), &[]);
        let parsed: MetadataResponse = self.get_json(&url)?;
        Ok(parsed.media_container.metadata)
    }

    /// Trigger a scan of a library and wait for it to finish.
    /// Returns the number of items in the library after scanning.
    pub fn rescan_library(&self, library: &str, timeout_secs: u64) -> Result<usize> {
        let key = self.section_key(library)?;
        let refresh_url = self.url(&format!("/library/sections/{key}/refresh"), &[]);
        self.agent
            .get(&refresh_url)
            .set("X-Plex-Client-Identifier", &self.client_id)
            .call()
            .map_err(|e| anyhow!("Library refresh failed: {}", e))?;

        let mut elapsed = 0;
        while elapsed < timeout_secs {
            std::thread::sleep(std::time::Duration::from_secs(2));
            elapsed += 2;
            let still_refreshing = self
                .sections()?
                .into_iter()
                .find(|d| d.key == key)
                .and_then(|d| d.refreshing)
                .unwrap_or(false);
            if !still_refreshing {
                let all_url = self.url(&format!("/library/sections/{key}/all"), &[]);
                let parsed: MetadataResponse = self.get_json(&all_url)?;
                return Ok(parsed.media_container.metadata.len());
            }
        }

        Err(anyhow!(
            "Library '{}' scan did not complete within {}s",
            library,
            timeout_secs
        ))
    }

    fn find_existing_playlist(&self, name: &str) -> Result<Option<Metadata>> {
        let url = self.url("/playlists", &[]);
        let parsed: MetadataResponse = self.get_json(&url)?;
        Ok(parsed
            .media_container
            .metadata
            .into_iter()
            .find(|m| m.title == name))
    }

    fn delete_playlist(&self, rating_key: &str) -> Result<()> {
        let url = self.url(&format!("/playlists/{rating_key}"), &[]);
        self.agent
            .delete(&url)
            .set("X-Plex-Client-Identifier", &self.client_id)
            .call()
            .map_err(|e| anyhow!("Failed to delete playlist: {}", e))?;
        Ok(())
    }

    /// Library URI for a set of items, the form the playlist endpoints accept
    fn items_uri(&self, machine: &str, items: &[ScheduledItem]) -> String {
        let keys: Vec<&str> = items.iter().map(|i| i.rating_key()).collect();
        format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            machine,
            keys.join(",")
        )
    }

    /// Create a playlist (replacing any existing one of the same name) and
    /// fill it with the given items, chunked to keep URIs manageable.
    pub fn create_or_update_playlist(&self, name: &str, items: &[ScheduledItem]) -> Result<()> {
        if items.is_empty() {
            return Err(anyhow!("Refusing to create empty playlist '{}'", name));
        }

        if let Some(existing) = self.find_existing_playlist(name)? {
            println!(
                "Playlist '{}' already exists (ID: {}), replacing it...",
                name, existing.rating_key
            );
            self.delete_playlist(&existing.rating_key)?;
        }

        let machine = self.machine_identifier()?;

        let first = &items[..items.len().min(PLAYLIST_CHUNK_SIZE)];
        let create_url = self.url(
            "/playlists",
            &[
                ("type", "video"),
                ("smart", "0"),
                ("title", name),
                ("uri", &self.items_uri(&machine, first)),
            ],
        );

        let response = self
            .agent
            .post(&create_url)
            .set("Accept", "application/json")
            .set("X-Plex-Client-Identifier", &self.client_id)
            .call()
            .map_err(|e| anyhow!("Failed to create playlist: {}", e))?;

        let response_text = response.into_string()?;
        let parsed: MetadataResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse create playlist response: {}", e))?;
        let playlist_key = parsed
            .media_container
            .metadata
            .first()
            .map(|m| m.rating_key.clone())
            .ok_or_else(|| anyhow!("No playlist returned in create response"))?;

        // Append remaining chunks
        for chunk in items[first.len()..].chunks(PLAYLIST_CHUNK_SIZE) {
            let append_url = self.url(
                &format!("/playlists/{playlist_key}/items"),
                &[("uri", &self.items_uri(&machine, chunk))],
            );
            self.agent
                .put(&append_url)
                .set("Accept", "application/json")
                .set("X-Plex-Client-Identifier", &self.client_id)
                .call()
                .map_err(|e| anyhow!("Failed to append playlist items: {}", e))?;
        }

        Ok(())
    }
}

impl Catalog for PlexClient {
    fn find_show(&self, name: &str, library: &str) -> Result<ShowHandle> {
        let key = self.section_key(library)?;
        // type=2 restricts the listing to shows; the title filter is a
        // substring match, so pick the exact title out of the results
        let url = self.url(
            &format!("/library/sections/{key}/all"),
            &[("type", "2"), ("title", name)],
        );
        let parsed: MetadataResponse = self.get_json(&url)?;
        parsed
            .media_container
            .metadata
            .into_iter()
            .find(|m| m.title.eq_ignore_ascii_case(name))
            .map(|m| ShowHandle {
                rating_key: m.rating_key,
                title: m.title,
                year: m.year,
            })
            .ok_or_else(|| anyhow!("Show '{}' not found in library '{}'", name, library))
    }

    fn find_episode(
        &self,
        show: &ShowHandle,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeRef>> {
        let Some(season_meta) = self
            .children(&show.rating_key)?
            .into_iter()
            .find(|s| s.index == Some(season))
        else {
            return Ok(None);
        };

        Ok(self
            .children(&season_meta.rating_key)?
            .into_iter()
            .find(|ep| ep.index == Some(episode))
            .map(|ep| EpisodeRef {
                duration_secs: ep.duration_secs(),
                show_title: ep.grandparent_title.unwrap_or_else(|| show.title.clone()),
                rating_key: ep.rating_key,
                title: ep.title,
                season,
                episode,
            }))
    }

    fn next_season_number(&self, show: &ShowHandle, after: u32) -> Result<Option<u32>> {
        // Season 0 holds specials; never schedule into it
        let mut numbers: Vec<u32> = self
            .children(&show.rating_key)?
            .into_iter()
            .filter_map(|s| s.index)
            .filter(|&n| n > 0)
            .collect();
        numbers.sort_unstable();
        Ok(numbers.into_iter().find(|&n| n > after))
    }

    fn list_commercials(&self, library: &str) -> Result<Vec<CommercialRef>> {
        // A missing commercial library means an empty pool, not a failure
        let Ok(key) = self.section_key(library) else {
            return Ok(Vec::new());
        };

        let url = self.url(&format!("/library/sections/{key}/all"), &[]);
        let parsed: MetadataResponse = self.get_json(&url)?;
        Ok(parsed
            .media_container
            .metadata
            .into_iter()
            .map(|m| CommercialRef {
                duration_secs: m.duration_secs(),
                file_path: m.first_file(),
                rating_key: m.rating_key,
                title: m.title,
            })
            .collect())
    }
}

impl Sink for PlexClient {
    fn publish(&self, name: &str, items: &[ScheduledItem]) -> Result<()> {
        self.create_or_update_playlist(name, items)
    }
}
