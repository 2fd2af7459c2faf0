use anyhow::Result;

/// Plex connection settings loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub base_url: String,
    pub token: String,
}

/// Load connection settings from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    // Read variables
    let base_url = std::env::var("PLEX_URL")?;
    let token = std::env::var("PLEX_TOKEN")?;
    Ok(Config { base_url, token })
}
