use crate::error::FitError;
use std::path::{Path, PathBuf};

/// Data type name Google Fit uses for heart rate samples in beats per minute.
pub const HEART_RATE_BPM: &str = "com.google.heart_rate.bpm";

/// The authenticated user, as the Fitness API spells it.
pub const USER_ID: &str = "me";

/// How far back from "now" samples are requested.
pub const LOOKBACK_HOURS: i64 = 24;

const DEFAULT_CLIENT_SECRET: &str = "client_id.json";
const TOKEN_STORE_DIR: &str = "sony_sbr12_auth";
const TOKEN_FILE: &str = "tokens.json";

const CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";
const TOKEN_STORE_VAR: &str = "FIT_TOKEN_STORE";

/// Everything a run needs to know, resolved once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_secret_path: PathBuf,
    pub token_store_dir: PathBuf,
    pub user_id: String,
    pub data_type: String,
    pub lookback: chrono::Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Builds a config from an arbitrary variable lookup. `home` is only consulted when
    /// no token store override is set.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> anyhow::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_secret_path = lookup(CLIENT_SECRET_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENT_SECRET));

        let token_store_dir = match lookup(TOKEN_STORE_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => home.ok_or(FitError::NoHomeDir)?.join(TOKEN_STORE_DIR),
        };

        Ok(Config {
            client_secret_path,
            token_store_dir,
            user_id: USER_ID.to_string(),
            data_type: HEART_RATE_BPM.to_string(),
            lookback: chrono::Duration::hours(LOOKBACK_HOURS),
        })
    }

    /// Fails early when the client secret file is missing, before any browser flow starts.
    pub fn validate(&self) -> Result<(), FitError> {
        if !Path::new(&self.client_secret_path).exists() {
            return Err(FitError::MissingClientSecret(
                self.client_secret_path.clone(),
            ));
        }
        Ok(())
    }

    pub fn token_file(&self) -> PathBuf {
        self.token_store_dir.join(TOKEN_FILE)
    }
}
