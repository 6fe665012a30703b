use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a registry directory.
///
/// This struct holds settings that control how assets are registered and how
/// registry reads are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether assets may be registered under a department that is not in
    /// the MAC catalogue.
    ///
    /// Such assets receive a code with an empty MAC segment, which never
    /// passes validation.
    pub allow_unknown_mac: bool,

    /// Whether registration refuses a code that is already held, or was
    /// retired, in the same collection.
    pub check_collisions: bool,

    /// Extra attempts made when a registry read fails.
    query_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_unknown_mac: false,
            check_collisions: default_check_collisions(),
            query_retries: 0,
        }
    }
}

impl Config {
    /// Reads a registry configuration from `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file is unreadable or is not a known config layout.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Writes the configuration to `path` in the current layout.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the number of extra attempts for a failed registry read.
    #[must_use]
    pub const fn query_retries(&self) -> u32 {
        self.query_retries
    }

    /// Sets the number of extra attempts for a failed registry read.
    pub const fn set_query_retries(&mut self, retries: u32) {
        self.query_retries = retries;
    }
}

const fn default_check_collisions() -> bool {
    true
}

/// On-disk layouts of `config.toml`, keyed by `_version`.
///
/// New layouts get a new variant; old files keep loading through theirs.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        allow_unknown_mac: bool,

        #[serde(default = "default_check_collisions")]
        check_collisions: bool,

        #[serde(default)]
        query_retries: u32,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                allow_unknown_mac,
                check_collisions,
                query_retries,
            } => Self {
                allow_unknown_mac,
                check_collisions,
                query_retries,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            allow_unknown_mac: config.allow_unknown_mac,
            check_collisions: config.check_collisions,
            query_retries: config.query_retries,
        }
    }
}
