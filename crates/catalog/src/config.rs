use std::env;
use std::path::PathBuf;

use crate::model::LibraryId;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// Where map records come from, read from `GLOBE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub backend_url: String,
    pub library_id: LibraryId,
    pub maps_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            library_id: LibraryId(1),
            maps_dir: PathBuf::from("maps"),
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            backend_url: lookup("GLOBE_BACKEND_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.backend_url),
            library_id: LibraryId(parse_or(&lookup, "GLOBE_LIBRARY_ID", defaults.library_id.0)),
            maps_dir: lookup("GLOBE_MAPS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.maps_dir),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
