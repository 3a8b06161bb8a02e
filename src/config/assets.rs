//! Static asset configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Locations of the landing page and the public asset directory.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    /// HTML page served at `/`.
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,

    /// Directory served for any path not matched by a route.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_index_file() -> PathBuf {
    PathBuf::from("views/index.html")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            public_dir: default_public_dir(),
        }
    }
}
