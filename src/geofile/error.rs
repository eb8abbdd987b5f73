use std::path::PathBuf;

use thiserror::Error;

/// Failure to load the input feature collection. Always fatal for a run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Input file {path:?} is empty")]
    Empty { path: PathBuf },

    #[error("Could not parse {path:?} as GeoJSON: {source}")]
    Parse {
        path: PathBuf,
        source: geojson::Error,
    },

    #[error("Expected a FeatureCollection in {path:?}, found a {found}")]
    NotFeatureCollection { path: PathBuf, found: &'static str },
}

/// Failure to write an output feature collection. Always fatal for a run.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Could not serialize feature collection for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
