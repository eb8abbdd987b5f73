use std::{fs, path::Path};

use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;

use super::error::{LoadError, WriteError};

/// Output document shape. Field order is the serialization order: type tag first, then features.
#[derive(Serialize)]
struct FeatureCollectionDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: &'a [Feature],
}

/// Read a GeoJSON file that must contain a single FeatureCollection.
pub fn read_feature_collection(input_filepath: &Path) -> Result<FeatureCollection, LoadError> {
    let contents = fs::read_to_string(input_filepath).map_err(|source| LoadError::Read {
        path: input_filepath.to_path_buf(),
        source,
    })?;
    parse_feature_collection(&contents, input_filepath)
}

fn parse_feature_collection(contents: &str, path: &Path) -> Result<FeatureCollection, LoadError> {
    if contents.trim().is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    let geojson = contents
        .parse::<GeoJson>()
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    match geojson {
        GeoJson::FeatureCollection(feature_collection) => Ok(feature_collection),
        GeoJson::Feature(_) => Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
            found: "Feature",
        }),
        GeoJson::Geometry(_) => Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
            found: "Geometry",
        }),
    }
}

/// Serialize features as an indented FeatureCollection document, replacing any existing file.
pub fn write_feature_collection(
    feature_collection: &FeatureCollection,
    output_filepath: &Path,
) -> Result<(), WriteError> {
    let document = FeatureCollectionDocument {
        kind: "FeatureCollection",
        features: &feature_collection.features,
    };
    let contents =
        serde_json::to_string_pretty(&document).map_err(|source| WriteError::Serialize {
            path: output_filepath.to_path_buf(),
            source,
        })?;
    fs::write(output_filepath, contents).map_err(|source| WriteError::Write {
        path: output_filepath.to_path_buf(),
        source,
    })
}
