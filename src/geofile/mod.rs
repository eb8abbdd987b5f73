pub mod error;
pub mod feature;
pub mod geojson;
