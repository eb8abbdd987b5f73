use crate::geofile::feature::{geometry_kind, is_polygonal};

use super::buffer::{BufferEngine, BufferError};

/// Outcome of offsetting one polygonal geometry.
///
/// Buffering failures never abort the caller. They are carried as `Fallback`, which holds a copy
/// of the untransformed input geometry together with the cause.
#[derive(Debug)]
pub enum Offset {
    Buffered(geojson::Geometry),
    Fallback {
        geometry: geojson::Geometry,
        error: BufferError,
    },
}

impl Offset {
    pub fn geometry(&self) -> &geojson::Geometry {
        match self {
            Offset::Buffered(geometry) => geometry,
            Offset::Fallback { geometry, .. } => geometry,
        }
    }

    pub fn into_geometry(self) -> geojson::Geometry {
        match self {
            Offset::Buffered(geometry) => geometry,
            Offset::Fallback { geometry, .. } => geometry,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Offset::Fallback { .. })
    }
}

/// Applies a signed kilometer offset to Polygon and MultiPolygon geometries.
pub struct OffsetTransformer<B: BufferEngine> {
    engine: B,
}

impl<B: BufferEngine> OffsetTransformer<B> {
    pub fn new(engine: B) -> Self {
        Self { engine }
    }

    /// Dilate (positive distance) or erode (negative distance) a polygonal geometry.
    ///
    /// A MultiPolygon is handed to the buffer engine whole. Whatever the engine returns is
    /// accepted, including an empty result from an erosion wider than the polygon.
    pub fn offset(&self, geometry: &geojson::Geometry, distance_km: f64) -> Offset {
        match self.try_offset(geometry, distance_km) {
            Ok(buffered) => Offset::Buffered(buffered),
            Err(error) => {
                log::debug!(
                    "Could not buffer {} by {} km, keeping original geometry: {}",
                    geometry_kind(Some(geometry)),
                    distance_km,
                    error
                );
                Offset::Fallback {
                    geometry: geometry.clone(),
                    error,
                }
            }
        }
    }

    fn try_offset(
        &self,
        geometry: &geojson::Geometry,
        distance_km: f64,
    ) -> Result<geojson::Geometry, BufferError> {
        if !is_polygonal(geometry) {
            return Err(BufferError::Unsupported(geometry_kind(Some(geometry))));
        }
        let geo_geometry = geo::Geometry::<f64>::try_from(geometry.value.clone())
            .map_err(|err| BufferError::Conversion(err.to_string()))?;
        let buffered = self.engine.buffer(&geo_geometry, distance_km)?;
        Ok(geojson::Geometry::new(geojson::Value::from(&buffered)))
    }
}
