use std::{
    f64::consts::FRAC_PI_2,
    panic::{catch_unwind, AssertUnwindSafe},
};

use geo::algorithm::buffer::{Buffer, BufferStyle, LineJoin};
use geo::{BoundingRect, CoordsIter, Geometry, MapCoords, MultiPolygon, Point};
use thiserror::Error;

use crate::crs::azimuthal::AzimuthalEquidistant;

const METERS_PER_KILOMETER: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Geometry has no coordinates")]
    EmptyGeometry,

    #[error("Geometry contains a non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("Coordinate ({x}, {y}) is outside the valid longitude/latitude range")]
    OutOfRange { x: f64, y: f64 },

    #[error("Cannot buffer geometry of type {0}")]
    Unsupported(&'static str),

    #[error("Could not convert geometry: {0}")]
    Conversion(String),

    #[error("Buffering panicked: {0}")]
    Panicked(String),
}

/// A geometric buffering capability working on WGS84 lon/lat geometries.
///
/// Positive distances dilate the geometry, negative distances erode it. Implementations may fail
/// on geometries they cannot process; callers decide how to recover.
pub trait BufferEngine {
    fn buffer(&self, geometry: &Geometry, distance_km: f64) -> Result<Geometry, BufferError>;
}

/// Buffers polygons by a geodesic distance.
///
/// The geometry is projected onto an azimuthal equidistant plane centred on its bounding box,
/// buffered there with round joins, and projected back.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicBuffer {
    /// Interpolation steps per quarter circle on rounded corners.
    steps: u32,
}

impl GeodesicBuffer {
    pub fn new(steps: u32) -> Self {
        Self {
            steps: steps.max(1),
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    fn style(&self, distance_m: f64) -> BufferStyle<f64> {
        BufferStyle::new(distance_m).line_join(LineJoin::Round(FRAC_PI_2 / self.steps as f64))
    }
}

impl Default for GeodesicBuffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUFFER_STEPS)
    }
}

impl BufferEngine for GeodesicBuffer {
    fn buffer(&self, geometry: &Geometry, distance_km: f64) -> Result<Geometry, BufferError> {
        let multi_polygon = match geometry {
            Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
            Geometry::MultiPolygon(multi_polygon) => multi_polygon.clone(),
            other => return Err(BufferError::Unsupported(geometry_type_name(other))),
        };
        check_lon_lat(&multi_polygon)?;
        let bounding_rect = multi_polygon
            .bounding_rect()
            .ok_or(BufferError::EmptyGeometry)?;
        let projection = AzimuthalEquidistant::new(Point::from(bounding_rect.center()));
        log::debug!(
            "Buffering {} polygon(s) by {} km around {:?}",
            multi_polygon.0.len(),
            distance_km,
            projection.center()
        );

        let projected = multi_polygon.map_coords(|coord| projection.forward(coord));
        let style = self.style(distance_km * METERS_PER_KILOMETER);
        let buffered = catch_unwind(AssertUnwindSafe(|| projected.buffer_with_style(style)))
            .map_err(|payload| BufferError::Panicked(panic_message(payload.as_ref())))?;
        let unprojected = buffered.map_coords(|coord| projection.inverse(coord));
        check_finite(&unprojected)?;

        Ok(single_or_multi(unprojected))
    }
}

fn check_finite(multi_polygon: &MultiPolygon) -> Result<(), BufferError> {
    match multi_polygon
        .coords_iter()
        .find(|coord| !coord.x.is_finite() || !coord.y.is_finite())
    {
        Some(coord) => Err(BufferError::NonFinite {
            x: coord.x,
            y: coord.y,
        }),
        None => Ok(()),
    }
}

fn check_lon_lat(multi_polygon: &MultiPolygon) -> Result<(), BufferError> {
    check_finite(multi_polygon)?;
    match multi_polygon
        .coords_iter()
        .find(|coord| coord.x.abs() > 180.0 || coord.y.abs() > 90.0)
    {
        Some(coord) => Err(BufferError::OutOfRange {
            x: coord.x,
            y: coord.y,
        }),
        None => Ok(()),
    }
}

/// A result with exactly one polygon is reported as a Polygon.
fn single_or_multi(mut multi_polygon: MultiPolygon) -> Geometry {
    match multi_polygon.0.len() {
        1 => Geometry::Polygon(multi_polygon.0.remove(0)),
        _ => Geometry::MultiPolygon(multi_polygon),
    }
}

fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Area, Geometry, MultiPolygon, Point};
    use rstest::rstest;

    use super::{BufferEngine, BufferError, GeodesicBuffer};

    /// One degree square in the Sahara.
    fn sahara_square() -> geo::Polygon {
        polygon![
            (x: 10.0, y: 20.0),
            (x: 11.0, y: 20.0),
            (x: 11.0, y: 21.0),
            (x: 10.0, y: 21.0),
            (x: 10.0, y: 20.0),
        ]
    }

    fn area(geometry: &Geometry) -> f64 {
        geometry.unsigned_area()
    }

    #[test]
    fn test_outward_buffer_grows_polygon() {
        let square = Geometry::Polygon(sahara_square());
        let buffered = GeodesicBuffer::default().buffer(&square, 30.0).unwrap();
        assert!(matches!(buffered, Geometry::Polygon(_)));
        assert!(area(&buffered) > area(&square));
    }

    #[test]
    fn test_inward_buffer_shrinks_polygon() {
        let square = Geometry::Polygon(sahara_square());
        let buffered = GeodesicBuffer::default().buffer(&square, -30.0).unwrap();
        assert!(matches!(buffered, Geometry::Polygon(_)));
        assert!(area(&buffered) < area(&square));
        assert!(area(&buffered) > 0.0);
    }

    #[test]
    fn test_inward_buffer_beyond_half_width_collapses() {
        // The square is roughly 105 km wide, so eroding by 80 km leaves nothing.
        let square = Geometry::Polygon(sahara_square());
        let buffered = GeodesicBuffer::default().buffer(&square, -80.0).unwrap();
        assert_eq!(0.0, area(&buffered));
    }

    #[test]
    fn test_multi_polygon_is_buffered_as_one_unit() {
        let mut far_square = sahara_square();
        far_square.exterior_mut(|exterior| {
            exterior.0.iter_mut().for_each(|coord| coord.x += 5.0);
        });
        let multi_polygon = Geometry::MultiPolygon(MultiPolygon::new(vec![
            sahara_square(),
            far_square,
        ]));
        let buffered = GeodesicBuffer::default()
            .buffer(&multi_polygon, 10.0)
            .unwrap();
        match buffered {
            Geometry::MultiPolygon(multi_polygon) => assert_eq!(2, multi_polygon.0.len()),
            other => panic!("Expected a MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_geometry() {
        let point = Geometry::Point(Point::new(10.0, 20.0));
        let result = GeodesicBuffer::default().buffer(&point, 30.0);
        assert!(matches!(result, Err(BufferError::Unsupported("Point"))));
    }

    #[rstest]
    #[case(f64::NAN, 20.0)]
    #[case(10.0, f64::INFINITY)]
    fn test_non_finite_coordinate(#[case] x: f64, #[case] y: f64) {
        let polygon = Geometry::Polygon(polygon![
            (x: 10.0, y: 20.0),
            (x: x, y: y),
            (x: 10.0, y: 21.0),
            (x: 10.0, y: 20.0),
        ]);
        let result = GeodesicBuffer::default().buffer(&polygon, 30.0);
        assert!(matches!(result, Err(BufferError::NonFinite { .. })));
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let polygon = Geometry::Polygon(polygon![
            (x: 10.0, y: 20.0),
            (x: 11.0, y: 95.0),
            (x: 10.0, y: 21.0),
            (x: 10.0, y: 20.0),
        ]);
        let result = GeodesicBuffer::default().buffer(&polygon, 30.0);
        assert!(matches!(result, Err(BufferError::OutOfRange { .. })));
    }

    #[test]
    fn test_empty_geometry() {
        let empty = Geometry::MultiPolygon(MultiPolygon::new(vec![]));
        let result = GeodesicBuffer::default().buffer(&empty, 30.0);
        assert!(matches!(result, Err(BufferError::EmptyGeometry)));
    }

    #[test]
    fn test_steps_are_at_least_one() {
        assert_eq!(1, GeodesicBuffer::new(0).steps());
        assert_eq!(8, GeodesicBuffer::default().steps());
    }
}
