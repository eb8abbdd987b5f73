use geo::{coord, Bearing, Coord, Destination, Distance, Haversine, Point};

/// Spherical azimuthal equidistant projection centred on a fixed WGS84 point.
///
/// Distances and bearings from the centre are preserved, so a planar buffer around a geometry near
/// the centre approximates a geodesic buffer. Planar coordinates are in meters, x pointing east
/// and y pointing north.
#[derive(Debug, Clone, Copy)]
pub struct AzimuthalEquidistant {
    center: Point,
}

impl AzimuthalEquidistant {
    /// # Arguments
    /// * center - projection centre as lon/lat in degrees.
    pub fn new(center: Point) -> Self {
        Self { center }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Project a lon/lat coordinate to planar meters.
    pub fn forward(&self, coord: Coord) -> Coord {
        let point = Point::from(coord);
        let distance = Haversine.distance(self.center, point);
        if distance == 0.0 {
            return coord! { x: 0.0, y: 0.0 };
        }
        let bearing = Haversine.bearing(self.center, point).to_radians();
        coord! {
            x: distance * bearing.sin(),
            y: distance * bearing.cos(),
        }
    }

    /// Unproject planar meters back to a lon/lat coordinate.
    pub fn inverse(&self, coord: Coord) -> Coord {
        let distance = coord.x.hypot(coord.y);
        if distance == 0.0 {
            return self.center.0;
        }
        let bearing = coord.x.atan2(coord.y).to_degrees();
        Haversine.destination(self.center, bearing, distance).0
    }
}
