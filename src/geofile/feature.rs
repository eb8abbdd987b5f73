use geojson::{feature::Id, Feature, JsonObject, JsonValue, Value};

/// Property key that mirrors the feature identifier.
pub const ID_PROPERTY: &str = "id";

/// Whether the geometry kind can be offset, i.e. it is a Polygon or MultiPolygon.
pub fn is_polygonal(geometry: &geojson::Geometry) -> bool {
    matches!(geometry.value, Value::Polygon(_) | Value::MultiPolygon(_))
}

/// Name of the geometry kind, or "null" for a feature without geometry.
pub fn geometry_kind(geometry: Option<&geojson::Geometry>) -> &'static str {
    match geometry.map(|geometry| &geometry.value) {
        Some(Value::Point(_)) => "Point",
        Some(Value::MultiPoint(_)) => "MultiPoint",
        Some(Value::LineString(_)) => "LineString",
        Some(Value::MultiLineString(_)) => "MultiLineString",
        Some(Value::Polygon(_)) => "Polygon",
        Some(Value::MultiPolygon(_)) => "MultiPolygon",
        Some(Value::GeometryCollection(_)) => "GeometryCollection",
        None => "null",
    }
}

/// Copy a feature and stamp it with its position in the input collection.
///
/// The identifier is always overwritten with `index` rendered as a string, and the same string is
/// stored under the `id` property. Every other member is kept as is.
pub fn with_index_identifier(feature: &Feature, index: usize) -> Feature {
    let identifier = index.to_string();
    let mut properties = feature.properties.clone().unwrap_or_else(JsonObject::new);
    properties.insert(
        ID_PROPERTY.to_string(),
        JsonValue::String(identifier.clone()),
    );
    Feature {
        bbox: feature.bbox.clone(),
        geometry: feature.geometry.clone(),
        id: Some(Id::String(identifier)),
        properties: Some(properties),
        foreign_members: feature.foreign_members.clone(),
    }
}
