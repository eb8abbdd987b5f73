use std::fmt;

use geojson::{Feature, FeatureCollection};
use indicatif::ProgressBar;

use crate::geofile::feature::{is_polygonal, with_index_identifier};

use super::{
    buffer::BufferEngine,
    transform::{Offset, OffsetTransformer},
};

/// Which derived collection a feature is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Boundaries expanded by the scale distance.
    Outer,
    /// Boundaries contracted by the scale distance.
    Inner,
}

impl Direction {
    pub fn signed_distance(&self, distance_km: f64) -> f64 {
        match self {
            Direction::Outer => distance_km,
            Direction::Inner => -distance_km,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outer => write!(f, "outer"),
            Direction::Inner => write!(f, "inner"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOutcome {
    Buffered,
    /// Buffering failed and the original geometry was kept.
    Fallback,
    /// Non-polygonal or missing geometry, only the identifier was assigned.
    PassedThrough,
}

/// Per-direction tally of what happened to each feature.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionReport {
    pub buffered: usize,
    pub fallbacks: usize,
    pub passed_through: usize,
}

impl DirectionReport {
    fn record(&mut self, outcome: FeatureOutcome) {
        match outcome {
            FeatureOutcome::Buffered => self.buffered += 1,
            FeatureOutcome::Fallback => self.fallbacks += 1,
            FeatureOutcome::PassedThrough => self.passed_through += 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScaleReport {
    pub outer: DirectionReport,
    pub inner: DirectionReport,
}

/// The two collections derived from one input, index aligned with it.
#[derive(Debug)]
pub struct ScaledCollections {
    pub outer: FeatureCollection,
    pub inner: FeatureCollection,
    pub report: ScaleReport,
}

/// Derives the outer and inner collections from an input collection.
///
/// Every feature is mapped on its own: the result for index `i` depends only on feature `i`, so
/// the per-feature work could be spread over workers without changing the output.
pub struct BatchProcessor<'a, B: BufferEngine> {
    transformer: &'a OffsetTransformer<B>,
    distance_km: f64,
}

impl<'a, B: BufferEngine> BatchProcessor<'a, B> {
    /// # Arguments
    /// * transformer - offsets polygonal geometries.
    /// * distance_km - magnitude of the offset, applied outward and inward.
    pub fn new(transformer: &'a OffsetTransformer<B>, distance_km: f64) -> Self {
        Self {
            transformer,
            distance_km,
        }
    }

    pub fn process(&self, feature_collection: &FeatureCollection) -> ScaledCollections {
        let num_features = feature_collection.features.len();
        log::info!(
            "Scaling {} features by {} km in both directions",
            num_features,
            self.distance_km
        );
        let bar = ProgressBar::new(2 * num_features as u64);
        let (outer, outer_report) =
            self.scale_collection(feature_collection, Direction::Outer, &bar);
        let (inner, inner_report) =
            self.scale_collection(feature_collection, Direction::Inner, &bar);
        bar.finish_and_clear();

        ScaledCollections {
            outer,
            inner,
            report: ScaleReport {
                outer: outer_report,
                inner: inner_report,
            },
        }
    }

    fn scale_collection(
        &self,
        feature_collection: &FeatureCollection,
        direction: Direction,
        bar: &ProgressBar,
    ) -> (FeatureCollection, DirectionReport) {
        let mut report = DirectionReport::default();
        let features = feature_collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let (scaled_feature, outcome) = self.scale_feature(index, feature, direction);
                report.record(outcome);
                bar.inc(1);
                scaled_feature
            })
            .collect();
        (
            FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            report,
        )
    }

    /// Build the feature at `index` of the `direction` collection.
    pub fn scale_feature(
        &self,
        index: usize,
        feature: &Feature,
        direction: Direction,
    ) -> (Feature, FeatureOutcome) {
        let mut scaled_feature = with_index_identifier(feature, index);
        let geometry = match &feature.geometry {
            Some(geometry) if is_polygonal(geometry) => geometry,
            _ => return (scaled_feature, FeatureOutcome::PassedThrough),
        };

        let signed_distance = direction.signed_distance(self.distance_km);
        match self.transformer.offset(geometry, signed_distance) {
            Offset::Buffered(buffered) => {
                scaled_feature.geometry = Some(buffered);
                // The input bbox no longer describes the buffered geometry.
                scaled_feature.bbox = None;
                (scaled_feature, FeatureOutcome::Buffered)
            }
            Offset::Fallback { geometry, error } => {
                log::warn!(
                    "Feature {}: {} offset by {} km failed, keeping original geometry. {}",
                    index,
                    direction,
                    signed_distance,
                    error
                );
                scaled_feature.geometry = Some(geometry);
                (scaled_feature, FeatureOutcome::Fallback)
            }
        }
    }
}
