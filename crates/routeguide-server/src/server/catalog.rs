//! Read-only feature catalog.
//!
//! [`FeatureCatalog`] is built once at startup and shared across every call
//! without locking. Features keep their load order, which is also the order
//! range queries report them in. An exact-point index answers lookups in
//! constant time; when two features share a location, the first one loaded
//! wins, matching a front-to-back scan.

use routeguide_core::{
    Error, Result,
    proto::Feature,
    types::{BoundingBox, GeoPoint},
};
use serde::Deserialize;
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

/// Landmarks served when no catalog file is configured.
const LANDMARKS: [(&str, i32, i32); 7] = [
    ("Liberty Bell", 395_906_000, -753_506_000),
    ("Statue of Liberty", 405_847_500, -741_301_800),
    ("Empire State Building", 407_486_500, -739_885_900),
    ("Golden Gate Bridge", 378_197_400, -1_224_650_700),
    ("Lincoln Memorial", 389_030_600, -770_494_800),
    ("Mount Rushmore", 438_813_500, -1_031_032_800),
    ("Space Needle", 476_203_100, -1_221_315_600),
];

#[derive(Debug, Default)]
pub struct FeatureCatalog {
    features: Vec<Feature>,
    by_point: HashMap<GeoPoint, usize>,
}

impl FeatureCatalog {
    pub fn new(features: Vec<Feature>) -> Self {
        let mut by_point = HashMap::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            by_point.entry(feature.point()).or_insert(idx);
        }
        Self { features, by_point }
    }

    /// The built-in landmark set.
    pub fn builtin() -> Self {
        Self::new(
            LANDMARKS
                .iter()
                .map(|&(name, lat, lon)| Feature::named(name, GeoPoint::new(lat, lon)))
                .collect(),
        )
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the file cannot be opened or does not
    /// hold an array of features.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::Catalog {
            reason: format!("failed to open {}: {e}", path.display()),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] on malformed input.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let records: Vec<FeatureRecord> =
            serde_json::from_reader(reader).map_err(|e| Error::Catalog {
                reason: format!("invalid feature list: {e}"),
            })?;
        Ok(Self::new(records.into_iter().map(Feature::from).collect()))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// The feature recorded exactly at `point`, if any.
    pub fn find(&self, point: GeoPoint) -> Option<&Feature> {
        self.by_point.get(&point).map(|&idx| &self.features[idx])
    }

    /// The feature at `point`, or an unnamed feature carrying `point` itself.
    pub fn lookup(&self, point: GeoPoint) -> Feature {
        self.find(point)
            .cloned()
            .unwrap_or_else(|| Feature::unnamed(point))
    }

    /// Features strictly inside `bbox`, in catalog order.
    pub fn within(&self, bbox: BoundingBox) -> impl Iterator<Item = &Feature> {
        self.features
            .iter()
            .filter(move |feature| bbox.contains(feature.point()))
    }
}

#[derive(Deserialize)]
struct FeatureRecord {
    #[serde(default)]
    name: String,
    location: LocationRecord,
}

#[derive(Deserialize)]
struct LocationRecord {
    latitude: i32,
    longitude: i32,
}

impl From<FeatureRecord> for Feature {
    fn from(record: FeatureRecord) -> Self {
        Feature::named(
            record.name,
            GeoPoint::new(record.location.latitude, record.location.longitude),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_catalog_feature_unchanged() {
        let catalog = FeatureCatalog::builtin();
        for feature in catalog.iter() {
            assert_eq!(&catalog.lookup(feature.point()), feature);
        }
    }

    #[test]
    fn lookup_miss_returns_unnamed_feature_at_query() {
        let catalog = FeatureCatalog::builtin();
        let point = GeoPoint::new(407_486_500, -3);
        let feature = catalog.lookup(point);
        assert!(feature.name.is_empty());
        assert_eq!(feature.point(), point);
        assert_eq!(catalog.lookup(point), feature);
    }

    #[test]
    fn first_feature_wins_on_shared_location() {
        let at = GeoPoint::new(1, 1);
        let catalog = FeatureCatalog::new(vec![
            Feature::named("first", at),
            Feature::named("second", at),
        ]);
        assert_eq!(catalog.lookup(at).name, "first");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn within_keeps_catalog_order_and_skips_edges() {
        let catalog = FeatureCatalog::new(vec![
            Feature::named("c", GeoPoint::new(5, 5)),
            Feature::named("edge", GeoPoint::new(0, 5)),
            Feature::named("a", GeoPoint::new(1, 9)),
            Feature::named("outside", GeoPoint::new(11, 5)),
            Feature::named("b", GeoPoint::new(9, 1)),
        ]);
        let bbox = BoundingBox::new(GeoPoint::new(0, 0), GeoPoint::new(10, 10));
        let names: Vec<_> = catalog.within(bbox).map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn within_mid_atlantic_box() {
        let catalog = FeatureCatalog::builtin();
        let bbox = BoundingBox::new(
            GeoPoint::new(385_000_000, -780_000_000),
            GeoPoint::new(410_000_000, -735_000_000),
        );
        let names: Vec<_> = catalog.within(bbox).map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Liberty Bell",
                "Statue of Liberty",
                "Empire State Building",
                "Lincoln Memorial"
            ]
        );
    }

    #[test]
    fn parses_json_catalog() {
        let json = r#"[
            {"location": {"latitude": 407838351, "longitude": -746143763}, "name": "Patriots Path"},
            {"location": {"latitude": 409146138, "longitude": -746188906}, "name": ""},
            {"location": {"latitude": 1, "longitude": 2}}
        ]"#;
        let catalog = FeatureCatalog::from_reader(json.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.lookup(GeoPoint::new(407_838_351, -746_143_763)).name,
            "Patriots Path"
        );
        assert!(catalog.find(GeoPoint::new(1, 2)).unwrap().name.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = FeatureCatalog::from_reader(r#"{"not": "a list"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Catalog { .. }));
    }

    #[test]
    fn missing_file_is_a_catalog_error() {
        let err = FeatureCatalog::load(Path::new("/nonexistent/features.json")).unwrap_err();
        assert!(matches!(err, Error::Catalog { .. }));
    }
}
