use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value as GeoJsonValue};
use log::info;
use serde_json::json;

use crate::Error;
use crate::assembly::ScoredGeometryCollection;
use crate::centrality::CentralityRecord;

impl CentralityRecord {
    /// Converts the record to a `GeoJSON` feature with `osmid`, `centrality`
    /// and, for exact results, `u`, `v` and `key` properties.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("osmid".to_string(), json!(self.edge_id.0));
        properties.insert("centrality".to_string(), json!(self.centrality));
        if let Some(endpoints) = self.endpoints {
            properties.insert("u".to_string(), json!(endpoints.u));
            properties.insert("v".to_string(), json!(endpoints.v));
            properties.insert("key".to_string(), json!(endpoints.key));
        }

        let value = match self.geometry.0.as_slice() {
            [line] => GeoJsonValue::from(line),
            _ => GeoJsonValue::from(&self.geometry),
        };

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl ScoredGeometryCollection {
    pub fn to_geojson(&self) -> FeatureCollection {
        FeatureCollection {
            features: self.records.iter().map(CentralityRecord::to_feature).collect(),
            bbox: None,
            foreign_members: None,
        }
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&GeoJson::from(self.to_geojson()))?)
    }
}

/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be written.
pub fn write_geojson(records: &ScoredGeometryCollection, path: &Path) -> Result<(), Error> {
    info!("Writing {} scored streets to {}", records.len(), path.display());
    fs::write(path, records.to_geojson_string()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::{EdgeEndpoints, Strategy};
    use crate::model::EdgeId;
    use geo::{LineString, MultiLineString, coord};

    fn line(x: f64) -> LineString<f64> {
        LineString::new(vec![coord! { x: x, y: 0.0 }, coord! { x: x + 1.0, y: 1.0 }])
    }

    fn collection() -> ScoredGeometryCollection {
        ScoredGeometryCollection {
            strategy: Strategy::Exact,
            records: vec![
                CentralityRecord {
                    edge_id: EdgeId(42),
                    endpoints: Some(EdgeEndpoints { u: 1, v: 2, key: 0 }),
                    geometry: MultiLineString::new(vec![line(0.0)]),
                    centrality: 0.25,
                },
                CentralityRecord {
                    edge_id: EdgeId(43),
                    endpoints: None,
                    geometry: MultiLineString::new(vec![line(0.0), line(2.0)]),
                    centrality: 1.0,
                },
            ],
        }
    }

    #[test]
    fn features_carry_scores_and_endpoints() {
        let fc = collection().to_geojson();
        assert_eq!(fc.features.len(), 2);

        let first = &fc.features[0];
        assert_eq!(first.property("osmid"), Some(&json!(42)));
        assert_eq!(first.property("centrality"), Some(&json!(0.25)));
        assert_eq!(first.property("u"), Some(&json!(1)));
        assert_eq!(first.property("key"), Some(&json!(0)));
        assert!(matches!(
            first.geometry.as_ref().map(|g| &g.value),
            Some(GeoJsonValue::LineString { .. })
        ));

        let second = &fc.features[1];
        assert_eq!(second.property("u"), None);
        assert!(matches!(
            second.geometry.as_ref().map(|g| &g.value),
            Some(GeoJsonValue::MultiLineString { .. })
        ));
    }

    #[test]
    fn writes_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        write_geojson(&collection(), &path).unwrap();

        let parsed: GeoJson = fs::read_to_string(&path).unwrap().parse().unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("unexpected GeoJSON: {other:?}"),
        }
    }
}
