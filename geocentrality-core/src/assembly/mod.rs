//! Joins centrality scores back onto street geometries.
//!
//! Empirical results are dissolved: records sharing a grouping key are merged
//! into one row whose geometry holds every member line and whose identifier
//! is the first member seen. With [`DissolveMode::ByScore`] unrelated streets
//! that happen to share a score end up in the same row. This is lossy and
//! kept on purpose; [`DissolveMode::ByEdge`] keeps identifiers apart.
//! Exact results are joined one row per directed edge.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::centrality::{CentralityRecord, CentralityStrategy, Strategy};
use crate::model::EdgeId;
use crate::Error;

/// Grouping key of the dissolve step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DissolveMode {
    /// One row per distinct centrality value
    #[default]
    ByScore,
    /// One row per edge identifier
    ByEdge,
}

impl fmt::Display for DissolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DissolveMode::ByScore => f.write_str("by_score"),
            DissolveMode::ByEdge => f.write_str("by_edge"),
        }
    }
}

impl FromStr for DissolveMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_score" => Ok(DissolveMode::ByScore),
            "by_edge" => Ok(DissolveMode::ByEdge),
            other => Err(Error::InvalidInput(format!(
                "unknown dissolve mode '{other}', expected by_score or by_edge"
            ))),
        }
    }
}

/// Final scored street geometries of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGeometryCollection {
    pub strategy: Strategy,
    pub records: Vec<CentralityRecord>,
}

impl ScoredGeometryCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CentralityRecord> {
        self.records.iter()
    }

    pub fn max_centrality(&self) -> f64 {
        self.records
            .iter()
            .map(|record| record.centrality)
            .fold(0.0, f64::max)
    }

    /// Records sorted by ascending centrality, ties kept in row order
    pub fn by_ascending_centrality(&self) -> Vec<&CentralityRecord> {
        let mut sorted: Vec<&CentralityRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.centrality.total_cmp(&b.centrality));
        sorted
    }
}

impl<'a> IntoIterator for &'a ScoredGeometryCollection {
    type Item = &'a CentralityRecord;
    type IntoIter = std::slice::Iter<'a, CentralityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    pub dissolve: DissolveMode,
}

impl ResultAssembler {
    pub fn new(dissolve: DissolveMode) -> Self {
        Self { dissolve }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] when a centrality is not a finite
    /// value in `[0, 1]`.
    pub fn assemble<S>(&self, centrality: &S) -> Result<ScoredGeometryCollection, Error>
    where
        S: CentralityStrategy + ?Sized,
    {
        let strategy = centrality.strategy();
        let records = centrality.produce();
        validate(&records)?;

        let records = match strategy {
            Strategy::Empirical => {
                let dissolved = dissolve(records, self.dissolve);
                info!(
                    "Dissolved scored segments into {} rows ({})",
                    dissolved.len(),
                    self.dissolve
                );
                dissolved
            }
            Strategy::Exact => records,
        };

        Ok(ScoredGeometryCollection { strategy, records })
    }
}

fn validate(records: &[CentralityRecord]) -> Result<(), Error> {
    match records
        .iter()
        .find(|record| !(0.0..=1.0).contains(&record.centrality))
    {
        Some(record) => Err(Error::InvariantViolation(format!(
            "centrality {} of edge {} is outside [0, 1]",
            record.centrality, record.edge_id
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Score(u64),
    Edge(EdgeId),
}

/// Groups come out sorted by their key; geometry and identifier of a group
/// follow first-seen order.
fn dissolve(records: Vec<CentralityRecord>, mode: DissolveMode) -> Vec<CentralityRecord> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<CentralityRecord> = Vec::new();

    for record in records {
        let key = match mode {
            // +0.0 so that -0.0 and 0.0 fall into one group
            DissolveMode::ByScore => GroupKey::Score((record.centrality + 0.0).to_bits()),
            DissolveMode::ByEdge => GroupKey::Edge(record.edge_id),
        };
        match positions.get(&key) {
            Some(&position) => groups[position].geometry.0.extend(record.geometry.0),
            None => {
                positions.insert(key, groups.len());
                groups.push(CentralityRecord {
                    endpoints: None,
                    ..record
                });
            }
        }
    }
    debug!("Dissolve produced {} groups", groups.len());

    match mode {
        DissolveMode::ByScore => groups.sort_by(|a, b| a.centrality.total_cmp(&b.centrality)),
        DissolveMode::ByEdge => groups.sort_by_key(|group| group.edge_id),
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::EdgeEndpoints;
    use geo::{LineString, MultiLineString, coord};

    struct Fixed(Strategy, Vec<CentralityRecord>);

    impl CentralityStrategy for Fixed {
        fn strategy(&self) -> Strategy {
            self.0
        }

        fn produce(&self) -> Vec<CentralityRecord> {
            self.1.clone()
        }
    }

    fn record(id: i64, x: f64, centrality: f64) -> CentralityRecord {
        let line = LineString::new(vec![coord! { x: x, y: 0.0 }, coord! { x: x + 1.0, y: 0.0 }]);
        CentralityRecord {
            edge_id: EdgeId(id),
            endpoints: None,
            geometry: MultiLineString::new(vec![line]),
            centrality,
        }
    }

    #[test]
    fn by_score_merges_equal_scores_and_keeps_first_identifier() {
        let empirical = Fixed(
            Strategy::Empirical,
            vec![
                record(3, 0.0, 0.5),
                record(1, 1.0, 0.25),
                record(2, 2.0, 0.5),
                record(3, 3.0, 0.5),
            ],
        );
        let result = ResultAssembler::default().assemble(&empirical).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.records[0].centrality, 0.25);
        assert_eq!(result.records[1].edge_id, EdgeId(3));
        assert_eq!(result.records[1].geometry.0.len(), 3);
        assert_eq!(result.records[1].geometry.0[1].0[0].x, 2.0);
    }

    #[test]
    fn by_edge_keeps_unrelated_streets_apart() {
        let empirical = Fixed(
            Strategy::Empirical,
            vec![record(3, 0.0, 0.5), record(2, 1.0, 0.5), record(3, 2.0, 0.5)],
        );
        let result = ResultAssembler::new(DissolveMode::ByEdge)
            .assemble(&empirical)
            .unwrap();

        let ids: Vec<EdgeId> = result.iter().map(|r| r.edge_id).collect();
        assert_eq!(ids, vec![EdgeId(2), EdgeId(3)]);
        assert_eq!(result.records[1].geometry.0.len(), 2);
    }

    #[test]
    fn exact_results_are_not_dissolved() {
        let mut records = vec![record(1, 0.0, 0.1), record(1, 1.0, 0.1)];
        records[0].endpoints = Some(EdgeEndpoints { u: 1, v: 2, key: 0 });
        let result = ResultAssembler::default()
            .assemble(&Fixed(Strategy::Exact, records.clone()))
            .unwrap();
        assert_eq!(result.records, records);
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        for bad in [1.5, -0.1, f64::NAN] {
            let result = ResultAssembler::default()
                .assemble(&Fixed(Strategy::Empirical, vec![record(1, 0.0, bad)]));
            assert!(matches!(result, Err(Error::InvariantViolation(_))));
        }
    }

    #[test]
    fn ascending_order_for_drawing() {
        let result = ResultAssembler::default()
            .assemble(&Fixed(
                Strategy::Exact,
                vec![record(1, 0.0, 0.9), record(2, 0.0, 0.1), record(3, 0.0, 0.5)],
            ))
            .unwrap();
        let order: Vec<i64> = result
            .by_ascending_centrality()
            .iter()
            .map(|r| r.edge_id.0)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!((result.max_centrality() - 0.9).abs() < 1e-12);
    }
}
