//! OSM way identifiers attached to street edges.
//!
//! After topology simplification a single edge may stand for several OSM
//! ways, in which case its identifier arrives as a list. Everything past
//! the loading stage works with [`EdgeId`], the canonical single id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Canonical edge identifier (an OSM way id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier as found in source data: either one way id or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOsmId {
    Single(i64),
    List(Vec<i64>),
    Text(String),
}

impl RawOsmId {
    /// Collapse into a single representative id; lists keep their first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for empty lists and non-numeric text.
    pub fn normalize(&self) -> Result<EdgeId, Error> {
        match self {
            RawOsmId::Single(id) => Ok(EdgeId(*id)),
            RawOsmId::List(ids) => ids
                .first()
                .copied()
                .map(EdgeId)
                .ok_or_else(|| Error::InvalidData("empty osmid list".to_string())),
            RawOsmId::Text(text) => parse_text_id(text),
        }
    }
}

impl From<i64> for RawOsmId {
    fn from(id: i64) -> Self {
        RawOsmId::Single(id)
    }
}

// Files written by other tools store lists as text, e.g. "[123, 456]".
fn parse_text_id(text: &str) -> Result<EdgeId, Error> {
    let trimmed = text.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next().unwrap_or_default().trim();
    first
        .parse::<i64>()
        .map(EdgeId)
        .map_err(|_| Error::InvalidData(format!("unparseable osmid '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_id_is_kept() {
        assert_eq!(RawOsmId::Single(42).normalize().unwrap(), EdgeId(42));
    }

    #[test]
    fn list_id_takes_first_element() {
        let raw = RawOsmId::List(vec![7, 3, 9]);
        assert_eq!(raw.normalize().unwrap(), EdgeId(7));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(RawOsmId::List(vec![]).normalize().is_err());
    }

    #[test]
    fn stringified_list_is_parsed() {
        let raw = RawOsmId::Text("[24619372, 4345]".to_string());
        assert_eq!(raw.normalize().unwrap(), EdgeId(24_619_372));
        let raw = RawOsmId::Text("1234".to_string());
        assert_eq!(raw.normalize().unwrap(), EdgeId(1234));
        assert!(RawOsmId::Text("abc".to_string()).normalize().is_err());
    }

    #[test]
    fn deserializes_scalar_and_list() {
        let scalar: RawOsmId = serde_json::from_str("5").unwrap();
        let list: RawOsmId = serde_json::from_str("[8, 1]").unwrap();
        assert_eq!(scalar, RawOsmId::Single(5));
        assert_eq!(list.normalize().unwrap(), EdgeId(8));
    }
}
