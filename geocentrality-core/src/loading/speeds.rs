//! Assumed driving speeds for travel time weights

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::Error;

const MPH_TO_KPH: f64 = 1.609_344;

/// Default speeds in km/h by OSM `highway` class
const DEFAULT_SPEEDS: [(&str, f64); 17] = [
    ("motorway", 100.0),
    ("motorway_link", 60.0),
    ("motorroad", 90.0),
    ("trunk", 85.0),
    ("trunk_link", 60.0),
    ("primary", 65.0),
    ("primary_link", 50.0),
    ("secondary", 60.0),
    ("secondary_link", 50.0),
    ("tertiary", 50.0),
    ("tertiary_link", 40.0),
    ("unclassified", 30.0),
    ("residential", 30.0),
    ("living_street", 10.0),
    ("service", 20.0),
    ("road", 20.0),
    ("track", 15.0),
];

/// Road class to speed (km/h) lookup with a fallback for unknown classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTable {
    classes: BTreeMap<String, f64>,
    fallback_kph: f64,
}

impl Default for SpeedTable {
    fn default() -> Self {
        let classes = DEFAULT_SPEEDS
            .iter()
            .map(|(class, kph)| ((*class).to_string(), *kph))
            .collect();
        Self {
            classes,
            fallback_kph: 30.0,
        }
    }
}

impl SpeedTable {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for speeds that are not positive.
    pub fn new(classes: BTreeMap<String, f64>, fallback_kph: f64) -> Result<Self, Error> {
        let table = Self {
            classes,
            fallback_kph,
        };
        table.validate()?;
        Ok(table)
    }

    /// Default table with `classes` replacing or extending its entries
    ///
    /// # Errors
    ///
    /// Same as [`SpeedTable::new`].
    pub fn with_overrides(
        mut self,
        classes: impl IntoIterator<Item = (String, f64)>,
        fallback_kph: Option<f64>,
    ) -> Result<Self, Error> {
        self.classes.extend(classes);
        if let Some(fallback) = fallback_kph {
            self.fallback_kph = fallback;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), Error> {
        let invalid = self
            .classes
            .iter()
            .map(|(class, kph)| (class.as_str(), *kph))
            .chain(std::iter::once(("fallback", self.fallback_kph)))
            .filter(|(_, kph)| !kph.is_finite() || *kph <= 0.0)
            .map(|(class, kph)| format!("{class}={kph}"))
            .join(", ");
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "speeds must be positive: {invalid}"
            )))
        }
    }

    pub fn class_speed(&self, class: &str) -> Option<f64> {
        self.classes.get(class).copied()
    }

    pub fn fallback_kph(&self) -> f64 {
        self.fallback_kph
    }

    /// Speed of an edge: its posted `maxspeed` when parseable, else the
    /// speed of its highway class, else the fallback.
    pub fn speed_for(&self, highway: Option<&str>, maxspeed: Option<&str>) -> f64 {
        maxspeed
            .and_then(parse_maxspeed)
            .or_else(|| highway.and_then(|class| self.class_speed(class)))
            .unwrap_or(self.fallback_kph)
    }
}

/// Travel time in seconds for `length_m` metres at `kph`
pub fn travel_time(length_m: f64, kph: f64) -> f64 {
    length_m / (kph / 3.6)
}

/// Parses an OSM `maxspeed` value into km/h.
///
/// Accepts plain numbers, `mph` suffixes and `;`-separated lists, which are
/// averaged. Symbolic values such as `none` or `DE:urban` yield `None`.
pub fn parse_maxspeed(raw: &str) -> Option<f64> {
    let speeds: Vec<f64> = raw
        .split(';')
        .map(str::trim)
        .map(|value| {
            let (number, factor) = match value.strip_suffix("mph") {
                Some(number) => (number.trim(), MPH_TO_KPH),
                None => (value.strip_suffix("km/h").unwrap_or(value).trim(), 1.0),
            };
            number
                .parse::<f64>()
                .ok()
                .filter(|kph| kph.is_finite() && *kph > 0.0)
                .map(|kph| kph * factor)
        })
        .collect::<Option<Vec<f64>>>()?;

    #[allow(clippy::cast_precision_loss)]
    let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
    Some(mean)
}
