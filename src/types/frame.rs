//! Decoded frame types.

use std::collections::HashMap;
use std::fmt;

use super::TicValue;

/// One label/value pair recovered from a data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// Label (e.g. `PAPP`)
    pub label: String,
    /// Value as transmitted, trimmed
    pub value: String,
    /// Whether the line passed checksum validation
    pub checksum_ok: bool,
}

impl Measurement {
    /// Create a checksum-validated measurement.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            checksum_ok: true,
        }
    }

    /// Create a measurement accepted without a valid checksum.
    pub fn unverified(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            checksum_ok: false,
            ..Self::new(label, value)
        }
    }

    /// Get the value coerced to a typed variant.
    ///
    /// Identifier labels keep their raw text.
    pub fn typed_value(&self) -> TicValue {
        TicValue::coerce_for(&self.label, &self.value)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)?;
        if !self.checksum_ok {
            f.write_str(" (unverified)")?;
        }
        Ok(())
    }
}

/// Line bookkeeping for one decoded frame.
///
/// Advisory only: the counters never change what ends up in the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Non-empty candidate lines
    pub lines: usize,
    /// Lines that passed checksum validation and field extraction
    pub valid_lines: usize,
    /// Lines dropped for any reason
    pub invalid_lines: usize,
    /// Lines accepted through the lenient tariff policy
    pub lenient_lines: usize,
    /// Distinct labels in the frame
    pub measurements: usize,
}

/// Decoded result of one TIC frame.
///
/// An ordered mapping from label to [`Measurement`]. Insertion order follows
/// line order; inserting an existing label replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicFrame {
    entries: Vec<Measurement>,
    // label -> position in `entries`
    index: HashMap<String, usize>,
    stats: DecodeStats,
}

impl TicFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a measurement, returning the value it replaced.
    pub fn insert(&mut self, measurement: Measurement) -> Option<Measurement> {
        if let Some(&position) = self.index.get(&measurement.label) {
            return Some(std::mem::replace(&mut self.entries[position], measurement));
        }

        self.index
            .insert(measurement.label.clone(), self.entries.len());
        self.entries.push(measurement);
        self.stats.measurements = self.entries.len();
        None
    }

    /// Get the raw value for a label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.measurement(label).map(|m| m.value.as_str())
    }

    /// Get the measurement for a label.
    pub fn measurement(&self, label: &str) -> Option<&Measurement> {
        self.index.get(label).map(|&position| &self.entries[position])
    }

    /// Get the typed value for a label.
    pub fn typed(&self, label: &str) -> Option<TicValue> {
        self.measurement(label).map(Measurement::typed_value)
    }

    /// Check if a label is present.
    pub fn contains(&self, label: &str) -> bool {
        self.measurement(label).is_some()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the frame holds no measurement.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over measurements in line order.
    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.entries.iter()
    }

    /// Iterate over labels in line order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|m| m.label.as_str())
    }

    /// Line statistics gathered while decoding.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut DecodeStats {
        &mut self.stats
    }

    /// Convert into a plain label to value map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries
            .into_iter()
            .map(|m| (m.label, m.value))
            .collect()
    }
}

impl IntoIterator for TicFrame {
    type Item = Measurement;
    type IntoIter = std::vec::IntoIter<Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a TicFrame {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Measurement> for TicFrame {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        let mut frame = Self::new();
        for m in iter {
            frame.insert(m);
        }
        frame
    }
}

impl fmt::Display for TicFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TicFrame[")?;
        for (i, m) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", m)?;
        }
        f.write_str("]")
    }
}
