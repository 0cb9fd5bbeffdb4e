//! Sensor registry.
//!
//! Consumes decoded frames and keeps one stateful [`Sensor`] per label.
//! Unknown labels are registered on first sight with fallback metadata.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use crate::types::{
    TicFrame, TicValue, ADCO, BASE, HCHC, HCHP, HHPHC, IINST, IMAX, ISOUSC, MOTDETAT, OPTARIF,
    PAPP, PTEC,
};

/// Display metadata for a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    /// Human-readable name
    pub name: Cow<'static, str>,
    /// Unit of measurement, if any
    pub unit: Option<&'static str>,
}

impl LabelInfo {
    const fn known(name: &'static str, unit: Option<&'static str>) -> Self {
        Self {
            name: Cow::Borrowed(name),
            unit,
        }
    }
}

/// Get metadata for a label, falling back to the label itself.
pub fn label_info(label: &str) -> LabelInfo {
    match label {
        ADCO => LabelInfo::known("Meter Address", None),
        OPTARIF => LabelInfo::known("Tariff Option", None),
        ISOUSC => LabelInfo::known("Subscribed Current", Some("A")),
        BASE => LabelInfo::known("Total Consumption (BASE)", Some("Wh")),
        HCHC => LabelInfo::known("Consumption (Off-Peak Hours)", Some("Wh")),
        HCHP => LabelInfo::known("Consumption (Peak Hours)", Some("Wh")),
        PTEC => LabelInfo::known("Current Tariff Period", None),
        IINST => LabelInfo::known("Instantaneous Current", Some("A")),
        IMAX => LabelInfo::known("Maximum Current", Some("A")),
        PAPP => LabelInfo::known("Apparent Power", Some("VA")),
        HHPHC => LabelInfo::known("Peak/Off-Peak Schedule", None),
        MOTDETAT => LabelInfo::known("Meter Status Word", None),
        other => LabelInfo {
            name: Cow::Owned(other.to_string()),
            unit: None,
        },
    }
}

/// Stateful record for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    label: String,
    info: LabelInfo,
    value: TicValue,
    updates: u64,
}

impl Sensor {
    fn new(label: &str, value: TicValue) -> Self {
        Self {
            label: label.to_string(),
            info: label_info(label),
            value,
            updates: 0,
        }
    }

    /// Label this sensor tracks.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Display metadata.
    pub fn info(&self) -> &LabelInfo {
        &self.info
    }

    /// Current value.
    pub fn value(&self) -> &TicValue {
        &self.value
    }

    /// Number of value changes since creation.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

/// Outcome of applying one measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorUpdate {
    /// First value seen for this label
    Created { label: String, value: TicValue },
    /// Value differs from the previous one
    Changed {
        label: String,
        previous: TicValue,
        value: TicValue,
    },
    /// Value identical to the previous one
    Unchanged { label: String },
}

impl SensorUpdate {
    /// Label concerned by this update.
    pub fn label(&self) -> &str {
        match self {
            Self::Created { label, .. }
            | Self::Changed { label, .. }
            | Self::Unchanged { label } => label,
        }
    }

    /// Check if the update changes observable state.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

/// Registry of sensors keyed by label.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    sensors: HashMap<String, Sensor>,
}

impl SensorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded frame, creating or updating one sensor per label.
    ///
    /// Updates are returned in frame order.
    pub fn apply(&mut self, frame: &TicFrame) -> Vec<SensorUpdate> {
        frame
            .iter()
            .map(|m| self.apply_value(&m.label, m.typed_value()))
            .collect()
    }

    fn apply_value(&mut self, label: &str, value: TicValue) -> SensorUpdate {
        if let Some(sensor) = self.sensors.get_mut(label) {
            if sensor.value == value {
                return SensorUpdate::Unchanged {
                    label: label.to_string(),
                };
            }

            debug!(label, %value, "Sensor updated");
            let previous = std::mem::replace(&mut sensor.value, value.clone());
            sensor.updates += 1;
            return SensorUpdate::Changed {
                label: label.to_string(),
                previous,
                value,
            };
        }

        debug!(label, %value, "Creating sensor");
        self.sensors
            .insert(label.to_string(), Sensor::new(label, value.clone()));
        SensorUpdate::Created {
            label: label.to_string(),
            value,
        }
    }

    /// Get a sensor by label.
    pub fn get(&self, label: &str) -> Option<&Sensor> {
        self.sensors.get(label)
    }

    /// Number of tracked sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Check if no sensor is tracked.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Iterate over tracked sensors, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Measurement;

    fn frame(pairs: &[(&str, &str)]) -> TicFrame {
        pairs
            .iter()
            .map(|(label, value)| Measurement::new(*label, *value))
            .collect()
    }

    #[test]
    fn test_label_info_known() {
        let info = label_info("PAPP");
        assert_eq!(info.name, "Apparent Power");
        assert_eq!(info.unit, Some("VA"));

        assert_eq!(label_info("BASE").unit, Some("Wh"));
        assert_eq!(label_info("PTEC").unit, None);
    }

    #[test]
    fn test_label_info_fallback() {
        let info = label_info("EASF01");
        assert_eq!(info.name, "EASF01");
        assert_eq!(info.unit, None);
    }

    #[test]
    fn test_apply_creates_then_updates() {
        let mut registry = SensorRegistry::new();

        let updates = registry.apply(&frame(&[("IINST", "002"), ("PTEC", "HP")]));
        assert_eq!(
            updates,
            vec![
                SensorUpdate::Created {
                    label: "IINST".into(),
                    value: TicValue::Integer(2),
                },
                SensorUpdate::Created {
                    label: "PTEC".into(),
                    value: TicValue::Text("HP".into()),
                },
            ]
        );
        assert_eq!(registry.len(), 2);

        let updates = registry.apply(&frame(&[("IINST", "005"), ("PTEC", "HP")]));
        assert_eq!(
            updates[0],
            SensorUpdate::Changed {
                label: "IINST".into(),
                previous: TicValue::Integer(2),
                value: TicValue::Integer(5),
            }
        );
        assert_eq!(updates[1], SensorUpdate::Unchanged { label: "PTEC".into() });
        assert!(updates[0].is_change());
        assert!(!updates[1].is_change());

        let sensor = registry.get("IINST").unwrap();
        assert_eq!(sensor.value(), &TicValue::Integer(5));
        assert_eq!(sensor.updates(), 1);
        assert_eq!(sensor.info().unit, Some("A"));
    }

    #[test]
    fn test_leading_zeros_do_not_count_as_change() {
        let mut registry = SensorRegistry::new();
        registry.apply(&frame(&[("PAPP", "00390")]));

        let updates = registry.apply(&frame(&[("PAPP", "390")]));
        assert_eq!(updates[0].label(), "PAPP");
        assert!(!updates[0].is_change());
    }

    #[test]
    fn test_meter_address_keeps_leading_zero() {
        let mut registry = SensorRegistry::new();
        registry.apply(&frame(&[("ADCO", "021528603314"), ("PAPP", "00390")]));

        assert_eq!(
            registry.get("ADCO").map(Sensor::value),
            Some(&TicValue::Text("021528603314".into()))
        );
        assert_eq!(
            registry.get("PAPP").map(Sensor::value),
            Some(&TicValue::Integer(390))
        );
    }

    #[test]
    fn test_empty_frame_is_noop() {
        let mut registry = SensorRegistry::new();
        assert!(registry.apply(&TicFrame::new()).is_empty());
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
