//! Typed measurement values.
//!
//! The decoder keeps values as text. Coercion to a number happens once, at
//! the boundary where a frame is handed to a consumer.

use std::fmt;

use super::is_identifier_label;

/// Typed view of a TIC value.
#[derive(Debug, Clone, PartialEq)]
pub enum TicValue {
    /// Integer value (indexes in Wh, currents, apparent power)
    Integer(i64),

    /// Finite decimal value
    Decimal(f64),

    /// Anything else (meter address, tariff names, status words)
    Text(String),
}

impl TicValue {
    /// Coerce a raw value: integer first, then decimal, else text.
    ///
    /// Leading zeros are dropped for numbers (`"018"` becomes `18`).
    /// Non-finite decimals such as `inf` or `NaN` stay textual.
    pub fn coerce(raw: &str) -> Self {
        let cleaned = raw.trim();

        if let Ok(v) = cleaned.parse::<i64>() {
            return Self::Integer(v);
        }

        match cleaned.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Decimal(v),
            _ => Self::Text(cleaned.to_string()),
        }
    }

    /// Coerce the value of a given label.
    ///
    /// Identifier labels such as `ADCO` stay textual; other labels go
    /// through [`coerce`](Self::coerce).
    pub fn coerce_for(label: &str, raw: &str) -> Self {
        if is_identifier_label(label) {
            return Self::Text(raw.trim().to_string());
        }
        Self::coerce(raw)
    }

    /// Convert to f64 if numeric.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Get the integer value, if any.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the textual value, if any.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Check if the value is numeric.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_))
    }
}

impl fmt::Display for TicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for TicValue {
    fn from(raw: &str) -> Self {
        Self::coerce(raw)
    }
}
