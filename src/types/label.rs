//! Framing bytes and well-known historic-mode labels.

/// Start of frame (STX).
pub const FRAME_START: u8 = 0x02;

/// End of frame (ETX).
pub const FRAME_END: u8 = 0x03;

/// Separator between label, value and checksum.
pub const FIELD_SEPARATOR: u8 = b' ';

/// Smallest line that can hold `<data> <checksum>`.
pub const MIN_LINE_LENGTH: usize = 3;

/// Meter address.
pub const ADCO: &str = "ADCO";
/// Tariff option.
pub const OPTARIF: &str = "OPTARIF";
/// Subscribed current (A).
pub const ISOUSC: &str = "ISOUSC";
/// Base tariff index (Wh).
pub const BASE: &str = "BASE";
/// Off-peak hours index (Wh).
pub const HCHC: &str = "HCHC";
/// Peak hours index (Wh).
pub const HCHP: &str = "HCHP";
/// Current tariff period.
pub const PTEC: &str = "PTEC";
/// Instantaneous current (A).
pub const IINST: &str = "IINST";
/// Maximum current called (A).
pub const IMAX: &str = "IMAX";
/// Apparent power (VA).
pub const PAPP: &str = "PAPP";
/// Peak/off-peak schedule group.
pub const HHPHC: &str = "HHPHC";
/// Meter status word.
pub const MOTDETAT: &str = "MOTDETAT";

/// Textual tariff identifiers.
///
/// These are the labels that may carry trailing punctuation padding and the
/// only labels eligible for lenient checksum acceptance.
pub const TARIFF_LABELS: [&str; 2] = [PTEC, OPTARIF];

/// Check if a label is one of the textual tariff identifiers.
#[inline]
pub fn is_tariff_label(label: &str) -> bool {
    TARIFF_LABELS.contains(&label)
}

/// Labels whose values are identifiers, never numbers.
///
/// `ADCO` would lose its leading zero and `MOTDETAT` is a status word.
pub const IDENTIFIER_LABELS: [&str; 2] = [ADCO, MOTDETAT];

/// Check if a label carries an identifier rather than a quantity.
#[inline]
pub fn is_identifier_label(label: &str) -> bool {
    IDENTIFIER_LABELS.contains(&label)
}

/// Check if a label is a frame boundary marker that leaked into content.
#[inline]
pub fn is_sentinel_label(label: &str) -> bool {
    matches!(label.as_bytes(), [FRAME_START] | [FRAME_END])
}
