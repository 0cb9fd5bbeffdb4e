//! TIC historic-mode frame decoder.
//!
//! This module turns the raw payload of one datagram into a [`TicFrame`].
//! Decoding runs in stages:
//!
//! 1. [`extract_frame`] - locate the STX/ETX boundaries
//! 2. [`decode_text`] - strict 7-bit ASCII decoding
//! 3. [`split_lines`] - CR/LF segmentation
//! 4. [`parse_line`] - checksum validation and label/value extraction
//!
//! Line failures drop the line only. Boundary and decoding failures discard
//! the whole frame.

use tracing::{debug, warn};

use crate::checksum::{self, ChecksumScope};
use crate::error::{Result, TicError};
use crate::types::{
    is_sentinel_label, is_tariff_label, Measurement, TicFrame, FIELD_SEPARATOR, FRAME_END,
    FRAME_START,
};

/// Characters stripped from the end of tariff values.
const TARIFF_PADDING: &[char] = &['.', ',', ';', ':'];

/// Checksum leniency policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LeniencyPolicy {
    /// Drop every line that fails validation
    #[default]
    Strict,

    /// Accept `PTEC` and `OPTARIF` lines even with a bad or missing checksum
    TariffLabels,
}

/// Decoder options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Checksum leniency policy
    pub leniency: LeniencyPolicy,
    /// Bytes covered by the checksum
    pub checksum_scope: ChecksumScope,
    /// Strip trailing punctuation from tariff values
    pub normalize_tariffs: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            leniency: LeniencyPolicy::Strict,
            checksum_scope: ChecksumScope::ExcludeSeparator,
            normalize_tariffs: true,
        }
    }
}

impl DecodeOptions {
    /// Create default options (strict, historic checksum, tariff normalization).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set leniency policy.
    pub fn leniency(mut self, leniency: LeniencyPolicy) -> Self {
        self.leniency = leniency;
        self
    }

    /// Set checksum scope.
    pub fn checksum_scope(mut self, scope: ChecksumScope) -> Self {
        self.checksum_scope = scope;
        self
    }

    /// Enable or disable tariff value normalization.
    pub fn normalize_tariffs(mut self, enabled: bool) -> Self {
        self.normalize_tariffs = enabled;
        self
    }
}

/// Decode one datagram with default options.
///
/// # Example
///
/// ```rust
/// let frame = linky_tic::decode(b"\x02\nIINST 002 Y\r\nPAPP 00390 -\r\x03");
/// assert_eq!(frame.get("IINST"), Some("002"));
/// assert_eq!(frame.get("PAPP"), Some("00390"));
/// ```
pub fn decode(raw: &[u8]) -> TicFrame {
    decode_frame(raw, &DecodeOptions::default())
}

/// Decode one datagram, never failing.
///
/// Frame-wide failures are logged and produce an empty frame.
pub fn decode_frame(raw: &[u8], options: &DecodeOptions) -> TicFrame {
    match parse_frame(raw, options) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, len = raw.len(), "Discarding TIC frame");
            TicFrame::new()
        }
    }
}

/// Decode one datagram, surfacing frame-wide failures.
///
/// Empty input decodes to an empty frame. Otherwise the payload must hold an
/// STX ... ETX pair of 7-bit ASCII.
pub fn parse_frame(raw: &[u8], options: &DecodeOptions) -> Result<TicFrame> {
    let mut frame = TicFrame::new();
    if raw.is_empty() {
        return Ok(frame);
    }

    let content = extract_frame(raw)?;
    let text = decode_text(content)?;

    for line in split_lines(text) {
        frame.stats_mut().lines += 1;

        match parse_line(line, options) {
            Ok(measurement) => {
                let stats = frame.stats_mut();
                if measurement.checksum_ok {
                    stats.valid_lines += 1;
                } else {
                    stats.lenient_lines += 1;
                }
                frame.insert(measurement);
            }
            Err(err @ TicError::ChecksumMismatch { .. }) => {
                frame.stats_mut().invalid_lines += 1;
                warn!(line, error = %err, "Invalid checksum for TIC line");
            }
            Err(err) => {
                frame.stats_mut().invalid_lines += 1;
                debug!(line, error = %err, "Skipping TIC line");
            }
        }
    }

    let stats = frame.stats();
    debug!(
        lines = stats.lines,
        valid = stats.valid_lines,
        invalid = stats.invalid_lines,
        lenient = stats.lenient_lines,
        measurements = stats.measurements,
        "Decoded TIC frame"
    );

    Ok(frame)
}

/// Locate the content between the first STX and the first ETX.
///
/// Fails when either marker is missing or ETX precedes STX.
pub fn extract_frame(raw: &[u8]) -> Result<&[u8]> {
    let start = raw.iter().position(|&b| b == FRAME_START);
    let end = raw.iter().position(|&b| b == FRAME_END);

    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(trim_padding(&raw[start + 1..end])),
        _ => Err(TicError::BoundaryNotFound),
    }
}

/// Decode frame content as 7-bit ASCII.
///
/// The error reports the first byte outside the ASCII range.
pub fn decode_text(content: &[u8]) -> Result<&str> {
    let rejected = |position: usize| TicError::Decode {
        position,
        byte: content[position],
    };

    // Invalid UTF-8 always starts at a non-ASCII byte
    let text = std::str::from_utf8(content).map_err(|e| rejected(e.valid_up_to()))?;
    match text.bytes().position(|b| !b.is_ascii()) {
        Some(position) => Err(rejected(position)),
        None => Ok(text),
    }
}

/// Split decoded text into candidate lines.
///
/// CR and LF both separate lines. Empty pieces are dropped; order is kept.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| c == '\r' || c == '\n')
        .map(trim_line)
        .filter(|line| !line.is_empty())
}

/// Validate one line and extract its measurement.
pub fn parse_line(line: &str, options: &DecodeOptions) -> Result<Measurement> {
    let verified = checksum::verify(line, options.checksum_scope);
    let data = checksum::split_line(line).map_or(line, |(data, _)| data);

    match verified {
        Ok(()) => {
            let (label, value) = extract_fields(data, options)?;
            Ok(Measurement::new(label, value))
        }
        Err(err) if accepts_unverified(line, options) => {
            // Without a checksum shape the whole line is the data field.
            let (label, value) = extract_fields(data, options)?;
            debug!(label, error = %err, "Accepting tariff line without valid checksum");
            Ok(Measurement::unverified(label, value))
        }
        Err(err) => Err(err),
    }
}

/// Split a data field into label and value.
///
/// The value is everything after the first space, trimmed.
pub fn extract_fields<'a>(data: &'a str, options: &DecodeOptions) -> Result<(&'a str, &'a str)> {
    let (label, value) = data
        .split_once(char::from(FIELD_SEPARATOR))
        .ok_or(TicError::FieldSplit)?;
    let label = label.trim();
    let value = value.trim();

    if is_sentinel_label(label) {
        return Err(TicError::SentinelLabel);
    }
    if label.is_empty() || value.is_empty() {
        return Err(TicError::EmptyLabelOrValue);
    }

    if options.normalize_tariffs && is_tariff_label(label) {
        return Ok((label, normalize_tariff_value(value)));
    }
    Ok((label, value))
}

/// Strip trailing punctuation padding from a tariff value (`HP..` -> `HP`).
///
/// A value made only of padding is returned unchanged.
pub fn normalize_tariff_value(value: &str) -> &str {
    match value.trim_end_matches(TARIFF_PADDING).trim_end() {
        "" => value,
        stripped => stripped,
    }
}

fn accepts_unverified(line: &str, options: &DecodeOptions) -> bool {
    options.leniency == LeniencyPolicy::TariffLabels
        && line
            .split(char::from(FIELD_SEPARATOR))
            .next()
            .is_some_and(is_tariff_label)
}

/// Trim framing whitespace, keeping trailing spaces.
///
/// A space is a valid checksum character, so only control whitespace is
/// removed from the end.
fn trim_line(line: &str) -> &str {
    line.trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() && c != ' ')
}

fn trim_padding(content: &[u8]) -> &[u8] {
    let start = content
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(content.len());
    let end = content
        .iter()
        .rposition(|&b| !b.is_ascii_whitespace() || b == b' ')
        .map_or(start, |i| i + 1);

    &content[start..end.max(start)]
}
