//! Error types for TIC frame decoding and the UDP listener.

use thiserror::Error;

/// Result type alias for TIC operations.
pub type Result<T> = std::result::Result<T, TicError>;

/// TIC decoding and transport error types.
#[derive(Debug, Error)]
pub enum TicError {
    /// No STX/ETX pair could be located in the datagram
    #[error("Frame boundaries not found (STX/ETX)")]
    BoundaryNotFound,

    /// Frame content is not 7-bit ASCII
    #[error("Undecodable byte 0x{byte:02X} at offset {position}")]
    Decode { position: usize, byte: u8 },

    /// Line shorter than `<data> <checksum>` allows
    #[error("Line too short: {len} characters")]
    LineTooShort { len: usize },

    /// No space between the data field and the checksum character
    #[error("Malformed line: missing checksum separator")]
    MalformedShape,

    /// Computed checksum differs from the received one
    #[error("Checksum mismatch: expected '{expected}', received '{received}'")]
    ChecksumMismatch { expected: char, received: char },

    /// Data field does not split into label and value
    #[error("Data field does not split into label and value")]
    FieldSplit,

    /// Label or value empty after trimming
    #[error("Empty label or value")]
    EmptyLabelOrValue,

    /// Label is a frame boundary marker
    #[error("Label is a frame boundary marker")]
    SentinelLabel,

    /// Listener has no bound socket
    #[error("Listener not bound")]
    NotBound,

    /// Listener socket already bound
    #[error("Listener already bound")]
    AlreadyBound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event receiver dropped
    #[error("Channel closed")]
    ChannelClosed,
}

impl TicError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Check if this error discards a whole frame.
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Self::BoundaryNotFound | Self::Decode { .. })
    }

    /// Check if this error discards a single line only.
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            Self::LineTooShort { .. }
                | Self::MalformedShape
                | Self::ChecksumMismatch { .. }
                | Self::FieldSplit
                | Self::EmptyLabelOrValue
                | Self::SentinelLabel
        )
    }

    /// Check if this error comes from a line that lacks `<space><checksum>`.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::LineTooShort { .. } | Self::MalformedShape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TicError::BoundaryNotFound;
        assert_eq!(err.to_string(), "Frame boundaries not found (STX/ETX)");

        let err = TicError::Decode {
            position: 12,
            byte: 0xE9,
        };
        assert_eq!(err.to_string(), "Undecodable byte 0xE9 at offset 12");

        let err = TicError::ChecksumMismatch {
            expected: 'Y',
            received: 'Z',
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: expected 'Y', received 'Z'"
        );
    }

    #[test]
    fn test_is_frame_error() {
        assert!(TicError::BoundaryNotFound.is_frame_error());
        assert!(TicError::Decode {
            position: 0,
            byte: 0x80
        }
        .is_frame_error());
        assert!(!TicError::MalformedShape.is_frame_error());
        assert!(!TicError::ChannelClosed.is_frame_error());
        assert!(!TicError::NotBound.is_frame_error());
    }

    #[test]
    fn test_is_line_error() {
        assert!(TicError::LineTooShort { len: 2 }.is_line_error());
        assert!(TicError::FieldSplit.is_line_error());
        assert!(TicError::SentinelLabel.is_line_error());
        assert!(!TicError::BoundaryNotFound.is_line_error());
        assert!(!TicError::invalid_config("port").is_line_error());
    }

    #[test]
    fn test_shape_errors_are_distinct_from_mismatch() {
        assert!(TicError::MalformedShape.is_shape_error());
        assert!(TicError::LineTooShort { len: 1 }.is_shape_error());
        assert!(!TicError::ChecksumMismatch {
            expected: 'A',
            received: 'B'
        }
        .is_shape_error());
    }
}
