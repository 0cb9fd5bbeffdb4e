//! Historic-mode line checksum.
//!
//! Every data line ends with `<space><checksum>`. The checksum character is
//! the sum of the checksummed bytes, masked to its low 6 bits and offset into
//! the printable range:
//!
//! ```text
//! checksum = (sum(bytes) & 0x3F) + 0x20      // always in 0x20..=0x5F
//! ```
//!
//! In historic mode the separator before the checksum is not summed
//! (`IINST 002 Y`: the sum covers `IINST 002`).

use crate::error::{Result, TicError};
use crate::types::{FIELD_SEPARATOR, MIN_LINE_LENGTH};

/// Which bytes of a line the checksum covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChecksumScope {
    /// Label, separator and value; the space before the checksum is excluded
    #[default]
    ExcludeSeparator,

    /// Everything up to and including the space before the checksum.
    ///
    /// This is how ESPLinky bridge firmware computes it (`IINST 018 @`).
    IncludeSeparator,
}

/// Compute the checksum byte of a data field.
#[inline]
pub fn compute(data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(*b)));
    (sum & 0x3F) as u8 + 0x20
}

/// Split a line into its data field and received checksum byte.
///
/// The line must be at least three bytes long and its second-to-last byte
/// must be a space.
pub fn split_line(line: &str) -> Result<(&str, u8)> {
    let bytes = line.as_bytes();
    let len = bytes.len();

    if len < MIN_LINE_LENGTH {
        return Err(TicError::LineTooShort { len });
    }
    if bytes[len - 2] != FIELD_SEPARATOR {
        return Err(TicError::MalformedShape);
    }

    Ok((&line[..len - 2], bytes[len - 1]))
}

/// Validate a line's trailing checksum character.
pub fn verify(line: &str, scope: ChecksumScope) -> Result<()> {
    let (data, received) = split_line(line)?;

    let covered = match scope {
        ChecksumScope::ExcludeSeparator => data.as_bytes(),
        ChecksumScope::IncludeSeparator => &line.as_bytes()[..line.len() - 1],
    };
    let expected = compute(covered);

    if expected != received {
        return Err(TicError::ChecksumMismatch {
            expected: char::from(expected),
            received: char::from(received),
        });
    }
    Ok(())
}

/// Build a complete line `<data><space><checksum>` for a data field.
pub fn encode_line(data: &str, scope: ChecksumScope) -> String {
    let mut line = String::with_capacity(data.len() + 2);
    line.push_str(data);
    line.push(char::from(FIELD_SEPARATOR));

    let checksum = match scope {
        ChecksumScope::ExcludeSeparator => compute(data.as_bytes()),
        ChecksumScope::IncludeSeparator => compute(line.as_bytes()),
    };
    line.push(char::from(checksum));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_meter_lines() {
        // Lines captured from a single-phase Linky in historic mode
        for line in [
            "ADCO 021528603314 :",
            "OPTARIF BASE 0",
            "ISOUSC 30 9",
            "BASE 002809718 .",
            "PTEC TH.. $",
            "IINST 002 Y",
            "IMAX 090 H",
            "PAPP 00390 -",
            "HHPHC A ,",
            "MOTDETAT 000000 B",
        ] {
            assert!(
                verify(line, ChecksumScope::ExcludeSeparator).is_ok(),
                "{line}"
            );
        }
    }

    #[test]
    fn test_compute() {
        assert_eq!(compute(b"IINST 002"), b'Y');
        assert_eq!(compute(b"PAPP 00390"), b'-');
        // Sum 576 masks to zero: the checksum is a space
        assert_eq!(compute(b"IINST 018"), b' ');
        assert_eq!(compute(b""), 0x20);
    }

    #[test]
    fn test_include_separator_scope() {
        // "IINST 018 " sums to 608, masked 32, offset 0x40
        assert_eq!(compute(b"IINST 018 "), b'@');
        assert!(verify("IINST 018 @", ChecksumScope::IncludeSeparator).is_ok());
        assert!(matches!(
            verify("IINST 018 @", ChecksumScope::ExcludeSeparator),
            Err(TicError::ChecksumMismatch {
                expected: ' ',
                received: '@'
            })
        ));
    }

    #[test]
    fn test_space_checksum_character() {
        assert!(verify("IINST 018  ", ChecksumScope::ExcludeSeparator).is_ok());
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("IINST 002 Y").unwrap(), ("IINST 002", b'Y'));
        assert_eq!(split_line("A B").unwrap(), ("A", b'B'));
    }

    #[test]
    fn test_shape_rejections() {
        assert!(matches!(
            split_line("AB"),
            Err(TicError::LineTooShort { len: 2 })
        ));
        assert!(matches!(
            split_line(""),
            Err(TicError::LineTooShort { len: 0 })
        ));
        assert!(matches!(
            split_line("IINST 002Y"),
            Err(TicError::MalformedShape)
        ));
    }

    #[test]
    fn test_mismatch() {
        let err = verify("IINST 002 Z", ChecksumScope::ExcludeSeparator).unwrap_err();
        assert!(matches!(
            err,
            TicError::ChecksumMismatch {
                expected: 'Y',
                received: 'Z'
            }
        ));
    }

    #[test]
    fn test_encode_line() {
        assert_eq!(encode_line("IINST 002", ChecksumScope::ExcludeSeparator), "IINST 002 Y");
        assert_eq!(encode_line("IINST 018", ChecksumScope::IncludeSeparator), "IINST 018 @");
    }

    #[test]
    fn test_single_character_corruption() {
        let data = "PAPP 00390";
        let line = encode_line(data, ChecksumScope::ExcludeSeparator);

        for i in 0..data.len() {
            for replacement in b'0'..=b'Z' {
                let mut corrupted = data.as_bytes().to_vec();
                if corrupted[i] == replacement {
                    continue;
                }
                corrupted[i] = replacement;
                let collides = compute(&corrupted) == compute(data.as_bytes());

                let mut candidate = String::from_utf8(corrupted).unwrap();
                candidate.push_str(&line[data.len()..]);
                let result = verify(&candidate, ChecksumScope::ExcludeSeparator);

                assert_eq!(result.is_ok(), collides, "{candidate}");
            }
        }
    }

    proptest! {
        #[test]
        fn checksum_stays_printable(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let c = compute(&data);
            prop_assert!((0x20..=0x5F).contains(&c));
            prop_assert_eq!(c, compute(&data));
        }

        #[test]
        fn encoded_lines_verify(data in "[A-Z0-9]{1,8} [A-Za-z0-9.]{1,12}") {
            for scope in [ChecksumScope::ExcludeSeparator, ChecksumScope::IncludeSeparator] {
                let line = encode_line(&data, scope);
                prop_assert!(verify(&line, scope).is_ok());
            }
        }

        #[test]
        fn split_line_never_panics(line in "\\PC{0,32}") {
            let _ = split_line(&line);
            let _ = verify(&line, ChecksumScope::ExcludeSeparator);
        }
    }
}
