//! Interpretation of the `dqbits` parameter.
//!
//! The value names the DQ (data quality) bit flags whose pixels still count as good:
//!
//! | value        | meaning                                         |
//! |--------------|-------------------------------------------------|
//! | `""`, `none` | ignore the DQ array; every pixel is good        |
//! | `4096`       | a pixel is good if only bit 4096 (or none) set  |
//! | `4+16+32`    | sum of single-bit flags (`,` also separates)    |
//! | `~4+16`      | flipped: the listed bits are the bad ones       |

use thiserror::Error;

/// Errors from parsing a `dqbits` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DqBitsError {
    #[error("`{0}` is not a non-negative integer bit flag")]
    InvalidFlag(String),

    #[error("bit flag {0} in a flag list is not a power of two")]
    NotPowerOfTwo(u64),

    #[error("flag lists must be separated by either `+` or `,`, not both")]
    MixedSeparators,

    #[error("`~` must be followed by bit flags")]
    MissingFlags,
}

/// Parsed good-pixel DQ selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DqBits {
    /// DQ array is not consulted.
    Ignore,
    Mask { bits: u64, flipped: bool },
}

impl DqBits {
    pub fn parse(spec: &str) -> Result<Self, DqBitsError> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
            return Ok(DqBits::Ignore);
        }

        let (flipped, body) = match spec.strip_prefix('~') {
            Some(rest) => (true, rest.trim()),
            None => (false, spec),
        };
        if body.is_empty() {
            return Err(DqBitsError::MissingFlags);
        }

        let separator = match (body.contains('+'), body.contains(',')) {
            (true, true) => return Err(DqBitsError::MixedSeparators),
            (true, false) => '+',
            (false, true) => ',',
            (false, false) => {
                let bits = parse_flag(body)?;
                return Ok(DqBits::Mask { bits, flipped });
            }
        };

        let mut bits = 0u64;
        for part in body.split(separator) {
            let flag = parse_flag(part.trim())?;
            if !flag.is_power_of_two() {
                return Err(DqBitsError::NotPowerOfTwo(flag));
            }
            if bits & flag != 0 {
                tracing::warn!(flag, "Duplicate DQ bit flag ignored");
            }
            bits |= flag;
        }

        Ok(DqBits::Mask { bits, flipped })
    }

    /// Bits that may be set on a good pixel, or `None` when DQ is ignored.
    pub fn good_mask(&self) -> Option<u64> {
        match *self {
            DqBits::Ignore => None,
            DqBits::Mask { bits, flipped: false } => Some(bits),
            DqBits::Mask { bits, flipped: true } => Some(!bits),
        }
    }

    /// Whether a pixel with the given DQ value is usable.
    pub fn is_good(&self, dq: u16) -> bool {
        match self.good_mask() {
            None => true,
            Some(mask) => u64::from(dq) & !mask == 0,
        }
    }
}

fn parse_flag(text: &str) -> Result<u64, DqBitsError> {
    text.parse()
        .map_err(|_| DqBitsError::InvalidFlag(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_none_ignore_dq() {
        assert_eq!(DqBits::parse(""), Ok(DqBits::Ignore));
        assert_eq!(DqBits::parse(" None "), Ok(DqBits::Ignore));
        assert!(DqBits::Ignore.is_good(u16::MAX));
    }

    #[test]
    fn test_integer_and_lists() {
        assert_eq!(
            DqBits::parse("4096"),
            Ok(DqBits::Mask { bits: 4096, flipped: false })
        );
        assert_eq!(
            DqBits::parse("4 + 16 + 32"),
            Ok(DqBits::Mask { bits: 52, flipped: false })
        );
        assert_eq!(
            DqBits::parse("4,16,16"),
            Ok(DqBits::Mask { bits: 20, flipped: false })
        );
        // A bare integer is a sum and need not be a single bit.
        assert_eq!(
            DqBits::parse("20"),
            Ok(DqBits::Mask { bits: 20, flipped: false })
        );
    }

    #[test]
    fn test_flipped() {
        let bits = DqBits::parse("~ 4+16").unwrap();
        assert_eq!(bits, DqBits::Mask { bits: 20, flipped: true });
        assert!(bits.is_good(0));
        assert!(bits.is_good(8));
        assert!(!bits.is_good(4));
        assert!(!bits.is_good(8 | 16));
    }

    #[test]
    fn test_is_good() {
        let bits = DqBits::parse("4096+16").unwrap();
        assert!(bits.is_good(0));
        assert!(bits.is_good(4096));
        assert!(bits.is_good(4096 | 16));
        assert!(!bits.is_good(4096 | 4));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(DqBits::parse("4+16,32"), Err(DqBitsError::MixedSeparators));
        assert_eq!(DqBits::parse("4+6"), Err(DqBitsError::NotPowerOfTwo(6)));
        assert_eq!(DqBits::parse("~"), Err(DqBitsError::MissingFlags));
        assert_eq!(DqBits::parse("-4"), Err(DqBitsError::InvalidFlag("-4".into())));
        assert_eq!(DqBits::parse("4+"), Err(DqBitsError::InvalidFlag(String::new())));
        assert_eq!(DqBits::parse("SATURATED"), Err(DqBitsError::InvalidFlag("SATURATED".into())));
    }
}
