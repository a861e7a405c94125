//! Exact fixed-point token amounts.
//!
//! Amounts entered by people are decimals in *display units* ("10.5 tokens",
//! "0.001 ERG"). On chain every amount is an integer count of the *smallest
//! unit*, i.e. the display amount scaled by `10^decimals`. Conversions here
//! never round: a display amount with more significant fractional digits than
//! the token allows is rejected with [`PrimitivesError::Precision`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PrimitivesError;

/// Number of nanoERG in one ERG.
pub const NANOERG_PER_ERG: u64 = 1_000_000_000;

/// Decimal places of the native ERG currency.
pub const ERG_DECIMALS: u32 = 9;

/// Largest value a box can carry (register values are signed 64-bit).
pub const MAX_ON_CHAIN_AMOUNT: u64 = i64::MAX as u64;

/// A non-negative decimal amount in display units.
///
/// Stored as `mantissa / 10^scale` in canonical form (no trailing fractional
/// zeros), so two amounts are equal exactly when their values are equal:
/// `"10.50"` and `"10.5"` parse to the same `DisplayAmount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayAmount {
    mantissa: u128,
    scale: u32,
}

impl DisplayAmount {
    /// The zero amount.
    pub const ZERO: Self = Self { mantissa: 0, scale: 0 };

    /// Parse a decimal string such as `"10"`, `"0.125"`, `"+3.50"` or `"1.5e2"`.
    ///
    /// Negative values, empty strings and non-digit characters are rejected
    /// with [`PrimitivesError::InvalidAmount`].
    pub fn parse(input: &str) -> Result<Self, PrimitivesError> {
        let invalid = |reason: &str| PrimitivesError::InvalidAmount {
            amount: input.to_string(),
            reason: reason.to_string(),
        };
        let overflow = || PrimitivesError::AmountOverflow(input.to_string());

        let text = input.trim();
        if text.is_empty() {
            return Err(invalid("empty amount"));
        }
        if text.starts_with('-') {
            return Err(invalid("negative amounts are not allowed"));
        }
        let text = text.strip_prefix('+').unwrap_or(text);

        let (number, exponent) = match text.find(|c| c == 'e' || c == 'E') {
            Some(pos) => {
                let exponent: i64 = text[pos + 1..]
                    .parse()
                    .map_err(|_| invalid("malformed exponent"))?;
                (&text[..pos], exponent)
            }
            None => (text, 0),
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => {
                if frac_part.is_empty() {
                    return Err(invalid("expected digits after the decimal point"));
                }
                (int_part, frac_part)
            }
            None => (number, ""),
        };
        if int_part.is_empty() {
            return Err(invalid("expected digits before the decimal point"));
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid("unexpected character"));
        }

        // Trailing fractional zeros carry no value; dropping them up front keeps
        // "1.000…0" from overflowing the mantissa.
        let frac_part = frac_part.trim_end_matches('0');

        let mut mantissa: u128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        let scale = (frac_part.len() as i64)
            .checked_sub(exponent)
            .ok_or_else(overflow)?;
        let amount = if scale < 0 {
            let shift = u32::try_from(-scale).map_err(|_| overflow())?;
            let factor = 10u128.checked_pow(shift).ok_or_else(overflow)?;
            Self {
                mantissa: mantissa.checked_mul(factor).ok_or_else(overflow)?,
                scale: 0,
            }
        } else {
            Self {
                mantissa,
                scale: u32::try_from(scale).map_err(|_| overflow())?,
            }
        };

        Ok(amount.canonical())
    }

    /// Build the display amount for `units` smallest units of a token with
    /// `decimals` decimal places. Always exact.
    pub fn from_smallest_units(units: u64, decimals: u32) -> Self {
        Self {
            mantissa: u128::from(units),
            scale: decimals,
        }
        .canonical()
    }

    /// Scale to smallest units: `self * 10^decimals`.
    ///
    /// # Errors
    /// - [`PrimitivesError::Precision`] if the result would not be an integer.
    /// - [`PrimitivesError::AmountOverflow`] if it exceeds [`MAX_ON_CHAIN_AMOUNT`].
    pub fn to_smallest_units(&self, decimals: u32) -> Result<u64, PrimitivesError> {
        if self.scale > decimals {
            return Err(PrimitivesError::Precision {
                amount: self.to_string(),
                decimals,
            });
        }
        let overflow = || PrimitivesError::AmountOverflow(self.to_string());
        let factor = 10u128
            .checked_pow(decimals - self.scale)
            .ok_or_else(overflow)?;
        let scaled = self.mantissa.checked_mul(factor).ok_or_else(overflow)?;
        if scaled > u128::from(MAX_ON_CHAIN_AMOUNT) {
            return Err(overflow());
        }
        Ok(scaled as u64)
    }

    /// True if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Number of significant fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn canonical(mut self) -> Self {
        if self.mantissa == 0 {
            return Self::ZERO;
        }
        while self.scale > 0 && self.mantissa % 10 == 0 {
            self.mantissa /= 10;
            self.scale -= 1;
        }
        self
    }
}

impl Default for DisplayAmount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{digits}");
        }
        if digits.len() <= scale {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

impl FromStr for DisplayAmount {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DisplayAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DisplayAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Convert a display amount to smallest units for a token with `decimals`
/// decimal places. See [`DisplayAmount::to_smallest_units`].
pub fn normalize(amount: &DisplayAmount, decimals: u32) -> Result<u64, PrimitivesError> {
    amount.to_smallest_units(decimals)
}

/// Convert smallest units back to a display amount. Exact by construction.
pub fn denormalize(units: u64, decimals: u32) -> DisplayAmount {
    DisplayAmount::from_smallest_units(units, decimals)
}

/// Convert an ERG amount to nanoERG, rejecting sub-nanoERG precision.
pub fn erg_to_nanoerg(erg: &DisplayAmount) -> Result<u64, PrimitivesError> {
    normalize(erg, ERG_DECIMALS)
}

/// Convert nanoERG to an ERG display amount.
pub fn nanoerg_to_erg(nanoerg: u64) -> DisplayAmount {
    denormalize(nanoerg, ERG_DECIMALS)
}

/// Human-readable ERG string, e.g. `1500000000` -> `"1.5 ERG"`.
pub fn format_nanoerg(nanoerg: u64) -> String {
    format!("{} ERG", nanoerg_to_erg(nanoerg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> DisplayAmount {
        DisplayAmount::parse(s).unwrap()
    }

    #[test]
    fn test_parse_integer_and_fraction() {
        assert_eq!(amt("10").to_string(), "10");
        assert_eq!(amt("10.5").to_string(), "10.5");
        assert_eq!(amt("0.125").to_string(), "0.125");
        assert_eq!(amt("+7").to_string(), "7");
        assert_eq!(amt("  42 ").to_string(), "42");
    }

    #[test]
    fn test_trailing_zeros_are_canonicalised() {
        assert_eq!(amt("10.50"), amt("10.5"));
        assert_eq!(amt("3.000"), amt("3"));
        assert_eq!(amt("0.0"), DisplayAmount::ZERO);
        assert_eq!(amt("1.5000").scale(), 1);
    }

    #[test]
    fn test_exponent_notation() {
        assert_eq!(amt("1.5e2"), amt("150"));
        assert_eq!(amt("25E-3"), amt("0.025"));
    }

    #[test]
    fn test_rejects_malformed_input() {
        for bad in ["", "-1", "abc", "1.2.3", ".5", "5.", "1,5", "1e", "0x10"] {
            assert!(
                matches!(DisplayAmount::parse(bad), Err(PrimitivesError::InvalidAmount { .. })),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_rejects_extreme_exponents() {
        for bad in [
            "1e-9223372036854775808",
            "1.5e-9223372036854775807",
            "1e-9223372036854775807",
            "1e9223372036854775807",
        ] {
            assert!(
                matches!(DisplayAmount::parse(bad), Err(PrimitivesError::AmountOverflow(_))),
                "expected overflow for {bad:?}"
            );
        }
    }

    #[test]
    fn test_normalize_exact() {
        assert_eq!(normalize(&amt("10.12"), 2).unwrap(), 1012);
        assert_eq!(normalize(&amt("10.120"), 2).unwrap(), 1012);
        assert_eq!(normalize(&amt("7"), 0).unwrap(), 7);
        assert_eq!(normalize(&amt("0.5"), 3).unwrap(), 500);
    }

    #[test]
    fn test_normalize_rejects_excess_precision() {
        let err = normalize(&amt("10.125"), 2).unwrap_err();
        assert_eq!(
            err,
            PrimitivesError::Precision { amount: "10.125".to_string(), decimals: 2 }
        );
    }

    #[test]
    fn test_zero_decimal_token_requires_integer() {
        assert!(matches!(
            normalize(&amt("5.5"), 0),
            Err(PrimitivesError::Precision { decimals: 0, .. })
        ));
    }

    #[test]
    fn test_normalize_overflow() {
        assert!(matches!(
            normalize(&amt("9223372036854775808"), 0),
            Err(PrimitivesError::AmountOverflow(_))
        ));
        assert_eq!(normalize(&amt("9223372036854775807"), 0).unwrap(), MAX_ON_CHAIN_AMOUNT);
        assert!(matches!(
            normalize(&amt("1"), 40),
            Err(PrimitivesError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize(1012, 2).to_string(), "10.12");
        assert_eq!(denormalize(1000, 2).to_string(), "10");
        assert_eq!(denormalize(5, 3).to_string(), "0.005");
        assert_eq!(denormalize(0, 4).to_string(), "0");
    }

    #[test]
    fn test_erg_conversions() {
        assert_eq!(erg_to_nanoerg(&amt("0.001")).unwrap(), 1_000_000);
        assert_eq!(erg_to_nanoerg(&amt("1.5")).unwrap(), 1_500_000_000);
        assert!(erg_to_nanoerg(&amt("0.0000000001")).is_err());
        assert_eq!(nanoerg_to_erg(NANOERG_PER_ERG), amt("1"));
        assert_eq!(format_nanoerg(1_500_000_000), "1.5 ERG");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&amt("0.25")).unwrap();
        assert_eq!(json, "\"0.25\"");
        let back: DisplayAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amt("0.25"));
    }
}
