//! Fixed-point amount arithmetic and lenient input coercion.
//!
//! All settlement math is integer-only. Amounts are in fen, ratios in basis
//! points, and products go through `u128` intermediates before rounding
//! half-up back to fen.
//!
//! User-edited values enter through the coercion functions below, which are
//! total: negative input clamps to 0, non-numeric input becomes 0 and
//! percentages clamp into `[0, 100]`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{BPS_PRECISION, FEN_PER_YUAN, MAX_AMOUNT_FEN, MAX_BONUS_COUNT};

/// Convert whole yuan to fen, saturating at [`MAX_AMOUNT_FEN`].
pub fn yuan_to_fen(yuan: u64) -> u64 {
    yuan.saturating_mul(FEN_PER_YUAN).min(MAX_AMOUNT_FEN)
}

/// Round-half-up integer division of a `u128` numerator.
fn div_round(numerator: u128, denominator: u128) -> u64 {
    let q = (numerator + denominator / 2) / denominator;
    u64::try_from(q).unwrap_or(u64::MAX)
}

/// `amount * bps / BPS_PRECISION`, rounded half-up.
///
/// ```
/// use mira_core::amount::mul_bps;
/// assert_eq!(mul_bps(1_000, 2_000), 200);
/// assert_eq!(mul_bps(1, 5_000), 1); // 0.5 rounds up
/// assert_eq!(mul_bps(1, 4_999), 0);
/// ```
pub fn mul_bps(amount: u64, bps: u64) -> u64 {
    div_round(amount as u128 * bps as u128, BPS_PRECISION as u128)
}

/// `amount * a_bps * b_bps / BPS_PRECISION^2`, rounded half-up once.
///
/// ```
/// use mira_core::amount::mul_bps2;
/// // ¥10,000 × 70% × 12% = ¥840
/// assert_eq!(mul_bps2(1_000_000, 7_000, 1_200), 84_000);
/// ```
pub fn mul_bps2(amount: u64, a_bps: u64, b_bps: u64) -> u64 {
    let p = BPS_PRECISION as u128;
    div_round(amount as u128 * a_bps as u128 * b_bps as u128, p * p)
}

/// `part / whole` in basis points, rounded half-up. Zero when `whole` is zero.
pub fn ratio_bps(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    div_round(part as u128 * BPS_PRECISION as u128, whole as u128)
}

/// Clamp a basis-point ratio into `[0, BPS_PRECISION]`.
pub fn clamp_bps(bps: u64) -> u64 {
    bps.min(BPS_PRECISION)
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Parse user text as a number. Blank text is 0; anything unparsable is 0.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(0.0)
}

/// Coerce a yuan amount to fen. Negative, NaN and infinite values become 0.
///
/// ```
/// use mira_core::amount::coerce_amount;
/// assert_eq!(coerce_amount(10.5), 1_050);
/// assert_eq!(coerce_amount(-3.0), 0);
/// assert_eq!(coerce_amount(f64::NAN), 0);
/// ```
pub fn coerce_amount(yuan: f64) -> u64 {
    if !yuan.is_finite() || yuan <= 0.0 {
        return 0;
    }
    let fen = (yuan * FEN_PER_YUAN as f64).round();
    if fen >= MAX_AMOUNT_FEN as f64 {
        MAX_AMOUNT_FEN
    } else {
        fen as u64
    }
}

/// Coerce a percentage to basis points, clamped into `[0, 100]%`.
///
/// ```
/// use mira_core::amount::coerce_percent;
/// assert_eq!(coerce_percent(12.5), 1_250);
/// assert_eq!(coerce_percent(250.0), 10_000);
/// assert_eq!(coerce_percent(-1.0), 0);
/// ```
pub fn coerce_percent(percent: f64) -> u64 {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    if percent >= 100.0 {
        return BPS_PRECISION;
    }
    (percent * 100.0).round() as u64
}

/// Coerce an activity count (or hours). Fractions truncate.
pub fn coerce_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value.trunc() as u64).min(MAX_BONUS_COUNT)
}

/// Coerce a points total. Fractions round half-up; huge values saturate.
pub fn coerce_points(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // Float-to-int casts saturate at u64::MAX.
    value.round() as u64
}

/// Parse and coerce a yuan amount from text.
pub fn parse_amount(text: &str) -> u64 {
    coerce_amount(parse_number(text))
}

/// Parse and coerce a percentage from text.
pub fn parse_percent(text: &str) -> u64 {
    coerce_percent(parse_number(text))
}

/// Parse and coerce a points total from text.
///
/// ```
/// use mira_core::amount::parse_points;
/// assert_eq!(parse_points("2000000"), 2_000_000);
/// assert_eq!(parse_points("-5"), 0);
/// assert_eq!(parse_points("abc"), 0);
/// ```
pub fn parse_points(text: &str) -> u64 {
    coerce_points(parse_number(text))
}

/// Snap basis points to the nearest multiple of `step`, rounding half-up,
/// then clamp into `[0, BPS_PRECISION]`.
///
/// ```
/// use mira_core::amount::snap_bps;
/// assert_eq!(snap_bps(3_330, 50), 3_350);
/// assert_eq!(snap_bps(3_320, 50), 3_300);
/// assert_eq!(snap_bps(3_325, 50), 3_350);
/// ```
pub fn snap_bps(bps: u64, step: u64) -> u64 {
    if step == 0 {
        return clamp_bps(bps);
    }
    clamp_bps(div_round(bps as u128, step as u128).saturating_mul(step))
}

// ---------------------------------------------------------------------------
// Lenient serde wrappers
// ---------------------------------------------------------------------------

/// Any JSON scalar: numbers are used as-is, strings are parsed, the rest is 0.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl LenientNumber {
    fn value(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Text(s) => parse_number(&s),
            Self::Other(_) => 0.0,
        }
    }
}

/// A yuan amount read leniently and stored in fen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LenientAmount(pub u64);

impl<'de> Deserialize<'de> for LenientAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(coerce_amount(LenientNumber::deserialize(deserializer)?.value())))
    }
}

/// A percentage read leniently and stored in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LenientPercent(pub u64);

impl<'de> Deserialize<'de> for LenientPercent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(coerce_percent(LenientNumber::deserialize(deserializer)?.value())))
    }
}

/// A non-negative count read leniently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LenientCount(pub u64);

impl<'de> Deserialize<'de> for LenientCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(coerce_count(LenientNumber::deserialize(deserializer)?.value())))
    }
}
