//! Program constants. Currency amounts are in fen (1 yuan = 100 fen),
//! rates and ratios are in basis points.

/// Fen per yuan. COIN rewards use the same hundredths scale.
pub const FEN_PER_YUAN: u64 = 100;

/// Mira points earned per yuan of recharge.
pub const RECHARGE_TO_MIRA: u64 = 100;

/// Mira points earned per fen of recharge.
///
/// ```
/// use mira_core::constants::MIRA_PER_FEN;
/// assert_eq!(MIRA_PER_FEN, 1);
/// ```
pub const MIRA_PER_FEN: u64 = RECHARGE_TO_MIRA / FEN_PER_YUAN;

/// Denominator for every ratio expressed in basis points (100% = 10_000).
pub const BPS_PRECISION: u64 = 10_000;

/// Fraction of a recharge that is payable as rewards at all (70%).
pub const SETTLEMENT_RATIO_BPS: u64 = 7_000;

/// Default fraction of a downline's settlement credited to its upline (20%).
pub const DEFAULT_UPLINE_SHARE_BPS: u64 = 2_000;

/// Granularity of user-edited tier rates (0.5%).
pub const RATE_STEP_BPS: u64 = 50;

/// Monthly retention floor as a fraction of the current tier's threshold (20%).
///
/// A month whose new points fall below this floor counts as a miss.
pub const RETENTION_FLOOR_BPS: u64 = 2_000;

/// Consecutive misses at the same tier that trigger a demotion.
pub const DEMOTION_MISS_LIMIT: u32 = 2;

/// Upper clamp for a single recharge amount, in fen (10 trillion yuan).
///
/// Keeps every per-month and cumulative sum far below `u64::MAX`.
pub const MAX_AMOUNT_FEN: u64 = 1_000_000_000_000_000;

/// Upper clamp for bonus activity counts.
pub const MAX_BONUS_COUNT: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Bonus activity
// ---------------------------------------------------------------------------

/// Points per invitee who registers.
pub const REGISTRATION_BONUS_MIRA: u64 = 100_000;

/// Points per invitee who reaches character level 50.
pub const LEVEL50_BONUS_MIRA: u64 = 100_000;

/// Points per hour of game livestreaming.
pub const LIVESTREAM_MIRA_PER_HOUR: u64 = 60_000;

/// Points per completed driver or courier certification.
pub const CERTIFICATION_BONUS_MIRA: u64 = 500_000;
