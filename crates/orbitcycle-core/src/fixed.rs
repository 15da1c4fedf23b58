use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for resource rates and tallies so accumulation is deterministic
/// across platforms.
pub type Fixed64 = I32F32;

/// Milliseconds of virtual page time. The atomic unit of scheduling.
pub type Millis = u64;

/// Convert an f64 to Fixed64. Use only for initialization and data loading.
///
/// Out-of-range values saturate; NaN maps to zero.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert an f64 to Fixed64, or `None` if it is NaN or out of range.
#[inline]
pub fn checked_f64_to_fixed64(v: f64) -> Option<Fixed64> {
    Fixed64::checked_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and FFI.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Scale a value by an integer percentage (`20` means 0.2).
///
/// Rounds to the nearest representable value, ties away from zero, and
/// saturates instead of overflowing.
pub fn scale_percent(v: Fixed64, percent: u32) -> Fixed64 {
    let scaled = i128::from(v.to_bits()) * i128::from(percent);
    let half = if scaled < 0 { -50 } else { 50 };
    let bits = (scaled + half) / 100;
    Fixed64::from_bits(bits.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
}

/// Scale a whole number by an integer percentage and floor the result.
///
/// Exact: integer arithmetic only, so `5 * 20%` is exactly `1`.
#[inline]
pub fn floor_percent(v: u32, percent: u32) -> u32 {
    ((v as u64 * percent as u64) / 100) as u32
}

/// Format with one decimal place, the way tally readouts are shown.
/// Halves round away from zero (`0.25` shows as `0.3`).
pub fn format_one_decimal(v: Fixed64) -> String {
    let one = 1i128 << Fixed64::FRAC_NBITS;
    let scaled = i128::from(v.to_bits()) * 10;
    let half = if scaled < 0 { -(one / 2) } else { one / 2 };
    let tenths = (scaled + half) / one;
    let sign = if tenths < 0 { "-" } else { "" };
    let tenths = tenths.unsigned_abs();
    format!("{sign}{}.{}", tenths / 10, tenths % 10)
}

/// Convert fractional seconds to whole milliseconds (rounded).
#[inline]
pub fn secs_to_millis(secs: f64) -> Millis {
    if secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).round() as Millis
}
