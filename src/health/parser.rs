//! Normalization of raw control-endpoint input.
//!
//! Nothing here returns an error: malformed values collapse to a safe value so
//! the control and probe endpoints keep answering during a failover drill.

use super::state::MAX_READINESS_PERCENT;
use std::num::IntErrorKind;

/// Values accepted as "true" for the `healthy` parameter (compared lowercase).
const TRUTHY_VALUES: [&str; 3] = ["true", "1", "yes"];

/// Parse the `healthy` parameter.
///
/// A missing parameter means `true`. Any present value other than
/// `true`, `1` or `yes` (case-insensitive) means `false`.
pub fn parse_healthy(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let value = value.trim().to_ascii_lowercase();
            TRUTHY_VALUES.contains(&value.as_str())
        }
    }
}

/// Parse the `percent` parameter.
///
/// Returns the integer as given (clamping happens in `HealthState`), or 100
/// when the parameter is missing or not an integer. Integers beyond the `i64`
/// range saturate, so they still clamp to the matching end of `[0, 100]`.
pub fn parse_readiness_percent(raw: Option<&str>) -> i64 {
    let fallback = i64::from(MAX_READINESS_PERCENT);
    let Some(value) = raw else {
        return fallback;
    };

    match value.trim().parse::<i64>() {
        Ok(percent) => percent,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => fallback,
        },
    }
}
