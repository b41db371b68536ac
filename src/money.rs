use chrono::{DateTime, Utc};

/// Platform fee in basis points (5%).
pub const DEFAULT_FEE_BPS: i64 = 500;

/// Platform fee for an amount in minor units, rounded half up.
///
/// Applied once, at the point funds first enter escrow or are paid
/// directly; the release leg of an escrow flow carries a zero fee.
pub fn platform_fee(amount: i64) -> i64 {
    platform_fee_bps(amount, fee_bps())
}

pub fn platform_fee_bps(amount: i64, bps: i64) -> i64 {
    (amount * bps + 5_000) / 10_000
}

/// Billable amount for an hourly contract: rate × minutes / 60, rounded
/// half up, all in integer minor units.
pub fn billable_amount(hourly_rate: i64, duration_minutes: i32) -> i64 {
    (hourly_rate * i64::from(duration_minutes) + 30) / 60
}

/// Work interval duration in minutes, rounded to the nearest minute.
/// Caller has already validated `end > start`.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    let seconds = (end - start).num_seconds();
    ((seconds + 30) / 60) as i32
}

fn fee_bps() -> i64 {
    std::env::var("PLATFORM_FEE_BPS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_FEE_BPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fee_is_five_percent_of_round_amounts() {
        // 100_000 cents → 5_000 cents fee
        assert_eq!(platform_fee_bps(100_000, DEFAULT_FEE_BPS), 5_000);
        assert_eq!(platform_fee_bps(20_000, DEFAULT_FEE_BPS), 1_000);
    }

    #[test]
    fn fee_rounds_half_up() {
        // 5% of 10 = 0.5 → 1
        assert_eq!(platform_fee_bps(10, DEFAULT_FEE_BPS), 1);
        // 5% of 9 = 0.45 → 0
        assert_eq!(platform_fee_bps(9, DEFAULT_FEE_BPS), 0);
        // 5% of 30 = 1.5 → 2
        assert_eq!(platform_fee_bps(30, DEFAULT_FEE_BPS), 2);
    }

    #[test]
    fn billable_amount_matches_rate_times_hours() {
        // 6000 cents/hr × 150 min = 6000 × 2.5 = 15000
        assert_eq!(billable_amount(6_000, 150), 15_000);
        // 6000 cents/hr × 60 min = 6000
        assert_eq!(billable_amount(6_000, 60), 6_000);
    }

    #[test]
    fn billable_amount_rounds_half_up() {
        // 101 cents/hr × 30 min = 50.5 → 51
        assert_eq!(billable_amount(101, 30), 51);
        // 99 cents/hr × 30 min = 49.5 → 50
        assert_eq!(billable_amount(99, 30), 50);
    }

    #[test]
    fn duration_rounds_to_nearest_minute() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

        let end = Utc.with_ymd_and_hms(2025, 3, 1, 11, 30, 0).unwrap();
        assert_eq!(duration_minutes(start, end), 150);

        // 29 seconds over rounds down, 30 rounds up
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 9, 10, 29).unwrap();
        assert_eq!(duration_minutes(start, end), 10);
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 9, 10, 30).unwrap();
        assert_eq!(duration_minutes(start, end), 11);
    }
}
