/// Guarded KPI ratios and emission rounding.
/// Every division checks `denominator > 0` first and yields 0 otherwise,
/// so a zero (or negative) denominator never produces NaN or infinity.

/// `numerator / denominator`, or 0 when the denominator is not strictly positive.
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Click-through rate in percent.
#[inline]
pub fn ctr(clicks: u64, impressions: u64) -> f64 {
    safe_ratio(clicks as f64, impressions as f64) * 100.0
}

/// Cost per click.
#[inline]
pub fn cpc(spend: f64, clicks: u64) -> f64 {
    safe_ratio(spend, clicks as f64)
}

/// Return on ad spend.
#[inline]
pub fn roas(attributed_revenue: f64, spend: f64) -> f64 {
    safe_ratio(attributed_revenue, spend)
}

/// Cost per new customer.
#[inline]
pub fn cpa(spend: f64, new_customers: u64) -> f64 {
    safe_ratio(spend, new_customers as f64)
}

/// Share of business revenue attributed to marketing, in percent.
#[inline]
pub fn attribution(attributed_revenue: f64, total_revenue: f64) -> f64 {
    safe_ratio(attributed_revenue, total_revenue) * 100.0
}

/// Round the exact binary value to `places` decimals, ties to even.
/// Decimal formatting rounds the exact value, so 36.25 → 36.2 and
/// 2.675 (stored as 2.67499..) → 2.67.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{value:.places$}").parse::<f64>().unwrap_or(value);
    // normalize -0.0 so serialized output never shows "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Currency fields: 2 decimals.
#[inline]
pub fn money(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominators_yield_zero() {
        assert_eq!(ctr(10, 0), 0.0);
        assert_eq!(cpc(25.0, 0), 0.0);
        assert_eq!(roas(100.0, 0.0), 0.0);
        assert_eq!(attribution(100.0, 0.0), 0.0);
        assert_eq!(safe_ratio(1.0, -5.0), 0.0);
    }

    #[test]
    fn test_ratio_values() {
        assert!((ctr(120, 3000) - 4.0).abs() < 1e-12);
        assert!((cpc(180.0, 120) - 1.5).abs() < 1e-12);
        assert!((roas(360.0, 180.0) - 2.0).abs() < 1e-12);
        assert!((attribution(360.0, 1000.0) - 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_inconsistent_counts_do_not_panic() {
        // clicks > impressions is not validated upstream
        let r = ctr(500, 100);
        assert!(r.is_finite());
        assert!((r - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
        assert_eq!(round_to(36.04, 1), 36.0);
        assert_eq!(money(179.999), 180.0);
        assert!(round_to(-0.0001, 2).is_sign_positive());
    }

    #[test]
    fn test_round_to_exact_halves_go_to_even() {
        assert_eq!(round_to(36.25, 1), 36.2);
        assert_eq!(round_to(36.35, 1), 36.4); // stored as 36.35000..01
        assert_eq!(round_to(2.625, 2), 2.62);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(money(21.0 / 8.0), 2.62);
    }
}
