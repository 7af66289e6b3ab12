use payvault::domain::fees::{FEE_SCALE, FeeSchedule, HIGH_RATE_BPS, LOW_RATE_BPS};
use payvault::domain::order::Balance;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fee(base: Decimal) -> Decimal {
    FeeSchedule::default().fee_for(Balance::new(base)).0
}

#[test]
fn test_documented_fee_scenarios() {
    // 100 units at 30 bps, 5 units at 50 bps, threshold hit at 10 units
    assert_eq!(fee(dec!(100)), dec!(0.3));
    assert_eq!(fee(dec!(5)), dec!(0.025));
    assert_eq!(fee(dec!(10)), dec!(0.03));
}

#[test]
fn test_fee_is_cheaper_at_the_threshold_than_just_below() {
    let just_below = fee(dec!(9.9999));
    let at_threshold = fee(dec!(10));
    assert!(at_threshold < just_below);
}

#[test]
fn test_randomized_fee_formula() {
    let mut rng = rand::thread_rng();
    let threshold = dec!(10);

    for _ in 0..1000 {
        // Random amounts at smallest-unit granularity up to 1000 units
        let base = Decimal::new(rng.gen_range(0..=10_000_000), FEE_SCALE);
        let rate = if base >= threshold {
            LOW_RATE_BPS
        } else {
            HIGH_RATE_BPS
        };

        let expected = (base * Decimal::from(rate) / dec!(10000)).trunc_with_scale(FEE_SCALE);
        let actual = fee(base);

        assert_eq!(actual, expected, "base {base}");
        // A fee never exceeds the worst-case rate on the base itself
        assert!(actual <= base * Decimal::from(HIGH_RATE_BPS) / dec!(10000));
    }
}

#[test]
fn test_custom_schedule_tiers() {
    let schedule = FeeSchedule::new(dec!(100), 10, 100);

    assert_eq!(schedule.fee_for(Balance::new(dec!(100))).0, dec!(0.1));
    assert_eq!(schedule.fee_for(Balance::new(dec!(50))).0, dec!(0.5));
}
