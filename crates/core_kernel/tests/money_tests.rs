//! Integration tests for Money covering the installment allocation policy

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn allocate_exact_division_produces_equal_parts() {
    let total = Money::brl(dec!(300.00));
    let parts = total.allocate(3).unwrap();

    assert_eq!(parts.len(), 3);
    for part in &parts {
        assert_eq!(part.amount(), dec!(100.00));
    }
}

#[test]
fn allocate_remainder_lands_on_earliest_parts() {
    let total = Money::brl(dec!(100.00));
    let parts = total.allocate(7).unwrap();

    // 10000 centavos / 7 = 1428 rem 4: four parts of 14.29, three of 14.28
    assert_eq!(parts[0].amount(), dec!(14.29));
    assert_eq!(parts[3].amount(), dec!(14.29));
    assert_eq!(parts[4].amount(), dec!(14.28));
    assert_eq!(parts[6].amount(), dec!(14.28));

    let sum: Decimal = parts.iter().map(|p| p.amount()).sum();
    assert_eq!(sum, dec!(100.00));
}

#[test]
fn allocate_single_part_returns_total() {
    let total = Money::brl(dec!(59.90));
    let parts = total.allocate(1).unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0], total);
}

#[test]
fn allocate_more_parts_than_centavos() {
    let total = Money::brl(dec!(0.05));
    let parts = total.allocate(10).unwrap();

    let sum: Decimal = parts.iter().map(|p| p.amount()).sum();
    assert_eq!(sum, dec!(0.05));
    assert_eq!(parts[0].amount(), dec!(0.01));
    assert_eq!(parts[9].amount(), dec!(0.00));
}

#[test]
fn new_rounds_to_minor_unit() {
    let m = Money::brl(dec!(10.005));
    assert_eq!(m.amount(), dec!(10.00));
}

#[test]
fn subtraction_can_go_negative() {
    let a = Money::brl(dec!(10.00));
    let b = Money::brl(dec!(25.00));

    let balance = a - b;
    assert!(balance.is_negative());
    assert_eq!(balance.amount(), dec!(-15.00));
}

#[test]
fn checked_ops_reject_mixed_currencies() {
    let brl = Money::brl(dec!(1.00));
    let usd = Money::new(dec!(1.00), Currency::USD);

    assert!(matches!(
        brl.checked_sub(&usd),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn currency_round_trip_from_str() {
    let c: Currency = "BRL".parse().unwrap();
    assert_eq!(c, Currency::BRL);
    assert!("XYZ".parse::<Currency>().is_err());
}
