//! Money calculation utilities using rust_decimal for precision
//!
//! SQLite stores amounts as REAL; sums are computed in `Decimal` and
//! converted back to `f64` rounded to cents.

use rust_decimal::prelude::*;

use crate::utils::{AppError, ErrorCode};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: i64 = 9999;

/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an `f64` amount to cents
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// unit_price × quantity
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Order total over `(unit_price, quantity)` lines
pub fn order_total(lines: &[(f64, i64)]) -> f64 {
    let total: Decimal = lines
        .iter()
        .map(|(price, qty)| line_total(*price, *qty))
        .sum();
    to_f64(total)
}

/// 支付金额不得少于订单总额 (总额已按分取整，不留容差)
pub fn is_payment_sufficient(paid: f64, required: f64) -> bool {
    to_decimal(paid) >= to_decimal(required)
}

/// Validate an order line quantity
pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}

/// Validate a payment amount: finite, positive and within bounds
pub fn validate_payment_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::PaymentInsufficientAmount,
            format!("amount must be a positive number, got {amount}"),
        ));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(AppError::validation(format!(
            "amount exceeds maximum allowed ({MAX_PAYMENT_AMOUNT}), got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_precision() {
        // 0.1 + 0.2 must be exactly 0.3
        assert_eq!(order_total(&[(0.1, 1), (0.2, 1)]), 0.3);
        assert_eq!(order_total(&[(12.99, 1), (14.99, 1)]), 27.98);
        assert_eq!(order_total(&[(10.99, 3)]), 32.97);
        assert_eq!(order_total(&[]), 0.0);
    }

    #[test]
    fn test_many_small_lines() {
        let lines = vec![(0.01, 1); 100];
        assert_eq!(order_total(&lines), 1.0);
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(0.005), 0.01);
        assert_eq!(round_money(0.004), 0.0);
        assert_eq!(round_money(30.75), 30.75);
    }

    #[test]
    fn test_is_payment_sufficient() {
        assert!(is_payment_sufficient(100.0, 100.0));
        assert!(is_payment_sufficient(100.01, 100.0));
        assert!(is_payment_sufficient(27.98, 27.98));
        assert!(!is_payment_sufficient(99.99, 100.0));
        assert!(!is_payment_sufficient(99.995, 100.0));
        assert!(!is_payment_sufficient(9.99, 10.0));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(validate_quantity(0).unwrap_err().code, ErrorCode::ValueOutOfRange);
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(25.98).is_ok());
        assert!(validate_payment_amount(0.0).is_err());
        assert!(validate_payment_amount(-5.0).is_err());
        assert!(validate_payment_amount(f64::NAN).is_err());
        assert!(validate_payment_amount(f64::INFINITY).is_err());
        assert!(validate_payment_amount(2_000_000.0).is_err());
    }
}
