//! Overflow-checked decimal arithmetic.
//!
//! Rates and hours arrive from request bodies, so every product and total in
//! the billing rules goes through these helpers and fails with a
//! `CalculationError` instead of panicking.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

fn overflow(context: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("amount overflow while computing {}", context),
    }
}

pub(crate) fn product(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

pub(crate) fn difference(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

pub(crate) fn total<I>(values: I, context: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| overflow(context))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_overflow_is_calculation_error() {
        match product(Decimal::MAX, Decimal::new(8, 0), "hourly amount") {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("overflow"));
                assert!(message.contains("hourly amount"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_difference_overflow_detected() {
        assert!(difference(Decimal::MIN, Decimal::ONE, "payable").is_err());
        assert_eq!(
            difference(Decimal::new(10, 0), Decimal::new(3, 0), "payable").unwrap(),
            Decimal::new(7, 0)
        );
    }

    #[test]
    fn test_total_of_empty_is_zero() {
        assert_eq!(total(Vec::new(), "subtotal").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_total_overflow_detected() {
        assert!(total([Decimal::MAX, Decimal::ONE], "subtotal").is_err());
        assert_eq!(
            total([Decimal::new(15, 1), Decimal::new(25, 1)], "subtotal").unwrap(),
            Decimal::new(4, 0)
        );
    }
}
