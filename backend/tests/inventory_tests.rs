//! Stock movement tests
//!
//! Tests for raw material and store inventory arithmetic including:
//! - Quantities never go negative after a decrement
//! - Record edits move stock by the difference only
//! - Reorder alert triggering

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{checked_decrement, needs_reorder, stock_delta, validate_positive_quantity, StockError};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_decrement_leaves_remainder() {
        assert_eq!(checked_decrement(dec("20"), dec("7.5")).unwrap(), dec("12.5"));
    }

    #[test]
    fn test_decrement_to_exactly_zero() {
        assert_eq!(checked_decrement(dec("4"), dec("4")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_decrement_insufficient() {
        assert_eq!(
            checked_decrement(dec("3"), dec("5")),
            Err(StockError::Insufficient {
                requested: dec("5"),
                available: dec("3"),
            })
        );
    }

    #[test]
    fn test_decrement_rejects_non_positive() {
        assert_eq!(checked_decrement(dec("3"), Decimal::ZERO), Err(StockError::NonPositive));
        assert_eq!(checked_decrement(dec("3"), dec("-1")), Err(StockError::NonPositive));
    }

    #[test]
    fn test_stock_delta_direction() {
        // Purchase raised from 10 to 15 adds 5 more to stock
        assert_eq!(stock_delta(dec("10"), dec("15")), dec("5"));
        // Lowered to 8 takes 2 back out
        assert_eq!(stock_delta(dec("10"), dec("8")), dec("-2"));
        assert_eq!(stock_delta(dec("10"), dec("10")), Decimal::ZERO);
    }

    #[test]
    fn test_reorder_at_level() {
        assert!(needs_reorder(dec("5"), dec("5")));
        assert!(needs_reorder(dec("4.99"), dec("5")));
        assert!(!needs_reorder(dec("5.01"), dec("5")));
    }

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(dec("0.01")).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Stock levels from 0 to 100000.00
    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000i64).prop_map(|v| Decimal::new(v, 2))
    }

    /// Movement quantities from 0.01 to 100000.00
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|v| Decimal::new(v, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A successful decrement never leaves negative stock
        #[test]
        fn prop_decrement_never_negative(
            available in stock_strategy(),
            quantity in quantity_strategy()
        ) {
            match checked_decrement(available, quantity) {
                Ok(remaining) => {
                    prop_assert!(remaining >= Decimal::ZERO);
                    prop_assert_eq!(remaining + quantity, available);
                }
                Err(StockError::Insufficient { requested, available: have }) => {
                    prop_assert!(requested > have);
                }
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }

        /// Repeated sales drain stock to zero but never below
        #[test]
        fn prop_repeated_decrements_stop_at_zero(
            initial in stock_strategy(),
            sales in prop::collection::vec(quantity_strategy(), 1..20)
        ) {
            let mut stock = initial;
            for quantity in sales {
                if let Ok(remaining) = checked_decrement(stock, quantity) {
                    stock = remaining;
                }
                prop_assert!(stock >= Decimal::ZERO);
            }
            prop_assert!(stock <= initial);
        }

        /// Applying an edit delta lands on the same level as reversing and reapplying
        #[test]
        fn prop_delta_matches_reverse_and_reapply(
            stock in stock_strategy(),
            old_quantity in quantity_strategy(),
            new_quantity in quantity_strategy()
        ) {
            let via_delta = stock + stock_delta(old_quantity, new_quantity);
            let via_reapply = stock - old_quantity + new_quantity;
            prop_assert_eq!(via_delta, via_reapply);
        }

        /// Transfers conserve total stock across two stores
        #[test]
        fn prop_transfer_conserves_stock(
            source in stock_strategy(),
            destination in stock_strategy(),
            quantity in quantity_strategy()
        ) {
            if let Ok(remaining) = checked_decrement(source, quantity) {
                let received = destination + quantity;
                prop_assert_eq!(remaining + received, source + destination);
            }
        }

        /// Reorder alert fires exactly when stock is at or below the level
        #[test]
        fn prop_reorder_threshold(
            quantity in stock_strategy(),
            level in stock_strategy()
        ) {
            prop_assert_eq!(needs_reorder(quantity, level), quantity <= level);
        }
    }
}
