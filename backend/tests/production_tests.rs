//! Production pipeline tests
//!
//! Tests for stage progression and entry quantities including:
//! - Stage transitions move forward by exactly one step
//! - Output plus rejected never exceeds input
//! - Wastage percentage calculation

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    calculate_wastage_percent, EntryQuantities, EntryStatus, OrderStatus, ProductionStage,
    QuantityError, StageError,
};
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
    fn test_stage_order() {
        let names: Vec<&str> = ProductionStage::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "PENDING",
                "CUTTING",
                "SHAPING",
                "BENDING",
                "WELDING_INNER",
                "WELDING_OUTER",
                "GRINDING",
                "FINISHING",
                "PAINTING",
                "COMPLETED",
            ]
        );
    }

    #[test]
    fn test_next_stage() {
        assert_eq!(ProductionStage::Pending.next(), Some(ProductionStage::Cutting));
        assert_eq!(
            ProductionStage::WeldingInner.next(),
            Some(ProductionStage::WeldingOuter)
        );
        assert_eq!(ProductionStage::Painting.next(), Some(ProductionStage::Completed));
        assert_eq!(ProductionStage::Completed.next(), None);
    }

    #[test]
    fn test_parse_stage_is_case_insensitive() {
        assert_eq!(
            ProductionStage::from_str("welding_outer").unwrap(),
            ProductionStage::WeldingOuter
        );
        assert!(matches!(
            ProductionStage::from_str("PUNCHING"),
            Err(StageError::Unknown(_))
        ));
    }

    #[test]
    fn test_skip_reports_expected_stage() {
        let err = ProductionStage::Cutting
            .validate_transition(ProductionStage::Bending)
            .unwrap_err();
        assert_eq!(
            err,
            StageError::Skip {
                from: ProductionStage::Cutting,
                to: ProductionStage::Bending,
                expected: ProductionStage::Shaping,
            }
        );
    }

    #[test]
    fn test_completed_is_terminal() {
        for stage in ProductionStage::ALL {
            assert_eq!(
                ProductionStage::Completed.validate_transition(stage),
                Err(StageError::AlreadyCompleted)
            );
        }
    }

    #[test]
    fn test_order_status_follows_stage() {
        assert_eq!(OrderStatus::for_stage(ProductionStage::Pending), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::for_stage(ProductionStage::Grinding),
            OrderStatus::InProduction
        );
        assert_eq!(
            OrderStatus::for_stage(ProductionStage::Completed),
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_order_status_names_parse_back() {
        for stage in ProductionStage::ALL {
            let status = OrderStatus::for_stage(stage);
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("CANCELLED"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("pending"), None);
    }

    #[test]
    fn test_manual_order_status_changes() {
        assert!(OrderStatus::Completed
            .validate_manual_change(OrderStatus::Delivered)
            .is_ok());
        assert!(OrderStatus::InProduction
            .validate_manual_change(OrderStatus::Cancelled)
            .is_ok());
        assert!(OrderStatus::Pending
            .validate_manual_change(OrderStatus::Completed)
            .is_err());
        assert!(OrderStatus::Delivered
            .validate_manual_change(OrderStatus::Cancelled)
            .is_err());
    }

    #[test]
    fn test_quantity_validation_errors() {
        assert_eq!(
            EntryQuantities::new(0, 0, 0).validate(),
            Err(QuantityError::NonPositiveInput)
        );
        assert_eq!(
            EntryQuantities::new(10, -1, 0).validate().unwrap_err().field(),
            "output_quantity"
        );
        assert_eq!(
            EntryQuantities::new(10, 0, -1).validate().unwrap_err().field(),
            "rejected_quantity"
        );
        assert!(matches!(
            EntryQuantities::new(10, 8, 3).validate(),
            Err(QuantityError::ExceedsInput { .. })
        ));
        assert!(EntryQuantities::new(10, 8, 2).validate().is_ok());
    }

    #[test]
    fn test_wastage_percent_examples() {
        assert_eq!(calculate_wastage_percent(100, 90), dec("10"));
        assert_eq!(calculate_wastage_percent(3, 2), dec("33.33"));
        assert_eq!(calculate_wastage_percent(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_entry_status_editable() {
        assert!(EntryStatus::InProgress.is_editable());
        assert!(!EntryStatus::Approved.is_editable());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stage_strategy() -> impl Strategy<Value = ProductionStage> {
        (0usize..ProductionStage::ALL.len()).prop_map(|i| ProductionStage::ALL[i])
    }

    fn input_strategy() -> impl Strategy<Value = i32> {
        1i32..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A transition is accepted only when it is exactly one step forward
        #[test]
        fn prop_transition_single_step_forward(
            from in stage_strategy(),
            to in stage_strategy()
        ) {
            let accepted = from.validate_transition(to).is_ok();
            let one_step = !from.is_completed() && to.index() == from.index() + 1;
            prop_assert_eq!(accepted, one_step);
        }

        /// `next` always yields an accepted transition
        #[test]
        fn prop_next_always_validates(stage in stage_strategy()) {
            match stage.next() {
                Some(next) => {
                    prop_assert!(stage.validate_transition(next).is_ok());
                    prop_assert_eq!(next.index(), stage.index() + 1);
                }
                None => prop_assert!(stage.is_completed()),
            }
        }

        /// Moving backwards is always a regression
        #[test]
        fn prop_backwards_is_regression(
            from in stage_strategy(),
            to in stage_strategy()
        ) {
            prop_assume!(!from.is_completed() && to < from);
            let is_regression = matches!(
                from.validate_transition(to),
                Err(StageError::Regression { .. })
            );
            prop_assert!(is_regression);
        }

        /// Index and stage map onto each other
        #[test]
        fn prop_index_round_trip(stage in stage_strategy()) {
            prop_assert_eq!(ProductionStage::from_index(stage.index()), Some(stage));
            prop_assert_eq!(ProductionStage::from_str(stage.as_str()).unwrap(), stage);
        }

        /// Accepted quantities never have output + rejected above input
        #[test]
        fn prop_valid_quantities_within_input(
            input in input_strategy(),
            output in 0i32..=10_000,
            rejected in 0i32..=10_000
        ) {
            let quantities = EntryQuantities::new(input, output, rejected);
            let within = output + rejected <= input;
            prop_assert_eq!(quantities.validate().is_ok(), within);
            if within {
                prop_assert!(quantities.wastage() >= 0);
                prop_assert_eq!(quantities.wastage() + output + rejected, input);
            }
        }

        /// Wastage percent stays between 0 and 100 for valid output
        #[test]
        fn prop_wastage_percent_bounded(
            input in input_strategy(),
            output_share in 0u32..=100
        ) {
            let output = (i64::from(input) * i64::from(output_share) / 100) as i32;
            let percent = calculate_wastage_percent(input, output);
            prop_assert!(percent >= Decimal::ZERO);
            prop_assert!(percent <= Decimal::from(100));
            prop_assert!(percent.scale() <= 2);
        }

        /// Full output means zero wastage
        #[test]
        fn prop_full_output_no_wastage(input in input_strategy()) {
            prop_assert_eq!(calculate_wastage_percent(input, input), Decimal::ZERO);
            prop_assert_eq!(EntryQuantities::new(input, input, 0).wastage(), 0);
        }
    }
}
