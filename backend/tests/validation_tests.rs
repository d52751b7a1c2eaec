//! India-specific field validation tests
//!
//! Tests for GSTIN, mobile numbers, PIN codes, branch codes and
//! money amounts.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    is_interstate_supply, validate_branch_code, validate_gstin, validate_indian_phone,
    validate_money, validate_pin_code,
};

const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Append the mod-36 check character to a 14-character GSTIN body
fn with_check_char(body: &str) -> String {
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let value = CHARSET.iter().position(|c| *c == b).unwrap() as u32;
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();
    let check = CHARSET[((36 - sum % 36) % 36) as usize] as char;
    format!("{}{}", body, check)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod gstin_tests {
    use super::*;

    #[test]
    fn test_known_valid_gstins() {
        for gstin in ["27AAPFU0939F1ZV", "29AAGCB7383J1Z4", "33AABCT1332L1ZL"] {
            assert!(validate_gstin(gstin).is_ok(), "{} should be valid", gstin);
        }
    }

    #[test]
    fn test_check_char_helper_matches_known() {
        assert_eq!(with_check_char("27AAPFU0939F1Z"), "27AAPFU0939F1ZV");
    }

    #[test]
    fn test_wrong_checksum() {
        assert_eq!(validate_gstin("07AAACR5055K1ZD"), Err("Invalid GSTIN checksum"));
        assert!(validate_gstin("07AAACR5055K1Z9").is_ok());
    }

    #[test]
    fn test_gstin_shape_errors() {
        assert!(validate_gstin("27AAPFU0939F1Z").is_err());
        assert!(validate_gstin("27aapfu0939f1zv").is_err());
        assert!(validate_gstin("00AAPFU0939F1ZV").is_err());
        assert!(validate_gstin("27AAPFU0939F1XV").is_err());
    }

    #[test]
    fn test_interstate_by_state_code() {
        assert!(!is_interstate_supply("27AAPFU0939F1ZV", "27AAACR5055K1Z1"));
        assert!(is_interstate_supply("27AAPFU0939F1ZV", "29AAGCB7383J1Z4"));
    }
}

#[cfg(test)]
mod field_tests {
    use super::*;

    #[test]
    fn test_indian_phone_formats() {
        for phone in ["9876543210", "98765-43210", "+919876543210", "09876543210", "6123456789"] {
            assert!(validate_indian_phone(phone).is_ok(), "{} should be valid", phone);
        }
        for phone in ["5876543210", "987654321", "+449876543210", "12345678901"] {
            assert!(validate_indian_phone(phone).is_err(), "{} should be invalid", phone);
        }
    }

    #[test]
    fn test_pin_codes() {
        assert!(validate_pin_code("411026").is_ok());
        assert!(validate_pin_code("011026").is_err());
        assert!(validate_pin_code("41102").is_err());
        assert!(validate_pin_code("41102A").is_err());
    }

    #[test]
    fn test_branch_codes() {
        assert!(validate_branch_code("MAIN").is_ok());
        assert!(validate_branch_code("PUNE2").is_ok());
        assert!(validate_branch_code("M").is_err());
        assert!(validate_branch_code("main").is_err());
        assert!(validate_branch_code("BRANCHCODE1").is_err());
    }

    #[test]
    fn test_money() {
        assert!(validate_money(Decimal::new(12345, 2)).is_ok());
        assert!(validate_money(Decimal::new(1500, 3)).is_ok());
        assert!(validate_money(Decimal::new(1234, 3)).is_err());
        assert!(validate_money(Decimal::new(-1, 0)).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// GSTIN body: state code 01-37, PAN, entity digit, `Z`
    fn gstin_body_strategy() -> impl Strategy<Value = String> {
        (1u32..=37, "[A-Z]{5}[0-9]{4}[A-Z]", "[1-9A-Z]")
            .prop_map(|(state, pan, entity)| format!("{:02}{}{}Z", state, pan, entity))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any body with its computed check character validates
        #[test]
        fn prop_generated_gstin_valid(body in gstin_body_strategy()) {
            let gstin = with_check_char(&body);
            prop_assert!(validate_gstin(&gstin).is_ok(), "{} should be valid", gstin);
        }

        /// Any other check character is rejected
        #[test]
        fn prop_wrong_check_char_rejected(
            body in gstin_body_strategy(),
            offset in 1usize..36
        ) {
            let valid = with_check_char(&body);
            let check = valid.as_bytes()[14];
            let position = CHARSET.iter().position(|c| *c == check).unwrap();
            let wrong = CHARSET[(position + offset) % 36] as char;
            let gstin = format!("{}{}", body, wrong);
            prop_assert!(validate_gstin(&gstin).is_err());
        }

        /// Same state code is never interstate
        #[test]
        fn prop_same_state_not_interstate(
            a in gstin_body_strategy(),
            b in gstin_body_strategy()
        ) {
            let b = format!("{}{}", &a[..2], &b[2..]);
            prop_assert!(!is_interstate_supply(&with_check_char(&a), &with_check_char(&b)));
        }

        /// Ten-digit numbers starting 6-9 are valid mobiles with any prefix form
        #[test]
        fn prop_indian_mobile_valid(number in "[6-9][0-9]{9}") {
            prop_assert!(validate_indian_phone(&number).is_ok());
            let with_country = format!("+91{}", number);
            let with_trunk = format!("0{}", number);
            prop_assert!(validate_indian_phone(&with_country).is_ok());
            prop_assert!(validate_indian_phone(&with_trunk).is_ok());
        }

        #[test]
        fn prop_pin_code_valid(pin in "[1-9][0-9]{5}") {
            prop_assert!(validate_pin_code(&pin).is_ok());
        }

        #[test]
        fn prop_branch_code_valid(code in "[A-Z0-9]{2,10}") {
            prop_assert!(validate_branch_code(&code).is_ok());
        }

        /// Paise amounts are always valid money
        #[test]
        fn prop_paise_amounts_valid(paise in 0i64..=1_000_000_000) {
            prop_assert!(validate_money(Decimal::new(paise, 2)).is_ok());
        }
    }
}
