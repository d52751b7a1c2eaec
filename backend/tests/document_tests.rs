//! Document numbering tests
//!
//! Tests for ORD-/BILL-/INV- numbers including:
//! - Format and parse round trip
//! - Numbers order by date then sequence within a prefix
//! - Rejection of malformed and non-canonical numbers

use chrono::NaiveDate;
use proptest::prelude::*;
use shared::{DocumentKind, DocumentNumber, DocumentNumberError};
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        let number = DocumentNumber::new(DocumentKind::Order, date(2026, 1, 15), 7).unwrap();
        assert_eq!(number.to_string(), "ORD-20260115-0007");
    }

    #[test]
    fn test_format_beyond_four_digits() {
        let number = DocumentNumber::new(DocumentKind::Bill, date(2026, 3, 2), 12345).unwrap();
        assert_eq!(number.to_string(), "BILL-20260302-12345");
        assert_eq!(DocumentNumber::from_str("BILL-20260302-12345").unwrap(), number);
    }

    #[test]
    fn test_sequence_key() {
        assert_eq!(DocumentKind::Invoice.sequence_key(date(2026, 10, 19)), "INV-20261019");
    }

    #[test]
    fn test_zero_sequence_rejected() {
        assert_eq!(
            DocumentNumber::new(DocumentKind::Invoice, date(2026, 1, 1), 0),
            Err(DocumentNumberError::ZeroSequence)
        );
        assert_eq!(
            DocumentNumber::from_str("INV-20260101-0000"),
            Err(DocumentNumberError::ZeroSequence)
        );
    }

    #[test]
    fn test_unknown_prefix() {
        assert!(matches!(
            DocumentNumber::from_str("PO-20260101-0001"),
            Err(DocumentNumberError::UnknownPrefix(_))
        ));
    }

    #[test]
    fn test_only_canonical_sequences_parse() {
        for bad in [
            "ORD-20261019-00001",
            "ORD-20261019-01234",
            "ORD-20261019-+123",
            "ORD-20261019--123",
            "ORD-+2026101-0001",
            "ORD-20261019-12 4",
        ] {
            assert!(
                matches!(DocumentNumber::from_str(bad), Err(DocumentNumberError::Malformed(_))),
                "{} should be malformed",
                bad
            );
        }
        let number = DocumentNumber::from_str("ORD-20261019-0001").unwrap();
        assert_eq!(number.to_string(), "ORD-20261019-0001");
    }

    #[test]
    fn test_malformed_numbers() {
        for bad in [
            "",
            "ORD",
            "ORD-20260101",
            "ORD-2026011-0001",
            "ORD-20261301-0001",
            "ORD-20260101-001",
            "ORD-20260101-00x1",
            "ORD-20260101-0001-2",
        ] {
            assert!(
                matches!(DocumentNumber::from_str(bad), Err(DocumentNumberError::Malformed(_))),
                "{} should be malformed",
                bad
            );
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn kind_strategy() -> impl Strategy<Value = DocumentKind> {
        prop_oneof![
            Just(DocumentKind::Order),
            Just(DocumentKind::Bill),
            Just(DocumentKind::Invoice),
        ]
    }

    /// Dates between 2020 and roughly 2047
    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0u64..10_000).prop_map(|days| date(2020, 1, 1) + chrono::Days::new(days))
    }

    fn sequence_strategy() -> impl Strategy<Value = u32> {
        1u32..=99_999
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Parsing a formatted number gives back the same number
        #[test]
        fn prop_format_parse_round_trip(
            kind in kind_strategy(),
            day in date_strategy(),
            sequence in sequence_strategy()
        ) {
            let number = DocumentNumber::new(kind, day, sequence).unwrap();
            let parsed = DocumentNumber::from_str(&number.to_string()).unwrap();
            prop_assert_eq!(parsed, number);
        }

        /// Extra leading zeros never parse, so every accepted string is canonical
        #[test]
        fn prop_extra_zero_padding_rejected(
            kind in kind_strategy(),
            day in date_strategy(),
            sequence in sequence_strategy()
        ) {
            let number = DocumentNumber::new(kind, day, sequence).unwrap();
            let formatted = number.to_string();
            let (head, tail) = formatted.rsplit_once('-').unwrap();
            let padded = format!("{}-0{}", head, tail);
            prop_assert!(DocumentNumber::from_str(&padded).is_err());
        }

        /// Within one prefix and day, a later sequence sorts later
        #[test]
        fn prop_sequence_monotonic(
            kind in kind_strategy(),
            day in date_strategy(),
            a in sequence_strategy(),
            b in sequence_strategy()
        ) {
            prop_assume!(a != b);
            let first = DocumentNumber::new(kind, day, a.min(b)).unwrap();
            let second = DocumentNumber::new(kind, day, a.max(b)).unwrap();
            prop_assert!(first < second);
            prop_assert_ne!(first.to_string(), second.to_string());
        }

        /// A later day sorts later regardless of sequence
        #[test]
        fn prop_later_day_sorts_later(
            kind in kind_strategy(),
            day in date_strategy(),
            gap in 1u64..365,
            a in sequence_strategy(),
            b in sequence_strategy()
        ) {
            let earlier = DocumentNumber::new(kind, day, a).unwrap();
            let later = DocumentNumber::new(kind, day + chrono::Days::new(gap), b).unwrap();
            prop_assert!(earlier < later);
        }

        /// Padded numbers up to 9999 keep string order equal to numeric order
        #[test]
        fn prop_padded_strings_sort(
            kind in kind_strategy(),
            day in date_strategy(),
            a in 1u32..=9_999,
            b in 1u32..=9_999
        ) {
            let x = DocumentNumber::new(kind, day, a).unwrap();
            let y = DocumentNumber::new(kind, day, b).unwrap();
            prop_assert_eq!(x.to_string().cmp(&y.to_string()), a.cmp(&b));
        }
    }
}
