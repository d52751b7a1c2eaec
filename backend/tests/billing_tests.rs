//! GST, POS billing and invoice payment tests
//!
//! Tests for money arithmetic including:
//! - CGST + SGST equals IGST for the same base
//! - Bill totals add up after discount and tax
//! - Change is only returned out of cash
//! - Invoice payments never exceed the invoice total

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    apply_invoice_payment, compute_bill, compute_gst, round_money, settle_payments, sum_lines,
    BillError, EntryType, InvoicePaymentError, InvoiceStatus, LineAmount, LineError,
    PaymentMethod, ProfitAndLoss, ReferenceType,
};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(quantity: &str, unit_price: &str) -> LineAmount {
    LineAmount::new(dec(quantity), dec(unit_price))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_intra_state_split() {
        let gst = compute_gst(dec("1000"), dec("18"), false);
        assert_eq!(gst.cgst, dec("90"));
        assert_eq!(gst.sgst, dec("90"));
        assert_eq!(gst.igst, Decimal::ZERO);
        assert_eq!(gst.grand_total, dec("1180"));
    }

    #[test]
    fn test_inter_state_igst() {
        let gst = compute_gst(dec("1000"), dec("18"), true);
        assert_eq!(gst.igst, dec("180"));
        assert_eq!(gst.cgst, Decimal::ZERO);
        assert_eq!(gst.sgst, Decimal::ZERO);
    }

    #[test]
    fn test_odd_paise_goes_to_sgst() {
        // 0.05 × 18% = 0.009 → 0.01 total tax
        let gst = compute_gst(dec("0.05"), dec("18"), false);
        assert_eq!(gst.total_tax, dec("0.01"));
        assert_eq!(gst.cgst + gst.sgst, dec("0.01"));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("2.345")), dec("2.35"));
        assert_eq!(round_money(dec("2.344")), dec("2.34"));
    }

    #[test]
    fn test_sum_lines_errors() {
        assert_eq!(sum_lines(&[]), Err(LineError::Empty));
        assert_eq!(
            sum_lines(&[line("1", "10"), line("0", "10")]),
            Err(LineError::NonPositiveQuantity(2))
        );
        assert_eq!(sum_lines(&[line("1", "-1")]), Err(LineError::NegativePrice(1)));
    }

    #[test]
    fn test_oversized_lines_are_errors() {
        let huge = "100000000000000000000";
        assert_eq!(sum_lines(&[line(huge, huge)]), Err(LineError::Overflow(1)));
        assert_eq!(
            compute_bill(&[line("1", "10"), line(huge, "1")], Decimal::ZERO, dec("18")),
            Err(BillError::Line(LineError::Overflow(2)))
        );
    }

    #[test]
    fn test_oversized_payment_rejected() {
        let huge = Decimal::MAX;
        assert_eq!(
            settle_payments(dec("10"), &[(PaymentMethod::Cash, huge), (PaymentMethod::Cash, huge)]),
            Err(BillError::PaymentTooLarge)
        );
    }

    #[test]
    fn test_bill_with_discount() {
        let totals = compute_bill(&[line("2", "500"), line("1", "250")], dec("250"), dec("18")).unwrap();
        assert_eq!(totals.subtotal, dec("1250"));
        assert_eq!(totals.taxable_amount, dec("1000"));
        assert_eq!(totals.tax_amount, dec("180"));
        assert_eq!(totals.total, dec("1180"));
    }

    #[test]
    fn test_bill_discount_limits() {
        assert_eq!(
            compute_bill(&[line("1", "100")], dec("-1"), dec("18")),
            Err(BillError::NegativeDiscount)
        );
        assert!(matches!(
            compute_bill(&[line("1", "100")], dec("100.01"), dec("18")),
            Err(BillError::DiscountExceedsSubtotal { .. })
        ));
    }

    #[test]
    fn test_settle_cash_change() {
        let settlement = settle_payments(dec("1180"), &[(PaymentMethod::Cash, dec("1200"))]).unwrap();
        assert_eq!(settlement.amount_paid, dec("1200"));
        assert_eq!(settlement.change_given, dec("20"));
    }

    #[test]
    fn test_settle_split_payment() {
        let settlement = settle_payments(
            dec("1180"),
            &[(PaymentMethod::Upi, dec("1000")), (PaymentMethod::Cash, dec("200"))],
        )
        .unwrap();
        assert_eq!(settlement.change_given, dec("20"));
    }

    #[test]
    fn test_settle_rejections() {
        assert_eq!(settle_payments(dec("10"), &[]), Err(BillError::NoPayments));
        assert_eq!(
            settle_payments(dec("10"), &[(PaymentMethod::Card, Decimal::ZERO)]),
            Err(BillError::NonPositivePayment)
        );
        assert!(matches!(
            settle_payments(dec("10"), &[(PaymentMethod::Cash, dec("9.99"))]),
            Err(BillError::Underpaid { .. })
        ));
        assert_eq!(
            settle_payments(dec("10"), &[(PaymentMethod::Card, dec("15"))]),
            Err(BillError::ChangeWithoutCash { change: dec("5") })
        );
    }

    #[test]
    fn test_invoice_payment_progression() {
        let (paid, status) =
            apply_invoice_payment(InvoiceStatus::Unpaid, dec("1180"), Decimal::ZERO, dec("500")).unwrap();
        assert_eq!(paid, dec("500"));
        assert_eq!(status, InvoiceStatus::PartiallyPaid);

        let (paid, status) = apply_invoice_payment(status, dec("1180"), paid, dec("680")).unwrap();
        assert_eq!(paid, dec("1180"));
        assert_eq!(status, InvoiceStatus::Paid);

        assert_eq!(
            apply_invoice_payment(status, dec("1180"), paid, dec("1")),
            Err(InvoicePaymentError::Closed(InvoiceStatus::Paid))
        );
    }

    #[test]
    fn test_invoice_payment_rejections() {
        assert_eq!(
            apply_invoice_payment(InvoiceStatus::Cancelled, dec("100"), Decimal::ZERO, dec("1")),
            Err(InvoicePaymentError::Closed(InvoiceStatus::Cancelled))
        );
        assert_eq!(
            apply_invoice_payment(InvoiceStatus::Unpaid, dec("100"), Decimal::ZERO, Decimal::ZERO),
            Err(InvoicePaymentError::NonPositive)
        );
        assert!(matches!(
            apply_invoice_payment(InvoiceStatus::Unpaid, dec("100"), dec("60"), dec("41")),
            Err(InvoicePaymentError::Overpayment { .. })
        ));
    }

    #[test]
    fn test_reference_postings() {
        assert_eq!(ReferenceType::Purchase.posting().0, EntryType::Expense);
        assert_eq!(ReferenceType::PosRefund.posting().0, EntryType::Expense);
        assert_eq!(ReferenceType::PosTransaction.posting(), (EntryType::Income, "POS_SALES"));
        assert_eq!(ReferenceType::InvoicePayment.posting().0, EntryType::Income);
        assert_eq!(ReferenceType::FinalProductSale.posting().0, EntryType::Income);
    }

    #[test]
    fn test_profit_and_loss() {
        let pnl = ProfitAndLoss::new(dec("10000"), dec("7500"));
        assert_eq!(pnl.net_profit, dec("2500"));
        assert_eq!(pnl.margin_percent, Some(dec("25")));

        let empty = ProfitAndLoss::new(Decimal::ZERO, dec("300"));
        assert_eq!(empty.net_profit, dec("-300"));
        assert_eq!(empty.margin_percent, None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Amounts from 0.00 to 1000000.00
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100_000_000i64).prop_map(|v| Decimal::new(v, 2))
    }

    /// Standard GST slabs
    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            Just(Decimal::ZERO),
            Just(Decimal::from(5)),
            Just(Decimal::from(12)),
            Just(Decimal::from(18)),
            Just(Decimal::from(28)),
        ]
    }

    fn line_strategy() -> impl Strategy<Value = LineAmount> {
        (1i64..=1_000, 0i64..=10_000_000)
            .prop_map(|(q, p)| LineAmount::new(Decimal::from(q), Decimal::new(p, 2)))
    }

    /// Mantissa and scale spanning the whole decimal range
    fn wide_decimal_strategy() -> impl Strategy<Value = Decimal> {
        (any::<u32>(), any::<u32>(), any::<u32>(), 0u32..=10)
            .prop_map(|(lo, mid, hi, scale)| Decimal::from_parts(lo, mid, hi, false, scale))
    }

    fn method_strategy() -> impl Strategy<Value = PaymentMethod> {
        prop_oneof![
            Just(PaymentMethod::Cash),
            Just(PaymentMethod::Card),
            Just(PaymentMethod::Upi),
            Just(PaymentMethod::BankTransfer),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// CGST + SGST equals IGST for the same base and rate
        #[test]
        fn prop_gst_split_matches_igst(
            taxable in amount_strategy(),
            rate in rate_strategy()
        ) {
            let intra = compute_gst(taxable, rate, false);
            let inter = compute_gst(taxable, rate, true);
            prop_assert_eq!(intra.cgst + intra.sgst, inter.igst);
            prop_assert_eq!(intra.grand_total, inter.grand_total);
        }

        /// Halves differ by at most one paisa
        #[test]
        fn prop_gst_halves_balanced(
            taxable in amount_strategy(),
            rate in rate_strategy()
        ) {
            let gst = compute_gst(taxable, rate, false);
            prop_assert!((gst.cgst - gst.sgst).abs() <= dec("0.01"));
        }

        /// Grand total is taxable amount plus every tax component
        #[test]
        fn prop_gst_totals_add_up(
            taxable in amount_strategy(),
            rate in rate_strategy(),
            interstate in any::<bool>()
        ) {
            let gst = compute_gst(taxable, rate, interstate);
            prop_assert_eq!(gst.total_tax, gst.cgst + gst.sgst + gst.igst);
            prop_assert_eq!(gst.grand_total, gst.taxable_amount + gst.total_tax);
        }

        /// Bill total is subtotal minus discount plus tax
        #[test]
        fn prop_bill_totals_add_up(
            lines in prop::collection::vec(line_strategy(), 1..8),
            discount_share in 0u32..=100,
            rate in rate_strategy()
        ) {
            let subtotal = sum_lines(&lines).unwrap();
            let discount = round_money(subtotal * Decimal::from(discount_share) / Decimal::from(100));
            let totals = compute_bill(&lines, discount, rate).unwrap();
            prop_assert_eq!(totals.subtotal, subtotal);
            prop_assert_eq!(totals.taxable_amount, subtotal - discount);
            prop_assert_eq!(totals.total, totals.taxable_amount + totals.tax_amount);
            prop_assert!(totals.total >= Decimal::ZERO);
        }

        /// Huge quantities and prices give an error, never a panic
        #[test]
        fn prop_huge_lines_never_panic(
            lines in prop::collection::vec((wide_decimal_strategy(), wide_decimal_strategy()), 1..5),
            rate in rate_strategy()
        ) {
            let lines: Vec<LineAmount> = lines
                .into_iter()
                .map(|(quantity, unit_price)| LineAmount::new(quantity, unit_price))
                .collect();
            match compute_bill(&lines, Decimal::ZERO, rate) {
                Ok(totals) => prop_assert_eq!(totals.total, totals.taxable_amount + totals.tax_amount),
                Err(err) => prop_assert!(matches!(
                    err,
                    BillError::Line(LineError::Overflow(_) | LineError::NonPositiveQuantity(_))
                )),
            }
        }

        /// Exact tender in any method settles with no change
        #[test]
        fn prop_exact_payment_no_change(
            total in amount_strategy(),
            method in method_strategy()
        ) {
            prop_assume!(total > Decimal::ZERO);
            let settlement = settle_payments(total, &[(method, total)]).unwrap();
            prop_assert_eq!(settlement.change_given, Decimal::ZERO);
            prop_assert_eq!(settlement.amount_paid, total);
        }

        /// Any accepted settlement covers the total and its change fits in cash
        #[test]
        fn prop_settlement_change_from_cash(
            total in amount_strategy(),
            payments in prop::collection::vec((method_strategy(), amount_strategy()), 1..4)
        ) {
            if let Ok(settlement) = settle_payments(total, &payments) {
                let cash: Decimal = payments
                    .iter()
                    .filter(|(m, _)| *m == PaymentMethod::Cash)
                    .map(|(_, a)| *a)
                    .sum();
                prop_assert_eq!(settlement.amount_paid - settlement.change_given, total);
                prop_assert!(settlement.change_given <= cash);
            }
        }

        /// Instalments never push the paid amount past the total
        #[test]
        fn prop_invoice_payments_bounded(
            total in amount_strategy(),
            instalments in prop::collection::vec(amount_strategy(), 1..6)
        ) {
            prop_assume!(total > Decimal::ZERO);
            let mut paid = Decimal::ZERO;
            let mut status = InvoiceStatus::Unpaid;
            for amount in instalments {
                if let Ok((new_paid, new_status)) = apply_invoice_payment(status, total, paid, amount) {
                    paid = new_paid;
                    status = new_status;
                }
                prop_assert!(paid <= total);
                prop_assert_eq!(status == InvoiceStatus::Paid, paid == total);
            }
        }
    }
}
