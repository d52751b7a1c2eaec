//! GST arithmetic

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default flat GST rate applied to sales, in percent
pub const DEFAULT_GST_RATE_PERCENT: u32 = 18;

/// Round a money amount to paise
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax split for one taxable amount.
///
/// Intra-state supplies carry CGST and SGST at half the rate each;
/// inter-state supplies carry IGST at the full rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstBreakdown {
    pub rate_percent: Decimal,
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

pub fn compute_gst(taxable_amount: Decimal, rate_percent: Decimal, interstate: bool) -> GstBreakdown {
    let taxable_amount = round_money(taxable_amount);
    let total_tax = round_money(taxable_amount * rate_percent / Decimal::from(100));

    let (cgst, sgst, igst) = if interstate {
        (Decimal::ZERO, Decimal::ZERO, total_tax)
    } else {
        // SGST takes the remainder so the halves always add up
        let cgst = round_money(total_tax / Decimal::from(2));
        (cgst, total_tax - cgst, Decimal::ZERO)
    };

    GstBreakdown {
        rate_percent,
        taxable_amount,
        cgst,
        sgst,
        igst,
        total_tax,
        grand_total: taxable_amount + total_tax,
    }
}

/// Validate a configured GST rate
pub fn validate_gst_rate(rate_percent: Decimal) -> Result<(), &'static str> {
    if rate_percent < Decimal::ZERO || rate_percent > Decimal::from(28) {
        return Err("GST rate must be between 0 and 28 percent");
    }
    Ok(())
}
