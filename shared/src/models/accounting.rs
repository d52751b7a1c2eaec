//! Accounting entry models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }
}

/// Source record an accounting entry was generated from.
///
/// Entries with a reference are owned by that record and are only
/// changed when it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Purchase,
    PosTransaction,
    PosRefund,
    InvoicePayment,
    FinalProductSale,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Purchase => "PURCHASE",
            ReferenceType::PosTransaction => "POS_TRANSACTION",
            ReferenceType::PosRefund => "POS_REFUND",
            ReferenceType::InvoicePayment => "INVOICE_PAYMENT",
            ReferenceType::FinalProductSale => "FINAL_PRODUCT_SALE",
        }
    }

    /// Entry type and category recorded for this source
    pub fn posting(&self) -> (EntryType, &'static str) {
        match self {
            ReferenceType::Purchase => (EntryType::Expense, "RAW_MATERIAL"),
            ReferenceType::PosTransaction => (EntryType::Income, "POS_SALES"),
            ReferenceType::PosRefund => (EntryType::Expense, "POS_REFUNDS"),
            ReferenceType::InvoicePayment => (EntryType::Income, "INVOICE_RECEIPTS"),
            ReferenceType::FinalProductSale => (EntryType::Income, "PRODUCT_SALES"),
        }
    }
}

/// Profit and loss totals for a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_profit: Decimal,
    /// Net profit as a percentage of income; `None` without income
    pub margin_percent: Option<Decimal>,
}

impl ProfitAndLoss {
    pub fn new(total_income: Decimal, total_expense: Decimal) -> Self {
        let net_profit = total_income - total_expense;
        let margin_percent = if total_income > Decimal::ZERO {
            Some(super::round_money(net_profit / total_income * Decimal::from(100)))
        } else {
            None
        };
        Self {
            total_income,
            total_expense,
            net_profit,
            margin_percent,
        }
    }
}
