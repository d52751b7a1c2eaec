//! WebAssembly module for the Fabrication ERP
//!
//! Provides client-side computation for:
//! - GST splits and POS bill totals
//! - Production wastage and stage progression
//! - Cart stock checks
//! - GSTIN checks and document number parsing

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str(concat!(
        "fabrication-erp-wasm ",
        env!("CARGO_PKG_VERSION")
    )));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("{} is not a valid amount: {}", field, value))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

#[derive(Serialize)]
struct Wastage {
    wastage: i32,
    wastage_percent: Decimal,
}

fn gst_json(taxable: &str, rate: &str, interstate: bool) -> Result<String, String> {
    let taxable = parse_amount("taxable", taxable)?;
    let rate = parse_amount("rate", rate)?;
    validate_gst_rate(rate)?;
    to_json(&compute_gst(taxable, rate, interstate))
}

fn bill_json(lines_json: &str, discount: &str, rate: &str) -> Result<String, String> {
    let lines: Vec<LineAmount> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid lines JSON: {}", e))?;
    let discount = parse_amount("discount", discount)?;
    let rate = parse_amount("rate", rate)?;
    let totals = compute_bill(&lines, discount, rate).map_err(|e| e.to_string())?;
    to_json(&totals)
}

fn wastage_json(input: i32, output: i32, rejected: i32) -> Result<String, String> {
    let quantities = EntryQuantities::new(input, output, rejected);
    quantities.validate().map_err(|e| e.to_string())?;
    to_json(&Wastage {
        wastage: quantities.wastage(),
        wastage_percent: quantities.wastage_percent(),
    })
}

fn transition_check(from: &str, to: &str) -> Result<(), String> {
    let from = ProductionStage::from_str(from).map_err(|e| e.to_string())?;
    let to = ProductionStage::from_str(to).map_err(|e| e.to_string())?;
    from.validate_transition(to).map_err(|e| e.to_string())
}

fn stock_check(available: &str, quantity: &str) -> Result<String, String> {
    let available = parse_amount("available", available)?;
    let quantity = parse_amount("quantity", quantity)?;
    let remaining = checked_decrement(available, quantity).map_err(|e| e.to_string())?;
    Ok(remaining.to_string())
}

fn document_json(number: &str) -> Result<String, String> {
    let parsed = DocumentNumber::from_str(number).map_err(|e| e.to_string())?;
    to_json(&parsed)
}

/// GST breakdown for a taxable amount, as JSON
#[wasm_bindgen]
pub fn calculate_gst(taxable: &str, rate_percent: &str, interstate: bool) -> Result<String, JsValue> {
    gst_json(taxable, rate_percent, interstate).map_err(js_error)
}

/// Bill totals for `[{"quantity": "2", "unit_price": "950"}]`, as JSON
#[wasm_bindgen]
pub fn calculate_bill(lines_json: &str, discount: &str, rate_percent: &str) -> Result<String, JsValue> {
    bill_json(lines_json, discount, rate_percent).map_err(js_error)
}

/// Wastage pieces and percentage for a production entry, as JSON
#[wasm_bindgen]
pub fn calculate_wastage(input: i32, output: i32, rejected: i32) -> Result<String, JsValue> {
    wastage_json(input, output, rejected).map_err(js_error)
}

/// Stage that follows `stage`, if any
#[wasm_bindgen]
pub fn next_production_stage(stage: &str) -> Option<String> {
    ProductionStage::from_str(stage)
        .ok()
        .and_then(ProductionStage::next)
        .map(|next| next.as_str().to_string())
}

/// Reject anything but a single forward step
#[wasm_bindgen]
pub fn check_stage_transition(from: &str, to: &str) -> Result<(), JsValue> {
    transition_check(from, to).map_err(js_error)
}

#[wasm_bindgen]
pub fn check_gstin(gstin: &str) -> Result<(), JsValue> {
    validate_gstin(gstin).map_err(|msg| js_error(msg.to_string()))
}

/// Whether a supply between two GSTINs crosses state lines (IGST)
#[wasm_bindgen]
pub fn is_interstate(seller_gstin: &str, buyer_gstin: &str) -> bool {
    is_interstate_supply(seller_gstin, buyer_gstin)
}

/// Stock left after taking `quantity` out, or an error when short
#[wasm_bindgen]
pub fn remaining_stock(available: &str, quantity: &str) -> Result<String, JsValue> {
    stock_check(available, quantity).map_err(js_error)
}

/// Split `ORD-20260115-0001` style numbers into kind, date and sequence
#[wasm_bindgen]
pub fn parse_document_number(number: &str) -> Result<String, JsValue> {
    document_json(number).map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(json: &str, field: &str) -> Decimal {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        Decimal::from_str(value[field].as_str().unwrap()).unwrap()
    }

    #[test]
    fn test_gst_json_intra_state() {
        let json = gst_json("1000", "18", false).unwrap();
        assert_eq!(amount(&json, "cgst"), Decimal::from(90));
        assert_eq!(amount(&json, "sgst"), Decimal::from(90));
        assert_eq!(amount(&json, "igst"), Decimal::ZERO);
        assert_eq!(amount(&json, "grand_total"), Decimal::from(1180));
    }

    #[test]
    fn test_gst_json_rejects_bad_input() {
        assert!(gst_json("abc", "18", false).is_err());
        assert!(gst_json("100", "40", false).is_err());
    }

    #[test]
    fn test_bill_json() {
        let json = bill_json(r#"[{"quantity":"2","unit_price":"500"}]"#, "100", "18").unwrap();
        assert_eq!(amount(&json, "subtotal"), Decimal::from(1000));
        assert_eq!(amount(&json, "taxable_amount"), Decimal::from(900));
        assert_eq!(amount(&json, "total"), Decimal::from(1062));
    }

    #[test]
    fn test_bill_json_oversized_line() {
        let lines = r#"[{"quantity":"100000000000000000000","unit_price":"100000000000000000000"}]"#;
        let err = bill_json(lines, "0", "18").unwrap_err();
        assert_eq!(err, "Item 1: amount is too large");
    }

    #[test]
    fn test_wastage_json() {
        let json = wastage_json(100, 90, 4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["wastage"], 6);
        assert_eq!(amount(&json, "wastage_percent"), Decimal::from(10));
        assert!(wastage_json(10, 8, 5).is_err());
    }

    #[test]
    fn test_stage_helpers() {
        assert_eq!(next_production_stage("CUTTING").as_deref(), Some("SHAPING"));
        assert_eq!(next_production_stage("COMPLETED"), None);
        assert!(transition_check("CUTTING", "SHAPING").is_ok());
        assert!(transition_check("CUTTING", "BENDING").is_err());
        assert!(transition_check("PAINTING", "CUTTING").is_err());
    }

    #[test]
    fn test_stock_check() {
        assert_eq!(stock_check("10", "2.5").unwrap(), "7.5");
        assert!(stock_check("1", "2").is_err());
        assert!(stock_check("1", "0").is_err());
    }

    #[test]
    fn test_document_json() {
        let json = document_json("INV-20260115-0042").unwrap();
        assert!(json.contains("\"sequence\":42"));
        assert!(document_json("INV-2026-42").is_err());
    }
}
