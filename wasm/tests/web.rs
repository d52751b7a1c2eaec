//! Exported bindings exercised in a wasm32 runtime
//!
//! Run with `wasm-pack test --node wasm`.

#![cfg(target_arch = "wasm32")]

use fabrication_erp_wasm::{
    calculate_bill, calculate_gst, check_gstin, check_stage_transition, next_production_stage,
    parse_document_number, remaining_stock,
};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn gst_splits_for_intra_state_supply() {
    let json = calculate_gst("1000", "18", false).unwrap();
    assert!(json.contains("\"cgst\":\"90"));
    assert!(json.contains("\"sgst\":\"90"));
}

#[wasm_bindgen_test]
fn bill_rejects_oversized_lines() {
    let lines = r#"[{"quantity":"100000000000000000000","unit_price":"100000000000000000000"}]"#;
    assert!(calculate_bill(lines, "0", "18").is_err());
}

#[wasm_bindgen_test]
fn stages_advance_one_at_a_time() {
    assert_eq!(next_production_stage("CUTTING").as_deref(), Some("SHAPING"));
    assert!(check_stage_transition("CUTTING", "SHAPING").is_ok());
    assert!(check_stage_transition("CUTTING", "BENDING").is_err());
}

#[wasm_bindgen_test]
fn gstin_and_stock_checks_surface_errors() {
    assert!(check_gstin("27AAPFU0939F1ZV").is_ok());
    assert!(check_gstin("27AAPFU0939F1ZX").is_err());
    assert!(remaining_stock("1", "2").is_err());
}

#[wasm_bindgen_test]
fn document_numbers_must_be_canonical() {
    assert!(parse_document_number("ORD-20261019-0001").is_ok());
    assert!(parse_document_number("ORD-20261019-00001").is_err());
}
