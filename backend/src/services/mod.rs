//! Business logic services for the Fabrication ERP

pub mod accounting;
pub mod auth;
pub mod branch;
pub mod customer;
pub mod employee;
pub mod final_sale;
pub mod invoice;
pub mod material;
pub mod order;
pub mod pos;
pub mod production;
pub mod reporting;
pub mod seed;
pub mod sequence;
pub mod store;
pub mod user;

pub use accounting::AccountingService;
pub use auth::AuthService;
pub use branch::BranchService;
pub use customer::CustomerService;
pub use employee::EmployeeService;
pub use final_sale::FinalSaleService;
pub use invoice::InvoiceService;
pub use material::MaterialService;
pub use order::OrderService;
pub use pos::PosService;
pub use production::ProductionService;
pub use reporting::ReportingService;
pub use store::StoreService;
pub use user::UserService;

use validator::ValidationError;

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// `validator` adapter for Indian mobile numbers
pub(crate) fn indian_phone(phone: &str) -> Result<(), ValidationError> {
    shared::validate_indian_phone(phone).map_err(|msg| field_error("phone", msg))
}

/// `validator` adapter for GSTINs
pub(crate) fn gstin(value: &str) -> Result<(), ValidationError> {
    shared::validate_gstin(value).map_err(|msg| field_error("gstin", msg))
}
