//! HTTP handlers, one module per feature area

mod accounting;
mod auth;
mod branch;
mod customer;
mod employee;
mod final_sale;
mod health;
mod invoice;
mod material;
mod order;
mod pos;
mod production;
mod reporting;
mod store;
mod user;

pub use accounting::*;
pub use auth::*;
pub use branch::*;
pub use customer::*;
pub use employee::*;
pub use final_sale::*;
pub use health::*;
pub use invoice::*;
pub use material::*;
pub use order::*;
pub use pos::*;
pub use production::*;
pub use reporting::*;
pub use store::*;
pub use user::*;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

/// `?branch_id=` scope for list endpoints
#[derive(Debug, Deserialize)]
pub struct BranchQuery {
    pub branch_id: Option<Uuid>,
}

/// `?start_date=&end_date=` period
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
