//! Domain models for the Fabrication ERP

mod accounting;
mod attendance;
mod document;
mod inventory;
mod invoice;
mod order;
mod pos;
mod production;
mod tax;
mod user;

pub use accounting::*;
pub use attendance::*;
pub use document::*;
pub use inventory::*;
pub use invoice::*;
pub use order::*;
pub use pos::*;
pub use production::*;
pub use tax::*;
pub use user::*;
