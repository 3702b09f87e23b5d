//! SeaORM entity definitions for the discount ledger.

pub mod iq_code;
pub mod one_time_code;
pub mod plafond;
pub mod validation_request;
