pub mod codes;
pub mod discounts;
pub mod iqcodes;
pub mod ledger;
pub mod reports;
pub mod requests;

pub use codes::Codes;
pub use discounts::Discounts;
pub use iqcodes::IqCodes;
pub use ledger::Ledger;
pub use reports::Reports;
pub use requests::Requests;
