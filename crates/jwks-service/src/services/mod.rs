pub mod issuance_service;
pub mod key_management_service;
pub mod token_service;

pub use issuance_service::{IssuanceService, KeyIssuer};
