//! Client for the external claims REST API.

mod client;
mod types;

pub use client::ClaimsClient;
pub use types::{Claim, ClaimsError, FormTypes, Health, OcrResult};
