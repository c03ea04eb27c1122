//! Payment gateway integration.

mod client;
mod types;

pub use client::{GatewayClient, GatewayError};
pub use types::{CreateLinkResponse, PaymentLink};
