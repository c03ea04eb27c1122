//! Coursepay HTTP API Service.
//!
//! This crate provides the HTTP API for the coursepay wallet core, including:
//!
//! - Account (wallet) management
//! - Wallet balance and the top-up ledger
//! - Payment-link initiation against the hosted gateway
//! - Success/failure payment callbacks with signature verification
//! - Wallet-funded course enrollment
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Identity-provider JWTs** - For end-user requests (HS256, `sub` +
//!    `email` claims)
//! 2. **Service API keys** - For support tooling (manual wallet credits)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;
pub mod signature;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use gateway::{GatewayClient, GatewayError};
pub use routes::create_router;
pub use state::AppState;
