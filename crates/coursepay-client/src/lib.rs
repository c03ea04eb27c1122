//! CoursePay Client SDK.
//!
//! This crate provides a client library for services and frontends to
//! interact with the coursepay API.
//!
//! # Example
//!
//! ```no_run
//! use coursepay_client::{CoursepayClient, EnrollRequest};
//!
//! # async fn example() -> Result<(), coursepay_client::ClientError> {
//! let client = CoursepayClient::new("http://coursepay.platform.svc:8080", "your-service-api-key");
//!
//! // Enroll a user in a course with their wallet balance
//! let response = client
//!     .enroll("user-jwt", EnrollRequest {
//!         course_slug: "rust-basics".to_string(),
//!         plan: "monthly".to_string(),
//!         price: 600,
//!     })
//!     .await?;
//!
//! println!("New balance: {}", response.balance);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, CoursepayClient};
pub use error::ClientError;
pub use types::*;
