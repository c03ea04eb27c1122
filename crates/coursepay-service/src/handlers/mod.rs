//! HTTP request handlers.

pub mod accounts;
pub mod callbacks;
pub mod enrollments;
pub mod health;
pub mod wallet;
