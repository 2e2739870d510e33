//! HTTP inbound adapter serving the dashboard pages and form controls.

pub mod cache_control;
pub mod controls;
pub mod error;
pub mod health;
pub mod pages;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use crate::domain::ApiResult;
