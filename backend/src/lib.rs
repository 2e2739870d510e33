//! Farm-to-table marketplace dashboard.
//!
//! Server-rendered pages over the tables from [`farm_data`]: the data state
//! is loaded once at startup, each visitor's filters and selections live in
//! an encrypted cookie session, and every request re-renders its page.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod render;
pub mod settings;

pub use middleware::Trace;
pub use middleware::trace::TraceId;
