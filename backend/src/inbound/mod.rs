//! Inbound adapters that translate HTTP requests into session updates and
//! rendered pages while keeping framework details at the edge.

pub mod http;
