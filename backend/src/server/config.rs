//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use dashboard::inbound::http::state::HttpState;

/// Attributes of the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Only send the cookie over HTTPS.
    pub secure: bool,
    /// Cross-site sending rule.
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// `SameSite=Lax`, `Secure` as configured.
    #[must_use]
    pub const fn lax(secure: bool) -> Self {
        Self {
            secure,
            same_site: SameSite::Lax,
        }
    }
}

/// Everything needed to build the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie: CookiePolicy,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub const fn new(
        key: Key,
        cookie: CookiePolicy,
        bind_addr: SocketAddr,
        http_state: HttpState,
    ) -> Self {
        Self {
            key,
            cookie,
            bind_addr,
            http_state,
        }
    }
}
