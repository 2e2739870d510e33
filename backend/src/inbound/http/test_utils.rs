//! Test helpers for inbound HTTP components.

use std::sync::{Arc, OnceLock};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use chrono::{DateTime, Local, TimeZone, Utc};
use farm_data::{DataSource, GenerationOptions, LoadOutcome, generate_dataset};
use mockable::Clock;

use super::state::HttpState;
use crate::domain::{DataState, DataStatus};
use crate::render::SvgVisuals;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
#[must_use]
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Clock pinned to one instant.
pub struct FixtureClock {
    /// Instant reported by the clock.
    pub utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock pinned to mid-July 2024.
#[must_use]
pub fn july_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(2024, 7, 15, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
    })
}

/// Tables generated from seed 42, shared across tests.
#[must_use]
pub fn loaded_data() -> Arc<DataState> {
    static DATA: OnceLock<Arc<DataState>> = OnceLock::new();
    Arc::clone(DATA.get_or_init(|| {
        let state = DataState::new();
        let status = state.initialize(|| {
            Ok(LoadOutcome {
                dataset: generate_dataset(&GenerationOptions::new(42))?,
                source: DataSource::Generated,
                seed: 42,
                warnings: Vec::new(),
            })
        });
        assert!(matches!(status, DataStatus::Ready { .. }), "{status:?}");
        Arc::new(state)
    }))
}

/// Handler state over the shared test tables.
#[must_use]
pub fn test_http_state() -> HttpState {
    HttpState::new(loaded_data(), july_clock(), Arc::new(SvgVisuals))
}
