//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`. The clock is injected
//! so tests can pin the month used for in-season checks.

use std::sync::Arc;

use chrono::Month;
use farm_data::month_of;
use mockable::Clock;

use crate::domain::DataState;
use crate::render::Visuals;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Marketplace tables loaded at startup.
    pub data: Arc<DataState>,
    /// Source of the current date.
    pub clock: Arc<dyn Clock>,
    /// Chart renderer chosen at startup.
    pub visuals: Arc<dyn Visuals>,
}

impl HttpState {
    /// Bundle the handler dependencies.
    #[must_use]
    pub const fn new(
        data: Arc<DataState>,
        clock: Arc<dyn Clock>,
        visuals: Arc<dyn Visuals>,
    ) -> Self {
        Self {
            data,
            clock,
            visuals,
        }
    }

    /// Calendar month in the server's local time zone.
    #[must_use]
    pub fn current_month(&self) -> Month {
        month_of(self.clock.local().date_naive())
    }
}
