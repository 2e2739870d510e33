//! Form posts that change session state.
//!
//! Every handler redirects with `303 See Other` so a refresh does not
//! resubmit the form.

use actix_web::http::header;
use actix_web::{HttpResponse, post, web};
use farm_data::{FilterSettings, MaxDistance};
use serde::Deserialize;
use tracing::info;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::session::Notification;
use crate::domain::{ApiResult, Error, Page};

/// Sidebar filter form.
#[derive(Debug, Deserialize)]
pub struct FilterForm {
    /// Present when the checkbox is ticked.
    #[serde(default)]
    pub sustainable_only: Option<String>,
    /// Present when the checkbox is ticked.
    #[serde(default)]
    pub in_season_only: Option<String>,
    /// Slider value in miles.
    pub max_distance: String,
    /// Page to show afterwards.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Form carrying only a return path.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnForm {
    /// Page to show afterwards.
    #[serde(default)]
    pub return_to: Option<String>,
}

fn checkbox(field: &str, value: Option<&str>) -> Result<bool, Error> {
    match value {
        None | Some("false" | "off") => Ok(false),
        Some("true" | "on") => Ok(true),
        Some(other) => Err(Error::invalid_request(format!(
            "{field} must be a checkbox value, got '{other}'"
        ))),
    }
}

impl FilterForm {
    /// Validates the form into filter settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::InvalidRequest`] for unparseable
    /// values and for distances outside the slider's range or step.
    pub fn settings(&self) -> Result<FilterSettings, Error> {
        let miles: u32 = self.max_distance.trim().parse().map_err(|_| {
            Error::invalid_request(format!(
                "max_distance must be a whole number of miles, got '{}'",
                self.max_distance
            ))
        })?;
        let max_distance =
            MaxDistance::new(miles).map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(FilterSettings {
            sustainable_only: checkbox("sustainable_only", self.sustainable_only.as_deref())?,
            in_season_only: checkbox("in_season_only", self.in_season_only.as_deref())?,
            max_distance,
        })
    }
}

/// Local page path to redirect to; anything else falls back to `fallback`.
fn redirect_target<'a>(return_to: Option<&'a str>, fallback: &'a str) -> &'a str {
    return_to
        .filter(|path| Page::from_path(path).is_some())
        .unwrap_or(fallback)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Validates and stores the sidebar filters.
#[post("/filters")]
pub async fn apply_filters(
    session: SessionContext,
    form: web::Form<FilterForm>,
) -> ApiResult<HttpResponse> {
    let settings = form.settings()?;
    let mut current = session.state();
    current.apply_filters(settings);
    session.store(&current)?;
    info!(
        sustainable_only = settings.sustainable_only,
        in_season_only = settings.in_season_only,
        max_distance = settings.max_distance.miles(),
        "filters applied"
    );
    Ok(see_other(redirect_target(form.return_to.as_deref(), "/")))
}

/// Adds or removes a product from the caller's favourites.
#[post("/favorites/{product_id}")]
pub async fn toggle_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    product_id: web::Path<u32>,
    form: web::Form<ReturnForm>,
) -> ApiResult<HttpResponse> {
    let id = product_id.into_inner();
    let product = state
        .data
        .dataset()
        .and_then(|dataset| dataset.product(id))
        .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;
    let mut current = session.state();
    let added = current.toggle_favorite(id);
    current.notify(if added {
        Notification::success(format!("Added {} to favourites", product.name))
    } else {
        Notification::info(format!("Removed {} from favourites", product.name))
    });
    session.store(&current)?;
    info!(product_id = id, added, "favourite toggled");
    let products = Page::Products.path();
    Ok(see_other(redirect_target(form.return_to.as_deref(), &products)))
}

/// Restores the default session state.
#[post("/session/reset")]
pub async fn reset_session(session: SessionContext) -> ApiResult<HttpResponse> {
    let mut current = session.state();
    current.reset();
    session.store(&current)?;
    info!("session reset");
    Ok(see_other("/"))
}
