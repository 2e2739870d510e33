//! Page routes.
//!
//! ```text
//! GET /
//! GET /pages/{slug}?producer={id}&product={id}
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use super::cache_control::private_no_cache_header;
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{ApiResult, DataState, Error, Page, SessionState};
use crate::render::{PageContext, render_page};

/// Optional row selections carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    /// Producer to show in the detail panel.
    pub producer: Option<u32>,
    /// Product to show the price trend for.
    pub product: Option<u32>,
}

/// Records selections that name a known row; returns whether anything changed.
fn record_selection(current: &mut SessionState, data: &DataState, query: &SelectionQuery) -> bool {
    let Some(dataset) = data.dataset() else {
        return false;
    };
    let mut changed = false;
    if let Some(id) = query.producer.filter(|id| dataset.producer(*id).is_some()) {
        changed |= current.selected_producer.replace(id) != Some(id);
    }
    if let Some(id) = query.product.filter(|id| dataset.product(*id).is_some()) {
        changed |= current.selected_product.replace(id) != Some(id);
    }
    changed
}

fn respond(
    state: &HttpState,
    session: &SessionContext,
    page: Page,
    query: &SelectionQuery,
) -> ApiResult<HttpResponse> {
    let mut current = session.state();
    if record_selection(&mut current, &state.data, query) {
        session.store(&current)?;
    }
    let html = render_page(&PageContext {
        page,
        data: &state.data,
        session: &current,
        month: state.current_month(),
        visuals: state.visuals.as_ref(),
    })?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header(private_no_cache_header())
        .body(html))
}

/// Dashboard landing page.
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    respond(&state, &session, Page::Dashboard, &SelectionQuery::default())
}

/// Any page by slug.
#[get("/pages/{slug}")]
pub async fn show_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    slug: web::Path<String>,
    query: web::Query<SelectionQuery>,
) -> ApiResult<HttpResponse> {
    let page = Page::from_slug(&slug).ok_or_else(|| Error::not_found("page not found"))?;
    respond(&state, &session, page, &query)
}

/// Fallback for unrouted paths.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("page not found"))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::CACHE_CONTROL;
    use actix_web::App;
    use actix_web::test as actix_test;
    use rstest::rstest;

    use super::*;
    use crate::inbound::http::cache_control::PRIVATE_NO_CACHE_MUST_REVALIDATE;
    use crate::inbound::http::test_utils::{
        loaded_data, test_http_state, test_session_middleware,
    };

    #[rstest]
    fn known_selections_are_recorded() {
        let data = loaded_data();
        let mut current = SessionState::default();
        let query = SelectionQuery {
            producer: Some(1),
            product: Some(1),
        };
        assert!(record_selection(&mut current, &data, &query));
        assert_eq!(current.selected_producer, Some(1));
        assert_eq!(current.selected_product, Some(1));
        assert!(!record_selection(&mut current, &data, &query));
    }

    #[rstest]
    fn unknown_selections_are_ignored() {
        let data = loaded_data();
        let mut current = SessionState::default();
        let query = SelectionQuery {
            producer: Some(9999),
            product: None,
        };
        assert!(!record_selection(&mut current, &data, &query));
        assert_eq!(current.selected_producer, None);
    }

    #[actix_web::test]
    async fn pages_are_private_html() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(test_http_state()))
                .service(index)
                .service(show_page),
        )
        .await;
        for uri in ["/", "/pages/sustainability"] {
            let res =
                actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                    .await;
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
            let cache = res
                .headers()
                .get(CACHE_CONTROL)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned);
            assert_eq!(cache.as_deref(), Some(PRIVATE_NO_CACHE_MUST_REVALIDATE));
        }
    }

    #[actix_web::test]
    async fn unknown_slug_is_not_found() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(test_http_state()))
                .service(show_page),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/pages/weather").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = actix_test::read_body(res).await;
        let text = String::from_utf8(body.to_vec()).expect("utf-8 body");
        assert!(text.contains("page not found"));
    }
}
