//! Server construction and middleware wiring.

mod config;

pub use config::{CookiePolicy, ServerConfig};

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::cookie::time::Duration;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use dashboard::Trace;
use dashboard::domain::Error;
use dashboard::inbound::http::controls::{apply_filters, reset_session, toggle_favorite};
use dashboard::inbound::http::health::{HealthState, live, ready};
use dashboard::inbound::http::pages::{index, not_found, show_page};
use dashboard::inbound::http::state::HttpState;

const SESSION_COOKIE: &str = "session";
const SESSION_TTL_HOURS: i64 = 2;

/// Encrypted cookie session holding the dashboard state.
fn session_middleware(key: Key, cookie: CookiePolicy) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie.secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(cookie.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionMiddleware<CookieSessionStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Extractor failures render as HTML error pages like handler errors do.
    let query_errors = web::QueryConfig::default()
        .error_handler(|err, _| Error::invalid_request(format!("invalid query: {err}")).into());
    let form_errors = web::FormConfig::default()
        .error_handler(|err, _| Error::invalid_request(format!("invalid form: {err}")).into());
    let path_errors =
        web::PathConfig::default().error_handler(|_, _| Error::not_found("page not found").into());

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(query_errors)
        .app_data(form_errors)
        .app_data(path_errors)
        .wrap(session)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(index)
        .service(show_page)
        .service(apply_filters)
        .service(toggle_favorite)
        .service(reset_session)
        .default_service(web::to(not_found))
}

/// Binds the dashboard server and marks it ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie,
        bind_addr,
        http_state: state,
    } = config;
    let http_state = web::Data::new(state);
    let probes = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(
            probes.clone(),
            http_state.clone(),
            session_middleware(key.clone(), cookie),
        )
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
