//! Request correlation for logs and error pages.
//!
//! [`Trace`] gives every request a fresh [`TraceId`], returns it in the
//! `trace-id` response header and logs one line per completed request with
//! its method, path, status and latency. While the request is handled the id
//! sits in a task-local, so error pages can quote it.
//!
//! Task-locals do not follow work onto spawned tasks; wrap such work in
//! [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::Method;
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Identifier shared by every log line and error page of one request.
///
/// # Examples
/// ```
/// use dashboard::TraceId;
///
/// let id: TraceId = "6f1c0c57-4a43-4d47-9d0e-6a1b3f2e9c10".parse().expect("uuid");
/// assert_eq!(id.to_string(), "6f1c0c57-4a43-4d47-9d0e-6a1b3f2e9c10");
/// assert!(TraceId::current().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Runs `fut` with `trace_id` as the current id.
    ///
    /// # Examples
    /// ```
    /// use dashboard::TraceId;
    ///
    /// # actix_web::rt::System::new().block_on(async {
    /// let id: TraceId = "6f1c0c57-4a43-4d47-9d0e-6a1b3f2e9c10".parse().expect("uuid");
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: Self, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Middleware that scopes each request to a new [`TraceId`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dashboard::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let line = RequestLine::capture(&req);
        let fut = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = fut.await.inspect_err(|err| line.failed(trace_id, err))?;
            stamp_header(&mut res, trace_id);
            line.completed(trace_id, res.status().as_u16());
            Ok(res)
        }))
    }
}

/// Request details kept for the completion log line.
struct RequestLine {
    method: Method,
    path: String,
    started: Instant,
}

impl RequestLine {
    fn capture(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().clone(),
            path: req.path().to_owned(),
            started: Instant::now(),
        }
    }

    fn latency_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn completed(&self, trace_id: TraceId, status: u16) {
        info!(
            trace_id = %trace_id,
            method = %self.method,
            path = %self.path,
            status,
            latency_ms = self.latency_ms(),
            "request completed"
        );
    }

    fn failed(&self, trace_id: TraceId, err: &Error) {
        warn!(
            trace_id = %trace_id,
            method = %self.method,
            path = %self.path,
            error = %err,
            latency_ms = self.latency_ms(),
            "request failed before a response was built"
        );
    }
}

fn stamp_header<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(err) => error!(
            error = %err,
            trace_id = %trace_id,
            "trace id is not a valid header value"
        ),
    }
}
