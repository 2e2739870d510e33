//! Dashboard domain: shared tables, per-user state, pages and errors.
//!
//! Nothing here knows about HTTP. Inbound adapters translate requests into
//! calls on these types and render the results.

pub mod data_state;
pub mod error;
pub mod page;
pub mod session;

pub use self::data_state::{DataState, DataStatus};
pub use self::error::{Error, ErrorCode};
pub use self::page::Page;
pub use self::session::SessionState;

/// Convenient result alias for handlers.
///
/// # Examples
/// ```
/// use dashboard::domain::{ApiResult, Error};
///
/// fn lookup(found: bool) -> ApiResult<u32> {
///     if found { Ok(1) } else { Err(Error::not_found("missing")) }
/// }
/// assert!(lookup(false).is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
