//! # Cancellation scopes handed to applications.
//!
//! ```text
//! root token (caller)
//!   └─► AppContext          child_token(); shared by every application during Start/Run
//!
//! TerminateContext          own token + fixed deadline; created once the app scope is canceled
//! ```
//!
//! - [`AppContext`] carries the cancel capability (`terminate()`); any application
//!   may call it, any number of times, from any task.
//! - [`TerminateContext`] is deadline-bound and read-only for applications; it
//!   expires `terminate_timeout` after the application scope was canceled.

mod app;
mod terminate;

pub use app::AppContext;
pub use terminate::TerminateContext;
