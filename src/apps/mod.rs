//! # Application abstractions.
//!
//! This module provides the component contract driven by the runtime:
//! - [`Application`] - trait with the four lifecycle phases
//! - [`AppRef`] - shared reference to an application (`Arc<dyn Application>`)
//! - [`AppFn`] - closure-backed application for callers that do not want a named type

mod app;
mod app_fn;

pub use app::{AppRef, Application};
pub use app_fn::AppFn;
