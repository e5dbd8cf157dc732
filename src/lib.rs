//! # history-router
//!
//! A client-side navigation router: it maps URL paths to handlers and keeps a
//! "current route" in sync with navigation history.
//!
//! - **Path patterns** - literal paths, `:name` parameters, and the `*` catch-all
//! - **First match wins** - routes are tried in registration order
//! - **Lifecycle hooks** - `before-route` and `route` hooks around every action
//! - **Async handlers** - every hook and action is awaited in order
//! - **Pluggable history** - any [`NavigationHost`]; [`MemoryHistory`] included
//! - **Middleware** - hook pairs installed and removed as a unit
//!
//! # Quick Start
//!
//! ```
//! use history_router::{MemoryHistory, RouteEvent, Router};
//! use std::rc::Rc;
//!
//! let history = Rc::new(MemoryHistory::new("/"));
//! let router = Router::new(history.clone());
//!
//! router.route("/", |_params, _to, _from| async {})?;
//! router.route("/user/:id", |params, _to, _from| async move {
//!     println!("user {}", params.get("id").unwrap_or_default());
//! })?;
//! router.route("*", |_params, to, _from| async move {
//!     println!("not found: {}", to.path());
//! })?;
//!
//! router.on(RouteEvent::Route, |to, from| async move {
//!     let from = from.map(|from| from.path().to_string());
//!     println!("{:?} -> {}", from, to.path());
//! });
//!
//! pollster::block_on(router.start(true)).unwrap();
//! pollster::block_on(router.push("/user/42")).unwrap();
//!
//! let current = router.current_route().unwrap();
//! assert_eq!(current.pattern(), Some("/user/:id"));
//! assert_eq!(current.params().get("id"), Some("42"));
//!
//! // Back/forward goes through the host.
//! pollster::block_on(history.back().unwrap()).unwrap();
//! assert_eq!(router.current_route().unwrap().path(), "/");
//! # Ok::<(), history_router::RouterError>(())
//! ```
//!
//! # Execution model
//!
//! The router is single-threaded. `push`, `replace` and `start` update the
//! current route before returning and hand back a [`Navigation`] future that
//! runs the hooks and the action. Navigations are not queued or cancelled.
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache for path resolution
//! - `middleware` (default) - [`RouteMiddleware`] support

#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod history;
pub mod hooks;
pub mod matcher;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod navigation;
pub mod params;
pub mod route;
pub mod router;

// Error handling
pub mod error;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, ResolutionCache};
pub use error::{HookError, PatternError, RouterError};
pub use history::{MemoryHistory, NavigationHost, PopListener, ScrollRestoration};
pub use hooks::{Hook, HookFuture, HookOutput, HookRegistry, RouteEvent};
pub use matcher::{normalize_path, Pattern, WILDCARD};
#[cfg(feature = "middleware")]
pub use middleware::{MiddlewareHandle, RouteMiddleware};
pub use navigation::Navigation;
pub use params::RouteParams;
pub use route::{
    resolve, Action, Resolution, RouteDefinition, RouteRegistry, RouteResult, RouteTrigger,
};
pub use router::{Router, RouterBuilder, RouterOptions};
