//! Route middleware
//!
//! Middleware bundles a before-route and a route hook behind one value, plus an
//! `init` callback run once at installation. It adds no lifecycle points of
//! its own: installing middleware registers ordinary hooks, so it runs in
//! subscription order alongside hooks added with [`Router::on`](crate::Router::on).
//!
//! # Example
//!
//! ```
//! use history_router::{HookFuture, RouteMiddleware, RouteResult, Router};
//! use std::rc::Rc;
//!
//! struct PageViews;
//!
//! impl RouteMiddleware for PageViews {
//!     fn after_route(&self, to: Rc<RouteResult>, _from: Option<Rc<RouteResult>>) -> HookFuture {
//!         Box::pin(async move {
//!             println!("page view: {}", to.path());
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let router = Router::default();
//! let handle = router.use_middleware(PageViews);
//! router.remove_middleware(&handle);
//! ```

use crate::hooks::{Hook, HookFuture};
use crate::route::RouteResult;
use crate::router::Router;
use std::rc::Rc;

/// A pair of lifecycle hooks installed as a unit.
pub trait RouteMiddleware: 'static {
    /// Called once by [`Router::use_middleware`] before the hooks are
    /// registered.
    fn init(&self, _router: &Router) {}

    /// Runs in the before-route phase
    fn before_route(&self, _to: Rc<RouteResult>, _from: Option<Rc<RouteResult>>) -> HookFuture {
        Box::pin(async { Ok(()) })
    }

    /// Runs in the route phase, after the matched action
    fn after_route(&self, _to: Rc<RouteResult>, _from: Option<Rc<RouteResult>>) -> HookFuture {
        Box::pin(async { Ok(()) })
    }

    /// Middleware name for debugging
    fn name(&self) -> &str {
        "RouteMiddleware"
    }
}

/// Hooks registered for one installed middleware.
#[derive(Debug, Clone)]
pub struct MiddlewareHandle {
    pub(crate) name: String,
    pub(crate) before: Hook,
    pub(crate) after: Hook,
}

impl MiddlewareHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn before_hook(&self) -> &Hook {
        &self.before
    }

    pub fn after_hook(&self) -> &Hook {
        &self.after
    }
}

/// Wrap a middleware's two phases as hooks.
pub(crate) fn into_hooks<M: RouteMiddleware>(middleware: Rc<M>) -> (Hook, Hook) {
    let before = {
        let middleware = Rc::clone(&middleware);
        Hook::new(move |to, from| middleware.before_route(to, from))
    };
    let after = Hook::new(move |to, from| middleware.after_route(to, from));
    (before, after)
}
