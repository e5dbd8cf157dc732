//! Router: route table, hook bus, and the dispatch lifecycle
//!
//! Every navigation goes through the same steps:
//!
//! 1. normalize and resolve the path against the route table
//! 2. build a fresh [`RouteResult`]
//! 3. make it the current route, keeping the previous one as `from`
//! 4. await each before-route hook in subscription order
//! 5. await the matched action, if any
//! 6. await each route hook in subscription order
//!
//! Steps 1–3 happen before `push`, `replace`, `start` or the popstate listener
//! return. Steps 4–6 run when the returned [`Navigation`] is awaited; the first
//! failure ends the chain and is handed back unchanged. The current route is
//! not rolled back on failure.
//!
//! Navigations are not queued. A second navigation started while an earlier
//! one is still suspended replaces the current route immediately and sees the
//! earlier result as its `from`.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolutionCache};
use crate::error::RouterError;
use crate::history::{MemoryHistory, NavigationHost, ScrollRestoration};
use crate::hooks::{run_hooks, Hook, HookOutput, HookRegistry, RouteEvent};
#[cfg(feature = "middleware")]
use crate::middleware::{into_hooks, MiddlewareHandle, RouteMiddleware};
use crate::navigation::Navigation;
use crate::params::RouteParams;
use crate::route::{Action, RouteRegistry, RouteResult, RouteTrigger};
use crate::{debug_log, trace_log, warn_log};
use crate::matcher::normalize_path;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

// ============================================================================
// RouterOptions / RouterBuilder
// ============================================================================

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterOptions {
    /// Hint passed to the host when the router is created; `None` leaves the
    /// host untouched.
    pub scroll_restoration: Option<ScrollRestoration>,
    /// Resolution cache entries; zero disables the cache. Ignored without the
    /// `cache` feature.
    pub cache_capacity: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            scroll_restoration: Some(ScrollRestoration::Manual),
            #[cfg(feature = "cache")]
            cache_capacity: ResolutionCache::DEFAULT_CAPACITY,
            #[cfg(not(feature = "cache"))]
            cache_capacity: 0,
        }
    }
}

/// Builder for a [`Router`] with an initial route table.
///
/// ```
/// use history_router::{MemoryHistory, Router, ScrollRestoration};
/// use std::rc::Rc;
///
/// let history = Rc::new(MemoryHistory::new("/"));
/// let router = Router::builder(history.clone())
///     .route("/", |_, _, _| async {})
///     .route("/users/:id", |_, _, _| async {})
///     .scroll_restoration(ScrollRestoration::Auto)
///     .build()?;
///
/// assert_eq!(router.patterns(), ["/", "/users/:id"]);
/// assert_eq!(history.scroll_restoration(), ScrollRestoration::Auto);
/// # Ok::<(), history_router::RouterError>(())
/// ```
pub struct RouterBuilder {
    host: Rc<dyn NavigationHost>,
    options: RouterOptions,
    routes: Vec<(String, Action)>,
}

impl RouterBuilder {
    pub fn new(host: Rc<dyn NavigationHost>) -> Self {
        Self {
            host,
            options: RouterOptions::default(),
            routes: Vec::new(),
        }
    }

    /// Queue a route; templates are compiled by [`build`](Self::build).
    pub fn route<F, Fut>(mut self, path: impl Into<String>, action: F) -> Self
    where
        F: Fn(RouteParams, Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        self.routes.push((path.into(), Action::new(action)));
        self
    }

    pub fn scroll_restoration(mut self, mode: ScrollRestoration) -> Self {
        self.options.scroll_restoration = Some(mode);
        self
    }

    /// Leave the host's scroll restoration setting alone.
    pub fn keep_scroll_restoration(mut self) -> Self {
        self.options.scroll_restoration = None;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.options.cache_capacity = capacity;
        self
    }

    pub fn options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Create the router, failing on the first malformed template.
    pub fn build(self) -> Result<Router, RouterError> {
        let router = Router::with_options(self.host, self.options);
        for (path, action) in self.routes {
            router.route_action(&path, action)?;
        }
        Ok(router)
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("options", &self.options)
            .field(
                "routes",
                &self.routes.iter().map(|(path, _)| path).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Router
// ============================================================================

struct RouterInner {
    host: Rc<dyn NavigationHost>,
    routes: RefCell<RouteRegistry>,
    hooks: RefCell<HookRegistry>,
    current: RefCell<Option<Rc<RouteResult>>>,
    started: Cell<bool>,
}

/// Client-side router.
///
/// `Router` is a cheap handle: clones share the same route table, hooks, and
/// current route. It is single-threaded; nothing in it is `Send`.
///
/// ```
/// use history_router::{MemoryHistory, NavigationHost, RouteParams, Router};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let history = Rc::new(MemoryHistory::new("/"));
/// let router = Router::new(history.clone());
/// let seen = Rc::new(RefCell::new(None));
///
/// let sink = seen.clone();
/// router.route("/user/:id", move |params: RouteParams, _to, _from| {
///     *sink.borrow_mut() = params.get("id").map(str::to_string);
///     async {}
/// })?;
///
/// pollster::block_on(router.push("/user/42/")).unwrap();
///
/// assert_eq!(seen.borrow().as_deref(), Some("42"));
/// assert_eq!(history.current_path(), "/user/42");
/// assert_eq!(router.current_route().unwrap().pattern(), Some("/user/:id"));
/// # Ok::<(), history_router::RouterError>(())
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Create a router over `host` with default options.
    pub fn new(host: Rc<dyn NavigationHost>) -> Self {
        Self::with_options(host, RouterOptions::default())
    }

    pub fn with_options(host: Rc<dyn NavigationHost>, options: RouterOptions) -> Self {
        if let Some(mode) = options.scroll_restoration {
            host.set_scroll_restoration(mode);
        }

        #[cfg(feature = "cache")]
        let routes = RouteRegistry::with_cache_capacity(options.cache_capacity);
        #[cfg(not(feature = "cache"))]
        let routes = RouteRegistry::new();

        Self {
            inner: Rc::new(RouterInner {
                host,
                routes: RefCell::new(routes),
                hooks: RefCell::new(HookRegistry::new()),
                current: RefCell::new(None),
                started: Cell::new(false),
            }),
        }
    }

    pub fn builder(host: Rc<dyn NavigationHost>) -> RouterBuilder {
        RouterBuilder::new(host)
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a route. Earlier registrations take precedence.
    pub fn route<F, Fut>(&self, path: &str, action: F) -> Result<(), RouterError>
    where
        F: Fn(RouteParams, Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        self.route_action(path, Action::new(action))
    }

    /// Register a route with an already type-erased action.
    pub fn route_action(&self, path: &str, action: Action) -> Result<(), RouterError> {
        self.inner.routes.borrow_mut().register(path, action)
    }

    /// Subscribe a hook built from `hook`, returning it for later [`off`](Self::off).
    pub fn on<F, Fut>(&self, event: RouteEvent, hook: F) -> Hook
    where
        F: Fn(Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        let hook = Hook::new(hook);
        self.on_hook(event, hook.clone());
        hook
    }

    /// Subscribe an existing hook. The same hook may be subscribed repeatedly.
    pub fn on_hook(&self, event: RouteEvent, hook: Hook) {
        trace_log!("Subscribed {} hook", event);
        self.inner.hooks.borrow_mut().add(event, hook);
    }

    /// Remove the first subscription of `hook` for `event`.
    ///
    /// Returns `false` when it was not subscribed; the hook lists are left
    /// unchanged in that case.
    pub fn off(&self, event: RouteEvent, hook: &Hook) -> bool {
        self.inner.hooks.borrow_mut().remove(event, hook)
    }

    /// Shorthand for `on(RouteEvent::BeforeRoute, hook)`.
    pub fn before_each<F, Fut>(&self, hook: F) -> Hook
    where
        F: Fn(Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        self.on(RouteEvent::BeforeRoute, hook)
    }

    /// Shorthand for `on(RouteEvent::Route, hook)`.
    pub fn after_each<F, Fut>(&self, hook: F) -> Hook
    where
        F: Fn(Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        self.on(RouteEvent::Route, hook)
    }

    /// Run `middleware.init`, then subscribe its two hooks.
    #[cfg(feature = "middleware")]
    pub fn use_middleware<M: RouteMiddleware>(&self, middleware: M) -> MiddlewareHandle {
        middleware.init(self);
        let name = middleware.name().to_string();
        debug_log!("Installing middleware '{}'", name);

        let (before, after) = into_hooks(Rc::new(middleware));
        self.on_hook(RouteEvent::BeforeRoute, before.clone());
        self.on_hook(RouteEvent::Route, after.clone());
        MiddlewareHandle {
            name,
            before,
            after,
        }
    }

    /// Unsubscribe both hooks of an installed middleware.
    #[cfg(feature = "middleware")]
    pub fn remove_middleware(&self, handle: &MiddlewareHandle) -> bool {
        let before = self.off(RouteEvent::BeforeRoute, &handle.before);
        let after = self.off(RouteEvent::Route, &handle.after);
        before || after
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Start handling navigation.
    ///
    /// With `handle_initial`, the host's current path is dispatched with
    /// [`RouteTrigger::Init`]. The first call also subscribes to the host's
    /// back/forward notifications; later calls do not subscribe again.
    pub fn start(&self, handle_initial: bool) -> Navigation {
        let navigation = if handle_initial {
            let path = self.host_path();
            self.dispatch(&path, RouteTrigger::Init)
        } else {
            Navigation::completed()
        };

        if self.inner.started.replace(true) {
            warn_log!("Router already started; back/forward listener not registered again");
        } else {
            let router = Rc::downgrade(&self.inner);
            self.inner
                .host
                .on_pop_navigation(Rc::new(move || Self::on_pop(&router)));
        }

        navigation
    }

    fn on_pop(router: &Weak<RouterInner>) -> Navigation {
        match router.upgrade() {
            Some(inner) => {
                let router = Router { inner };
                let path = router.host_path();
                router.dispatch(&path, RouteTrigger::PopState)
            }
            None => Navigation::completed(),
        }
    }

    /// Normalized path of the host's current entry; empty reads as `/`.
    fn host_path(&self) -> String {
        let path = self.inner.host.current_path();
        if path.is_empty() {
            "/".to_string()
        } else {
            normalize_path(&path).to_string()
        }
    }

    /// Add a history entry for `path` and navigate to it.
    ///
    /// The history entry and the current route change before this returns.
    /// Hooks and the action run only when the returned [`Navigation`] is
    /// awaited; dropping it skips them.
    pub fn push(&self, path: &str) -> Navigation {
        let path = normalize_path(path);
        self.inner.host.push_entry(path);
        self.dispatch(path, RouteTrigger::Push)
    }

    /// Overwrite the current history entry with `path` and navigate to it.
    ///
    /// Like [`push`](Self::push), the returned [`Navigation`] must be awaited
    /// for hooks and the action to run.
    pub fn replace(&self, path: &str) -> Navigation {
        let path = normalize_path(path);
        self.inner.host.replace_entry(path);
        self.dispatch(path, RouteTrigger::Replace)
    }

    /// Resolve `path`, swap the current route, and return the hook chain.
    ///
    /// `path` is already normalized by the entry point; it is resolved,
    /// stored, and reported exactly as given.
    fn dispatch(&self, path: &str, trigger: RouteTrigger) -> Navigation {
        let (to, action) = {
            let mut routes = self.inner.routes.borrow_mut();
            match routes.resolve(path) {
                Some(resolution) => match routes.get(resolution.index) {
                    Some(definition) => (
                        RouteResult::matched(
                            path,
                            definition.pattern().raw(),
                            resolution.params,
                            trigger,
                        ),
                        Some(definition.action().clone()),
                    ),
                    None => (RouteResult::unmatched(path, trigger), None),
                },
                None => (RouteResult::unmatched(path, trigger), None),
            }
        };
        let to = Rc::new(to);
        let from = self.inner.current.replace(Some(Rc::clone(&to)));

        debug_log!(
            "Dispatching '{}' ({}) -> {}",
            to.path(),
            trigger,
            to.pattern().unwrap_or("<unmatched>")
        );

        let before = self.hooks(RouteEvent::BeforeRoute);
        let inner = Rc::clone(&self.inner);

        Navigation::new(async move {
            run_hooks(RouteEvent::BeforeRoute, before, Rc::clone(&to), from.clone()).await?;

            if let Some(action) = action {
                trace_log!("Running action for '{}'", to.path());
                action
                    .call(to.params().clone(), Rc::clone(&to), from.clone())
                    .await?;
            }

            let after = inner.hooks.borrow().hooks(RouteEvent::Route).to_vec();
            run_hooks(RouteEvent::Route, after, to, from).await
        })
    }

    fn hooks(&self, event: RouteEvent) -> Vec<Hook> {
        self.inner.hooks.borrow().hooks(event).to_vec()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Result of the most recent dispatch, `None` before the first one.
    pub fn current_route(&self) -> Option<Rc<RouteResult>> {
        self.inner.current.borrow().clone()
    }

    /// Registered templates in registration order.
    pub fn patterns(&self) -> Vec<String> {
        self.inner
            .routes
            .borrow()
            .definitions()
            .iter()
            .map(|definition| definition.pattern().raw().to_string())
            .collect()
    }

    pub fn route_count(&self) -> usize {
        self.inner.routes.borrow().len()
    }

    pub fn hook_count(&self, event: RouteEvent) -> usize {
        self.inner.hooks.borrow().len(event)
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    pub fn host(&self) -> Rc<dyn NavigationHost> {
        Rc::clone(&self.inner.host)
    }

    /// Resolution cache statistics; `None` when caching is disabled.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.inner.routes.borrow().cache_stats().cloned()
    }
}

impl Default for Router {
    /// A router over a fresh [`MemoryHistory`] starting at `/`.
    fn default() -> Self {
        Self::new(Rc::new(MemoryHistory::default()))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.patterns())
            .field("hooks", &*self.inner.hooks.borrow())
            .field("current", &self.current_route())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;

    fn router() -> (Rc<MemoryHistory>, Router) {
        let history = Rc::new(MemoryHistory::new("/"));
        let router = Router::new(history.clone());
        (history, router)
    }

    fn record(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> Hook {
        let log = Rc::clone(log);
        Hook::new(move |to, _| {
            log.borrow_mut().push(format!("{label}:{}", to.path()));
            async {}
        })
    }

    #[test]
    fn test_default_options_apply_manual_scroll_restoration() {
        let (history, _router) = router();
        assert_eq!(history.scroll_restoration(), ScrollRestoration::Manual);
    }

    #[test]
    fn test_keep_scroll_restoration() {
        let history = Rc::new(MemoryHistory::new("/"));
        let _router = Router::builder(history.clone())
            .keep_scroll_restoration()
            .build()
            .unwrap();
        assert_eq!(history.scroll_restoration(), ScrollRestoration::Auto);
    }

    #[test]
    fn test_builder_fails_on_malformed_route() {
        let error = Router::builder(Rc::new(MemoryHistory::default()))
            .route("/ok", |_, _, _| async {})
            .route("/bad/:", |_, _, _| async {})
            .build()
            .unwrap_err();
        assert!(matches!(error, RouterError::InvalidPattern { .. }));
    }

    #[test]
    fn test_path_is_normalized_once() {
        let (history, router) = router();
        let matched = Rc::new(Cell::new(false));
        let flag = Rc::clone(&matched);
        router
            .route("/x", move |_, _, _| {
                flag.set(true);
                async {}
            })
            .unwrap();

        pollster::block_on(router.push("/x//")).unwrap();

        let current = router.current_route().unwrap();
        assert_eq!(history.current_path(), "/x/");
        assert_eq!(current.path(), "/x/");
        assert!(!current.is_matched());
        assert!(!matched.get());
    }

    #[test]
    fn test_current_route_is_set_before_hooks_run() {
        let (_history, router) = router();
        router.route("/a", |_, _, _| async {}).unwrap();

        let navigation = router.push("/a");
        let current = router.current_route().unwrap();
        assert_eq!(current.path(), "/a");
        assert_eq!(current.trigger(), RouteTrigger::Push);

        pollster::block_on(navigation).unwrap();
    }

    #[test]
    fn test_phases_run_in_order() {
        let (_history, router) = router();
        let log = Rc::new(RefCell::new(Vec::new()));

        let action_log = Rc::clone(&log);
        router
            .route("/p", move |_, to: Rc<RouteResult>, _| {
                action_log.borrow_mut().push(format!("action:{}", to.path()));
                async {}
            })
            .unwrap();
        router.on_hook(RouteEvent::Route, record(&log, "after1"));
        router.on_hook(RouteEvent::BeforeRoute, record(&log, "before1"));
        router.on_hook(RouteEvent::BeforeRoute, record(&log, "before2"));
        router.on_hook(RouteEvent::Route, record(&log, "after2"));

        pollster::block_on(router.push("/p")).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["before1:/p", "before2:/p", "action:/p", "after1:/p", "after2:/p"]
        );
    }

    #[test]
    fn test_failing_before_hook_skips_action_and_rest() {
        let (_history, router) = router();
        let log = Rc::new(RefCell::new(Vec::new()));

        let action_log = Rc::clone(&log);
        router
            .route("/p", move |_, _, _| {
                action_log.borrow_mut().push("action".to_string());
                async {}
            })
            .unwrap();
        router.before_each(|_, _| async { Err::<(), HookError>("denied".into()) });
        router.on_hook(RouteEvent::BeforeRoute, record(&log, "before2"));
        router.on_hook(RouteEvent::Route, record(&log, "after"));

        let error = pollster::block_on(router.push("/p")).unwrap_err();
        assert_eq!(error.to_string(), "denied");
        assert!(log.borrow().is_empty());
        // No rollback.
        assert_eq!(router.current_route().unwrap().path(), "/p");
    }

    #[test]
    fn test_off_during_dispatch_affects_later_phases_only() {
        let (_history, router) = router();
        let log = Rc::new(RefCell::new(Vec::new()));
        let after = record(&log, "after");
        router.on_hook(RouteEvent::Route, after.clone());

        let remover = router.clone();
        let target = after.clone();
        router.before_each(move |_, _| {
            remover.off(RouteEvent::Route, &target);
            async {}
        });

        pollster::block_on(router.push("/x")).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_start_twice_registers_one_listener() {
        let (history, router) = router();
        let first = router.start(false);
        let second = router.start(false);
        assert!(first.is_completed());
        assert!(second.is_completed());
        assert!(router.is_started());
        assert_eq!(history.listener_count(), 1);
    }

    #[test]
    fn test_popstate_after_router_dropped_is_noop() {
        let history = Rc::new(MemoryHistory::new("/"));
        {
            let router = Router::new(history.clone());
            let _ = router.start(false);
        }
        history.push_entry("/a");
        let navigation = history.back().unwrap();
        assert!(navigation.is_completed());
    }

    #[cfg(feature = "middleware")]
    #[test]
    fn test_middleware_init_and_removal() {
        struct Init(Rc<Cell<bool>>);

        impl RouteMiddleware for Init {
            fn init(&self, router: &Router) {
                self.0.set(router.route_count() == 1);
            }
        }

        let (_history, router) = router();
        router.route("*", |_, _, _| async {}).unwrap();
        let initialized = Rc::new(Cell::new(false));
        let handle = router.use_middleware(Init(Rc::clone(&initialized)));

        assert!(initialized.get());
        assert_eq!(handle.name(), "RouteMiddleware");
        assert_eq!(router.hook_count(RouteEvent::BeforeRoute), 1);
        assert_eq!(router.hook_count(RouteEvent::Route), 1);

        assert!(router.remove_middleware(&handle));
        assert!(!router.remove_middleware(&handle));
        assert_eq!(router.hook_count(RouteEvent::Route), 0);
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_cache_stats_track_dispatches() {
        let (_history, router) = router();
        router.route("/a", |_, _, _| async {}).unwrap();
        pollster::block_on(router.push("/a")).unwrap();
        pollster::block_on(router.push("/a")).unwrap();

        let stats = router.cache_stats().unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }
}
