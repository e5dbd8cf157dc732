//! Lifecycle hooks fired around every dispatch.
//!
//! Two events exist. [`RouteEvent::BeforeRoute`] hooks run before the matched
//! action, [`RouteEvent::Route`] hooks after it. Within an event, hooks run in
//! subscription order and each one is awaited before the next starts.

use crate::error::{HookError, RouterError};
use crate::route::RouteResult;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::str::FromStr;

/// Boxed future returned by hooks and actions once type-erased.
pub type HookFuture = LocalBoxFuture<'static, Result<(), HookError>>;

/// Values a hook or action future may resolve to.
///
/// Implemented for `()` (infallible handlers) and for `Result<(), E>` where the
/// error converts into [`HookError`].
pub trait HookOutput {
    fn into_result(self) -> Result<(), HookError>;
}

impl HookOutput for () {
    fn into_result(self) -> Result<(), HookError> {
        Ok(())
    }
}

impl<E> HookOutput for Result<(), E>
where
    E: Into<HookError>,
{
    fn into_result(self) -> Result<(), HookError> {
        self.map_err(Into::into)
    }
}

/// Lifecycle event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteEvent {
    /// `"before-route"`: runs before the matched action
    BeforeRoute,
    /// `"route"`: runs after the matched action
    Route,
}

impl RouteEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteEvent::BeforeRoute => "before-route",
            RouteEvent::Route => "route",
        }
    }
}

impl fmt::Display for RouteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteEvent {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before-route" => Ok(RouteEvent::BeforeRoute),
            "route" => Ok(RouteEvent::Route),
            other => Err(RouterError::UnknownEvent(other.to_string())),
        }
    }
}

type HookFn = dyn Fn(Rc<RouteResult>, Option<Rc<RouteResult>>) -> HookFuture;

/// A lifecycle callback receiving `(to, from)`.
///
/// Cloning a `Hook` yields the same identity: [`HookRegistry::remove`] and
/// [`Router::off`](crate::Router::off) compare hooks by pointer.
///
/// ```
/// use history_router::Hook;
///
/// let hook = Hook::new(|to, _from| async move {
///     println!("entering {}", to.path());
/// });
/// assert!(hook.ptr_eq(&hook.clone()));
/// ```
#[derive(Clone)]
pub struct Hook {
    inner: Rc<HookFn>,
}

impl Hook {
    pub fn new<F, Fut>(hook: F) -> Self
    where
        F: Fn(Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        Self {
            inner: Rc::new(
                move |to: Rc<RouteResult>, from: Option<Rc<RouteResult>>| {
                    hook(to, from).map(HookOutput::into_result).boxed_local()
                },
            ),
        }
    }

    pub(crate) fn call(&self, to: Rc<RouteResult>, from: Option<Rc<RouteResult>>) -> HookFuture {
        (self.inner)(to, from)
    }

    /// Whether both handles refer to the same registration target.
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Ordered hook lists, one per event.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    before_route: Vec<Hook>,
    route: Vec<Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, event: RouteEvent) -> &Vec<Hook> {
        match event {
            RouteEvent::BeforeRoute => &self.before_route,
            RouteEvent::Route => &self.route,
        }
    }

    fn list_mut(&mut self, event: RouteEvent) -> &mut Vec<Hook> {
        match event {
            RouteEvent::BeforeRoute => &mut self.before_route,
            RouteEvent::Route => &mut self.route,
        }
    }

    /// Append a hook; the same hook may be added more than once.
    pub fn add(&mut self, event: RouteEvent, hook: Hook) {
        self.list_mut(event).push(hook);
    }

    /// Remove the first registration of `hook` for `event`.
    ///
    /// Returns `false` and leaves the registry untouched when the hook is not
    /// registered.
    pub fn remove(&mut self, event: RouteEvent, hook: &Hook) -> bool {
        let hooks = self.list_mut(event);
        match hooks.iter().position(|registered| registered.ptr_eq(hook)) {
            Some(index) => {
                hooks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Hooks for `event` in invocation order.
    pub fn hooks(&self, event: RouteEvent) -> &[Hook] {
        self.list(event)
    }

    pub fn len(&self, event: RouteEvent) -> usize {
        self.list(event).len()
    }

    pub fn is_empty(&self) -> bool {
        self.before_route.is_empty() && self.route.is_empty()
    }
}

/// Await each hook in order, stopping at the first failure.
pub(crate) async fn run_hooks(
    event: RouteEvent,
    hooks: Vec<Hook>,
    to: Rc<RouteResult>,
    from: Option<Rc<RouteResult>>,
) -> Result<(), HookError> {
    for (index, hook) in hooks.iter().enumerate() {
        crate::trace_log!("{} hook #{} for '{}'", event, index, to.path());
        hook.call(Rc::clone(&to), from.clone()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteTrigger;
    use std::cell::RefCell;

    fn noop() -> Hook {
        Hook::new(|_, _| async {})
    }

    fn result(path: &str) -> Rc<RouteResult> {
        Rc::new(RouteResult::unmatched(path, RouteTrigger::Push))
    }

    #[test]
    fn test_event_names_round_trip() {
        assert_eq!("before-route".parse::<RouteEvent>().unwrap(), RouteEvent::BeforeRoute);
        assert_eq!("route".parse::<RouteEvent>().unwrap(), RouteEvent::Route);
        assert_eq!(RouteEvent::BeforeRoute.to_string(), "before-route");
        assert!(matches!(
            "after-route".parse::<RouteEvent>(),
            Err(RouterError::UnknownEvent(name)) if name == "after-route"
        ));
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = noop();
        let b = noop();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_remove_first_registration_only() {
        let hook = noop();
        let mut registry = HookRegistry::new();
        registry.add(RouteEvent::Route, hook.clone());
        registry.add(RouteEvent::Route, hook.clone());

        assert!(registry.remove(RouteEvent::Route, &hook));
        assert_eq!(registry.len(RouteEvent::Route), 1);
        assert!(registry.remove(RouteEvent::Route, &hook));
        assert_eq!(registry.len(RouteEvent::Route), 0);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let kept = noop();
        let mut registry = HookRegistry::new();
        registry.add(RouteEvent::BeforeRoute, kept.clone());

        assert!(!registry.remove(RouteEvent::BeforeRoute, &noop()));
        // Registered under the other event only.
        assert!(!registry.remove(RouteEvent::Route, &kept));
        assert_eq!(registry.len(RouteEvent::BeforeRoute), 1);
        assert!(registry.hooks(RouteEvent::BeforeRoute)[0].ptr_eq(&kept));
    }

    #[test]
    fn test_run_hooks_in_order_and_abort_on_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = |label: &'static str, fail: bool| {
            let log = Rc::clone(&log);
            Hook::new(move |to, _| {
                let log = Rc::clone(&log);
                async move {
                    log.borrow_mut().push(format!("{label}:{}", to.path()));
                    if fail {
                        Err("hook failed")
                    } else {
                        Ok(())
                    }
                }
            })
        };

        let hooks = vec![push("a", false), push("b", true), push("c", false)];
        let outcome = pollster::block_on(run_hooks(RouteEvent::Route, hooks, result("/x"), None));

        assert_eq!(outcome.unwrap_err().to_string(), "hook failed");
        assert_eq!(*log.borrow(), vec!["a:/x", "b:/x"]);
    }

    #[test]
    fn test_hook_receives_from() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let hook = Hook::new(move |_, from: Option<Rc<RouteResult>>| {
            *sink.borrow_mut() = from.map(|from| from.path().to_string());
            async {}
        });

        pollster::block_on(hook.call(result("/to"), Some(result("/from")))).unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("/from"));
    }
}
