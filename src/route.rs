//! Route definitions, resolution, and navigation results

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolutionCache};
use crate::error::RouterError;
use crate::hooks::{HookFuture, HookOutput};
use crate::matcher::Pattern;
use crate::params::RouteParams;
use crate::{debug_log, trace_log};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

// ============================================================================
// RouteTrigger / RouteResult
// ============================================================================

/// What started a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteTrigger {
    /// Initial dispatch from [`Router::start`](crate::Router::start)
    Init,
    /// [`Router::push`](crate::Router::push)
    Push,
    /// [`Router::replace`](crate::Router::replace)
    Replace,
    /// Back/forward navigation reported by the host
    PopState,
}

impl RouteTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteTrigger::Init => "init",
            RouteTrigger::Push => "push",
            RouteTrigger::Replace => "replace",
            RouteTrigger::PopState => "popstate",
        }
    }
}

impl fmt::Display for RouteTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one path.
///
/// A result is matched exactly when it carries the matched template, and an
/// unmatched result always has empty params; the two constructors are the only
/// way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResult {
    path: String,
    pattern: Option<String>,
    params: RouteParams,
    trigger: RouteTrigger,
}

impl RouteResult {
    /// A path that matched the definition registered as `pattern`.
    pub fn matched(
        path: impl Into<String>,
        pattern: impl Into<String>,
        params: RouteParams,
        trigger: RouteTrigger,
    ) -> Self {
        Self {
            path: path.into(),
            pattern: Some(pattern.into()),
            params,
            trigger,
        }
    }

    /// A path no definition matched.
    pub fn unmatched(path: impl Into<String>, trigger: RouteTrigger) -> Self {
        Self {
            path: path.into(),
            pattern: None,
            params: RouteParams::new(),
            trigger,
        }
    }

    /// The normalized path that was resolved.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Template of the matched definition.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn is_matched(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn trigger(&self) -> RouteTrigger {
        self.trigger
    }
}

// ============================================================================
// Action / RouteDefinition
// ============================================================================

type ActionFn = dyn Fn(RouteParams, Rc<RouteResult>, Option<Rc<RouteResult>>) -> HookFuture;

/// Handler invoked with `(params, to, from)` when its route matches.
#[derive(Clone)]
pub struct Action {
    inner: Rc<ActionFn>,
}

impl Action {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn(RouteParams, Rc<RouteResult>, Option<Rc<RouteResult>>) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: HookOutput,
    {
        Self {
            inner: Rc::new(
                move |params: RouteParams,
                      to: Rc<RouteResult>,
                      from: Option<Rc<RouteResult>>| {
                    action(params, to, from)
                        .map(HookOutput::into_result)
                        .boxed_local()
                },
            ),
        }
    }

    pub(crate) fn call(
        &self,
        params: RouteParams,
        to: Rc<RouteResult>,
        from: Option<Rc<RouteResult>>,
    ) -> HookFuture {
        (self.inner)(params, to, from)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// A registered `(pattern, action)` pair. Never mutated after registration.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pattern: Pattern,
    action: Action,
}

impl RouteDefinition {
    pub fn new(pattern: Pattern, action: Action) -> Self {
        Self { pattern, action }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// The first definition that matched a path, by registration index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub index: usize,
    pub params: RouteParams,
}

/// Find the first definition matching `path`.
///
/// Registration order is the only precedence rule; there is no specificity
/// scoring. The path is matched as given.
///
/// ```
/// use history_router::{resolve, Action, Pattern, RouteDefinition};
///
/// let definitions = vec![
///     RouteDefinition::new(Pattern::compile("/a")?, Action::new(|_, _, _| async {})),
///     RouteDefinition::new(Pattern::compile("*")?, Action::new(|_, _, _| async {})),
/// ];
///
/// assert_eq!(resolve(&definitions, "/a").unwrap().index, 0);
/// assert_eq!(resolve(&definitions, "/z").unwrap().index, 1);
/// # Ok::<(), history_router::PatternError>(())
/// ```
pub fn resolve(definitions: &[RouteDefinition], path: &str) -> Option<Resolution> {
    definitions
        .iter()
        .enumerate()
        .find_map(|(index, definition)| {
            definition
                .pattern
                .test(path)
                .map(|params| Resolution { index, params })
        })
}

// ============================================================================
// RouteRegistry
// ============================================================================

/// Ordered route table with optional resolution caching.
#[derive(Debug)]
pub struct RouteRegistry {
    definitions: Vec<RouteDefinition>,
    #[cfg(feature = "cache")]
    cache: Option<ResolutionCache>,
}

impl RouteRegistry {
    /// Create an empty registry, cached with the default capacity when the
    /// `cache` feature is enabled.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            #[cfg(feature = "cache")]
            cache: Some(ResolutionCache::new()),
        }
    }

    /// Create an empty registry with a cache of `capacity` entries.
    /// A capacity of zero disables caching.
    #[cfg(feature = "cache")]
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            definitions: Vec::new(),
            cache: (capacity > 0).then(|| ResolutionCache::with_capacity(capacity)),
        }
    }

    /// Compile `template` and append it to the table.
    pub fn register(&mut self, template: &str, action: Action) -> Result<(), RouterError> {
        let pattern = Pattern::compile(template).map_err(|source| RouterError::InvalidPattern {
            template: template.to_string(),
            source,
        })?;

        debug_log!(
            "Registered route #{} '{}'",
            self.definitions.len(),
            pattern.raw()
        );
        self.definitions.push(RouteDefinition::new(pattern, action));

        #[cfg(feature = "cache")]
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
        Ok(())
    }

    /// Find the first definition matching `path`.
    ///
    /// `path` is matched as given; the router normalizes it once on entry.
    pub fn resolve(&mut self, path: &str) -> Option<Resolution> {
        let resolution = self.lookup(path);
        trace_log!("Resolved '{}' -> {:?}", path, resolution.as_ref().map(|r| r.index));
        resolution
    }

    #[cfg(feature = "cache")]
    fn lookup(&mut self, path: &str) -> Option<Resolution> {
        let Some(cache) = self.cache.as_mut() else {
            return resolve(&self.definitions, path);
        };
        if let Some(cached) = cache.get(path) {
            return cached;
        }
        let resolution = resolve(&self.definitions, path);
        cache.insert(path.to_string(), resolution.clone());
        resolution
    }

    #[cfg(not(feature = "cache"))]
    fn lookup(&mut self, path: &str) -> Option<Resolution> {
        resolve(&self.definitions, path)
    }

    pub fn definitions(&self) -> &[RouteDefinition] {
        &self.definitions
    }

    pub fn get(&self, index: usize) -> Option<&RouteDefinition> {
        self.definitions.get(index)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(ResolutionCache::stats)
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
