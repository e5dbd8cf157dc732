//! Navigation hosts
//!
//! The router never touches a concrete history API. It talks to a
//! [`NavigationHost`], which owns the history stack, reports the current path,
//! and tells the router about back/forward navigation.
//!
//! [`MemoryHistory`] is an in-memory host with:
//! - Forward/backward navigation
//! - History truncation on new navigation
//! - Configurable history limits

use crate::error::RouterError;
use crate::navigation::Navigation;
use crate::{debug_log, trace_log};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Callback the host invokes on back/forward navigation.
///
/// The returned [`Navigation`] carries the router's hook chain; the host drives
/// it and receives any hook failure.
pub type PopListener = Rc<dyn Fn() -> Navigation>;

/// Scroll restoration hint passed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollRestoration {
    /// Let the host restore scroll positions
    Auto,
    /// The application manages scroll positions
    #[default]
    Manual,
}

impl ScrollRestoration {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollRestoration::Auto => "auto",
            ScrollRestoration::Manual => "manual",
        }
    }
}

impl fmt::Display for ScrollRestoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrollRestoration {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ScrollRestoration::Auto),
            "manual" => Ok(ScrollRestoration::Manual),
            other => Err(RouterError::UnknownScrollRestoration(other.to_string())),
        }
    }
}

/// Capabilities the router needs from the navigation substrate.
pub trait NavigationHost {
    /// Path of the current history entry.
    fn current_path(&self) -> String;

    /// Add a history entry for `path` without reloading.
    fn push_entry(&self, path: &str);

    /// Overwrite the current history entry with `path`.
    fn replace_entry(&self, path: &str);

    /// Register a listener for back/forward navigation.
    fn on_pop_navigation(&self, listener: PopListener);

    /// Hint how scroll positions should be restored. Hosts without a notion
    /// of scrolling ignore it.
    fn set_scroll_restoration(&self, _mode: ScrollRestoration) {}
}

// ============================================================================
// MemoryHistory
// ============================================================================

#[derive(Debug, Clone)]
struct Stack {
    entries: Vec<String>,
    current: usize,
    /// Maximum entries (0 = unlimited)
    max_size: usize,
}

impl Stack {
    fn current_path(&self) -> &str {
        &self.entries[self.current]
    }

    fn push(&mut self, path: &str) {
        // Remove forward history when pushing
        self.entries.truncate(self.current + 1);
        self.entries.push(path.to_string());
        self.current += 1;

        if self.max_size > 0 && self.entries.len() > self.max_size {
            // Drop the oldest entries; the current one is always the newest.
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }

    fn go(&mut self, delta: isize) -> bool {
        let target = (self.current as isize)
            .checked_add(delta)
            .and_then(|target| usize::try_from(target).ok());
        match target {
            Some(target) if delta != 0 && target < self.entries.len() => {
                self.current = target;
                true
            }
            _ => false,
        }
    }
}

/// In-memory navigation host.
///
/// Useful for headless embedding and tests. `back`, `forward` and `go` move the
/// cursor and notify every listener, returning their combined
/// [`Navigation`].
///
/// ```
/// use history_router::{MemoryHistory, NavigationHost};
///
/// let history = MemoryHistory::new("/");
/// history.push_entry("/users");
/// history.push_entry("/users/1");
///
/// let navigation = history.back().expect("there is an earlier entry");
/// pollster::block_on(navigation).unwrap();
/// assert_eq!(history.current_path(), "/users");
/// ```
pub struct MemoryHistory {
    stack: RefCell<Stack>,
    listeners: RefCell<Vec<PopListener>>,
    scroll_restoration: Cell<ScrollRestoration>,
}

impl MemoryHistory {
    /// Default history limit
    pub const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a history holding a single entry.
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self::with_max_size(initial_path, Self::DEFAULT_MAX_SIZE)
    }

    /// Create with custom max size (0 = unlimited)
    pub fn with_max_size(initial_path: impl Into<String>, max_size: usize) -> Self {
        Self {
            stack: RefCell::new(Stack {
                entries: vec![initial_path.into()],
                current: 0,
                max_size,
            }),
            listeners: RefCell::new(Vec::new()),
            scroll_restoration: Cell::new(ScrollRestoration::Auto),
        }
    }

    /// Go back one entry. `None` when already at the oldest entry.
    pub fn back(&self) -> Option<Navigation> {
        self.go(-1)
    }

    /// Go forward one entry. `None` when already at the newest entry.
    pub fn forward(&self) -> Option<Navigation> {
        self.go(1)
    }

    /// Move the cursor by `delta` entries and notify listeners.
    ///
    /// Returns `None` without notifying anyone when `delta` is zero or lands
    /// outside the stack.
    pub fn go(&self, delta: isize) -> Option<Navigation> {
        if !self.stack.borrow_mut().go(delta) {
            return None;
        }
        debug_log!("History moved by {} to '{}'", delta, self.current_path());

        // Listeners read the current path back from this host.
        let listeners: Vec<PopListener> = self.listeners.borrow().clone();
        Some(Navigation::sequence(
            listeners.iter().map(|listener| listener()),
        ))
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.borrow().current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let stack = self.stack.borrow();
        stack.current + 1 < stack.entries.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.stack.borrow().entries.len()
    }

    /// Always false: the stack keeps at least one entry.
    pub fn is_empty(&self) -> bool {
        self.stack.borrow().entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.stack.borrow().current
    }

    /// Snapshot of every entry, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.stack.borrow().entries.clone()
    }

    pub fn scroll_restoration(&self) -> ScrollRestoration {
        self.scroll_restoration.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl NavigationHost for MemoryHistory {
    fn current_path(&self) -> String {
        self.stack.borrow().current_path().to_string()
    }

    fn push_entry(&self, path: &str) {
        trace_log!("History push '{}'", path);
        self.stack.borrow_mut().push(path);
    }

    fn replace_entry(&self, path: &str) {
        trace_log!("History replace '{}'", path);
        let mut stack = self.stack.borrow_mut();
        let current = stack.current;
        stack.entries[current] = path.to_string();
    }

    fn on_pop_navigation(&self, listener: PopListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn set_scroll_restoration(&self, mode: ScrollRestoration) {
        self.scroll_restoration.set(mode);
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("stack", &self.stack.borrow())
            .field("listeners", &self.listener_count())
            .field("scroll_restoration", &self.scroll_restoration.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_creation() {
        let history = MemoryHistory::default();
        assert_eq!(history.current_path(), "/");
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_push() {
        let history = MemoryHistory::new("/");

        history.push_entry("/users");
        assert_eq!(history.current_path(), "/users");
        assert_eq!(history.len(), 2);
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_back_forward() {
        let history = MemoryHistory::new("/");
        history.push_entry("/page1");
        history.push_entry("/page2");

        assert!(history.back().is_some());
        assert_eq!(history.current_path(), "/page1");
        assert!(history.can_go_forward());

        assert!(history.forward().is_some());
        assert_eq!(history.current_path(), "/page2");
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_history_truncation_on_push() {
        let history = MemoryHistory::new("/");
        history.push_entry("/page1");
        history.push_entry("/page2");
        let _ = history.back();

        history.push_entry("/page3");
        assert_eq!(history.entries(), vec!["/", "/page1", "/page3"]);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_replace() {
        let history = MemoryHistory::new("/");
        history.push_entry("/page1");
        history.replace_entry("/page2");

        assert_eq!(history.current_path(), "/page2");
        assert_eq!(history.len(), 2);

        let _ = history.back();
        assert_eq!(history.current_path(), "/");
    }

    #[test]
    fn test_history_go() {
        let history = MemoryHistory::new("/");
        history.push_entry("/a");
        history.push_entry("/b");

        assert!(history.go(-2).is_some());
        assert_eq!(history.current_index(), 0);
        assert!(history.go(-1).is_none());
        assert!(history.go(0).is_none());
        assert!(history.go(3).is_none());
        assert!(history.go(2).is_some());
        assert_eq!(history.current_path(), "/b");
    }

    #[test]
    fn test_history_go_out_of_range_delta() {
        let history = MemoryHistory::new("/");
        history.push_entry("/a");

        assert!(history.go(isize::MAX).is_none());
        assert!(history.go(isize::MIN).is_none());
        assert_eq!(history.current_path(), "/a");
        assert!(history.go(-1).is_some());
        assert_eq!(history.current_path(), "/");
    }

    #[test]
    fn test_history_max_size() {
        let history = MemoryHistory::with_max_size("/", 3);
        for page in ["/page1", "/page2", "/page3", "/page4"] {
            history.push_entry(page);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.current_path(), "/page4");
        assert_eq!(history.entries(), vec!["/page2", "/page3", "/page4"]);
    }

    #[test]
    fn test_listeners_fire_in_order() {
        let history = MemoryHistory::new("/");
        history.push_entry("/next");

        let seen = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second"] {
            let seen = Rc::clone(&seen);
            history.on_pop_navigation(Rc::new(move || {
                seen.borrow_mut().push(label);
                Navigation::completed()
            }));
        }

        let navigation = history.back().unwrap();
        pollster::block_on(navigation).unwrap();
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(history.listener_count(), 2);
    }

    #[test]
    fn test_scroll_restoration() {
        let history = MemoryHistory::default();
        assert_eq!(history.scroll_restoration(), ScrollRestoration::Auto);

        history.set_scroll_restoration(ScrollRestoration::Manual);
        assert_eq!(history.scroll_restoration(), ScrollRestoration::Manual);

        assert_eq!("auto".parse::<ScrollRestoration>().unwrap(), ScrollRestoration::Auto);
        assert_eq!(ScrollRestoration::Manual.to_string(), "manual");
        assert!("smooth".parse::<ScrollRestoration>().is_err());
    }
}
