//! The awaitable half of a navigation.
//!
//! `push`, `replace`, `start` and popstate listeners update the current route
//! before they return. The hook and action chain that follows is packaged as a
//! [`Navigation`] the caller awaits or hands to its executor.

use crate::error::HookError;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Pending lifecycle chain of one or more dispatches.
///
/// Resolves to the first hook or action failure, if any. Dropping it without
/// polling skips the hooks and the action; the current route has already been
/// updated either way.
#[must_use = "hooks and actions only run when the navigation is awaited"]
pub struct Navigation {
    future: Option<LocalBoxFuture<'static, Result<(), HookError>>>,
}

impl Navigation {
    /// Wrap a lifecycle future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), HookError>> + 'static,
    {
        Self {
            future: Some(future.boxed_local()),
        }
    }

    /// A navigation with nothing left to run.
    pub fn completed() -> Self {
        Self { future: None }
    }

    /// Run several navigations one after another, stopping at the first
    /// failure.
    pub fn sequence(navigations: impl IntoIterator<Item = Navigation>) -> Self {
        let navigations: Vec<Navigation> = navigations
            .into_iter()
            .filter(|navigation| !navigation.is_completed())
            .collect();

        match navigations.len() {
            0 => Self::completed(),
            1 => navigations.into_iter().next().unwrap_or_else(Self::completed),
            _ => Self::new(async move {
                for navigation in navigations {
                    navigation.await?;
                }
                Ok::<(), HookError>(())
            }),
        }
    }

    /// True when there is nothing left to poll.
    pub fn is_completed(&self) -> bool {
        self.future.is_none()
    }
}

impl Future for Navigation {
    type Output = Result<(), HookError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.future.as_mut() {
            None => Poll::Ready(Ok(())),
            Some(future) => {
                let output = futures::ready!(future.as_mut().poll(cx));
                this.future = None;
                Poll::Ready(output)
            }
        }
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::completed()
    }
}

impl fmt::Debug for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigation")
            .field("completed", &self.is_completed())
            .finish()
    }
}
