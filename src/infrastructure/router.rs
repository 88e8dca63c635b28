//! Router contract consumed by the application shell.
//!
//! The shell does not track history or match URLs itself. It registers one
//! [`RouteHandler`] per route table entry and asks the router to navigate
//! when a transition is cancelled or fails.

use crate::app::TransitionHandle;
use crate::domain::RouteArgs;
use std::rc::Rc;

/// Handler bound to one route. Invoked by the router with the positional
/// arguments it captured from the fragment.
///
/// The returned handle must be polled to completion, typically by spawning
/// it on the embedder's local executor. A transition that is never polled
/// blocks every transition after it.
pub type RouteHandler = Rc<dyn Fn(RouteArgs) -> TransitionHandle>;

/// Options for [`Router::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    /// Run the matching route handler after updating the fragment.
    pub trigger: bool,
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
    /// Run the handler even when the fragment is unchanged.
    pub force: bool,
}

impl NavigateOptions {
    /// Triggering navigation that runs the handler immediately, even for the
    /// current fragment. Used for the initial route and failure recovery.
    #[must_use]
    pub const fn forced() -> Self {
        Self {
            trigger: true,
            replace: false,
            force: true,
        }
    }

    /// Plain triggering navigation.
    #[must_use]
    pub const fn triggering() -> Self {
        Self {
            trigger: true,
            replace: false,
            force: false,
        }
    }

    /// Rewrites the fragment without running any handler. Used to put the
    /// URL back after a guard rejected a navigation.
    #[must_use]
    pub const fn restore() -> Self {
        Self {
            trigger: false,
            replace: true,
            force: false,
        }
    }
}

/// Hash-based router and history facility.
///
/// Methods take `&self`: handlers re-enter the router (a failing transition
/// navigates again), so implementations keep their state behind interior
/// mutability and must not hold a borrow while invoking a handler.
pub trait Router {
    /// Registers `handler` for `pattern`.
    fn route(&self, pattern: &str, handler: RouteHandler);

    /// Updates the fragment and, depending on `options`, runs its handler.
    fn navigate(&self, url: &str, options: NavigateOptions);

    /// The current fragment.
    fn hash(&self) -> String;

    /// Starts history tracking and runs the handler for the current
    /// fragment. Returns `false` when no route matched it.
    fn start_history(&self) -> bool;
}
