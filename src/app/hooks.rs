//! Overridable hooks the embedding application supplies.
//!
//! Every hook has a default, so an application only implements the ones it
//! cares about. Hooks are called with no shell state borrowed and may call
//! back into the [`Application`](crate::Application).

use crate::domain::{ControllerInfo, RouteArgs};
use futures_util::future::{self, LocalBoxFuture};

/// Future returned by [`ShellHooks::can_leave_current_controller`].
pub type GuardFuture = LocalBoxFuture<'static, bool>;

/// Application-level hooks around controller transitions.
///
/// # Example
///
/// ```
/// use pageshell::app::{GuardFuture, ShellHooks};
/// use pageshell::domain::{ControllerInfo, RouteArgs};
/// use std::cell::Cell;
///
/// #[derive(Default)]
/// struct Editor {
///     unsaved_changes: Cell<bool>,
/// }
///
/// impl ShellHooks for Editor {
///     fn can_leave_current_controller(&self, _current: Option<&ControllerInfo>) -> GuardFuture {
///         let allowed = !self.unsaved_changes.get();
///         Box::pin(async move { allowed })
///     }
///
///     fn route_did_fail(&self, hash: &str, _args: &RouteArgs) -> bool {
///         eprintln!("could not open {hash}");
///         false
///     }
/// }
/// ```
pub trait ShellHooks {
    /// Shows the loading indicator.
    fn show_loading(&self) {}

    /// Hides the loading indicator. Called once per transition whatever its
    /// outcome.
    fn hide_loading(&self) {}

    /// Hides the outgoing controller's view right after the route commits.
    fn hide_controller(&self, current: Option<&ControllerInfo>) {
        let _ = current;
    }

    /// Decides whether the current controller may be left.
    fn can_leave_current_controller(&self, current: Option<&ControllerInfo>) -> GuardFuture {
        let _ = current;
        Box::pin(future::ready(true))
    }

    /// Called when a transition fails with the current hash and the
    /// navigation arguments. Return `true` when the failure was handled;
    /// otherwise the shell navigates back to the previous route.
    fn route_did_fail(&self, hash: &str, args: &RouteArgs) -> bool {
        let _ = (hash, args);
        false
    }

    /// Maps a deferred controller token to the path given to the loader.
    fn get_controller_path(&self, path: &str) -> String {
        path.to_string()
    }

    /// Route to open when history has nothing to resume. `None` falls back
    /// to the configured `initial_route`.
    fn initial_route(&self) -> Option<String> {
        None
    }
}

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ShellHooks for DefaultHooks {}

/// Prefixes every deferred controller token with a fixed module root.
///
/// # Example
///
/// ```
/// use pageshell::app::{ControllerRoot, ShellHooks};
///
/// let hooks = ControllerRoot::new("controllers");
/// assert_eq!(hooks.get_controller_path("inbox"), "controllers/inbox");
/// assert_eq!(hooks.get_controller_path("/inbox"), "controllers/inbox");
/// ```
#[derive(Debug, Clone)]
pub struct ControllerRoot {
    root: String,
}

impl ControllerRoot {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl ShellHooks for ControllerRoot {
    fn get_controller_path(&self, path: &str) -> String {
        let root = self.root.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if root.is_empty() {
            path.to_string()
        } else {
            format!("{root}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_guard_allows_leaving() {
        let allowed = futures::executor::block_on(DefaultHooks.can_leave_current_controller(None));
        assert!(allowed);
    }

    #[test]
    fn default_failure_hook_reports_unhandled() {
        assert!(!DefaultHooks.route_did_fail("inbox", &vec![]));
    }

    #[test]
    fn controller_root_with_empty_root_is_identity() {
        assert_eq!(ControllerRoot::new("").get_controller_path("pages/home"), "pages/home");
    }
}
