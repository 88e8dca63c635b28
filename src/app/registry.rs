//! Route registry: the route table and its binding to the router.
//!
//! The table maps route patterns to controller references. Binding produces
//! one [`RouteHandler`] per entry; each handler starts a transition for its
//! route when the router invokes it. Handlers hold the application weakly so
//! the router does not keep it alive.

use super::application::WeakApplication;
use super::transition::{CancelReason, TransitionOutcome};
use crate::domain::{ControllerFactory, ControllerRef, Result, ShellError};
use crate::infrastructure::{RouteHandler, Router};
use crate::RouteSpec;
use std::rc::Rc;

/// One route table entry.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub pattern: String,
    pub controller: ControllerRef,
}

/// Ordered mapping from route pattern to controller reference.
///
/// # Example
///
/// ```
/// use pageshell::app::RouteTable;
///
/// let routes = RouteTable::new()
///     .deferred("", "pages/home")
///     .deferred("inbox/:folder", "pages/inbox");
///
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes.patterns(), vec!["", "inbox/:folder"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route backed by a constructor.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, factory: ControllerFactory) -> Self {
        self.push(pattern, ControllerRef::Constructor(factory));
        self
    }

    /// Adds a route whose controller is loaded from `path` on first visit.
    #[must_use]
    pub fn deferred(mut self, pattern: impl Into<String>, path: impl Into<String>) -> Self {
        self.push(pattern, ControllerRef::Deferred(path.into()));
        self
    }

    /// Adds an entry. A pattern registered twice keeps both entries; the
    /// router decides which one matches.
    pub fn push(&mut self, pattern: impl Into<String>, controller: ControllerRef) {
        self.entries.push(RouteEntry {
            pattern: pattern.into(),
            controller,
        });
    }

    /// Builds a table of deferred routes from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Config`] when an entry names no controller.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self> {
        let mut table = Self::new();
        for spec in specs {
            let controller = spec.controller.trim();
            if controller.is_empty() {
                return Err(ShellError::Config(format!(
                    "route {:?} has no controller",
                    spec.pattern
                )));
            }
            table.push(spec.pattern.clone(), ControllerRef::Deferred(controller.to_string()));
        }
        Ok(table)
    }

    /// Appends every entry of `other`.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.pattern.as_str()).collect()
    }

    /// Looks up the first entry registered for `pattern`.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&ControllerRef> {
        self.entries
            .iter()
            .find(|e| e.pattern == pattern)
            .map(|e| &e.controller)
    }
}

/// Registers one handler per table entry with `router`.
///
/// Returns the number of routes registered. An empty table registers
/// nothing.
pub(crate) fn bind_routes(table: &RouteTable, router: &dyn Router, app: &WeakApplication) -> usize {
    for entry in table.iter() {
        let pattern = entry.pattern.clone();
        let controller = entry.controller.clone();
        let app = app.clone();

        let handler: RouteHandler = Rc::new(move |args| match app.upgrade() {
            Some(app) => app.begin_transition(&pattern, controller.clone(), args),
            None => {
                tracing::debug!(route = %pattern, "route fired after the application was dropped");
                TransitionOutcome::Cancelled(CancelReason::Detached).into_handle()
            }
        });

        tracing::debug!(route = %entry.pattern, deferred = entry.controller.is_deferred(), "binding route");
        router.route(&entry.pattern, handler);
    }

    table.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_become_deferred_routes() {
        let specs = vec![
            RouteSpec {
                pattern: String::new(),
                controller: "pages/home".into(),
            },
            RouteSpec {
                pattern: "inbox".into(),
                controller: " pages/inbox ".into(),
            },
        ];

        let table = RouteTable::from_specs(&specs).unwrap();
        assert_eq!(table.patterns(), vec!["", "inbox"]);
        assert!(matches!(table.get("inbox"), Some(ControllerRef::Deferred(path)) if path == "pages/inbox"));
    }

    #[test]
    fn spec_without_controller_is_rejected() {
        let specs = vec![RouteSpec {
            pattern: "inbox".into(),
            controller: "  ".into(),
        }];

        let error = RouteTable::from_specs(&specs).unwrap_err();
        assert!(error.to_string().contains("inbox"));
    }

    #[test]
    fn extend_keeps_order() {
        let mut table = RouteTable::new().deferred("a", "pages/a");
        table.extend(RouteTable::new().deferred("b", "pages/b"));
        assert_eq!(table.patterns(), vec!["a", "b"]);
        assert!(table.get("c").is_none());
    }
}
