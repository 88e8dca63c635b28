//! In-memory router and container for headless embedding and tests.
//!
//! Both types are cheap handles over shared state: clone one, hand the clone
//! to the application, and keep the original to inspect what happened.

use super::fragment::{match_pattern, normalize_fragment};
use super::router::{NavigateOptions, RouteHandler, Router};
use super::view::ViewContainer;
use crate::app::TransitionHandle;
use std::cell::RefCell;
use std::rc::Rc;

/// One call to [`Router::navigate`], as recorded by [`MemoryRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRecord {
    pub url: String,
    pub options: NavigateOptions,
}

#[derive(Default)]
struct RouterState {
    routes: Vec<(String, RouteHandler)>,
    fragment: String,
    started: bool,
    navigations: Vec<NavigationRecord>,
    pending: Vec<TransitionHandle>,
}

/// Router that keeps the fragment in memory.
///
/// Routes match in registration order. Handles returned by route handlers are
/// queued; call [`take_pending`](MemoryRouter::take_pending) and poll them on
/// whatever executor drives the application.
#[derive(Clone, Default)]
pub struct MemoryRouter {
    state: Rc<RefCell<RouterState>>,
}

impl MemoryRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Router whose history starts at `fragment`, as if the page had been
    /// opened with that hash.
    #[must_use]
    pub fn with_fragment(fragment: &str) -> Self {
        let router = Self::default();
        router.state.borrow_mut().fragment = normalize_fragment(fragment);
        router
    }

    /// Every `navigate` call so far, including ones that changed nothing.
    #[must_use]
    pub fn navigations(&self) -> Vec<NavigationRecord> {
        self.state.borrow().navigations.clone()
    }

    /// Registered patterns, in registration order.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        self.state
            .borrow()
            .routes
            .iter()
            .map(|(pattern, _)| pattern.clone())
            .collect()
    }

    /// Drains the transition handles produced since the last call.
    #[must_use]
    pub fn take_pending(&self) -> Vec<TransitionHandle> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    /// Runs the first handler matching `fragment`. Returns `false` when none
    /// matched.
    fn load_fragment(&self, fragment: &str) -> bool {
        let found = {
            let state = self.state.borrow();
            state.routes.iter().find_map(|(pattern, handler)| {
                match_pattern(pattern, fragment).map(|args| (pattern.clone(), Rc::clone(handler), args))
            })
        };

        let Some((pattern, handler, args)) = found else {
            tracing::debug!(fragment = %fragment, "no route matched fragment");
            return false;
        };

        tracing::debug!(fragment = %fragment, pattern = %pattern, "route matched");
        let handle = handler(args);
        self.state.borrow_mut().pending.push(handle);
        true
    }
}

impl Router for MemoryRouter {
    fn route(&self, pattern: &str, handler: RouteHandler) {
        self.state
            .borrow_mut()
            .routes
            .push((pattern.to_string(), handler));
    }

    fn navigate(&self, url: &str, options: NavigateOptions) {
        let fragment = normalize_fragment(url);
        let should_load = {
            let mut state = self.state.borrow_mut();
            state.navigations.push(NavigationRecord {
                url: url.to_string(),
                options,
            });

            let unchanged = state.fragment == fragment;
            state.fragment.clone_from(&fragment);
            options.trigger && state.started && (options.force || !unchanged)
        };

        if should_load {
            self.load_fragment(&fragment);
        }
    }

    fn hash(&self) -> String {
        self.state.borrow().fragment.clone()
    }

    fn start_history(&self) -> bool {
        let fragment = {
            let mut state = self.state.borrow_mut();
            state.started = true;
            state.fragment.clone()
        };
        self.load_fragment(&fragment)
    }
}

/// Snapshot of a [`MemoryContainer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub classes: Vec<String>,
    pub element_id: Option<String>,
    pub fragments: Vec<String>,
}

/// Container that records content, classes and id in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    state: Rc<RefCell<ContainerSnapshot>>,
}

impl MemoryContainer {
    /// Container whose initial classes become the application's baseline.
    #[must_use]
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let container = Self::default();
        container.state.borrow_mut().classes = classes.into_iter().map(Into::into).collect();
        container
    }

    #[must_use]
    pub fn snapshot(&self) -> ContainerSnapshot {
        self.state.borrow().clone()
    }
}

impl ViewContainer for MemoryContainer {
    fn empty(&mut self) {
        self.state.borrow_mut().fragments.clear();
    }

    fn append(&mut self, fragment: String) {
        self.state.borrow_mut().fragments.push(fragment);
    }

    fn class_names(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    fn set_class_names(&mut self, classes: Vec<String>) {
        self.state.borrow_mut().classes = classes;
    }

    fn set_element_id(&mut self, id: Option<&str>) {
        self.state.borrow_mut().element_id = id.map(String::from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_handles_share_state() {
        let container = MemoryContainer::with_classes(["app", "shell"]);
        let mut attached = container.clone();

        attached.append("<p>hello</p>".to_string());
        attached.set_element_id(Some("inbox"));

        let snapshot = container.snapshot();
        assert_eq!(snapshot.classes, vec!["app", "shell"]);
        assert_eq!(snapshot.element_id.as_deref(), Some("inbox"));
        assert_eq!(snapshot.fragments, vec!["<p>hello</p>"]);

        attached.empty();
        assert!(container.snapshot().fragments.is_empty());
    }

    #[test]
    fn navigate_before_start_only_records() {
        let router = MemoryRouter::new();
        router.navigate("#/inbox", NavigateOptions::forced());

        assert_eq!(router.hash(), "/inbox");
        assert_eq!(router.navigations().len(), 1);
        assert!(router.take_pending().is_empty());
    }

    #[test]
    fn start_history_without_routes_reports_no_match() {
        let router = MemoryRouter::with_fragment("#/missing");
        assert!(!router.start_history());
        assert_eq!(router.hash(), "/missing");
    }
}
