//! Deferred controller loading.
//!
//! Route table entries can name a controller by module path instead of
//! holding a constructor. The loader turns that path into a
//! [`ControllerFactory`] when the route is first visited.

use crate::domain::{ControllerError, ControllerFactory};
use futures_util::future::{self, LocalBoxFuture};
use std::cell::RefCell;
use std::collections::HashMap;

/// Future returned by [`ControllerLoader::load`].
pub type LoadFuture = LocalBoxFuture<'static, Result<ControllerFactory, ControllerError>>;

/// Resolves a module path to a controller constructor.
pub trait ControllerLoader {
    /// Starts loading `path`. The path has already been through the
    /// `get_controller_path` hook.
    fn load(&self, path: &str) -> LoadFuture;
}

/// Loader backed by an in-memory path table.
///
/// Useful when every controller is compiled in but the route table should
/// still refer to them by path, e.g. when routes come from configuration.
/// Every request is recorded, which makes the loader handy in tests too.
///
/// # Example
///
/// ```
/// use pageshell::infrastructure::{ControllerLoader, StaticLoader};
/// use pageshell::domain::{settled, Controller, ControllerFactory, LifecycleFuture, RouteArgs};
///
/// #[derive(Default)]
/// struct Home;
///
/// impl Controller for Home {
///     fn display_name(&self) -> &str { "Home" }
///     fn start(&mut self, _args: RouteArgs) -> LifecycleFuture { settled() }
/// }
///
/// let loader = StaticLoader::new().with("pages/home", ControllerFactory::of::<Home>());
/// let _pending = loader.load("pages/home");
/// assert_eq!(loader.requests(), vec!["pages/home".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct StaticLoader {
    factories: HashMap<String, ControllerFactory>,
    requests: RefCell<Vec<String>>,
}

impl StaticLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `path`, replacing any earlier entry.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, factory: ControllerFactory) -> Self {
        self.register(path, factory);
        self
    }

    /// Registers `factory` under `path`, replacing any earlier entry.
    pub fn register(&mut self, path: impl Into<String>, factory: ControllerFactory) {
        self.factories.insert(path.into(), factory);
    }

    /// Every path requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ControllerLoader for StaticLoader {
    fn load(&self, path: &str) -> LoadFuture {
        self.requests.borrow_mut().push(path.to_string());

        let result = self
            .factories
            .get(path)
            .cloned()
            .ok_or_else(|| ControllerError::new(format!("no controller registered at {path:?}")));

        if let Err(e) = &result {
            tracing::debug!(path = %path, error = %e, "controller lookup failed");
        }

        Box::pin(future::ready(result))
    }
}
