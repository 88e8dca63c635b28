//! Application shell: bootstrap, route binding and the public handle.
//!
//! [`Application`] is a cheap, cloneable handle over the shared shell state.
//! Everything runs on one thread; the embedder polls the transition handles
//! the router receives on its local executor.
//!
//! # Example
//!
//! ```
//! use pageshell::app::{Application, RouteTable, ShellOptions};
//! use pageshell::domain::{settled, Controller, ControllerFactory, LifecycleFuture, RouteArgs};
//! use pageshell::infrastructure::{MemoryContainer, MemoryRouter};
//!
//! #[derive(Default)]
//! struct Home;
//!
//! impl Controller for Home {
//!     fn display_name(&self) -> &str { "Home" }
//!     fn start(&mut self, _args: RouteArgs) -> LifecycleFuture { settled() }
//! }
//!
//! let router = MemoryRouter::new();
//! let options = ShellOptions::new(router.clone())
//!     .with_routes(RouteTable::new().route("", ControllerFactory::of::<Home>()));
//!
//! let app = Application::launch(MemoryContainer::default(), options)?;
//! for handle in router.take_pending() {
//!     futures::executor::block_on(handle);
//! }
//!
//! assert_eq!(app.active_route().as_deref(), Some(""));
//! assert_eq!(app.current_controller().map(|c| c.name).as_deref(), Some("Home"));
//! # Ok::<(), pageshell::ShellError>(())
//! ```

use super::events::{EventBus, ShellEvent, SubscriptionId};
use super::hooks::{DefaultHooks, ShellHooks};
use super::host::ControllerHost;
use super::registry::{bind_routes, RouteTable};
use super::transition::{
    ActiveRoute, Transition, TransitionEngine, TransitionHandle, TransitionReport,
};
use crate::domain::{ControllerInfo, ControllerRef, Result, RouteArgs};
use crate::infrastructure::{
    normalize_fragment, ControllerLoader, NavigateOptions, Router, StaticLoader, ViewContainer,
};
use crate::ShellConfig;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Collaborators and configuration for building an [`Application`].
pub struct ShellOptions {
    pub config: ShellConfig,
    pub router: Rc<dyn Router>,
    pub hooks: Rc<dyn ShellHooks>,
    pub loader: Rc<dyn ControllerLoader>,
    /// Routes defined in code. Routes from `config.routes` are appended.
    pub routes: RouteTable,
}

impl ShellOptions {
    /// Options with default hooks, an empty loader and no routes.
    pub fn new(router: impl Router + 'static) -> Self {
        Self {
            config: ShellConfig::default(),
            router: Rc::new(router),
            hooks: Rc::new(DefaultHooks),
            loader: Rc::new(StaticLoader::default()),
            routes: RouteTable::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: impl ShellHooks + 'static) -> Self {
        self.hooks = Rc::new(hooks);
        self
    }

    /// Shares hooks the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_hooks(mut self, hooks: Rc<dyn ShellHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl ControllerLoader + 'static) -> Self {
        self.loader = Rc::new(loader);
        self
    }

    /// Shares a loader the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_loader(mut self, loader: Rc<dyn ControllerLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }
}

/// Shell state shared between the application handle, route handlers and
/// in-flight transitions.
pub(crate) struct Shell {
    pub(crate) config: ShellConfig,
    pub(crate) router: Rc<dyn Router>,
    pub(crate) hooks: Rc<dyn ShellHooks>,
    pub(crate) loader: Rc<dyn ControllerLoader>,
    pub(crate) events: EventBus,
    pub(crate) host: RefCell<ControllerHost>,
    pub(crate) active_route: RefCell<Option<ActiveRoute>>,
    pub(crate) engine: TransitionEngine,
    routes: RouteTable,
    routes_bound: Cell<bool>,
}

impl Shell {
    /// Route opened when history has nothing to resume.
    pub(crate) fn initial_route(&self) -> String {
        self.hooks
            .initial_route()
            .unwrap_or_else(|| self.config.initial_route.clone())
    }
}

/// Handle to the application shell.
#[derive(Clone)]
pub struct Application {
    shell: Rc<Shell>,
}

/// Non-owning handle, upgraded by route handlers when they fire.
#[derive(Clone)]
pub struct WeakApplication {
    shell: Weak<Shell>,
}

impl WeakApplication {
    #[must_use]
    pub fn upgrade(&self) -> Option<Application> {
        self.shell.upgrade().map(|shell| Application { shell })
    }
}

impl Application {
    /// Builds the shell around `container`.
    ///
    /// The container's current classes become the baseline restored on every
    /// controller hand-off.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Config`](crate::ShellError::Config) when a
    /// configured route names no controller.
    pub fn new(container: impl ViewContainer + 'static, options: ShellOptions) -> Result<Self> {
        let ShellOptions {
            config,
            router,
            hooks,
            loader,
            mut routes,
        } = options;

        routes.extend(RouteTable::from_specs(&config.routes)?);
        tracing::debug!(routes = routes.len(), initial_route = %config.initial_route, "building application shell");

        let shell = Shell {
            config,
            router,
            hooks,
            loader,
            events: EventBus::default(),
            host: RefCell::new(ControllerHost::new(Box::new(container))),
            active_route: RefCell::new(None),
            engine: TransitionEngine::default(),
            routes,
            routes_bound: Cell::new(false),
        };

        Ok(Self {
            shell: Rc::new(shell),
        })
    }

    /// Builds the shell and starts it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Application::new`].
    pub fn launch(container: impl ViewContainer + 'static, options: ShellOptions) -> Result<Self> {
        let app = Self::new(container, options)?;
        app.start();
        Ok(app)
    }

    /// Registers routes, resumes history, and opens the initial route when
    /// history has nothing to resume.
    pub fn start(&self) {
        let _span = tracing::debug_span!("shell_start").entered();

        self.setup_routes();
        if self.shell.router.start_history() {
            tracing::debug!(fragment = %self.shell.router.hash(), "resumed from history");
            return;
        }

        let initial = self.shell.initial_route();
        tracing::debug!(initial_route = %initial, "no history match, opening initial route");
        self.shell.router.navigate(&initial, NavigateOptions::forced());
    }

    /// Binds every route table entry to the router.
    ///
    /// Runs once; later calls and empty tables are no-ops. Returns the number
    /// of routes bound by this call.
    pub fn setup_routes(&self) -> usize {
        if self.shell.routes_bound.replace(true) {
            tracing::debug!("routes already bound");
            return 0;
        }

        if self.shell.routes.is_empty() {
            tracing::debug!("route table is empty, nothing to bind");
            return 0;
        }

        bind_routes(&self.shell.routes, self.shell.router.as_ref(), &self.downgrade())
    }

    /// Starts a transition to `route`. Normally called by route handlers.
    ///
    /// The transition chains after the one currently in flight, if any, and
    /// does nothing until the returned handle is polled.
    pub fn begin_transition(
        &self,
        route: &str,
        controller: ControllerRef,
        args: RouteArgs,
    ) -> TransitionHandle {
        Transition::begin(&self.shell, route, controller, args)
    }

    /// Programmatic navigation through the router.
    pub fn navigate(&self, url: &str) {
        self.shell.router.navigate(url, NavigateOptions::triggering());
    }

    /// Name of the active route, `None` before the first commit and after a
    /// failure.
    #[must_use]
    pub fn active_route(&self) -> Option<String> {
        self.shell
            .active_route
            .borrow()
            .as_ref()
            .map(|route| route.name.clone())
    }

    /// Fragment the router showed when the active route committed.
    #[must_use]
    pub fn active_fragment(&self) -> Option<String> {
        self.shell
            .active_route
            .borrow()
            .as_ref()
            .map(|route| route.fragment.clone())
    }

    #[must_use]
    pub fn current_controller(&self) -> Option<ControllerInfo> {
        self.shell.host.borrow().current().cloned()
    }

    /// Handle of the most recently begun transition.
    #[must_use]
    pub fn current_transition(&self) -> Option<TransitionHandle> {
        self.shell.engine.current()
    }

    #[must_use]
    pub fn last_transition(&self) -> Option<TransitionReport> {
        self.shell.engine.last_report()
    }

    /// Route opened when history has nothing to resume, normalized.
    #[must_use]
    pub fn initial_route(&self) -> String {
        normalize_fragment(&self.shell.initial_route())
    }

    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.shell.config
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.shell.routes
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ShellEvent) + 'static,
    {
        self.shell.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shell.events.unsubscribe(id)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakApplication {
        WeakApplication {
            shell: Rc::downgrade(&self.shell),
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("active_route", &self.shell.active_route.borrow())
            .field("host", &self.shell.host.borrow())
            .field("engine", &self.shell.engine)
            .finish_non_exhaustive()
    }
}
