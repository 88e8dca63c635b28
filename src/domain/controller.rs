//! Page controller contract and the references the route table holds.
//!
//! A controller is one unit of page content with a start/unload/destroy
//! life-cycle. The shell never knows concrete controller types: the route
//! table holds a [`ControllerRef`], which is either a [`ControllerFactory`]
//! ready to build an instance or a deferred token that a loader resolves on
//! first navigation.
//!
//! Life-cycle operations return `'static` local futures. The shell calls the
//! method under a short borrow and awaits the returned future afterwards, so a
//! controller that needs its own state inside the future should move an `Rc`
//! clone into it.

use super::error::ControllerError;
use crate::infrastructure::ViewContainer;
use futures_util::future::{self, LocalBoxFuture};
use std::fmt;
use std::rc::Rc;

/// Positional arguments captured by the router for one navigation.
pub type RouteArgs = Vec<String>;

/// Future returned by controller life-cycle operations.
pub type LifecycleFuture = LocalBoxFuture<'static, Result<(), ControllerError>>;

/// Returns a life-cycle future that has already succeeded.
///
/// Default `unload` and `destroy` implementations use this, and so can
/// controllers whose operations are synchronous.
#[must_use]
pub fn settled() -> LifecycleFuture {
    Box::pin(future::ready(Ok(())))
}

/// Returns a life-cycle future that has already failed with `message`.
#[must_use]
pub fn failed(message: impl Into<String>) -> LifecycleFuture {
    Box::pin(future::ready(Err(ControllerError::new(message))))
}

/// A unit of page content managed by the shell.
///
/// Only [`display_name`](Controller::display_name) and
/// [`start`](Controller::start) are required. The display name doubles as the
/// source of the CSS class applied to the shared container.
///
/// # Example
///
/// ```
/// use pageshell::domain::{settled, Controller, LifecycleFuture, RouteArgs};
/// use pageshell::infrastructure::ViewContainer;
///
/// struct Inbox;
///
/// impl Controller for Inbox {
///     fn display_name(&self) -> &str {
///         "Inbox"
///     }
///
///     fn setup_view_properties(&mut self, container: &mut dyn ViewContainer) {
///         container.append("<ul class=\"messages\"></ul>".to_string());
///     }
///
///     fn start(&mut self, _args: RouteArgs) -> LifecycleFuture {
///         settled()
///     }
/// }
/// ```
pub trait Controller {
    /// Human-readable name, used for logging and the container class.
    fn display_name(&self) -> &str;

    /// Element id to assign to the container while this controller is current.
    fn element_id(&self) -> Option<&str> {
        None
    }

    /// Wires the controller's view into the freshly reset container.
    fn setup_view_properties(&mut self, container: &mut dyn ViewContainer) {
        let _ = container;
    }

    /// Starts the controller with the navigation's positional arguments.
    fn start(&mut self, args: RouteArgs) -> LifecycleFuture;

    /// Prepares the controller to be left. Called after it has been hidden.
    fn unload(&mut self) -> LifecycleFuture {
        settled()
    }

    /// Releases everything the controller holds. The instance is dropped
    /// right after this future settles.
    fn destroy(&mut self) -> LifecycleFuture {
        settled()
    }
}

/// Builds fresh controller instances. One instance is built per transition.
#[derive(Clone)]
pub struct ControllerFactory {
    build: Rc<dyn Fn() -> Box<dyn Controller>>,
}

impl ControllerFactory {
    /// Wraps a constructor closure.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Box<dyn Controller> + 'static,
    {
        Self {
            build: Rc::new(build),
        }
    }

    /// Shorthand for controllers that implement `Default`.
    #[must_use]
    pub fn of<C>() -> Self
    where
        C: Controller + Default + 'static,
    {
        Self::new(|| Box::new(C::default()))
    }

    /// Constructs a new controller instance.
    #[must_use]
    pub fn build(&self) -> Box<dyn Controller> {
        (self.build)()
    }
}

impl fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerFactory").finish_non_exhaustive()
    }
}

/// What a route table entry points at.
#[derive(Debug, Clone)]
pub enum ControllerRef {
    /// A constructor available right away.
    Constructor(ControllerFactory),

    /// A module path resolved through the loader when the route is visited.
    ///
    /// The path is passed through the `get_controller_path` hook first.
    Deferred(String),
}

impl ControllerRef {
    /// Returns `true` for deferred-load tokens.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl From<ControllerFactory> for ControllerRef {
    fn from(factory: ControllerFactory) -> Self {
        Self::Constructor(factory)
    }
}

/// Identity the shell assigns to each constructed controller.
///
/// Ids increase monotonically per application, so a later controller always
/// has a larger id than an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(pub u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller#{}", self.0)
    }
}

/// Snapshot of a constructed controller, carried by lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub id: ControllerId,
    pub name: String,
    /// Sanitized class applied to the container, `None` for blank names.
    pub class_name: Option<String>,
    pub element_id: Option<String>,
}

/// Derives the container CSS class from a controller's display name.
///
/// The name is trimmed and lowercased, and every run of whitespace or
/// underscores collapses into a single hyphen. Blank names yield `None`.
///
/// # Examples
///
/// ```
/// use pageshell::domain::class_name_for;
///
/// assert_eq!(class_name_for("My Page_View").as_deref(), Some("my-page-view"));
/// assert_eq!(class_name_for("inbox").as_deref(), Some("inbox"));
/// assert_eq!(class_name_for("   "), None);
/// ```
#[must_use]
pub fn class_name_for(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut class = String::with_capacity(trimmed.len());
    let mut in_separator = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '_' {
            if !in_separator {
                class.push('-');
                in_separator = true;
            }
        } else {
            class.extend(ch.to_lowercase());
            in_separator = false;
        }
    }

    Some(class)
}
