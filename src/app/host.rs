//! Controller host: the current controller slot and the shared container.
//!
//! The host is the only owner of the current controller. It is mutated
//! exclusively by the transition engine, which keeps the "at most one current
//! controller" invariant: a new controller is only attached after the
//! previous one has been taken out of the slot by
//! [`take_current`](ControllerHost::take_current).
//!
//! The host never runs controller code itself. Building, wiring and the
//! life-cycle calls go through [`PreparedController`] and
//! [`HostedController`], which the engine uses after releasing its borrow of
//! the host, so a controller may call back into the application freely.

use crate::domain::{
    class_name_for, Controller, ControllerFactory, ControllerId, ControllerInfo, LifecycleFuture,
    RouteArgs,
};
use crate::infrastructure::ViewContainer;
use std::cell::RefCell;
use std::rc::Rc;

/// A controller instance shared between the host and the running transition.
pub type SharedController = Rc<RefCell<Box<dyn Controller>>>;

/// The container, shared so controllers can be wired without borrowing the
/// host.
pub type SharedContainer = Rc<RefCell<Box<dyn ViewContainer>>>;

/// A freshly built controller that is not attached yet.
pub struct PreparedController {
    controller: Box<dyn Controller>,
    name: String,
    element_id: Option<String>,
}

impl PreparedController {
    /// Builds an instance from `factory` and reads its name and element id.
    #[must_use]
    pub fn build(factory: &ControllerFactory) -> Self {
        let controller = factory.build();
        let name = controller.display_name().to_string();
        let element_id = controller.element_id().map(String::from);
        Self {
            controller,
            name,
            element_id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The current controller and what the shell knows about it.
#[derive(Clone)]
pub struct HostedController {
    pub info: ControllerInfo,
    controller: SharedController,
}

impl HostedController {
    /// Lets the controller wire its view into `container`.
    pub fn setup_view(&self, container: &SharedContainer) {
        let mut container = container.borrow_mut();
        self.controller
            .borrow_mut()
            .setup_view_properties(container.as_mut());
    }

    pub fn start(&self, args: RouteArgs) -> LifecycleFuture {
        self.controller.borrow_mut().start(args)
    }

    pub fn unload(&self) -> LifecycleFuture {
        tracing::debug!(controller = %self.info.id, name = %self.info.name, "unloading controller");
        self.controller.borrow_mut().unload()
    }

    /// Destroys the controller. The instance stays alive until the returned
    /// future settles and is dropped right after.
    pub fn destroy(self) -> LifecycleFuture {
        tracing::debug!(controller = %self.info.id, name = %self.info.name, "destroying controller");
        let destroying = self.controller.borrow_mut().destroy();
        Box::pin(async move {
            let result = destroying.await;
            drop(self);
            result
        })
    }
}

impl std::fmt::Debug for HostedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedController")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Owns the current controller and the container it renders into.
pub struct ControllerHost {
    container: SharedContainer,
    /// Classes the container had when the host was created.
    baseline_classes: Vec<String>,
    current: Option<HostedController>,
    next_id: u64,
}

impl ControllerHost {
    /// Creates a host, capturing the container's current classes as the
    /// baseline restored on every hand-off.
    #[must_use]
    pub fn new(container: Box<dyn ViewContainer>) -> Self {
        let baseline_classes = container.class_names();
        tracing::debug!(baseline = ?baseline_classes, "controller host created");
        Self {
            container: Rc::new(RefCell::new(container)),
            baseline_classes,
            current: None,
            next_id: 1,
        }
    }

    /// Info for the current controller, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ControllerInfo> {
        self.current.as_ref().map(|hosted| &hosted.info)
    }

    /// Handle to the current controller, for running its life-cycle after
    /// the host borrow is released.
    #[must_use]
    pub fn current_hosted(&self) -> Option<HostedController> {
        self.current.clone()
    }

    #[must_use]
    pub fn baseline_classes(&self) -> &[String] {
        &self.baseline_classes
    }

    #[must_use]
    pub fn container(&self) -> SharedContainer {
        Rc::clone(&self.container)
    }

    /// Empties the slot, handing back the controller that occupied it.
    pub fn take_current(&mut self) -> Option<HostedController> {
        self.current.take()
    }

    /// Attaches `prepared` to the container and makes it current. Does not
    /// wire its view or start it.
    ///
    /// Attaching empties the container, resets its classes to the baseline
    /// plus the controller's sanitized name class, and replaces its id with
    /// the controller's element id.
    pub fn attach(&mut self, prepared: PreparedController) -> HostedController {
        if let Some(stale) = self.current.take() {
            tracing::warn!(controller = %stale.info.id, "replacing a controller that was never destroyed");
        }

        let PreparedController {
            controller,
            name,
            element_id,
        } = prepared;

        let id = ControllerId(self.next_id);
        self.next_id += 1;

        let class_name = class_name_for(&name);
        let mut classes = self.baseline_classes.clone();
        if let Some(class) = &class_name {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        }

        {
            let mut container = self.container.borrow_mut();
            container.empty();
            container.set_class_names(classes);
            container.set_element_id(element_id.as_deref());
        }

        let hosted = HostedController {
            info: ControllerInfo {
                id,
                name,
                class_name,
                element_id,
            },
            controller: Rc::new(RefCell::new(controller)),
        };
        tracing::debug!(controller = %hosted.info.id, name = %hosted.info.name, "controller attached");

        self.current = Some(hosted.clone());
        hosted
    }
}

impl std::fmt::Debug for ControllerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHost")
            .field("baseline_classes", &self.baseline_classes)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{failed, settled, ControllerError};
    use crate::infrastructure::MemoryContainer;
    use futures::executor::block_on;

    struct Page {
        name: &'static str,
        id: Option<&'static str>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Controller for Page {
        fn display_name(&self) -> &str {
            self.name
        }

        fn element_id(&self) -> Option<&str> {
            self.id
        }

        fn setup_view_properties(&mut self, container: &mut dyn ViewContainer) {
            container.append(format!("<{}>", self.name));
        }

        fn start(&mut self, args: RouteArgs) -> LifecycleFuture {
            self.log.borrow_mut().push(format!("start {} {args:?}", self.name));
            settled()
        }

        fn destroy(&mut self) -> LifecycleFuture {
            self.log.borrow_mut().push(format!("destroy {}", self.name));
            failed("teardown failed")
        }
    }

    impl Drop for Page {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop {}", self.name));
        }
    }

    fn factory(name: &'static str, id: Option<&'static str>, log: &Rc<RefCell<Vec<String>>>) -> ControllerFactory {
        let log = Rc::clone(log);
        ControllerFactory::new(move || {
            Box::new(Page {
                name,
                id,
                log: Rc::clone(&log),
            })
        })
    }

    fn attach(host: &mut ControllerHost, factory: &ControllerFactory) -> HostedController {
        let hosted = host.attach(PreparedController::build(factory));
        hosted.setup_view(&host.container());
        hosted
    }

    #[test]
    fn baseline_is_captured_from_the_container() {
        let host = ControllerHost::new(Box::new(MemoryContainer::with_classes(["app", "shell"])));
        assert_eq!(host.baseline_classes(), ["app", "shell"]);
        assert!(host.current().is_none());
    }

    #[test]
    fn prepared_controller_reads_its_name() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let prepared = PreparedController::build(&factory("Inbox", None, &log));
        assert_eq!(prepared.name(), "Inbox");
    }

    #[test]
    fn attach_resets_container_to_baseline() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let container = MemoryContainer::with_classes(["app"]);
        let mut host = ControllerHost::new(Box::new(container.clone()));

        let first = attach(&mut host, &factory("My Page_View", Some("page"), &log));
        assert_eq!(first.info.class_name.as_deref(), Some("my-page-view"));
        assert_eq!(container.snapshot().classes, vec!["app", "my-page-view"]);
        assert_eq!(container.snapshot().element_id.as_deref(), Some("page"));

        let outgoing = host.take_current().unwrap();
        let _ = block_on(outgoing.destroy());
        let second = attach(&mut host, &factory("Inbox", None, &log));

        let snapshot = container.snapshot();
        assert_eq!(snapshot.classes, vec!["app", "inbox"]);
        assert_eq!(snapshot.element_id, None);
        assert_eq!(snapshot.fragments, vec!["<Inbox>"]);
        assert!(second.info.id > first.info.id);
        assert_eq!(host.baseline_classes(), ["app"]);
    }

    #[test]
    fn destroy_failure_still_drops_the_instance() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut host = ControllerHost::new(Box::new(MemoryContainer::default()));
        attach(&mut host, &factory("Inbox", None, &log));

        let outgoing = host.take_current().unwrap();
        assert!(host.current().is_none());

        let result = block_on(outgoing.destroy());
        assert_eq!(result, Err(ControllerError::new("teardown failed")));
        assert_eq!(*log.borrow(), vec!["destroy Inbox", "drop Inbox"]);
    }

    #[test]
    fn start_passes_arguments_through() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut host = ControllerHost::new(Box::new(MemoryContainer::default()));
        attach(&mut host, &factory("Inbox", None, &log));

        let hosted = host.current_hosted().unwrap();
        assert!(block_on(hosted.start(vec!["42".into()])).is_ok());
        assert_eq!(*log.borrow(), vec!["start Inbox [\"42\"]"]);
    }

    #[test]
    fn default_unload_succeeds() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut host = ControllerHost::new(Box::new(MemoryContainer::default()));
        let hosted = attach(&mut host, &factory("Inbox", None, &log));
        assert!(block_on(hosted.unload()).is_ok());
    }
}
