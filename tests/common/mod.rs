//! Shared fixtures for shell integration tests.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{FutureExt, Shared};
use pageshell::app::{Application, GuardFuture, RouteTable, ShellHooks, ShellOptions};
use pageshell::domain::{
    failed, settled, Controller, ControllerFactory, ControllerInfo, LifecycleFuture, RouteArgs,
};
use pageshell::infrastructure::{MemoryContainer, MemoryRouter, StaticLoader, ViewContainer};
use pageshell::{ShellConfig, ShellEvent};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Ordered log of everything controllers and hooks did.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    /// Asserts `first` was logged before `second`.
    pub fn assert_before(&self, first: &str, second: &str) {
        let a = self.position(first).unwrap_or_else(|| panic!("{first:?} missing from {:?}", self.entries()));
        let b = self.position(second).unwrap_or_else(|| panic!("{second:?} missing from {:?}", self.entries()));
        assert!(a < b, "expected {first:?} before {second:?} in {:?}", self.entries());
    }
}

type Gate = Shared<oneshot::Receiver<()>>;

enum StartBehaviour {
    Succeed,
    Fail(&'static str),
    Wait(Gate),
}

/// Scripted life-cycle answers for a test page.
struct Script {
    start: StartBehaviour,
    unload_error: Option<&'static str>,
    destroy_error: Option<&'static str>,
}

impl Script {
    fn starting(start: StartBehaviour) -> Self {
        Self {
            start,
            unload_error: None,
            destroy_error: None,
        }
    }
}

struct Page {
    name: String,
    element_id: Option<String>,
    journal: Journal,
    live: Rc<Cell<usize>>,
    script: Rc<Script>,
}

impl Drop for Page {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl Controller for Page {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    fn setup_view_properties(&mut self, container: &mut dyn ViewContainer) {
        container.append(format!("view:{}", self.name));
    }

    fn start(&mut self, args: RouteArgs) -> LifecycleFuture {
        if args.is_empty() {
            self.journal.push(format!("start {}", self.name));
        } else {
            self.journal.push(format!("start {} {}", self.name, args.join(",")));
        }

        match &self.script.start {
            StartBehaviour::Succeed => settled(),
            StartBehaviour::Fail(message) => failed(*message),
            StartBehaviour::Wait(gate) => {
                let gate = gate.clone();
                let journal = self.journal.clone();
                let name = self.name.clone();
                Box::pin(async move {
                    let _ = gate.await;
                    journal.push(format!("started {name}"));
                    Ok(())
                })
            }
        }
    }

    fn unload(&mut self) -> LifecycleFuture {
        self.journal.push(format!("unload {}", self.name));
        self.script.unload_error.map_or_else(settled, failed)
    }

    fn destroy(&mut self) -> LifecycleFuture {
        self.journal.push(format!("destroy {}", self.name));
        self.script.destroy_error.map_or_else(settled, failed)
    }
}

/// Hooks that log every call and whose guard and failure answers can be
/// changed between navigations.
#[derive(Default)]
pub struct RecordingHooks {
    pub journal: Journal,
    pub allow_leave: Cell<bool>,
    pub handle_failures: Cell<bool>,
    pub failures: RefCell<Vec<(String, RouteArgs)>>,
    pub controller_root: RefCell<Option<String>>,
    pub initial_route: RefCell<Option<String>>,
}

impl ShellHooks for RecordingHooks {
    fn show_loading(&self) {
        self.journal.push("show_loading");
    }

    fn hide_loading(&self) {
        self.journal.push("hide_loading");
    }

    fn hide_controller(&self, current: Option<&ControllerInfo>) {
        match current {
            Some(info) => self.journal.push(format!("hide {}", info.name)),
            None => self.journal.push("hide none"),
        }
    }

    fn can_leave_current_controller(&self, _current: Option<&ControllerInfo>) -> GuardFuture {
        let allowed = self.allow_leave.get();
        self.journal.push(format!("guard {allowed}"));
        Box::pin(async move { allowed })
    }

    fn route_did_fail(&self, hash: &str, args: &RouteArgs) -> bool {
        self.journal.push(format!("route_did_fail {hash}"));
        self.failures.borrow_mut().push((hash.to_string(), args.clone()));
        self.handle_failures.get()
    }

    fn get_controller_path(&self, path: &str) -> String {
        match self.controller_root.borrow().as_deref() {
            Some(root) => format!("{root}/{path}"),
            None => path.to_string(),
        }
    }

    fn initial_route(&self) -> Option<String> {
        self.initial_route.borrow().clone()
    }
}

/// Builds test pages that share one journal and live-instance count.
#[derive(Clone, Default)]
pub struct Kit {
    pub journal: Journal,
    pub live: Rc<Cell<usize>>,
}

impl Kit {
    pub fn new() -> Self {
        Self::default()
    }

    fn factory(&self, name: &str, element_id: Option<&str>, script: Script) -> ControllerFactory {
        let name = name.to_string();
        let element_id = element_id.map(String::from);
        let journal = self.journal.clone();
        let live = Rc::clone(&self.live);
        let script = Rc::new(script);

        ControllerFactory::new(move || {
            live.set(live.get() + 1);
            journal.push(format!("construct {name}"));
            Box::new(Page {
                name: name.clone(),
                element_id: element_id.clone(),
                journal: journal.clone(),
                live: Rc::clone(&live),
                script: Rc::clone(&script),
            })
        })
    }

    pub fn page(&self, name: &str) -> ControllerFactory {
        self.factory(name, None, Script::starting(StartBehaviour::Succeed))
    }

    pub fn page_with_id(&self, name: &str, element_id: &str) -> ControllerFactory {
        self.factory(name, Some(element_id), Script::starting(StartBehaviour::Succeed))
    }

    pub fn failing(&self, name: &str, message: &'static str) -> ControllerFactory {
        self.factory(name, None, Script::starting(StartBehaviour::Fail(message)))
    }

    /// A controller that starts but refuses to unload.
    pub fn failing_unload(&self, name: &str, message: &'static str) -> ControllerFactory {
        let script = Script {
            unload_error: Some(message),
            ..Script::starting(StartBehaviour::Succeed)
        };
        self.factory(name, None, script)
    }

    /// A controller that starts but fails to destroy.
    pub fn failing_destroy(&self, name: &str, message: &'static str) -> ControllerFactory {
        let script = Script {
            destroy_error: Some(message),
            ..Script::starting(StartBehaviour::Succeed)
        };
        self.factory(name, None, script)
    }

    /// A controller whose `start` resolves only once the sender fires.
    pub fn gated(&self, name: &str) -> (ControllerFactory, oneshot::Sender<()>) {
        let (sender, receiver) = oneshot::channel();
        let factory = self.factory(name, None, Script::starting(StartBehaviour::Wait(receiver.shared())));
        (factory, sender)
    }

    pub fn hooks(&self) -> Rc<RecordingHooks> {
        Rc::new(RecordingHooks {
            journal: self.journal.clone(),
            allow_leave: Cell::new(true),
            ..RecordingHooks::default()
        })
    }
}

/// A running application wired to in-memory collaborators.
pub struct Harness {
    pub app: Application,
    pub router: MemoryRouter,
    pub container: MemoryContainer,
    pub hooks: Rc<RecordingHooks>,
    pub loader: Rc<StaticLoader>,
    pub events: Journal,
}

impl Harness {
    /// Builds the application without starting it.
    pub fn build(kit: &Kit, routes: RouteTable, loader: StaticLoader, fragment: &str) -> Self {
        Self::build_with(kit, routes, loader, fragment, ShellConfig::default(), &["app-shell"])
    }

    pub fn build_with(
        kit: &Kit,
        routes: RouteTable,
        loader: StaticLoader,
        fragment: &str,
        config: ShellConfig,
        baseline: &[&str],
    ) -> Self {
        let router = MemoryRouter::with_fragment(fragment);
        let container = MemoryContainer::with_classes(baseline.iter().copied());
        let hooks = kit.hooks();
        let loader = Rc::new(loader);

        let options = ShellOptions::new(router.clone())
            .with_config(config)
            .with_shared_hooks(hooks.clone())
            .with_shared_loader(loader.clone())
            .with_routes(routes);

        let app = Application::new(container.clone(), options).expect("valid shell options");

        let events = Journal::default();
        {
            let events = events.clone();
            app.subscribe(move |event| {
                let entry = match event {
                    ShellEvent::Route(route) => format!("route {route}"),
                    ShellEvent::InitController(info) => format!("init {}", info.name),
                    ShellEvent::StartController(info) => format!("start {}", info.name),
                };
                events.push(entry);
            });
        }

        Self {
            app,
            router,
            container,
            hooks,
            loader,
            events,
        }
    }

    /// Builds, starts, and settles every transition the start produced.
    pub fn launch(kit: &Kit, routes: RouteTable, loader: StaticLoader, fragment: &str) -> Self {
        let harness = Self::build(kit, routes, loader, fragment);
        harness.app.start();
        harness.settle();
        harness
    }

    /// Polls queued transition handles until the router queues no more.
    pub fn settle(&self) {
        loop {
            let pending = self.router.take_pending();
            if pending.is_empty() {
                break;
            }
            for handle in pending {
                block_on(handle);
            }
        }
    }

    /// Triggering navigation followed by [`settle`](Self::settle).
    pub fn go(&self, url: &str) {
        self.app.navigate(url);
        self.settle();
    }

    pub fn navigated_urls(&self) -> Vec<String> {
        self.router.navigations().into_iter().map(|n| n.url).collect()
    }
}
