//! Lifecycle events observable by the embedding application.
//!
//! The transition engine emits three events per successful navigation, in
//! this order: [`ShellEvent::Route`] once the route is committed,
//! [`ShellEvent::InitController`] once the new controller is attached, and
//! [`ShellEvent::StartController`] once its `start` has resolved.

use crate::domain::ControllerInfo;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Events emitted while a transition runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The active route changed to the given route name.
    Route(String),
    /// A controller was constructed and attached to the container.
    InitController(ControllerInfo),
    /// A controller's `start` resolved.
    StartController(ControllerInfo),
}

impl ShellEvent {
    /// Conventional event name: `route`, `init:controller` or
    /// `start:controller`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Route(_) => "route",
            Self::InitController(_) => "init:controller",
            Self::StartController(_) => "start:controller",
        }
    }
}

/// Token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&ShellEvent)>;

/// Synchronous fan-out of [`ShellEvent`]s to subscribed closures.
///
/// Listeners run in subscription order. A listener may subscribe or
/// unsubscribe while an event is being delivered; the change applies from the
/// next event on.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ShellEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn emit(&self, event: &ShellEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        tracing::debug!(event = event.name(), listeners = listeners.len(), "emitting shell event");
        for listener in listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_receive_events_in_subscription_order() {
        let bus = EventBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |event| seen.borrow_mut().push(format!("{tag}:{}", event.name())));
        }

        bus.emit(&ShellEvent::Route("inbox".into()));
        assert_eq!(*seen.borrow(), vec!["first:route", "second:route"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let bus = EventBus::default();
        let count = Rc::new(Cell::new(0));
        let id = {
            let count = Rc::clone(&count);
            bus.subscribe(move |_| count.set(count.get() + 1))
        };

        bus.emit(&ShellEvent::Route("a".into()));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&ShellEvent::Route("b".into()));

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_delivery() {
        let bus = Rc::new(EventBus::default());
        let late_calls = Rc::new(Cell::new(0));
        {
            let bus_inner = Rc::clone(&bus);
            let late_calls = Rc::clone(&late_calls);
            bus.subscribe(move |_| {
                let late_calls = Rc::clone(&late_calls);
                bus_inner.subscribe(move |_| late_calls.set(late_calls.get() + 1));
            });
        }

        bus.emit(&ShellEvent::Route("a".into()));
        assert_eq!(late_calls.get(), 0);
        bus.emit(&ShellEvent::Route("b".into()));
        assert_eq!(late_calls.get(), 1);
    }
}
