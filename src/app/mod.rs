//! Application layer: route registry, transition engine and controller host.
//!
//! This module is the orchestration core of the shell. It sits between the
//! router (which reports navigations) and the view layer (which shows
//! controllers), and owns the life-cycle that hands the page from one
//! controller to the next.
//!
//! # Architecture
//!
//! ```text
//! Router ──▶ Route Registry handler ──▶ Transition Engine ──▶ Controller Host ──▶ Container
//!                                              │
//!                                              └──▶ Events / Hooks
//! ```
//!
//! # Modules
//!
//! - [`application`]: Public handle, bootstrap and options
//! - [`registry`]: Route table and handler binding
//! - [`transition`]: Transition state machine and serializer
//! - [`host`]: Current controller slot and container bookkeeping
//! - [`events`]: Lifecycle events and the event bus
//! - [`hooks`]: Overridable application hooks

pub mod application;
pub mod events;
pub mod hooks;
pub mod host;
pub mod registry;
pub mod transition;

pub use application::{Application, ShellOptions, WeakApplication};
pub use events::{EventBus, ShellEvent, SubscriptionId};
pub use hooks::{ControllerRoot, DefaultHooks, GuardFuture, ShellHooks};
pub use host::{ControllerHost, HostedController, PreparedController, SharedContainer, SharedController};
pub use registry::{RouteEntry, RouteTable};
pub use transition::{
    ActiveRoute, CancelReason, Phase, TransitionEngine, TransitionError, TransitionHandle,
    TransitionOutcome, TransitionReport,
};
