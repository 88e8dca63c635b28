//! Route-transition state machine.
//!
//! One transition drives a single navigation from request to settlement
//! through explicit phases:
//!
//! ```text
//! Guarding → Resolving → Committing → Unloading → Destroying → Constructing → Starting → Settled
//!    │           │
//!    │           └── newer transition begun ──→ Cancelled(Superseded)
//!    └── guard denied ─────────────────────────→ Cancelled(GuardRejected)
//!
//! any step error ──────────────────────────────→ Failed(..) → failure recovery
//! ```
//!
//! # Serialization
//!
//! The [`TransitionEngine`] holds exactly one handle: the most recently begun
//! transition. Beginning a new transition takes that handle and stores its
//! own. The new transition awaits the old handle during `Resolving`, before
//! touching the controller slot, so destructive steps of consecutive
//! transitions never interleave. With no prior handle the wait completes
//! immediately. Handles are [`Shared`] futures: awaiting the prior handle
//! also drives it, so a chain of transitions makes progress as long as the
//! newest one is polled.
//!
//! # Borrowing
//!
//! Shell state lives in `RefCell`s. Every step borrows only long enough to
//! read state or obtain a `'static` future, and never across an `.await` or a
//! call into the router, hooks, event listeners or controllers, all of which
//! may re-enter the application. Controllers run against a
//! [`HostedController`] handle taken out of the host, never under a host
//! borrow.

use super::application::Shell;
use super::events::ShellEvent;
use super::host::{HostedController, PreparedController};
use crate::domain::{ControllerError, ControllerFactory, ControllerRef, RouteArgs};
use crate::infrastructure::{normalize_fragment, NavigateOptions};
use chrono::{DateTime, Utc};
use futures_util::future::{self, FutureExt, LocalBoxFuture, Shared};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;
use tracing::Instrument;

/// Handle to a begun transition. Cloneable; every clone resolves to the same
/// outcome.
pub type TransitionHandle = Shared<LocalBoxFuture<'static, TransitionOutcome>>;

/// Phases of a transition, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Guarding,
    Resolving,
    Committing,
    Unloading,
    Destroying,
    Constructing,
    Starting,
    Settled,
}

/// Why a transition was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// `can_leave_current_controller` denied leaving.
    GuardRejected,
    /// A newer transition began before this one committed.
    Superseded,
    /// The application was dropped before the route handler fired.
    Detached,
}

/// A genuine transition failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("failed to load controller {path:?}: {source}")]
    Load {
        path: String,
        source: ControllerError,
    },

    #[error("controller {controller:?} failed to unload: {source}")]
    Unload {
        controller: String,
        source: ControllerError,
    },

    #[error("controller {controller:?} failed to destroy: {source}")]
    Destroy {
        controller: String,
        source: ControllerError,
    },

    #[error("controller {controller:?} failed to start: {source}")]
    Start {
        controller: String,
        source: ControllerError,
    },
}

/// How a transition settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Completed,
    Cancelled(CancelReason),
    Failed(TransitionError),
}

impl TransitionOutcome {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// A handle that has already settled with `outcome`.
    #[must_use]
    pub fn into_handle(self) -> TransitionHandle {
        future::ready(self).boxed_local().shared()
    }
}

/// Summary of a settled transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub route: String,
    pub previous_route: Option<String>,
    pub generation: u64,
    pub outcome: TransitionOutcome,
    /// Last phase entered before settling.
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The route a committed transition left active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
    /// Route name, i.e. the pattern it was registered under.
    pub name: String,
    /// Fragment the router showed when the route committed.
    pub fragment: String,
}

/// Single-slot serializer for transitions.
#[derive(Default)]
pub struct TransitionEngine {
    current: RefCell<Option<TransitionHandle>>,
    generation: Cell<u64>,
    last_report: RefCell<Option<TransitionReport>>,
}

impl TransitionEngine {
    /// Claims the slot for a new transition: bumps the generation and hands
    /// back the previous handle, if any.
    pub(crate) fn claim(&self) -> (u64, Option<TransitionHandle>) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        (generation, self.current.borrow_mut().take())
    }

    pub(crate) fn install(&self, handle: TransitionHandle) {
        *self.current.borrow_mut() = Some(handle);
    }

    /// Generation of the most recently begun transition.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Handle of the most recently begun transition.
    #[must_use]
    pub fn current(&self) -> Option<TransitionHandle> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn last_report(&self) -> Option<TransitionReport> {
        self.last_report.borrow().clone()
    }

    fn record(&self, report: TransitionReport) {
        *self.last_report.borrow_mut() = Some(report);
    }
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("in_flight", &self.current.borrow().is_some())
            .field("generation", &self.generation.get())
            .field("last_report", &self.last_report.borrow())
            .finish()
    }
}

/// Step state carrying what each phase needs from the one before.
enum Step {
    Guarding,
    Resolving,
    Committing(ControllerFactory),
    Unloading(ControllerFactory),
    Destroying(ControllerFactory),
    Constructing(ControllerFactory),
    Starting(HostedController),
    Settled,
}

impl Step {
    const fn phase(&self) -> Phase {
        match self {
            Self::Guarding => Phase::Guarding,
            Self::Resolving => Phase::Resolving,
            Self::Committing(_) => Phase::Committing,
            Self::Unloading(_) => Phase::Unloading,
            Self::Destroying(_) => Phase::Destroying,
            Self::Constructing(_) => Phase::Constructing,
            Self::Starting(_) => Phase::Starting,
            Self::Settled => Phase::Settled,
        }
    }
}

/// Why a step stopped the chain early.
enum Interrupt {
    Cancelled(CancelReason),
    Failed(TransitionError),
}

impl From<TransitionError> for Interrupt {
    fn from(error: TransitionError) -> Self {
        Self::Failed(error)
    }
}

type StepResult = Result<Step, Interrupt>;

/// One navigation attempt.
pub(crate) struct Transition {
    shell: Rc<Shell>,
    route: String,
    controller: ControllerRef,
    args: RouteArgs,
    /// Fragment the router showed when the transition began.
    fragment: String,
    previous_route: Option<ActiveRoute>,
    previous: Option<TransitionHandle>,
    generation: u64,
    phase: Phase,
    started_at: DateTime<Utc>,
}

impl Transition {
    /// Registers a new transition with the engine and returns its handle.
    ///
    /// Nothing runs until the handle is polled.
    pub(crate) fn begin(
        shell: &Rc<Shell>,
        route: &str,
        controller: ControllerRef,
        args: RouteArgs,
    ) -> TransitionHandle {
        let previous_route = shell.active_route.borrow().clone();
        let fragment = normalize_fragment(&shell.router.hash());
        let (generation, previous) = shell.engine.claim();

        tracing::debug!(
            route = %route,
            generation = generation,
            previous_route = ?previous_route.as_ref().map(|r| &r.name),
            chained = previous.is_some(),
            "transition begun"
        );

        let transition = Self {
            shell: Rc::clone(shell),
            route: route.to_string(),
            controller,
            args,
            fragment,
            previous_route,
            previous,
            generation,
            phase: Phase::Guarding,
            started_at: Utc::now(),
        };

        let span = tracing::debug_span!("transition", route = %route, generation = generation);
        let handle = transition.run().instrument(span).boxed_local().shared();
        shell.engine.install(handle.clone());
        handle
    }

    async fn run(mut self) -> TransitionOutcome {
        self.shell.hooks.show_loading();

        let mut step = Step::Guarding;
        let outcome = loop {
            self.phase = step.phase();
            let next = match step {
                Step::Guarding => self.guard().await,
                Step::Resolving => self.resolve().await,
                Step::Committing(factory) => Ok(self.commit(factory)),
                Step::Unloading(factory) => self.unload(factory).await,
                Step::Destroying(factory) => self.destroy(factory).await,
                Step::Constructing(factory) => Ok(self.construct(&factory)),
                Step::Starting(info) => self.start(info).await,
                Step::Settled => break TransitionOutcome::Completed,
            };

            step = match next {
                Ok(step) => step,
                Err(Interrupt::Cancelled(reason)) => break TransitionOutcome::Cancelled(reason),
                Err(Interrupt::Failed(error)) => break TransitionOutcome::Failed(error),
            };
        };

        self.shell.hooks.hide_loading();
        self.settle(&outcome);
        self.report(&outcome);
        outcome
    }

    async fn guard(&mut self) -> StepResult {
        let current = self.shell.host.borrow().current().cloned();
        let allowed = self
            .shell
            .hooks
            .can_leave_current_controller(current.as_ref())
            .await;

        if allowed {
            Ok(Step::Resolving)
        } else {
            tracing::debug!(current = ?current.map(|c| c.name), "leave guard rejected navigation");
            Err(Interrupt::Cancelled(CancelReason::GuardRejected))
        }
    }

    async fn resolve(&mut self) -> StepResult {
        let resolution = self.resolution();
        let previous = self.previous.take();
        let wait_previous = async move {
            if let Some(previous) = previous {
                let outcome = previous.await;
                tracing::debug!(previous_outcome = ?outcome, "previous transition settled");
            }
        };

        let (resolved, ()) = future::join(resolution, wait_previous).await;

        if self.shell.engine.generation() != self.generation {
            tracing::debug!(
                latest = self.shell.engine.generation(),
                "superseded before commit, discarding controller"
            );
            return Err(Interrupt::Cancelled(CancelReason::Superseded));
        }

        Ok(Step::Committing(resolved?))
    }

    fn resolution(&self) -> LocalBoxFuture<'static, Result<ControllerFactory, TransitionError>> {
        match &self.controller {
            ControllerRef::Constructor(factory) => future::ready(Ok(factory.clone())).boxed_local(),
            ControllerRef::Deferred(token) => {
                let path = self.shell.hooks.get_controller_path(token);
                tracing::debug!(token = %token, path = %path, "loading deferred controller");
                let loading = self.shell.loader.load(&path);
                async move { loading.await.map_err(|source| TransitionError::Load { path, source }) }
                    .boxed_local()
            }
        }
    }

    fn commit(&mut self, factory: ControllerFactory) -> Step {
        let fragment = normalize_fragment(&self.shell.router.hash());
        *self.shell.active_route.borrow_mut() = Some(ActiveRoute {
            name: self.route.clone(),
            fragment,
        });
        self.shell.events.emit(&ShellEvent::Route(self.route.clone()));

        let current = self.shell.host.borrow().current().cloned();
        self.shell.hooks.hide_controller(current.as_ref());
        Step::Unloading(factory)
    }

    async fn unload(&mut self, factory: ControllerFactory) -> StepResult {
        self.shell.hooks.show_loading();

        let outgoing = self.shell.host.borrow().current_hosted();
        if let Some(outgoing) = outgoing {
            outgoing.unload().await.map_err(|source| TransitionError::Unload {
                controller: outgoing.info.name.clone(),
                source,
            })?;
        }
        Ok(Step::Destroying(factory))
    }

    async fn destroy(&mut self, factory: ControllerFactory) -> StepResult {
        let outgoing = self.shell.host.borrow_mut().take_current();
        if let Some(outgoing) = outgoing {
            let controller = outgoing.info.name.clone();
            outgoing
                .destroy()
                .await
                .map_err(|source| TransitionError::Destroy { controller, source })?;
        }
        Ok(Step::Constructing(factory))
    }

    fn construct(&mut self, factory: &ControllerFactory) -> Step {
        let prepared = PreparedController::build(factory);
        let (hosted, container) = {
            let mut host = self.shell.host.borrow_mut();
            (host.attach(prepared), host.container())
        };
        hosted.setup_view(&container);

        self.shell.events.emit(&ShellEvent::InitController(hosted.info.clone()));
        Step::Starting(hosted)
    }

    async fn start(&mut self, hosted: HostedController) -> StepResult {
        let info = hosted.info.clone();
        hosted.start(self.args.clone()).await.map_err(|source| TransitionError::Start {
            controller: info.name.clone(),
            source,
        })?;

        tracing::debug!(controller = %info.id, name = %info.name, "controller started");
        self.shell.events.emit(&ShellEvent::StartController(info));
        Ok(Step::Settled)
    }

    /// Terminal handler: every outcome passes through here exactly once.
    fn settle(&self, outcome: &TransitionOutcome) {
        match outcome {
            TransitionOutcome::Completed => {
                tracing::debug!("transition completed");
            }
            TransitionOutcome::Cancelled(CancelReason::GuardRejected) => self.restore_previous_fragment(),
            TransitionOutcome::Cancelled(reason) => {
                tracing::debug!(reason = ?reason, "transition cancelled");
            }
            TransitionOutcome::Failed(error) => self.recover(error),
        }
    }

    /// Puts the URL back after the guard kept the user on the current page.
    ///
    /// Skipped only when both the route and the fragment are unchanged, so a
    /// rejected `item/1 → item/2` still restores `item/1`. The restore never
    /// triggers a handler and cannot loop.
    fn restore_previous_fragment(&self) {
        match &self.previous_route {
            Some(previous) if previous.name == self.route && previous.fragment == self.fragment => {
                tracing::debug!("guard rejected navigation to the active route, not navigating");
            }
            Some(previous) => {
                tracing::debug!(fragment = %previous.fragment, "guard rejected navigation, restoring fragment");
                self.shell.router.navigate(&previous.fragment, NavigateOptions::restore());
            }
            None => {
                tracing::debug!("guard rejected the first navigation, nothing to restore");
            }
        }
    }

    fn recover(&self, error: &TransitionError) {
        tracing::warn!(error = %error, phase = ?self.phase, "transition failed");

        let hash = self.shell.router.hash();
        let handled = self.shell.hooks.route_did_fail(&hash, &self.args);
        *self.shell.active_route.borrow_mut() = None;

        if handled {
            tracing::debug!("failure handled by route_did_fail hook");
            return;
        }

        if self.shell.engine.generation() != self.generation {
            tracing::debug!("a newer transition is queued, skipping fallback navigation");
            return;
        }

        let target = self.previous_route.as_ref().map_or_else(
            || normalize_fragment(&self.shell.initial_route()),
            |previous| previous.fragment.clone(),
        );

        if target == self.fragment {
            tracing::debug!(fragment = %target, "fallback would reopen the failing route, not navigating");
            return;
        }

        tracing::debug!(fragment = %target, "navigating back after failure");
        self.shell.router.navigate(&target, NavigateOptions::forced());
    }

    fn report(&self, outcome: &TransitionOutcome) {
        let finished_at = Utc::now();
        tracing::debug!(
            outcome = ?outcome,
            elapsed_ms = (finished_at - self.started_at).num_milliseconds(),
            "transition settled"
        );

        self.shell.engine.record(TransitionReport {
            route: self.route.clone(),
            previous_route: self.previous_route.as_ref().map(|r| r.name.clone()),
            generation: self.generation,
            outcome: outcome.clone(),
            phase: self.phase,
            started_at: self.started_at,
            finished_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn claim_hands_back_previous_handle_once() {
        let engine = TransitionEngine::default();
        let (first, previous) = engine.claim();
        assert_eq!(first, 1);
        assert!(previous.is_none());

        engine.install(TransitionOutcome::Completed.into_handle());
        let (second, previous) = engine.claim();
        assert_eq!(second, 2);
        assert_eq!(previous.map(block_on), Some(TransitionOutcome::Completed));
        assert!(engine.current().is_none());
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Guarding < Phase::Resolving);
        assert!(Phase::Destroying < Phase::Constructing);
        assert!(Phase::Starting < Phase::Settled);
    }

    #[test]
    fn outcome_predicates() {
        assert!(TransitionOutcome::Completed.is_completed());
        assert!(TransitionOutcome::Cancelled(CancelReason::Superseded).is_cancelled());
        let failed = TransitionOutcome::Failed(TransitionError::Start {
            controller: "Inbox".into(),
            source: ControllerError::new("boom"),
        });
        assert!(!failed.is_completed() && !failed.is_cancelled());
    }

    #[test]
    fn errors_name_the_controller() {
        let error = TransitionError::Unload {
            controller: "Inbox".into(),
            source: ControllerError::new("still saving"),
        };
        assert_eq!(error.to_string(), "controller \"Inbox\" failed to unload: still saving");
    }
}
