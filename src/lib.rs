//! pageshell: an application shell that hands the page from one controller to
//! the next on navigation.
//!
//! pageshell provides:
//! - A route registry binding route patterns to controllers, eager or loaded
//!   on first visit
//! - A transition state machine that guards, loads, tears down and starts
//!   controllers in a fixed order
//! - Serialization of overlapping navigations, with superseded and
//!   guard-rejected transitions cancelled rather than failed
//! - Failure recovery through an application hook and fallback navigation
//! - Lifecycle events (`route`, `init:controller`, `start:controller`)
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Embedding application (router, view, hooks)        │  ← Collaborators
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Route registry                                   │
//! │  - Transition engine                                │
//! │  - Controller host                                  │
//! └─────────────────────────────────────────────────────┘
//!         │                                     │
//! ┌───────────────────────┐   ┌─────────────────────────┐
//! │ Domain (domain/)      │   │ Infrastructure          │
//! │ - Controller contract │   │ (infrastructure/)       │
//! │ - Errors              │   │ - Router/view/loader    │
//! │                       │   │ - In-memory doubles     │
//! └───────────────────────┘   └─────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing subscriber setup                         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Application handle, route registry, transition engine, host
//! - [`domain`]: Controller contract and error types
//! - [`infrastructure`]: Router, view and loader contracts plus in-memory
//!   implementations
//! - [`observability`]: Tracing subscriber setup
//!
//! # Configuration
//!
//! The shell can be configured in code or from TOML/JSON:
//!
//! ```toml
//! initial_route = "inbox"
//! trace_level = "debug"
//!
//! [[routes]]
//! pattern = "inbox"
//! controller = "pages/inbox"
//!
//! [[routes]]
//! pattern = "message/:id"
//! controller = "pages/message"
//! ```
//!
//! # Transition Flow
//!
//! 1. **Guard**: ask whether the current controller may be left
//! 2. **Resolve**: load the controller and wait for the previous transition
//! 3. **Commit**: set the active route, emit `route`, hide the old view
//! 4. **Unload** and **destroy** the old controller
//! 5. **Construct** and attach the new controller, emit `init:controller`
//! 6. **Start** it, emit `start:controller`
//! 7. Hide the loading indicator; on failure run the recovery path
//!
//! # Threading
//!
//! Everything is single-threaded (`Rc`, `RefCell`, local futures). Route
//! handlers return transition handles that the embedder polls on its local
//! executor.

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;

pub use app::{
    Application, CancelReason, Phase, RouteTable, ShellEvent, ShellHooks, ShellOptions,
    TransitionError, TransitionHandle, TransitionOutcome,
};
pub use domain::{Controller, ControllerError, ControllerFactory, ControllerRef, Result, ShellError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One route from configuration: a pattern and the controller path loaded
/// when it is first visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub pattern: String,
    pub controller: String,
}

/// Shell configuration.
///
/// # Example
///
/// ```toml
/// initial_route = "inbox"
/// trace_level = "debug"
///
/// [[routes]]
/// pattern = "inbox"
/// controller = "pages/inbox"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Route opened when history has nothing to resume.
    ///
    /// Overridden by the `initial_route` hook when it returns a value.
    /// Default: `""` (the root route)
    pub initial_route: String,

    /// Tracing level for the subscriber installed by
    /// [`observability::init_tracing`].
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Deferred routes, appended after routes defined in code.
    pub routes: Vec<RouteSpec>,
}

impl ShellConfig {
    /// Parses configuration from a flat string map, such as data attributes
    /// on the host element.
    ///
    /// # Parsing Rules
    ///
    /// - `initial_route`: String, leading `#` stripped
    /// - `trace_level`: String → `Option<String>`
    /// - `routes`: comma-separated `pattern=controller` pairs; pairs without
    ///   `=` are skipped
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use pageshell::ShellConfig;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("initial_route".to_string(), "#inbox".to_string());
    /// map.insert("routes".to_string(), "inbox=pages/inbox, message/:id=pages/message".to_string());
    ///
    /// let config = ShellConfig::from_map(&map);
    /// assert_eq!(config.initial_route, "inbox");
    /// assert_eq!(config.routes.len(), 2);
    /// assert_eq!(config.routes[1].pattern, "message/:id");
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let routes = config
            .get("routes")
            .map(|s| {
                s.split(',')
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(pattern, controller)| RouteSpec {
                        pattern: pattern.trim().to_string(),
                        controller: controller.trim().to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            initial_route: config
                .get("initial_route")
                .map(|s| infrastructure::normalize_fragment(s))
                .unwrap_or_default(),
            trace_level: config.get("trace_level").cloned(),
            routes,
        }
    }

    /// Parses TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Toml`] on malformed input.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Parses JSON configuration, e.g. options handed over by the page.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Json`] on malformed input.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Reads configuration from a file. Files ending in `.json` are parsed as
    /// JSON, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Io`] when the file cannot be read, or a parse
    /// error from the matching format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        tracing::debug!(path = %path.display(), routes = config.routes.len(), "loaded shell configuration");
        Ok(config)
    }
}
