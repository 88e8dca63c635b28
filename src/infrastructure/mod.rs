//! Infrastructure layer: the collaborators the shell drives.
//!
//! The shell only orchestrates. Rendering, routing and module loading are
//! reached through the traits defined here, and this module also ships
//! in-memory implementations for headless embedding and tests.
//!
//! # Modules
//!
//! - [`view`]: Content container contract
//! - [`router`]: Router/history contract and navigation options
//! - [`loader`]: Deferred controller loading
//! - [`fragment`]: Fragment normalization and pattern matching
//! - [`memory`]: In-memory router and container

pub mod fragment;
pub mod loader;
pub mod memory;
pub mod router;
pub mod view;

pub use fragment::{match_pattern, normalize_fragment};
pub use loader::{ControllerLoader, LoadFuture, StaticLoader};
pub use memory::{ContainerSnapshot, MemoryContainer, MemoryRouter, NavigationRecord};
pub use router::{NavigateOptions, RouteHandler, Router};
pub use view::ViewContainer;
