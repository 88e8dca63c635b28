//! Domain layer for the pageshell crate.
//!
//! This module contains the types the shell shares with the controllers it
//! hosts, independent of any particular view layer or router.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`controller`]: Controller contract, factories and route references

pub mod controller;
pub mod error;

pub use controller::{
    class_name_for, failed, settled, Controller, ControllerFactory, ControllerId, ControllerInfo,
    ControllerRef, LifecycleFuture, RouteArgs,
};
pub use error::{ControllerError, Result, ShellError};
