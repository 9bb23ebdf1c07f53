#![warn(missing_docs)]
//! Core abstractions shared by the tarmac crates.
//!
//! This crate defines how an agent interacts with a driving environment:
//! [`Env`] produces [`Step`] objects, a [`Policy`] maps observations to
//! actions, and [`record`] carries per-step diagnostics such as the expert
//! action attached by the scenario environment.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};
