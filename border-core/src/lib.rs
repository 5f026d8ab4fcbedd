#![warn(missing_docs)]
//! Core abstractions shared by the environments of the library.
//!
//! An environment implements [`Env`]. At every interaction step it emits a [`Step`]
//! object together with a [`Record`](record::Record), which can be handed to a
//! [`Recorder`](record::Recorder) by the caller. Environments are often built
//! as a stack of wrappers, each of which implements [`Env`] and owns its inner
//! environment.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};
