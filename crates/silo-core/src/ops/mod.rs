//! Operation orchestration.
//!
//! This module contains the multi-call flows behind the facade, organized
//! into submodules by category. Each function takes the backend, the
//! already-resolved scope, and the operation's inputs; the facade handles
//! in [`crate::client`], [`crate::bucket`], and [`crate::object`] resolve
//! scopes and delegate here.

pub(crate) mod bucket;
pub(crate) mod list;
pub(crate) mod object;
pub(crate) mod purge;
pub(crate) mod tags;
