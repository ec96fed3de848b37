//! Authentication session lifecycle for the hosted identity provider:
//! token acquisition, in-memory session state, route guarding, and the
//! callback that finishes the authorization-code flow.

pub mod callback;
pub mod controller;
pub mod error;
pub mod guard;
pub mod idp;
pub mod session;
