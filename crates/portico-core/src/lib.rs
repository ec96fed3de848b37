//! Core Portico library (config, identity provider client, session, guards).

pub mod auth;
pub mod config;
pub mod logging;
