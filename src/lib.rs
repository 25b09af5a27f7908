//! Vault-Tec Enterprise Suite: a themed terminal dashboard for the monk CLI.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod mock;
pub mod monk;
pub mod session;
pub mod tui;
