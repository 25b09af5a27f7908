//! Reusable Vault-Tec widgets.

pub mod confirm;
pub mod footer;
pub mod header;
pub mod help;
pub mod input;
pub mod panels;
pub mod spinner;
pub mod table;
pub mod trace_bar;
