//! End-to-end tests of the headless binary.

pub mod common;
pub mod headless_test;
