//! Bridge tests against real child processes.

pub mod client_test;
