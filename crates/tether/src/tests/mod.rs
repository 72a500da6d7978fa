//! Test suites for the command bridge.

pub(crate) mod support;
