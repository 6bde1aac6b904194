//! tests/mod.rs
mod support;

mod call_handler_tests;
mod classifier_tests;
