//! handlers/mod.rs
pub mod call_handler;
pub mod company_handler;
