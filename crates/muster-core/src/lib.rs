//! Core types and trait definitions for the Muster guild ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod catalog;
pub mod ledger;
pub mod member;
pub mod store;
