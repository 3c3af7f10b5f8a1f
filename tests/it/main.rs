//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary following matklad's best practices,
//! reducing linking overhead from one binary per file to one.
//!
//! Structure:
//! - helpers: Builders and fixture generators shared by every test
//! - integration: Multi-component workflow tests driven through the controller
//! - unit: Single-component unit tests

mod integration;
mod unit;
