//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve search pages and an in-memory renderer
//! in place of the headless browser.

mod common;
mod pipeline_tests;
