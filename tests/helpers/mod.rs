// ABOUTME: Test helper module exports
// ABOUTME: Provides the axum request helper used across integration tests

pub mod axum_test;
