// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify properties that must hold for
//! all inputs: identifier stability, metadata flattening and the cache
//! capacity bound.

mod property;
