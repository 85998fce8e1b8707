// Copyright 2026 Lexwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lexwatch library — tiered, bandwidth-minimizing change detection for
//! consolidated-law documents.
//!
//! This library crate exposes the core modules for integration testing.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod marker;
pub mod monitor;
pub mod probe;
pub mod rest;
