// Copyright 2026 Montax Contributors
// SPDX-License-Identifier: Apache-2.0

//! Montax library — search and export public tax records from the
//! Monongalia County sheriff's tax portal.
//!
//! This library crate exposes the core modules for integration testing.

pub mod artifacts;
pub mod cli;
pub mod client;
pub mod export;
pub mod extract;
pub mod logging;
pub mod paginate;
pub mod query;
pub mod session;
