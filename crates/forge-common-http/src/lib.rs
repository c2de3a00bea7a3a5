// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Forge.
//!
//! This crate provides pre-configured blocking HTTP client construction
//! with a consistent User-Agent header. The crash-forwarding path is
//! synchronous end to end, so only the blocking client is exposed.

mod client;

pub use client::{blocking_builder, new_blocking_client_with_timeout, user_agent};
