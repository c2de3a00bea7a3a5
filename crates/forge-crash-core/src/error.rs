// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash forwarding core.

use thiserror::Error;

/// Errors that can occur when working with core crash types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid log level: {0}")]
	InvalidLogLevel(String),
}

/// Result type for core crash operations.
pub type Result<T> = std::result::Result<T, CoreError>;
