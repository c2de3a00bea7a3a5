// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for crash forwarding.

use thiserror::Error;

/// Result type alias for crash forwarding operations.
pub type Result<T> = std::result::Result<T, ForwardError>;

/// Errors that can occur while forwarding a crash report.
///
/// On the crash path every one of these is converted to a failed delivery
/// outcome at the forwarder boundary; none of them may escape the handler
/// chain.
#[derive(Debug, Error)]
pub enum ForwardError {
	/// An application state collaborator is required to build the handler.
	#[error("application state collaborator is required")]
	MissingApplication,

	/// HTTP request failed (connect error, timeout, TLS setup).
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	/// Development server answered with a non-success status.
	#[error("development server error (status {status})")]
	ServerStatus {
		/// HTTP status code.
		status: u16,
	},

	/// Failed to serialize queued entries.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
