// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared blocking HTTP client with consistent User-Agent header.

use forge_common_version::BuildInfo;
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a new blocking HTTP client builder with the standard Forge
/// User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = forge_common_http::blocking_builder()
///     .timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub fn blocking_builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new blocking HTTP client with a request timeout and the
/// standard User-Agent.
///
/// Client construction can fail (TLS backend initialization); callers on
/// the crash path must treat that as a delivery failure, not a panic.
pub fn new_blocking_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	blocking_builder().timeout(timeout).build()
}

/// Returns the standard Forge User-Agent string.
///
/// Format: `forge/{platform}/{git_sha}`
pub fn user_agent() -> String {
	let info = BuildInfo::current();
	format!("forge/{}/{}", info.platform, info.git_sha)
}
