// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP delivery of queued log entries to the development server.

use std::time::Duration;

use forge_common_version::{headers, BuildInfo};
use tracing::debug;
use url::Url;

use crate::error::{ForwardError, Result};

/// Sender used by the forwarder to deliver one payload to one endpoint.
///
/// Implementations must respect `timeout` as a hard ceiling on the whole
/// call: the caller may be the last thing standing between a fatal error
/// and process termination.
pub trait LogTransport: Send + Sync {
	fn send(&self, endpoint: &Url, payload: &serde_json::Value, timeout: Duration) -> Result<()>;
}

/// Blocking HTTP transport.
///
/// The client is built per call rather than held long-lived: transports on
/// the crash path are constructed per crash event, and a process about to
/// terminate has no connection pool worth keeping warm.
pub struct HttpTransport;

impl LogTransport for HttpTransport {
	fn send(&self, endpoint: &Url, payload: &serde_json::Value, timeout: Duration) -> Result<()> {
		let client = forge_common_http::new_blocking_client_with_timeout(timeout)?;
		let build = BuildInfo::current();

		let response = client
			.post(endpoint.clone())
			.header(headers::VERSION, build.version)
			.header(headers::GIT_SHA, build.git_sha)
			.json(payload)
			.send()?;

		let status = response.status();
		if status.is_success() {
			debug!(endpoint = %endpoint, status = status.as_u16(), "log payload accepted");
			Ok(())
		} else {
			Err(ForwardError::ServerStatus {
				status: status.as_u16(),
			})
		}
	}
}
