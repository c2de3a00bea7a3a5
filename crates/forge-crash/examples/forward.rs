// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: forward a crash to a locally-running development server.
//!
//! Run with:
//!   FORGE_LOGS_URL=http://127.0.0.1:8081/logs cargo run --example forward -p forge-crash

use std::sync::Arc;

use forge_crash::{ApplicationState, CrashHandler};
use url::Url;

/// Stand-in for the launcher's application state: always running, with a
/// manifest that names the log endpoint directly.
struct DemoApplication {
	logs_url: String,
}

impl ApplicationState for DemoApplication {
	fn is_running(&self) -> bool {
		true
	}

	fn manifest(&self) -> Option<serde_json::Value> {
		Some(serde_json::json!({ "logsUrl": self.logs_url }))
	}

	fn bundle_origin(&self) -> Option<Url> {
		None
	}
}

fn main() {
	tracing_subscriber::fmt::init();

	let logs_url = std::env::var("FORGE_LOGS_URL")
		.unwrap_or_else(|_| "http://127.0.0.1:8081/logs".to_string());

	println!("Forwarding crash reports to {logs_url}");

	let handler = CrashHandler::builder()
		.application(Arc::new(DemoApplication { logs_url }))
		.build()
		.expect("application state provided");

	handler.set_installed(true);

	// The report is flushed to the development server before the default
	// panic output below appears.
	panic!("demo crash from the forge example");
}
