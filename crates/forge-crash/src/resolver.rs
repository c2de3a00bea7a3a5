// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution of the development server's log ingestion endpoint.

use tracing::debug;
use url::Url;

use crate::application::ApplicationState;

/// Manifest field naming the log ingestion endpoint.
const MANIFEST_LOGS_URL: &str = "logsUrl";

/// Well-known path under the bundle origin, used when the manifest does not
/// name an endpoint explicitly.
const LOGS_PATH_SEGMENT: &str = "logs";

/// Derives the endpoint crash reports should be sent to for the currently
/// running application, or `None` when forwarding is impossible.
///
/// Sources, first success wins:
/// 1. the manifest's `logsUrl` field, when present and well-formed;
/// 2. the bundle origin with the `logs` segment appended
///    (`https://dev.example/app` becomes `https://dev.example/app/logs`).
///
/// Malformed manifest URLs never raise; they fall through to the bundle
/// origin. The result is derived fresh per crash event and must not be
/// cached across installs.
pub fn resolve_logs_endpoint(app: &dyn ApplicationState) -> Option<Url> {
	if let Some(manifest) = app.manifest() {
		if let Some(raw) = manifest.get(MANIFEST_LOGS_URL).and_then(|value| value.as_str()) {
			match Url::parse(raw) {
				Ok(url) => return Some(url),
				Err(error) => {
					debug!(url = raw, error = %error, "manifest logsUrl is malformed, falling back to bundle origin");
				}
			}
		}
	}

	let origin = app.bundle_origin()?;
	with_logs_segment(origin)
}

/// Appends the well-known segment to the origin's path, keeping the rest of
/// the URL intact. Returns `None` for origins that cannot carry a path
/// (e.g. `mailto:`).
fn with_logs_segment(mut url: Url) -> Option<Url> {
	url.path_segments_mut().ok()?.pop_if_empty().push(LOGS_PATH_SEGMENT);
	Some(url)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Application fake that counts how often each source is consulted.
	#[derive(Default)]
	struct SourcesApp {
		manifest: Option<serde_json::Value>,
		origin: Option<Url>,
		origin_reads: AtomicUsize,
	}

	impl ApplicationState for SourcesApp {
		fn is_running(&self) -> bool {
			true
		}

		fn manifest(&self) -> Option<serde_json::Value> {
			self.manifest.clone()
		}

		fn bundle_origin(&self) -> Option<Url> {
			self.origin_reads.fetch_add(1, Ordering::SeqCst);
			self.origin.clone()
		}
	}

	#[test]
	fn manifest_url_wins_without_consulting_origin() {
		let app = SourcesApp {
			manifest: Some(serde_json::json!({ "logsUrl": "https://dev.example/logs" })),
			origin: Some(Url::parse("https://dev.example/app").unwrap()),
			..Default::default()
		};

		let endpoint = resolve_logs_endpoint(&app).unwrap();
		assert_eq!(endpoint.as_str(), "https://dev.example/logs");
		assert_eq!(app.origin_reads.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn origin_gets_logs_segment_appended() {
		let app = SourcesApp {
			origin: Some(Url::parse("https://dev.example/app").unwrap()),
			..Default::default()
		};

		let endpoint = resolve_logs_endpoint(&app).unwrap();
		assert_eq!(endpoint.as_str(), "https://dev.example/app/logs");
	}

	#[test]
	fn origin_trailing_slash_does_not_double_segment() {
		let app = SourcesApp {
			origin: Some(Url::parse("http://localhost:8081/bundles/").unwrap()),
			..Default::default()
		};

		let endpoint = resolve_logs_endpoint(&app).unwrap();
		assert_eq!(endpoint.as_str(), "http://localhost:8081/bundles/logs");
	}

	#[test]
	fn malformed_manifest_url_falls_through_to_origin() {
		let app = SourcesApp {
			manifest: Some(serde_json::json!({ "logsUrl": "not a url" })),
			origin: Some(Url::parse("https://dev.example/app").unwrap()),
			..Default::default()
		};

		let endpoint = resolve_logs_endpoint(&app).unwrap();
		assert_eq!(endpoint.as_str(), "https://dev.example/app/logs");
	}

	#[test]
	fn non_string_manifest_field_falls_through() {
		let app = SourcesApp {
			manifest: Some(serde_json::json!({ "logsUrl": 42 })),
			origin: Some(Url::parse("https://dev.example/app").unwrap()),
			..Default::default()
		};

		let endpoint = resolve_logs_endpoint(&app).unwrap();
		assert_eq!(endpoint.as_str(), "https://dev.example/app/logs");
	}

	#[test]
	fn no_sources_resolves_to_none() {
		let app = SourcesApp::default();
		assert!(resolve_logs_endpoint(&app).is_none());
	}

	#[test]
	fn pathless_origin_resolves_to_none() {
		let app = SourcesApp {
			origin: Some(Url::parse("mailto:dev@example.com").unwrap()),
			..Default::default()
		};
		assert!(resolve_logs_endpoint(&app).is_none());
	}
}
