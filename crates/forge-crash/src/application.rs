// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only view of the currently launched application.

use url::Url;

/// State of the application the harness is currently running, owned by the
/// launcher.
///
/// The crash handler only ever reads this state; it is consulted fresh on
/// every crash event because the active application (and therefore its
/// manifest and bundle origin) can change between installs.
pub trait ApplicationState: Send + Sync {
	/// Whether an application bundle is currently executing under the
	/// harness. When nothing is running there is no development server
	/// session to report to.
	fn is_running(&self) -> bool;

	/// The manifest document the development server delivered with the
	/// bundle, when one was served.
	fn manifest(&self) -> Option<serde_json::Value>;

	/// Origin URL the application bundle was loaded from.
	fn bundle_origin(&self) -> Option<Url>;
}
