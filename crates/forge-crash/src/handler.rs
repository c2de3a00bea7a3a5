// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide interception of uncaught fatal errors.
//!
//! The handler installs itself as the runtime's last-resort error hook,
//! forwards crash information to the development server, and then hands the
//! error to whichever handler was registered before it: another diagnostic
//! tool's, a crash reporter's, or the runtime default.

use std::panic::{catch_unwind, AssertUnwindSafe, PanicHookInfo};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use forge_crash_core::ExceptionRecord;
use tracing::{debug, error, warn};

use crate::application::ApplicationState;
use crate::backtrace::capture_stacktrace;
use crate::error::{ForwardError, Result};
use crate::forwarder::{FlushOutcome, RemoteLogForwarder, DEFAULT_FLUSH_TIMEOUT};
use crate::registry::{FatalHandler, HandlerRegistry, StdPanicHooks};
use crate::resolver::resolve_logs_endpoint;
use crate::transport::{HttpTransport, LogTransport};

/// Note forwarded ahead of the structured record so the developer sees
/// context before the stack trace.
const CRASH_NOTE: &str = "Your app just crashed. See the error below.";

/// Classification applied to errors intercepted by this handler.
const PANIC_KIND: &str = "panic";

/// Builder for constructing a [`CrashHandler`].
pub struct CrashHandlerBuilder {
	application: Option<Arc<dyn ApplicationState>>,
	registry: Arc<dyn HandlerRegistry>,
	transport: Arc<dyn LogTransport>,
	flush_timeout: Duration,
}

impl CrashHandlerBuilder {
	/// Creates a builder wired to the `std::panic` hook and HTTP delivery.
	pub fn new() -> Self {
		Self {
			application: None,
			registry: Arc::new(StdPanicHooks),
			transport: Arc::new(HttpTransport),
			flush_timeout: DEFAULT_FLUSH_TIMEOUT,
		}
	}

	/// Sets the application state collaborator (required).
	pub fn application(mut self, application: Arc<dyn ApplicationState>) -> Self {
		self.application = Some(application);
		self
	}

	/// Overrides the fatal-handler registration point.
	pub fn registry(mut self, registry: Arc<dyn HandlerRegistry>) -> Self {
		self.registry = registry;
		self
	}

	/// Overrides the delivery transport.
	pub fn transport(mut self, transport: Arc<dyn LogTransport>) -> Self {
		self.transport = transport;
		self
	}

	/// Sets the ceiling on one crash-report flush.
	pub fn flush_timeout(mut self, timeout: Duration) -> Self {
		self.flush_timeout = timeout;
		self
	}

	pub fn build(self) -> Result<CrashHandler> {
		let application = self.application.ok_or(ForwardError::MissingApplication)?;

		Ok(CrashHandler {
			inner: Arc::new(HandlerShared {
				application,
				registry: self.registry,
				transport: self.transport,
				flush_timeout: self.flush_timeout,
				installed: Mutex::new(false),
				prior: Mutex::new(None),
			}),
		})
	}
}

impl Default for CrashHandlerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Interceptor for uncaught fatal errors.
///
/// At most one install side effect is live at any time: installing saves the
/// previously-registered handler, uninstalling restores it, and requesting
/// the current state is a no-op. The crash callback itself forwards a report
/// to the development server (best effort, bounded by the flush timeout) and
/// then unconditionally delegates to the saved prior handler.
///
/// # Example
///
/// ```ignore
/// let handler = CrashHandler::builder()
///     .application(launcher.application_state())
///     .build()?;
///
/// handler.set_installed(true);
/// // ... session runs, crashes are forwarded to the dev server ...
/// handler.set_installed(false);
/// ```
#[derive(Clone)]
pub struct CrashHandler {
	inner: Arc<HandlerShared>,
}

struct HandlerShared {
	application: Arc<dyn ApplicationState>,
	registry: Arc<dyn HandlerRegistry>,
	transport: Arc<dyn LogTransport>,
	flush_timeout: Duration,
	/// Serializes install/uninstall transitions; doubles as the flag.
	installed: Mutex<bool>,
	/// Handler that was active before ours. Kept apart from the transition
	/// lock so the crash callback never contends with an in-flight
	/// install/uninstall when it delegates.
	prior: Mutex<Option<FatalHandler>>,
}

impl CrashHandler {
	pub fn builder() -> CrashHandlerBuilder {
		CrashHandlerBuilder::new()
	}

	pub fn is_installed(&self) -> bool {
		*lock_unpoisoned(&self.inner.installed)
	}

	/// Installs or uninstalls this handler as the process-wide fatal-error
	/// hook. Requesting the current state is a no-op.
	///
	/// Installing saves whichever handler was registered at that moment;
	/// uninstalling re-registers it exactly as saved, including "no
	/// handler" when none existed. Callers racing on this method are
	/// serialized, so the saved handler can never be this handler itself.
	pub fn set_installed(&self, target: bool) {
		let mut installed = lock_unpoisoned(&self.inner.installed);
		if *installed == target {
			return;
		}

		if target {
			let shared = Arc::clone(&self.inner);
			let callback: FatalHandler = Arc::new(move |info| shared.on_fatal(info));
			let prior = self.inner.registry.replace(Some(callback));
			*lock_unpoisoned(&self.inner.prior) = prior;
			debug!("crash handler installed");
		} else {
			let prior = lock_unpoisoned(&self.inner.prior).take();
			self.inner.registry.replace(prior);
			debug!("crash handler uninstalled, prior handler restored");
		}

		*installed = target;
	}
}

impl HandlerShared {
	/// Runs synchronously on whichever thread raised the fatal error.
	/// Forwarding is best effort and must finish (or give up) before the
	/// prior handler runs, because the prior handler may terminate the
	/// process.
	fn on_fatal(&self, info: &PanicHookInfo<'_>) {
		if catch_unwind(AssertUnwindSafe(|| self.forward_crash(info))).is_err() {
			error!("crash forwarding raised, continuing to the prior handler");
		}

		let prior = lock_unpoisoned(&self.prior).clone();
		if let Some(handler) = prior {
			handler(info);
		}
	}

	fn forward_crash(&self, info: &PanicHookInfo<'_>) {
		if !self.application.is_running() {
			debug!("no application running, crash report not forwarded");
			return;
		}

		let message = panic_message(info);
		let location = info
			.location()
			.map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()));
		error!(
			message = %message,
			location = location.as_deref().unwrap_or("unknown"),
			"uncaught fatal error intercepted"
		);

		let Some(endpoint) = resolve_logs_endpoint(self.application.as_ref()) else {
			debug!("no logs endpoint available, crash report not forwarded");
			return;
		};

		let record = ExceptionRecord::new(PANIC_KIND, message, capture_stacktrace());
		let mut forwarder = RemoteLogForwarder::with_transport(
			endpoint,
			Arc::clone(&self.transport),
			self.flush_timeout,
		);
		forwarder.enqueue_note(CRASH_NOTE);
		forwarder.enqueue_exception(record);

		match forwarder.flush_sync() {
			FlushOutcome::Sent { entries } => {
				debug!(entries, "crash report delivered to development server");
			}
			FlushOutcome::Failed { error, .. } => {
				warn!(error = %error, "crash report delivery failed");
			}
		}
	}
}

/// Extracts the human-readable message from hook info.
fn panic_message(info: &PanicHookInfo<'_>) -> String {
	if let Some(s) = info.payload().downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = info.payload().downcast_ref::<String>() {
		s.clone()
	} else {
		"Box<dyn Any>".to_string()
	}
}

/// A poisoned lock here means some thread panicked mid-transition; the
/// state itself is still a plain flag and a handler slot, so recover the
/// guard rather than losing the chain on the crash path.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
