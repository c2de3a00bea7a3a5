// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Uncaught fatal error interception for the Forge development harness.
//!
//! When an application launched by the harness dies with an uncaught fatal
//! error, this crate captures what happened and forwards it to the
//! locally-running development server so the crash lands in the developer's
//! terminal, then hands the error to whichever handler was registered
//! before, preserving standard crash reporting for any other installed
//! tool.
//!
//! # Quick Start
//!
//! ```ignore
//! use forge_crash::CrashHandler;
//!
//! let handler = CrashHandler::builder()
//!     .application(launcher.application_state())
//!     .build()?;
//!
//! // Intercept fatal errors while a development session is active
//! handler.set_installed(true);
//!
//! // ... run the session ...
//!
//! // Restore whatever was registered before
//! handler.set_installed(false);
//! ```
//!
//! # How a crash is handled
//!
//! The callback runs synchronously on the thread that raised the error,
//! because the process may terminate as soon as the handler chain returns:
//!
//! 1. If no application is running, skip straight to delegation.
//! 2. Resolve the development server's log endpoint from the application's
//!    manifest (`logsUrl`) or its bundle origin (`…/logs`).
//! 3. Queue a human-readable note and a structured exception record, then
//!    flush them in one blocking, timeout-bounded HTTP request.
//! 4. Unconditionally invoke the previously-registered handler.
//!
//! Delivery is best effort: resolution and transmission failures are
//! logged and swallowed, never re-raised into the chain.

mod application;
mod backtrace;
mod error;
mod forwarder;
mod handler;
mod registry;
mod resolver;
mod transport;

pub use application::ApplicationState;
pub use error::{ForwardError, Result};
pub use forwarder::{FlushOutcome, RemoteLogForwarder, DEFAULT_FLUSH_TIMEOUT};
pub use handler::{CrashHandler, CrashHandlerBuilder};
pub use registry::{FatalHandler, HandlerRegistry, StdPanicHooks};
pub use resolver::resolve_logs_endpoint;
pub use transport::{HttpTransport, LogTransport};

// Re-export core types for convenience
pub use forge_crash_core::{ExceptionRecord, Frame, LogEntry, LogLevel, Stacktrace};
