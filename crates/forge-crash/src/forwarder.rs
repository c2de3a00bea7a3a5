// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Queue of pending diagnostic entries and its best-effort synchronous flush.

use std::sync::Arc;
use std::time::Duration;

use forge_crash_core::{ExceptionRecord, LogEntry, LogLevel};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ForwardError, Result};
use crate::transport::{HttpTransport, LogTransport};

/// Ceiling on one flush attempt. A hung connection must not delay process
/// termination past this bound.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one flush attempt. Failures are reported, never raised.
#[derive(Debug)]
pub enum FlushOutcome {
	/// All queued entries were delivered in one payload.
	Sent { entries: usize },
	/// Delivery failed; the entries are gone (one crash event, no retry).
	Failed { entries: usize, error: ForwardError },
}

impl FlushOutcome {
	pub fn is_sent(&self) -> bool {
		matches!(self, Self::Sent { .. })
	}
}

/// Forwards queued diagnostic entries to one development-server endpoint.
///
/// A forwarder is built fresh per crash event: it owns the endpoint it was
/// resolved against, the entries queued for that event, and nothing else.
pub struct RemoteLogForwarder {
	endpoint: Url,
	queue: Vec<LogEntry>,
	transport: Arc<dyn LogTransport>,
	timeout: Duration,
}

impl RemoteLogForwarder {
	/// Creates a forwarder delivering over HTTP with the default timeout.
	pub fn new(endpoint: Url) -> Self {
		Self::with_transport(endpoint, Arc::new(HttpTransport), DEFAULT_FLUSH_TIMEOUT)
	}

	pub fn with_transport(endpoint: Url, transport: Arc<dyn LogTransport>, timeout: Duration) -> Self {
		Self {
			endpoint,
			queue: Vec::new(),
			transport,
			timeout,
		}
	}

	/// Appends an entry. Never blocks, never fails; the queue lives for a
	/// single crash event so growth is naturally bounded.
	pub fn enqueue(&mut self, entry: LogEntry) {
		self.queue.push(entry);
	}

	/// Appends a free-text error note.
	pub fn enqueue_note(&mut self, message: impl Into<String>) {
		self.enqueue(LogEntry::note(LogLevel::Error, message));
	}

	/// Appends a structured exception record.
	pub fn enqueue_exception(&mut self, record: ExceptionRecord) {
		self.enqueue(LogEntry::Exception(record));
	}

	pub fn queued_entries(&self) -> usize {
		self.queue.len()
	}

	/// Transmits all queued entries, in insertion order, as a single JSON
	/// payload, blocking the calling thread until the transmission
	/// completes, fails, or the timeout elapses.
	///
	/// The queue is consumed either way. An empty queue sends nothing and
	/// reports `Sent { entries: 0 }`.
	pub fn flush_sync(&mut self) -> FlushOutcome {
		let entries = std::mem::take(&mut self.queue);
		if entries.is_empty() {
			return FlushOutcome::Sent { entries: 0 };
		}

		let count = entries.len();
		let payload = match wire_payload(&entries) {
			Ok(payload) => payload,
			Err(error) => {
				warn!(error = %error, "could not serialize log entries");
				return FlushOutcome::Failed {
					entries: count,
					error,
				};
			}
		};

		match self.transport.send(&self.endpoint, &payload, self.timeout) {
			Ok(()) => {
				debug!(entries = count, endpoint = %self.endpoint, "log entries delivered");
				FlushOutcome::Sent { entries: count }
			}
			Err(error) => {
				warn!(error = %error, endpoint = %self.endpoint, "log delivery failed");
				FlushOutcome::Failed {
					entries: count,
					error,
				}
			}
		}
	}
}

fn wire_payload(entries: &[LogEntry]) -> Result<serde_json::Value> {
	let wire: Vec<WireEntry> = entries.iter().map(WireEntry::from_entry).collect();
	Ok(serde_json::to_value(wire)?)
}

/// Entry in wire format.
#[derive(Debug, Serialize)]
struct WireEntry {
	level: LogLevel,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	timestamp: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	exception: Option<WireException>,
}

impl WireEntry {
	fn from_entry(entry: &LogEntry) -> Self {
		match entry {
			LogEntry::Note { level, message } => Self {
				level: *level,
				message: message.clone(),
				timestamp: None,
				exception: None,
			},
			LogEntry::Exception(record) => Self {
				level: LogLevel::Error,
				message: record.message.clone(),
				timestamp: Some(record.timestamp.to_rfc3339()),
				exception: Some(WireException::from_record(record)),
			},
		}
	}
}

/// Exception detail in wire format.
#[derive(Debug, Serialize)]
struct WireException {
	kind: String,
	message: String,
	frames: Vec<WireFrame>,
}

impl WireException {
	fn from_record(record: &ExceptionRecord) -> Self {
		Self {
			kind: record.kind.clone(),
			message: record.message.clone(),
			frames: record.stacktrace.frames.iter().map(WireFrame::from_frame).collect(),
		}
	}
}

/// Stack frame in wire format.
#[derive(Debug, Serialize)]
struct WireFrame {
	#[serde(skip_serializing_if = "Option::is_none")]
	symbol: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	file: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	line: Option<u32>,
}

impl WireFrame {
	fn from_frame(frame: &forge_crash_core::Frame) -> Self {
		Self {
			symbol: frame.symbol.clone(),
			file: frame.filename.clone(),
			line: frame.lineno,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ForwardError;
	use forge_crash_core::{Frame, Stacktrace};
	use std::sync::Mutex;

	/// Transport fake that records every payload it is asked to deliver.
	#[derive(Default)]
	struct RecordingTransport {
		payloads: Mutex<Vec<serde_json::Value>>,
	}

	impl LogTransport for RecordingTransport {
		fn send(&self, _endpoint: &Url, payload: &serde_json::Value, _timeout: Duration) -> Result<()> {
			self.payloads.lock().unwrap().push(payload.clone());
			Ok(())
		}
	}

	/// Transport fake that always fails.
	struct RefusingTransport;

	impl LogTransport for RefusingTransport {
		fn send(&self, _endpoint: &Url, _payload: &serde_json::Value, _timeout: Duration) -> Result<()> {
			Err(ForwardError::ServerStatus { status: 503 })
		}
	}

	fn endpoint() -> Url {
		Url::parse("http://localhost:8081/logs").unwrap()
	}

	fn sample_record() -> ExceptionRecord {
		ExceptionRecord::new(
			"panic",
			"index out of bounds",
			Stacktrace::new(vec![Frame {
				symbol: Some("app::main".to_string()),
				module: Some("app".to_string()),
				filename: Some("src/main.rs".to_string()),
				lineno: Some(7),
				colno: Some(13),
				in_app: true,
			}]),
		)
	}

	#[test]
	fn flush_preserves_insertion_order_in_one_payload() {
		let transport = Arc::new(RecordingTransport::default());
		let mut forwarder = RemoteLogForwarder::with_transport(
			endpoint(),
			Arc::clone(&transport) as Arc<dyn LogTransport>,
			DEFAULT_FLUSH_TIMEOUT,
		);

		forwarder.enqueue_note("A");
		forwarder.enqueue_exception(sample_record());

		let outcome = forwarder.flush_sync();
		assert!(outcome.is_sent());

		let payloads = transport.payloads.lock().unwrap();
		assert_eq!(payloads.len(), 1);

		let body = payloads[0].as_array().expect("payload is an ordered array");
		assert_eq!(body.len(), 2);
		assert_eq!(body[0]["message"], "A");
		assert_eq!(body[0]["level"], "error");
		assert!(body[0].get("exception").is_none());
		assert_eq!(body[1]["exception"]["kind"], "panic");
		assert_eq!(body[1]["exception"]["frames"][0]["symbol"], "app::main");
		assert_eq!(body[1]["exception"]["frames"][0]["file"], "src/main.rs");
		assert_eq!(body[1]["exception"]["frames"][0]["line"], 7);
	}

	#[test]
	fn flush_consumes_the_queue() {
		let transport = Arc::new(RecordingTransport::default());
		let mut forwarder = RemoteLogForwarder::with_transport(
			endpoint(),
			transport,
			DEFAULT_FLUSH_TIMEOUT,
		);

		forwarder.enqueue_note("once");
		assert_eq!(forwarder.queued_entries(), 1);

		assert!(forwarder.flush_sync().is_sent());
		assert_eq!(forwarder.queued_entries(), 0);
	}

	#[test]
	fn failed_delivery_reports_instead_of_raising() {
		let mut forwarder = RemoteLogForwarder::with_transport(
			endpoint(),
			Arc::new(RefusingTransport),
			DEFAULT_FLUSH_TIMEOUT,
		);

		forwarder.enqueue_note("A");
		match forwarder.flush_sync() {
			FlushOutcome::Failed { entries, error } => {
				assert_eq!(entries, 1);
				assert!(matches!(error, ForwardError::ServerStatus { status: 503 }));
			}
			FlushOutcome::Sent { .. } => panic!("delivery should have failed"),
		}
		// queue consumed even on failure
		assert_eq!(forwarder.queued_entries(), 0);
	}

	#[test]
	fn empty_queue_flush_sends_nothing() {
		let transport = Arc::new(RecordingTransport::default());
		let mut forwarder = RemoteLogForwarder::with_transport(
			endpoint(),
			Arc::clone(&transport) as Arc<dyn LogTransport>,
			DEFAULT_FLUSH_TIMEOUT,
		);

		match forwarder.flush_sync() {
			FlushOutcome::Sent { entries } => assert_eq!(entries, 0),
			FlushOutcome::Failed { .. } => panic!("nothing to deliver"),
		}
		assert!(transport.payloads.lock().unwrap().is_empty());
	}

	#[test]
	fn unreachable_endpoint_fails_within_the_timeout_bound() {
		// nothing listens on the discard port; HTTP delivery must turn the
		// connection error into a Failed outcome, not a panic
		let unreachable = Url::parse("http://127.0.0.1:9/logs").unwrap();
		let mut forwarder = RemoteLogForwarder::with_transport(
			unreachable,
			Arc::new(HttpTransport),
			Duration::from_secs(1),
		);

		forwarder.enqueue_note("A");
		let started = std::time::Instant::now();
		let outcome = forwarder.flush_sync();
		assert!(!outcome.is_sent());
		assert!(started.elapsed() < Duration::from_secs(5));
	}
}
