// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic log entries queued for transmission to the development server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::stacktrace::Stacktrace;

/// Severity of a log entry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	Info,
	Warning,
	Error,
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for LogLevel {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidLogLevel(s.to_string())),
		}
	}
}

/// A structured record of an uncaught fatal error.
///
/// Immutable once created; the timestamp marks when the error was
/// intercepted, not when it was transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
	/// Error classification, e.g. "panic"
	pub kind: String,
	pub message: String,
	pub stacktrace: Stacktrace,
	pub timestamp: DateTime<Utc>,
}

impl ExceptionRecord {
	pub fn new(kind: impl Into<String>, message: impl Into<String>, stacktrace: Stacktrace) -> Self {
		Self {
			kind: kind.into(),
			message: message.into(),
			stacktrace,
			timestamp: Utc::now(),
		}
	}
}

/// A single pending diagnostic entry: either a free-text note or a
/// structured exception record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogEntry {
	Note { level: LogLevel, message: String },
	Exception(ExceptionRecord),
}

impl LogEntry {
	/// Creates a free-text note entry.
	pub fn note(level: LogLevel, message: impl Into<String>) -> Self {
		Self::Note {
			level,
			message: message.into(),
		}
	}

	/// The human-readable message carried by this entry.
	pub fn message(&self) -> &str {
		match self {
			Self::Note { message, .. } => message,
			Self::Exception(record) => &record.message,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn note_carries_level_and_message() {
		let entry = LogEntry::note(LogLevel::Error, "it broke");
		match entry {
			LogEntry::Note { level, ref message } => {
				assert_eq!(level, LogLevel::Error);
				assert_eq!(message, "it broke");
			}
			_ => panic!("expected a note"),
		}
	}

	#[test]
	fn exception_entry_exposes_record_message() {
		let record = ExceptionRecord::new("panic", "index out of bounds", Stacktrace::default());
		let entry = LogEntry::Exception(record);
		assert_eq!(entry.message(), "index out of bounds");
	}

	#[test]
	fn unknown_level_does_not_parse() {
		assert!("fatal".parse::<LogLevel>().is_err());
	}

	proptest! {
		#[test]
		fn log_level_roundtrip(level in prop_oneof![
			Just(LogLevel::Info),
			Just(LogLevel::Warning),
			Just(LogLevel::Error),
		]) {
			let s = level.to_string();
			let parsed: LogLevel = s.parse().unwrap();
			prop_assert_eq!(level, parsed);
		}
	}
}
