// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and parsing at crash time.

use std::backtrace::Backtrace;

use forge_crash_core::{Frame, Stacktrace};
use rustc_demangle::demangle;

/// Captures the raising thread's backtrace and parses it into frames.
///
/// Uses `force_capture` so a trace is available even when backtraces are
/// disabled in the environment.
pub(crate) fn capture_stacktrace() -> Stacktrace {
	let backtrace = Backtrace::force_capture();
	parse_backtrace(&backtrace)
}

pub(crate) fn parse_backtrace(backtrace: &Backtrace) -> Stacktrace {
	Stacktrace::new(parse_rendered(&backtrace.to_string()))
}

/// Parses the rendered backtrace. Symbol lines open a new frame;
/// `at file:line:col` lines carry the location of the preceding frame.
fn parse_rendered(rendered: &str) -> Vec<Frame> {
	let mut frames: Vec<Frame> = Vec::new();

	for line in rendered.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(frame) = frames.last_mut() {
				apply_location(frame, location.trim());
			}
			continue;
		}

		if let Some(frame) = parse_symbol_line(line) {
			frames.push(frame);
		}
	}

	frames
}

/// Parses a `N: symbol` or bare `symbol` line into a frame.
fn parse_symbol_line(line: &str) -> Option<Frame> {
	let symbol_part = match line.split_once(':') {
		Some((index, rest)) if index.trim().parse::<u32>().is_ok() => rest.trim(),
		_ => line,
	};

	if symbol_part.is_empty() {
		return None;
	}

	let demangled = demangle(symbol_part).to_string();
	let module = demangled.rfind("::").map(|idx| demangled[..idx].to_string());
	let in_app = is_in_app_symbol(&demangled);

	Some(Frame {
		symbol: Some(demangled),
		module,
		filename: None,
		lineno: None,
		colno: None,
		in_app,
	})
}

/// Splits `path:line:col` from the right so paths containing colons keep
/// working; anything that does not parse lands verbatim in `filename`.
fn apply_location(frame: &mut Frame, location: &str) {
	let mut parts = location.rsplitn(3, ':');
	let colno = parts.next().and_then(|s| s.parse().ok());
	let lineno = parts.next().and_then(|s| s.parse().ok());
	let filename = parts.next().map(str::to_string);

	match (filename, lineno) {
		(Some(filename), Some(lineno)) => {
			frame.filename = Some(filename);
			frame.lineno = Some(lineno);
			frame.colno = colno;
		}
		_ => frame.filename = Some(location.to_string()),
	}
}

/// Whether a symbol belongs to application code rather than the standard
/// library or runtime plumbing.
fn is_in_app_symbol(symbol: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"tracing::",
		"<tracing::",
		"backtrace::",
		"<backtrace::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::thread::",
		"::rt::",
		"::sys::",
		"::sys_common::",
	];

	for prefix in SYSTEM_PREFIXES {
		if symbol.starts_with(prefix) {
			return false;
		}
	}

	for needle in SYSTEM_CONTAINS {
		if symbol.contains(needle) {
			return false;
		}
	}

	true
}
