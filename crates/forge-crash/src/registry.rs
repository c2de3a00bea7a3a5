// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registration point for the process-wide fatal-error handler.

use std::panic::PanicHookInfo;
use std::sync::Arc;

/// A fatal-error handler of unknown origin.
///
/// This is a plain callable capability: it may belong to another diagnostic
/// tool, a crash reporter, or the runtime itself, and nothing here assumes
/// anything about its implementation.
pub type FatalHandler = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Abstraction over the runtime's single global fatal-error hook.
///
/// Exactly one handler is active process-wide. Registering overwrites the
/// previous handler, and `replace` hands the previous one back so a caller
/// can chain to it or restore it later.
pub trait HandlerRegistry: Send + Sync {
	/// Registers `next` as the active handler (clearing the slot when
	/// `None`) and returns whichever handler was registered before, which
	/// may be none.
	fn replace(&self, next: Option<FatalHandler>) -> Option<FatalHandler>;
}

/// Production registry backed by the `std::panic` hook.
///
/// `std` always reports a handler: with no custom hook installed,
/// [`std::panic::take_hook`] hands back the default hook, so `replace`
/// never returns `None` here. Restoring that default later preserves
/// standard crash output.
pub struct StdPanicHooks;

impl HandlerRegistry for StdPanicHooks {
	fn replace(&self, next: Option<FatalHandler>) -> Option<FatalHandler> {
		// take_hook leaves the default hook registered, so the None case
		// needs no further work.
		let prior = std::panic::take_hook();
		if let Some(handler) = next {
			std::panic::set_hook(Box::new(move |info| handler(info)));
		}
		Some(Arc::from(prior))
	}
}
