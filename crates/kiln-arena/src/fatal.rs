//! Process-wide hook for unrecoverable allocation failures.
//!
//! Allocation never reports failure to its caller. System allocator
//! exhaustion, a full [`StackArena`](crate::StackArena), the chunk limit and
//! impossible layouts all end up in [`fatal`], which logs the error and hands
//! it to the installed [`FatalHandler`]. The handler can be set once per
//! process; until then [`default_fatal_handler`] is used.

use std::sync::OnceLock;

use tracing::error;

use crate::error::ArenaError;

/// Signature of the process-wide fatal handler. It must not return.
pub type FatalHandler = fn(&ArenaError) -> !;

static HANDLER: OnceLock<FatalHandler> = OnceLock::new();

/// Install the process-wide fatal handler.
///
/// Succeeds once per process. Later calls leave the installed handler in
/// place and return the rejected one.
pub fn set_fatal_handler(handler: FatalHandler) -> Result<(), FatalHandler> {
    HANDLER.set(handler)
}

/// The handler [`fatal`] will invoke.
pub fn fatal_handler() -> FatalHandler {
    HANDLER.get().copied().unwrap_or(default_fatal_handler)
}

/// Report an unrecoverable arena failure and terminate via the handler.
#[cold]
pub fn fatal(err: ArenaError) -> ! {
    error!(error = %err, "fatal arena failure");
    (fatal_handler())(&err)
}

/// Handler used when none has been installed: panics with the error.
///
/// The workspace release profile sets `panic = "abort"`, so in release
/// builds this terminates the process once the panic message is printed.
/// Test and debug builds unwind instead, which lets `#[should_panic]` tests
/// observe fatal paths. Install a handler that calls
/// [`std::process::abort`] to terminate regardless of the panic strategy.
pub fn default_fatal_handler(err: &ArenaError) -> ! {
    panic!("kiln fatal: {err}")
}
