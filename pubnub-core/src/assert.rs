//! Pluggable assertion handling.
//!
//! Ported from `pubnub_assert.h` in the original C SDK (notes taken before
//! the retrieval pack was lost — see DESIGN.md), which lets an embedded
//! target choose what an invariant violation does at runtime: abort the
//! process, spin forever (so a debugger can attach), or log and continue.
//! `no_std` has no process to abort and no stderr to log to by default, so
//! the handler is a trait a host crate implements.
use core::fmt;

/// What to do when [`check`] observes a failed invariant.
pub trait AssertHandler {
    fn on_failed(&self, message: fmt::Arguments<'_>, file: &'static str, line: u32);
}

/// Calls `core::intrinsics`-free `loop {}` — used on targets with no
/// meaningful abort, where spinning lets a debugger break in.
pub struct SpinHandler;

impl AssertHandler for SpinHandler {
    fn on_failed(&self, _message: fmt::Arguments<'_>, _file: &'static str, _line: u32) {
        loop {
            core::hint::spin_loop();
        }
    }
}

/// Reports the failure through a caller-supplied sink and continues
/// execution — the original C SDK's "printf and continue" mode, useful in
/// fuzzing/test harnesses that want every violation recorded rather than
/// the process dying at the first one.
pub struct ContinueHandler<F: Fn(fmt::Arguments<'_>, &'static str, u32)>(pub F);

impl<F: Fn(fmt::Arguments<'_>, &'static str, u32)> AssertHandler for ContinueHandler<F> {
    fn on_failed(&self, message: fmt::Arguments<'_>, file: &'static str, line: u32) {
        (self.0)(message, file, line);
    }
}

/// Evaluates `cond`, invoking `handler` on failure with `message` plus the
/// caller's file/line. Unlike `debug_assert!`, this stays active in release
/// builds since several of this crate's invariants (DNS pointer-hop cap,
/// scratch-buffer bounds) are adversarial-input guards, not just
/// programmer-error catches.
pub fn check(handler: &dyn AssertHandler, cond: bool, message: fmt::Arguments<'_>, file: &'static str, line: u32) {
    if !cond {
        handler.on_failed(message, file, line);
    }
}

#[macro_export]
macro_rules! pubnub_assert {
    ($handler:expr, $cond:expr, $($arg:tt)*) => {
        $crate::assert::check($handler, $cond, format_args!($($arg)*), file!(), line!())
    };
}
