//! Stack growth for the recursive graph walks.
//!
//! Parsing resolves inputs depth-first, the interpreter evaluates expression
//! chains recursively and the lowering inlines flow chains. A long wire chain
//! can therefore recurse once per block. Every recursive step goes through
//! [`ensure_sufficient_stack`], which extends the stack on native targets.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; run `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    let _ = (RED_ZONE, SEGMENT_SIZE);
    f()
}
