//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A chain links handlers of *different* types: the user's terminal handler
//! and one wrapper per middleware. Each link only knows "the next link", so
//! every link is stored behind the same trait object, `dyn ErasedHandler`.
//!
//! ```text
//! async fn show(ctx: Context) -> Context { … }   ← user writes this
//!        ↓ compose(show, middleware)
//! show.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time             ← one vtable dispatch per link
//!        ↓
//! Box::pin(show(ctx))                            ← BoxFuture
//! ```
//!
//! Handlers never see the response writer. They record what they produced on
//! the [`Context`] and hand it back.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

// ── Internal types ───────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to the request's
/// [`Context`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place; it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub type BoxFuture = Pin<Box<dyn Future<Output = Context> + Send + 'static>>;

/// One link of a composed chain.
///
/// Implement this directly only when writing a [`Middleware`](crate::middleware::Middleware)
/// by hand; functions and closures get it through [`Handler`].
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A type-erased link shared by every request served by the same chain.
///
/// `Arc` gives cheap, thread-safe shared ownership: cloning a [`Chain`](crate::Chain)
/// for a new connection is one atomic increment, not a copy of every link.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ─────────────────────────────────────────────────────

/// Implemented for every valid terminal handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> Context
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ──────────────────────────────────────────────────

/// Implement the sealing trait for any function with the right signature.
///
/// `Fn(Context) -> Fut` covers named `async fn` items, closures returning an
/// `async` block, and any struct that implements `Fn`.
impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ─────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        // Calling the wrapped function returns the concrete `Fut`; boxing it
        // makes the return type match the trait signature.
        Box::pin((self.0)(ctx))
    }
}
