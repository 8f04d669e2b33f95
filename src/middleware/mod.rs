//! Middleware layer.
//!
//! Middleware intercepts a request on its way to the terminal handler and the
//! [`Context`] on its way back. It is the right place for cross-cutting
//! concerns: structured tracing, request-id injection, authentication-header
//! inspection.
//!
//! A middleware receives the next link of the chain and returns a new link
//! wrapping it. The easy way to write one is [`from_fn`]:
//!
//! ```rust
//! use finale::{Context, catalog, middleware};
//!
//! let require_auth = middleware::from_fn(|mut ctx: Context, next| async move {
//!     if ctx.request().header("authorization").is_none() {
//!         ctx.report_error(&catalog::INVALID_AUTH_TOKEN);
//!         return ctx; // short-circuit: `next` never runs
//!     }
//!     next.run(ctx).await
//! });
//! # let _ = require_auth;
//! ```
//!
//! Middleware never writes the response. Whatever it leaves on the context is
//! written once, by the chain, after every middleware returned.
//!
//! Built-in middleware:
//! - [`trace::Trace`] — per-request log lines with method, path, status, latency

pub mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};

// ── Middleware trait ─────────────────────────────────────────────────────────

/// Wraps the next link of a chain.
///
/// Called once per middleware when the chain is composed, not per request.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

/// The rest of the chain, as seen from a [`from_fn`] middleware.
pub struct Next(BoxedHandler);

impl Next {
    /// Runs every remaining link and the terminal handler.
    pub fn run(self, ctx: Context) -> BoxFuture {
        self.0.call(ctx)
    }
}

// ── Closure middleware ───────────────────────────────────────────────────────

/// Builds a [`Middleware`] from an async closure `(Context, Next) -> Context`.
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    FromFn(Arc::new(f))
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F>(Arc<F>);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(FromFnLink { f: Arc::clone(&self.0), next })
    }
}

struct FromFnLink<F> {
    f: Arc<F>,
    next: BoxedHandler,
}

impl<F, Fut> ErasedHandler for FromFnLink<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.f)(ctx, Next(Arc::clone(&self.next))))
    }
}
