//! Composing middleware around a terminal handler.
//!
//! ```text
//! compose(h, [a, b])  ==  finalize ∘ a ∘ b ∘ h
//!
//!   a: pre ─┐                        ┌─ a: post ── finalize (write)
//!           b: pre ─┐        ┌─ b: post
//!                   └─ h ────┘
//! ```
//!
//! The first middleware in the list is the outermost: its pre-logic runs
//! first and its post-logic last. The finalizer is always added by the chain
//! itself and runs after every post-logic, so each request is written once.

use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{Response, ResponseWriter, finalize};

/// A terminal handler wrapped in its middleware, ready to serve requests.
///
/// Immutable once built. Cloning is one atomic increment and shares nothing
/// mutable: every request gets its own [`Context`].
#[derive(Clone)]
pub struct Chain {
    inner: BoxedHandler,
}

/// Wraps `handler` with `middleware`, first element outermost.
pub fn compose(handler: impl Handler, middleware: Vec<Arc<dyn Middleware>>) -> Chain {
    // Fold right to left: the last middleware wraps the handler first.
    let inner = middleware
        .iter()
        .rev()
        .fold(handler.into_boxed_handler(), |next, m| m.wrap(next));
    Chain { inner }
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder { middleware: Vec::new() }
    }

    /// Runs `request` through the chain and returns the buffered response.
    pub async fn call(&self, request: Request) -> Response {
        let mut res = Response::new();
        self.call_into(Context::new(request), &mut res).await;
        res
    }

    /// Runs `ctx` through the chain, then writes its outcome to `writer`.
    pub async fn call_into<W: ResponseWriter + Send + ?Sized>(&self, ctx: Context, writer: &mut W) {
        let ctx = self.inner.call(ctx).await;
        finalize(ctx.into_outcome(), writer);
    }
}

/// Collects middleware in execution order, then takes the terminal handler.
///
/// ```rust
/// use finale::{Chain, Context, middleware};
/// use http::StatusCode;
///
/// async fn hello(mut ctx: Context) -> Context {
///     ctx.respond(StatusCode::OK, "hello");
///     ctx
/// }
///
/// let chain = Chain::builder()
///     .with(middleware::trace::Trace)
///     .handler(hello);
/// # let _ = chain;
/// ```
pub struct ChainBuilder {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ChainBuilder {
    /// Appends `m`. Earlier middleware wraps later middleware.
    pub fn with(mut self, m: impl Middleware) -> Self {
        self.middleware.push(Arc::new(m));
        self
    }

    pub fn handler(self, handler: impl Handler) -> Chain {
        compose(handler, self.middleware)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    async fn ok(mut ctx: Context) -> Context {
        ctx.respond(StatusCode::OK, "ok");
        ctx
    }

    fn get() -> Request {
        http::Request::builder().uri("/").body(Bytes::new()).unwrap().into()
    }

    #[tokio::test]
    async fn empty_chain_writes_handler_outcome() {
        let res = compose(ok, Vec::new()).call(get()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), br#""ok""#);
    }

    #[tokio::test]
    async fn chains_are_independent() {
        let plain = Chain::builder().handler(ok);
        let tagged = Chain::builder()
            .with(crate::middleware::from_fn(|ctx, next: crate::middleware::Next| async move {
                let mut ctx = next.run(ctx).await;
                ctx.outcome_mut().set_status(StatusCode::ACCEPTED);
                ctx
            }))
            .handler(ok);

        assert_eq!(tagged.call(get()).await.status(), StatusCode::ACCEPTED);
        assert_eq!(plain.call(get()).await.status(), StatusCode::OK);
        assert_eq!(plain.clone().call(get()).await.status(), StatusCode::OK);
    }
}
