//! Request logging.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, warn};

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;

/// Logs one line when a request enters the chain and one when it leaves,
/// with the status the finalizer is about to write and the latency.
/// Statuses of 500 and above are logged at `WARN`.
///
/// Place it first so the latency covers every other middleware.
pub struct Trace;

impl Middleware for Trace {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(TraceLink(next))
    }
}

struct TraceLink(BoxedHandler);

impl ErasedHandler for TraceLink {
    fn call(&self, ctx: Context) -> BoxFuture {
        let next = Arc::clone(&self.0);
        Box::pin(async move {
            let span = ctx.span().clone();
            let start = Instant::now();
            span.in_scope(|| info!("started"));

            // Events from inner links land in the request span too.
            let ctx = next.call(ctx).instrument(span.clone()).await;

            let status = ctx.outcome().status_or_default().as_u16();
            let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
            span.in_scope(|| {
                if status >= 500 {
                    warn!(status, latency_us, "finished");
                } else {
                    info!(status, latency_us, "finished");
                }
            });
            ctx
        })
    }
}
