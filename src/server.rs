//! HTTP server and graceful shutdown.
//!
//! The server is a thin host for one [`Chain`]: every request, whatever its
//! method or path, goes through that chain. Put a router in front of it if you
//! need one.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Set `terminationGracePeriodSeconds` in your pod spec to a value longer
//! than your slowest request.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::catalog;
use crate::chain::Chain;
use crate::error::Error;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::response::{Response, finalize};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use finale::Server;
    ///
    /// assert!(Server::bind("0.0.0.0:3000").is_ok());
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: addr.parse()? })
    }

    pub fn addr(&self) -> SocketAddr { self.addr }

    /// Starts accepting connections and dispatching them through `chain`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, chain: Chain) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        run(listener, chain, shutdown_signal()).await
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

/// Serves `chain` on `listener` until `shutdown` resolves, then drains.
async fn run(
    listener: TcpListener,
    chain: Chain,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    info!(addr = %listener.local_addr()?, "finale listening");

    // JoinSet tracks every spawned connection task so we can wait for
    // them all to finish during graceful shutdown.
    let mut tasks = tokio::task::JoinSet::new();

    // Futures must not move in memory after the first poll, and the select
    // loop below polls `shutdown` many times. `tokio::pin!` pins it on the stack.
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // `biased` makes select! check arms top-to-bottom instead of
            // randomly. Shutdown is checked first so a SIGTERM immediately
            // stops accepting new connections, even if more are queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                // A clone is one atomic increment; every connection task gets
                // its own handle to the same immutable chain.
                let chain = chain.clone();
                // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper
                // IO traits.
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    // `service_fn` turns a plain async function into a hyper
                    // `Service`. The closure is called once per request on the
                    // connection, not once per connection.
                    let svc = service_fn(move |req| {
                        let chain = chain.clone();
                        async move { dispatch(chain, req).await }
                    });

                    // `auto::Builder` transparently handles both HTTP/1.1
                    // and HTTP/2, whatever the client negotiates.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound on long-running servers.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    // Drain: wait for every in-flight connection to finish before we return.
    while tasks.join_next().await.is_some() {}

    info!("finale stopped");
    Ok(())
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers the body and runs one request through the chain.
///
/// The error type is [`Infallible`]: every failure is answered through the
/// finalizer, so hyper never sees an error.
async fn dispatch(
    chain: Chain,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let response = match body.collect().await {
        Ok(collected) => chain.call(Request::new(parts, collected.to_bytes())).await,
        Err(e) => {
            warn!(method = %parts.method, path = %parts.uri.path(), "failed to read request body: {e}");
            unreadable_body()
        }
    };

    Ok(response.into_inner())
}

/// The answer to a request whose body could not be read: the chain never
/// ran, so [`catalog::INTERNAL_SERVICE`] goes out through the same finalizer.
fn unreadable_body() -> Response {
    let mut outcome = Outcome::new();
    outcome.set_error(&catalog::INTERNAL_SERVICE);
    let mut res = Response::new();
    finalize(outcome, &mut res);
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available. A signal whose handler cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // `pending()` is a future that never resolves: on non-Unix platforms
    // the SIGTERM arm is effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
