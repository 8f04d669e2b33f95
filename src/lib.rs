//! # finale
//!
//! Middleware chains for HTTP handlers, with exactly one place that writes
//! the response.
//!
//! ## The contract
//!
//! Handlers and middleware never write to the wire. They record a result on
//! the request [`Context`]: a status and a payload via [`Context::respond`],
//! or a coded error via [`Context::report_error`]. When the outermost
//! middleware returns, the chain's finalizer writes that result once:
//!
//! - `content-type: application/json`, always
//! - the recorded status, or `500` when none was recorded
//! - the error body `{"message", "code"}` if an error was reported,
//!   otherwise the payload, otherwise nothing
//!
//! Errors come from a small fixed [`catalog`] of [`StructuredError`]s with
//! stable codes and fixed statuses.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use finale::{Chain, Context, Server, catalog, middleware};
//! use http::StatusCode;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64 }
//!
//! #[tokio::main]
//! async fn main() {
//!     let require_auth = middleware::from_fn(|mut ctx: Context, next| async move {
//!         if ctx.request().header("authorization").is_none() {
//!             ctx.report_error(&catalog::INVALID_AUTH_TOKEN);
//!             return ctx;
//!         }
//!         next.run(ctx).await
//!     });
//!
//!     let app = Chain::builder()
//!         .with(middleware::trace::Trace)
//!         .with(require_auth)
//!         .handler(get_user);
//!
//!     Server::bind("0.0.0.0:3000").unwrap().serve(app).await.unwrap();
//! }
//!
//! async fn get_user(mut ctx: Context) -> Context {
//!     ctx.respond(StatusCode::OK, User { id: 7 });
//!     ctx
//! }
//! ```

mod chain;
mod context;
mod error;
mod handler;
mod outcome;
mod request;
mod response;
mod server;
mod structured;

pub mod catalog;
pub mod middleware;
pub mod token;

pub use chain::{Chain, ChainBuilder, compose};
pub use context::Context;
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use outcome::Outcome;
pub use request::Request;
pub use response::{Response, ResponseWriter};
pub use server::Server;
pub use structured::{ErrorResponse, StructuredError};
