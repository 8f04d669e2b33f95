//! Minimal finale example — one JSON endpoint behind tracing and an auth check.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -H 'authorization: Bearer demo' http://localhost:3000/users/42
//!   curl -i -H 'authorization: Bearer demo' http://localhost:3000/users/

use finale::token::{JwtToken, StandardClaims};
use finale::{Chain, Context, Server, catalog, middleware};
use http::StatusCode;
use serde::Serialize;

#[derive(Serialize)]
struct User {
    id: String,
    name: &'static str,
    requested_by: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let auth = middleware::from_fn(|mut ctx: Context, next| async move {
        let token = ctx
            .request()
            .header("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);

        match token {
            // A real service verifies the signature and decodes the claims;
            // the demo takes the bearer value as the subject.
            Some(token) if !token.is_empty() => {
                ctx.insert(JwtToken {
                    claims: StandardClaims { subject: Some(token), ..Default::default() },
                    ..Default::default()
                });
                next.run(ctx).await
            }
            _ => {
                ctx.report_error(&catalog::INVALID_AUTH_TOKEN);
                ctx
            }
        }
    });

    let app = Chain::builder()
        .with(middleware::trace::Trace)
        .with(auth)
        .handler(get_user);

    let server = match Server::bind("0.0.0.0:3000") {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{e}");
            return;
        }
    };

    if let Err(e) = server.serve(app).await {
        tracing::error!("server error: {e}");
    }
}

// GET /users/{id}
//
// The path is parsed by hand: finale does no routing.
async fn get_user(mut ctx: Context) -> Context {
    let id = ctx
        .request()
        .path()
        .strip_prefix("/users/")
        .filter(|id| !id.is_empty())
        .map(str::to_owned);

    let requested_by = ctx.get::<JwtToken>().and_then(|t| t.claims.subject.clone());

    match id {
        Some(id) => ctx.respond(StatusCode::OK, User { id, name: "alice", requested_by }),
        None => ctx.report_error(&catalog::REQUIRED_DATA),
    }
    ctx
}
