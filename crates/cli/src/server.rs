// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Json, Router, extract::Request};
use http::header::ACCEPT_LANGUAGE;
use lang_redirect_core::{LanguageNegotiator, LanguageRedirectLayer};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span};

/// What the echo handler saw of the request, after the language negotiation
/// rewrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub accept_language: Option<String>,
}

async fn echo(request: Request) -> Json<Echo> {
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    Json(Echo {
        method: request.method().to_string(),
        path: request.uri().path().to_owned(),
        query: request.uri().query().map(str::to_owned),
        accept_language,
    })
}

/// Build the router serving the echo handler behind the language negotiation.
///
/// The handler is mounted as the fallback so that it answers on any path,
/// including the ones rewritten by the path strategy.
pub fn build_router(negotiator: LanguageNegotiator) -> Router {
    Router::new()
        .fallback(echo)
        .layer(LanguageRedirectLayer::new(negotiator))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router on the given address until a shutdown is requested.
///
/// On a soft shutdown, the server stops accepting connections and lets the
/// in-flight requests finish. On a hard shutdown, it stops right away.
pub async fn run_server(
    listen: SocketAddr,
    router: Router,
    soft_shutdown_token: CancellationToken,
    hard_shutdown_token: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("could not bind to {listen}"))?;

    let local_addr = listener.local_addr()?;
    info!(%local_addr, "Listening on http://{local_addr}/");

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(soft_shutdown_token.cancelled_owned())
        .into_future()
        .instrument(info_span!("http.serve", %local_addr));

    tokio::select! {
        res = server => res.context("server failed")?,
        () = hard_shutdown_token.cancelled() => {
            tracing::warn!("Dropping in-flight requests");
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode, header::LOCATION};
    use http_body_util::BodyExt;
    use lang_redirect_core::{NegotiatorSettings, StrategyKind};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn router(strategy: StrategyKind, redirect_after_handling: bool) -> Router {
        let negotiator = LanguageNegotiator::new(NegotiatorSettings {
            languages: vec!["en".to_owned(), "fr".to_owned(), "de".to_owned()],
            default_language: "en".to_owned(),
            strategy,
            redirect_after_handling,
            ..NegotiatorSettings::default()
        })
        .unwrap();

        build_router(negotiator)
    }

    async fn call(router: Router, uri: &str, accept_language: &str) -> http::Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header(ACCEPT_LANGUAGE, accept_language)
            .body(Body::empty())
            .unwrap();

        router.oneshot(request).await.unwrap()
    }

    async fn echoed(response: http::Response<Body>) -> serde_json::Value {
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_echo_sees_rewritten_path() {
        let response = call(router(StrategyKind::Path, false), "/about?x=1", "fr, en").await;

        assert_eq!(
            echoed(response).await,
            json!({
                "method": "GET",
                "path": "/fr/about",
                "query": "x=1",
                "accept_language": "fr, en",
            })
        );
    }

    #[tokio::test]
    async fn test_echo_sees_rewritten_header() {
        let response = call(router(StrategyKind::Header, false), "/", "it, de;q=0.4").await;

        assert_eq!(
            echoed(response).await,
            json!({
                "method": "GET",
                "path": "/",
                "query": null,
                "accept_language": "de",
            })
        );
    }

    #[tokio::test]
    async fn test_echo_sees_rewritten_query() {
        let response = call(router(StrategyKind::Query, false), "/search?q=cat", "de").await;
        let echo = echoed(response).await;

        assert_eq!(echo["path"], "/search");
        assert_eq!(echo["query"], "lang=de&q=cat");
    }

    #[tokio::test]
    async fn test_redirects_before_echo() {
        let response = call(router(StrategyKind::Path, true), "/about", "fr").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/fr/about");
    }

    #[tokio::test]
    async fn test_redirect_stays_on_the_origin() {
        let response = call(
            router(StrategyKind::Query, true),
            "//evil.example/phish",
            "de",
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/evil.example/phish?lang=de");
    }

    #[tokio::test]
    async fn test_default_language_passes_through() {
        let response = call(router(StrategyKind::Path, true), "/about", "it").await;
        let echo = echoed(response).await;

        assert_eq!(echo["path"], "/about");
        assert_eq!(echo["accept_language"], "it");
    }
}
