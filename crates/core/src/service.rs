// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response, StatusCode};
use tower_service::Service;

use crate::{LanguageNegotiator, ResponseFuture};

/// A service which runs the [`LanguageNegotiator`] on each request before
/// handing it to the inner service.
///
/// Redirects and rewrite failures are answered directly, without calling the
/// inner service.
#[derive(Debug, Clone)]
pub struct LanguageRedirectService<S> {
    inner: S,
    negotiator: Arc<LanguageNegotiator>,
}

impl<S> LanguageRedirectService<S> {
    pub fn new(inner: S, negotiator: Arc<LanguageNegotiator>) -> Self {
        Self { inner, negotiator }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for LanguageRedirectService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Default,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        match self.negotiator.negotiate(&mut req) {
            Ok(decision) => match decision.into_response() {
                Some(response) => ResponseFuture::ready(response),
                None => ResponseFuture::inner(self.inner.call(req)),
            },

            Err(err) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    uri = %req.uri(),
                    "Failed to rewrite the request language"
                );
                let mut response = Response::new(ResBody::default());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                ResponseFuture::ready(response)
            }
        }
    }
}
