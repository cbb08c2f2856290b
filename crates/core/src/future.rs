// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use http::Response;

pin_project_lite::pin_project! {
    /// The response future of a [`crate::LanguageRedirectService`]: either the
    /// inner service's future, or a response built by the negotiator.
    #[project = ResponseFutureProj]
    pub enum ResponseFuture<F, B> {
        Inner {
            #[pin]
            inner: F,
        },
        Ready {
            response: Option<Response<B>>,
        },
    }
}

impl<F, B> ResponseFuture<F, B> {
    pub(crate) fn inner(inner: F) -> Self {
        Self::Inner { inner }
    }

    pub(crate) fn ready(response: Response<B>) -> Self {
        Self::Ready {
            response: Some(response),
        }
    }
}

impl<F, B, E> Future for ResponseFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Inner { inner } => inner.poll(cx),
            ResponseFutureProj::Ready { response } => {
                let response = response
                    .take()
                    .expect("ResponseFuture polled after completion");
                Poll::Ready(Ok(response))
            }
        }
    }
}
