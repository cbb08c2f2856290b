// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Negotiate the language of incoming HTTP requests, and hand it to the
//! downstream services through a header, a path prefix or a query parameter.
//!
//! The [`LanguageNegotiator`] holds the logic and works on plain
//! [`http::Request`]s; the [`LanguageRedirectLayer`] wraps it as a [`tower`]
//! middleware.
//!
//! [`tower`]: https://docs.rs/tower

#![allow(clippy::module_name_repetitions)]

mod error;
mod future;
mod layer;
mod negotiator;
pub mod preference;
mod service;
mod strategy;

pub use self::{
    error::{ConfigError, InvalidStrategy, RewriteError},
    future::ResponseFuture,
    layer::LanguageRedirectLayer,
    negotiator::{Decision, LanguageNegotiator, NegotiatorSettings},
    preference::{LanguageSet, parse_accept_language},
    service::LanguageRedirectService,
    strategy::{LanguageStrategy, StrategyKind},
};
