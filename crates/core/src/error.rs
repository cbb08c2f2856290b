// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use thiserror::Error;

/// The strategy selector was not one of `header`, `path` or `query`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid language strategy {0:?}, expected one of \"header\", \"path\" or \"query\"")]
pub struct InvalidStrategy(pub String);

/// Errors which can happen when building a [`crate::LanguageNegotiator`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one supported language is required")]
    NoLanguages,

    #[error("a default language is required")]
    MissingDefaultLanguage,

    #[error("a language parameter name is required when using the query strategy")]
    MissingLanguageParam,
}

/// Errors which can happen when rewriting a request to carry a language.
///
/// These can only be triggered by a configured language tag which can't be
/// represented in a header or in a URI.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("language {language:?} is not a valid header value")]
    InvalidHeaderValue {
        language: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    #[error("could not build the rewritten request URI")]
    InvalidUri(#[from] http::Error),
}
