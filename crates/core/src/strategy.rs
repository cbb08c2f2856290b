// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The channels through which the negotiated language is handed to the
//! downstream handlers.

use std::{borrow::Cow, fmt, str::FromStr};

use http::{HeaderValue, Request, Uri, header::ACCEPT_LANGUAGE, uri::PathAndQuery};
use percent_encoding::percent_decode_str;

use crate::{ConfigError, InvalidStrategy, RewriteError};

/// Which channel to use to encode the language in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Overwrite the `Accept-Language` header
    #[default]
    Header,

    /// Prefix the request path with the language
    Path,

    /// Set a query parameter
    Query,
}

impl StrategyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Path => "path",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = InvalidStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(Self::Header),
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            other => Err(InvalidStrategy(other.to_owned())),
        }
    }
}

/// A strategy to read and write the language encoded in a request.
///
/// Note that the variants don't agree on what "reading" means:
///
///  - [`LanguageStrategy::Header`] returns the whole raw `Accept-Language`
///    value, not a parsed tag, so a multi-valued header never compares equal
///    to a single language and always gets rewritten.
///  - [`LanguageStrategy::Path`] only recognizes first segments which are
///    exactly two bytes long once percent-decoded. Longer tags like `fr-CA`
///    are never seen as already present, and any unrelated two-letter segment
///    (`/js/app.js`) is taken for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageStrategy {
    Header,
    Path,
    Query { param: String },
}

impl LanguageStrategy {
    /// Build the strategy for the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLanguageParam`] if the kind is
    /// [`StrategyKind::Query`] and the parameter name is empty.
    pub fn new(kind: StrategyKind, param: &str) -> Result<Self, ConfigError> {
        match kind {
            StrategyKind::Header => Ok(Self::Header),
            StrategyKind::Path => Ok(Self::Path),
            StrategyKind::Query if param.is_empty() => Err(ConfigError::MissingLanguageParam),
            StrategyKind::Query => Ok(Self::Query {
                param: param.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Header => StrategyKind::Header,
            Self::Path => StrategyKind::Path,
            Self::Query { .. } => StrategyKind::Query,
        }
    }

    /// Get the language currently encoded in the request, or an empty string
    /// if there is none.
    #[must_use]
    pub fn read_encoded<'a, B>(&self, request: &'a Request<B>) -> Cow<'a, str> {
        match self {
            Self::Header => request
                .headers()
                .get(ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .map_or(Cow::Borrowed(""), Cow::Borrowed),

            Self::Path => {
                let segment = request.uri().path().split('/').nth(1).unwrap_or_default();
                let segment = percent_decode_str(segment).decode_utf8_lossy();
                if segment.len() == 2 {
                    segment
                } else {
                    Cow::Borrowed("")
                }
            }

            Self::Query { param } => request
                .uri()
                .query()
                .and_then(|query| {
                    form_urlencoded::parse(query.as_bytes())
                        .find(|(key, _)| key == param)
                        .map(|(_, value)| Cow::Owned(value.into_owned()))
                })
                .unwrap_or(Cow::Borrowed("")),
        }
    }

    /// Rewrite the request so that it carries the given language.
    ///
    /// # Errors
    ///
    /// Returns an error if the language can't be put in a header or in a URI.
    /// The request is left untouched in that case.
    pub fn write_encoded<B>(
        &self,
        request: &mut Request<B>,
        language: &str,
    ) -> Result<(), RewriteError> {
        match self {
            Self::Header => {
                let value = HeaderValue::from_str(language).map_err(|source| {
                    RewriteError::InvalidHeaderValue {
                        language: language.to_owned(),
                        source,
                    }
                })?;
                request.headers_mut().insert(ACCEPT_LANGUAGE, value);
            }

            Self::Path => {
                let uri = request.uri();
                let path = if uri.path() == "/" {
                    format!("/{language}")
                } else {
                    format!("/{language}{}", uri.path())
                };
                let path_and_query = match uri.query() {
                    Some(query) => format!("{path}?{query}"),
                    None => path,
                };
                set_path_and_query(request, &path_and_query)?;
            }

            Self::Query { param } => {
                let mut pairs: Vec<(String, String)> = request
                    .uri()
                    .query()
                    .map(|query| {
                        form_urlencoded::parse(query.as_bytes())
                            .into_owned()
                            .filter(|(key, _)| key != param)
                            .collect()
                    })
                    .unwrap_or_default();
                pairs.push((param.clone(), language.to_owned()));
                // Stable sort, so repeated keys keep their relative order
                pairs.sort_by(|(a, _), (b, _)| a.cmp(b));

                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                let path_and_query = format!("{}?{query}", request.uri().path());
                set_path_and_query(request, &path_and_query)?;
            }
        }

        Ok(())
    }
}

fn set_path_and_query<B>(
    request: &mut Request<B>,
    path_and_query: &str,
) -> Result<(), RewriteError> {
    let path_and_query = PathAndQuery::try_from(path_and_query).map_err(http::Error::from)?;
    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    *request.uri_mut() = Uri::from_parts(parts).map_err(http::Error::from)?;
    Ok(())
}
