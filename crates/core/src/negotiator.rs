// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use http::{
    HeaderValue, Request, Response, StatusCode, Uri,
    header::{ACCEPT_LANGUAGE, LOCATION},
    uri::PathAndQuery,
};

use crate::{
    ConfigError, LanguageSet, LanguageStrategy, RewriteError, StrategyKind,
    preference::parse_accept_language,
};

/// Settings used to build a [`LanguageNegotiator`]
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatorSettings {
    /// The languages the site supports. Tags are matched exactly.
    pub languages: Vec<String>,

    /// The language to use when the client accepts none of the supported ones
    pub default_language: String,

    /// Whether requests resolving to the default language should still be
    /// rewritten
    pub default_language_handling: bool,

    /// How to encode the language in the request
    pub strategy: StrategyKind,

    /// The name of the query parameter, used by the query strategy
    pub language_param: String,

    /// Whether to redirect the client to the rewritten URL instead of
    /// forwarding the request
    pub redirect_after_handling: bool,
}

impl Default for NegotiatorSettings {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            default_language: String::new(),
            default_language_handling: false,
            strategy: StrategyKind::default(),
            language_param: "lang".to_owned(),
            redirect_after_handling: false,
        }
    }
}

/// What to do with a request once the negotiator looked at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request, rewritten or not, to the next service
    Forward,

    /// Answer with a redirect to the rewritten URL
    Redirect { location: HeaderValue },
}

impl Decision {
    /// Whether the request should be forwarded to the next service
    #[must_use]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward)
    }

    /// Build the `302 Found` response for a redirect decision, or `None` if
    /// the request should be forwarded.
    #[must_use]
    pub fn into_response<B: Default>(self) -> Option<Response<B>> {
        match self {
            Self::Forward => None,
            Self::Redirect { location } => {
                let mut response = Response::new(B::default());
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(LOCATION, location);
                Some(response)
            }
        }
    }
}

/// Picks the language a request should be served in, and rewrites the request
/// so that it carries it.
///
/// It holds no per-request state, so a single instance can be shared between
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct LanguageNegotiator {
    languages: LanguageSet,
    strategy: LanguageStrategy,
    default_language_handling: bool,
    redirect_after_handling: bool,
}

impl LanguageNegotiator {
    /// Build a new negotiator out of the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no supported languages, if the default
    /// language is empty, or if the query strategy is used without a parameter
    /// name.
    pub fn new(settings: NegotiatorSettings) -> Result<Self, ConfigError> {
        if settings.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }

        if settings.default_language.is_empty() {
            return Err(ConfigError::MissingDefaultLanguage);
        }

        let strategy = LanguageStrategy::new(settings.strategy, &settings.language_param)?;

        Ok(Self {
            languages: LanguageSet::new(settings.languages, settings.default_language),
            strategy,
            default_language_handling: settings.default_language_handling,
            redirect_after_handling: settings.redirect_after_handling,
        })
    }

    #[must_use]
    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    #[must_use]
    pub fn strategy(&self) -> &LanguageStrategy {
        &self.strategy
    }

    /// Resolve the language to use given a raw `Accept-Language` value
    #[must_use]
    pub fn preferred_language<'a>(&'a self, accept_language: &'a str) -> &'a str {
        let candidates = parse_accept_language(accept_language);
        self.languages.preferred(&candidates)
    }

    /// Look at the request, rewrite it if needed and decide whether it should
    /// be forwarded or redirected.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be rewritten, in which case
    /// it is left untouched and should not be forwarded.
    pub fn negotiate<B>(&self, request: &mut Request<B>) -> Result<Decision, RewriteError> {
        let accept_language = request
            .headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let language = self.preferred_language(accept_language).to_owned();

        if language.is_empty()
            || (language == self.languages.fallback() && !self.default_language_handling)
        {
            tracing::trace!(%language, "Default language, leaving the request untouched");
            return Ok(Decision::Forward);
        }

        let strategy = self.strategy.kind();
        let encoded = self.strategy.read_encoded(request);
        if !encoded.is_empty() && encoded == language.as_str() {
            tracing::trace!(%language, %strategy, "Request already carries the language");
            return Ok(Decision::Forward);
        }
        drop(encoded);

        self.strategy.write_encoded(request, &language)?;
        tracing::debug!(%language, %strategy, uri = %request.uri(), "Rewrote request language");

        if !self.redirect_after_handling {
            return Ok(Decision::Forward);
        }

        let location = redirect_location(request.uri());
        let location =
            HeaderValue::try_from(location).map_err(|source| RewriteError::InvalidHeaderValue {
                language: language.clone(),
                source,
            })?;
        tracing::debug!(%language, ?location, "Redirecting to the rewritten URL");

        Ok(Decision::Redirect { location })
    }
}

/// Render the rewritten request URI as a `Location` which stays on the
/// current origin.
///
/// An origin-form target like `//other.example/x` would be read by browsers
/// as a scheme-relative URL pointing at another host, so leading slashes (and
/// backslashes, which browsers treat the same) are collapsed into one.
fn redirect_location(uri: &Uri) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let target = uri.path_and_query().map_or("/", PathAndQuery::as_str);
    let trimmed = target.trim_start_matches(['/', '\\']);
    if target.len() - trimmed.len() > 1 || target.starts_with('\\') {
        format!("/{trimmed}")
    } else {
        target.to_owned()
    }
}
