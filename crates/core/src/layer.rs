// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use tower_layer::Layer;

use crate::{ConfigError, LanguageNegotiator, LanguageRedirectService, NegotiatorSettings};

/// A layer which negotiates the language of each request, rewriting or
/// redirecting it before it reaches the inner service.
#[derive(Debug, Clone)]
pub struct LanguageRedirectLayer {
    negotiator: Arc<LanguageNegotiator>,
}

impl LanguageRedirectLayer {
    #[must_use]
    pub fn new(negotiator: impl Into<Arc<LanguageNegotiator>>) -> Self {
        Self {
            negotiator: negotiator.into(),
        }
    }

    /// Build the layer straight from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, see
    /// [`LanguageNegotiator::new`]
    pub fn from_settings(settings: NegotiatorSettings) -> Result<Self, ConfigError> {
        LanguageNegotiator::new(settings).map(Self::new)
    }
}

impl<S> Layer<S> for LanguageRedirectLayer {
    type Service = LanguageRedirectService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LanguageRedirectService::new(inner, self.negotiator.clone())
    }
}
