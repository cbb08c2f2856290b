// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::Figment;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod http;
mod language;

pub use self::{
    http::HttpConfig,
    language::{LanguageConfig, LanguageStrategyKind},
};
use crate::{SectionError, util::ConfigurationSection};

/// Application configuration root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Configuration of the HTTP server
    #[serde(default, skip_serializing_if = "HttpConfig::is_default")]
    pub http: HttpConfig,

    /// Configuration of the language negotiation
    pub language: LanguageConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &Figment) -> Result<(), SectionError> {
        self.http.validate(figment)?;
        self.language.validate(figment)?;

        Ok(())
    }
}

impl RootConfig {
    /// Generate a sample configuration
    #[must_use]
    pub fn generate() -> Self {
        Self {
            http: HttpConfig::default(),
            language: LanguageConfig::sample(),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Jail,
        providers::{Env, Format, Serialized, Yaml},
    };

    use super::*;

    #[test]
    fn load_root_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    language:
                      languages: [en, fr]
                      default_language: en
                      strategy: path
                ",
            )?;
            jail.set_env("LANG_REDIRECT_LANGUAGE__REDIRECT_AFTER_HANDLING", "true");

            let figment = Figment::new()
                .merge(Env::prefixed("LANG_REDIRECT_").split("__"))
                .admerge(Yaml::file("config.yaml"));
            let config = RootConfig::extract(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.http, HttpConfig::default());
            assert_eq!(config.language.strategy, LanguageStrategyKind::Path);
            assert!(config.language.redirect_after_handling);

            Ok(())
        });
    }

    #[test]
    fn missing_language_section_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "http:\n  listen: '[::1]:8080'\n")?;
            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            assert!(RootConfig::extract(&figment).is_err());

            Ok(())
        });
    }

    #[test]
    fn generated_config_round_trips() {
        let generated = RootConfig::generate();
        let figment = Figment::from(Serialized::defaults(&generated));
        let config = RootConfig::extract(&figment).unwrap();
        assert_eq!(config, generated);
    }
}
