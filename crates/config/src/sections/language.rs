// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::Figment;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};

use crate::{ConfigurationSection, SectionError, util::error_on_field};

fn default_param() -> String {
    "lang".to_owned()
}

fn is_default_param(param: &str) -> bool {
    param == "lang"
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// How the negotiated language is passed to the downstream handlers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, JsonSchema, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageStrategyKind {
    /// Overwrite the `Accept-Language` header with the negotiated language
    #[default]
    Header,

    /// Prefix the request path with the negotiated language, e.g. `/fr/about`
    Path,

    /// Set a query parameter to the negotiated language, e.g. `?lang=fr`
    Query,
}

/// Configuration of the language negotiation
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema, Serialize)]
pub struct LanguageConfig {
    /// Languages supported by the site. Tags are compared exactly and are
    /// case-sensitive, so `fr` does not match `fr-CA` nor `FR`.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Language used when the client accepts none of the supported languages
    #[serde(default)]
    pub default_language: String,

    /// Whether requests resolving to the default language should still be
    /// rewritten. When disabled, those requests are left untouched.
    #[serde(default, skip_serializing_if = "is_false")]
    pub default_language_handling: bool,

    /// How the negotiated language is passed to the downstream handlers
    #[serde(default)]
    pub strategy: LanguageStrategyKind,

    /// Name of the query parameter, used by the `query` strategy
    #[serde(default = "default_param", skip_serializing_if = "is_default_param")]
    pub param: String,

    /// Whether to redirect the client to the rewritten URL, instead of
    /// forwarding the rewritten request
    #[serde(default, skip_serializing_if = "is_false")]
    pub redirect_after_handling: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            default_language: String::new(),
            default_language_handling: false,
            strategy: LanguageStrategyKind::default(),
            param: default_param(),
            redirect_after_handling: false,
        }
    }
}

impl LanguageConfig {
    /// A sample configuration, used when generating a new config file
    #[must_use]
    pub fn sample() -> Self {
        Self {
            languages: vec!["en".to_owned(), "fr".to_owned(), "de".to_owned()],
            default_language: "en".to_owned(),
            ..Self::default()
        }
    }
}

impl ConfigurationSection for LanguageConfig {
    const PATH: Option<&'static str> = Some("language");

    fn validate(&self, figment: &Figment) -> Result<(), SectionError> {
        let path = Self::PATH.unwrap_or_default();

        if self.languages.is_empty() {
            let error =
                figment::error::Error::invalid_length(0, &"at least one entry in `languages`");
            return Err(error_on_field(figment, path, "languages", error).into());
        }

        if self.default_language.is_empty() {
            let error = figment::error::Error::missing_field("default_language");
            return Err(error_on_field(figment, path, "default_language", error).into());
        }

        if self.strategy == LanguageStrategyKind::Query && self.param.is_empty() {
            let error = figment::error::Error::custom(
                "a parameter name is required when using the query strategy",
            );
            return Err(error_on_field(figment, path, "param", error).into());
        }

        if !self.languages.contains(&self.default_language) {
            tracing::warn!(
                default_language = %self.default_language,
                "The default language is not one of the supported languages"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Format, Yaml},
    };

    use super::*;

    fn load(jail: &mut Jail, yaml: &str) -> Result<LanguageConfig, SectionError> {
        jail.create_file("config.yaml", yaml)?;
        let figment = Figment::new().merge(Yaml::file("config.yaml"));
        LanguageConfig::extract(&figment)
    }

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            let config = load(
                jail,
                r"
                    language:
                      languages: [en, fr-CA, de]
                      default_language: en
                      strategy: query
                      param: lg
                      redirect_after_handling: true
                ",
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.languages, vec!["en", "fr-CA", "de"]);
            assert_eq!(config.default_language, "en");
            assert_eq!(config.strategy, LanguageStrategyKind::Query);
            assert_eq!(config.param, "lg");
            assert!(config.redirect_after_handling);
            assert!(!config.default_language_handling);

            Ok(())
        });
    }

    #[test]
    fn load_config_defaults() {
        Jail::expect_with(|jail| {
            let config = load(
                jail,
                r"
                    language:
                      languages: [en]
                      default_language: en
                ",
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.strategy, LanguageStrategyKind::Header);
            assert_eq!(config.param, "lang");
            assert!(!config.redirect_after_handling);
            assert!(!config.default_language_handling);

            Ok(())
        });
    }

    #[test]
    fn reject_invalid_config() {
        Jail::expect_with(|jail| {
            let err = load(
                jail,
                r"
                    language:
                      languages: []
                      default_language: en
                ",
            )
            .unwrap_err();
            assert!(err.to_string().contains("languages"), "{err}");

            let err = load(
                jail,
                r"
                    language:
                      languages: [en]
                ",
            )
            .unwrap_err();
            assert!(err.to_string().contains("default_language"), "{err}");

            let err = load(
                jail,
                r#"
                    language:
                      languages: [en]
                      default_language: en
                      strategy: query
                      param: ""
                "#,
            )
            .unwrap_err();
            assert!(err.to_string().contains("param"), "{err}");

            let err = load(
                jail,
                r"
                    language:
                      languages: [en]
                      default_language: en
                      strategy: cookie
                ",
            )
            .unwrap_err();
            assert!(err.to_string().contains("cookie"), "{err}");

            Ok(())
        });
    }

    #[test]
    fn sample_is_valid() {
        let figment = Figment::new();
        let sample = LanguageConfig::sample();
        assert!(sample.validate(&figment).is_ok());
        assert_eq!(sample.strategy, LanguageStrategyKind::Header);
    }
}
