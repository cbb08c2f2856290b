// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use anyhow::Context;
use lang_redirect_config::{LanguageConfig, LanguageStrategyKind};
use lang_redirect_core::{LanguageNegotiator, NegotiatorSettings, StrategyKind};

fn strategy_kind_from_config(kind: LanguageStrategyKind) -> StrategyKind {
    match kind {
        LanguageStrategyKind::Header => StrategyKind::Header,
        LanguageStrategyKind::Path => StrategyKind::Path,
        LanguageStrategyKind::Query => StrategyKind::Query,
    }
}

pub fn negotiator_settings_from_config(config: &LanguageConfig) -> NegotiatorSettings {
    NegotiatorSettings {
        languages: config.languages.clone(),
        default_language: config.default_language.clone(),
        default_language_handling: config.default_language_handling,
        strategy: strategy_kind_from_config(config.strategy),
        language_param: config.param.clone(),
        redirect_after_handling: config.redirect_after_handling,
    }
}

pub fn negotiator_from_config(config: &LanguageConfig) -> anyhow::Result<LanguageNegotiator> {
    let settings = negotiator_settings_from_config(config);
    LanguageNegotiator::new(settings).context("invalid language configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_field() {
        let config = LanguageConfig {
            languages: vec!["en".to_owned(), "fr".to_owned()],
            default_language: "fr".to_owned(),
            default_language_handling: true,
            strategy: LanguageStrategyKind::Query,
            param: "lg".to_owned(),
            redirect_after_handling: true,
        };

        let settings = negotiator_settings_from_config(&config);
        assert_eq!(settings.languages, ["en", "fr"]);
        assert_eq!(settings.default_language, "fr");
        assert!(settings.default_language_handling);
        assert_eq!(settings.strategy, StrategyKind::Query);
        assert_eq!(settings.language_param, "lg");
        assert!(settings.redirect_after_handling);

        let negotiator = negotiator_from_config(&config).unwrap();
        assert_eq!(negotiator.strategy().kind(), StrategyKind::Query);
        assert_eq!(negotiator.languages().fallback(), "fr");
    }

    #[test]
    fn maps_strategies() {
        assert_eq!(
            strategy_kind_from_config(LanguageStrategyKind::Header),
            StrategyKind::Header
        );
        assert_eq!(
            strategy_kind_from_config(LanguageStrategyKind::Path),
            StrategyKind::Path
        );
        assert_eq!(
            strategy_kind_from_config(LanguageStrategyKind::Query),
            StrategyKind::Query
        );
    }

    #[test]
    fn rejects_unusable_config() {
        let config = LanguageConfig {
            languages: Vec::new(),
            ..LanguageConfig::sample()
        };
        assert!(negotiator_from_config(&config).is_err());
    }
}
