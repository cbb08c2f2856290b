// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

mod config;
mod debug;
mod server;

/// Environment variable holding a `:`-separated list of configuration files,
/// used when no `--config` flag is given
const CONFIG_ENV: &str = "LANG_REDIRECT_CONFIG";

/// Prefix of the environment variables which override configuration values
const ENV_PREFIX: &str = "LANG_REDIRECT_";

#[derive(Parser, Debug)]
enum Subcommand {
    /// Configuration-related commands
    Config(self::config::Options),

    /// Run the language redirect server
    Server(self::server::Options),

    /// Debug utilities
    #[clap(hide = true)]
    Debug(self::debug::Options),
}

#[derive(Parser, Debug)]
#[command(version = crate::VERSION)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, global = true, action = clap::ArgAction::Append)]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            Some(S::Config(c)) => c.run(figment).await,
            Some(S::Server(c)) => c.run(figment).await,
            Some(S::Debug(c)) => c.run(figment),
            None => self::server::Options::default().run(figment).await,
        }
    }

    /// Build the [`Figment`] out of the configuration files and environment.
    ///
    /// Files are merged in order, each one on top of the previous ones and of
    /// the environment.
    pub fn figment(&self) -> Figment {
        let configs = if self.config.is_empty() {
            std::env::var(CONFIG_ENV)
                .unwrap_or_else(|_| "config.yaml".to_owned())
                .split(':')
                .map(Utf8PathBuf::from)
                .collect()
        } else {
            self.config.clone()
        };

        let base = Figment::new().merge(Env::prefixed(ENV_PREFIX).split("__"));

        configs
            .into_iter()
            .fold(base, |f, path| f.admerge(Yaml::file(path)))
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use lang_redirect_config::{ConfigurationSection, LanguageConfig, LanguageStrategyKind};

    use super::*;

    #[test]
    fn figment_reads_explicit_config_files() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "base.yaml",
                r"
                    language:
                      languages: [en, fr]
                      default_language: en
                ",
            )?;
            jail.create_file(
                "override.yaml",
                r"
                    language:
                      strategy: path
                ",
            )?;

            let opts = Options::try_parse_from([
                "lang-redirect",
                "--config",
                "base.yaml",
                "--config",
                "override.yaml",
                "config",
                "check",
            ])
            .unwrap();

            let config = LanguageConfig::extract(&opts.figment()).unwrap();
            assert_eq!(config.languages, ["en", "fr"]);
            assert_eq!(config.strategy, LanguageStrategyKind::Path);

            Ok(())
        });
    }

    #[test]
    fn figment_defaults_to_config_env_and_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "one.yaml",
                r"
                    language:
                      languages: [en, de]
                ",
            )?;
            jail.set_env("LANG_REDIRECT_CONFIG", "one.yaml");
            jail.set_env("LANG_REDIRECT_LANGUAGE__DEFAULT_LANGUAGE", "de");
            jail.set_env("LANG_REDIRECT_LANGUAGE__STRATEGY", "query");

            let opts = Options::try_parse_from(["lang-redirect"]).unwrap();
            assert!(opts.subcommand.is_none());

            let config = LanguageConfig::extract(&opts.figment()).unwrap();
            assert_eq!(config.languages, ["en", "de"]);
            assert_eq!(config.default_language, "de");
            assert_eq!(config.strategy, LanguageStrategyKind::Query);

            Ok(())
        });
    }

    #[test]
    fn config_files_win_over_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    language:
                      languages: [en]
                      default_language: en
                      param: lg
                ",
            )?;
            jail.set_env("LANG_REDIRECT_LANGUAGE__PARAM", "locale");

            let opts = Options::try_parse_from(["lang-redirect", "server"]).unwrap();
            let config = LanguageConfig::extract(&opts.figment()).unwrap();
            assert_eq!(config.param, "lg");

            Ok(())
        });
    }
}
