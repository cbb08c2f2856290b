// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{io::Write, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use figment::Figment;
use http::{Request, header::ACCEPT_LANGUAGE};
use lang_redirect_config::{ConfigurationSection, LanguageConfig};
use lang_redirect_core::{Decision, LanguageNegotiator, StrategyKind};
use serde::Serialize;
use tracing::info_span;

use crate::util::negotiator_settings_from_config;

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Show what the middleware would do with a request
    Negotiate {
        /// The value of the `Accept-Language` header
        #[arg(long, default_value = "")]
        accept_language: String,

        /// The request URI, path and query
        #[arg(long, default_value = "/")]
        uri: String,

        /// Use this strategy (`header`, `path` or `query`) instead of the
        /// configured one
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
}

/// Outcome of a dry-run negotiation
#[derive(Debug, PartialEq, Eq, Serialize)]
struct Report {
    language: String,
    redirect: Option<String>,
    uri: String,
    accept_language: Option<String>,
}

fn negotiate(
    negotiator: &LanguageNegotiator,
    accept_language: &str,
    uri: &str,
) -> anyhow::Result<Report> {
    let mut request = Request::builder()
        .uri(uri)
        .header(ACCEPT_LANGUAGE, accept_language)
        .body(())
        .context("invalid request")?;

    let language = negotiator.preferred_language(accept_language).to_owned();
    let decision = negotiator.negotiate(&mut request)?;

    let redirect = match decision {
        Decision::Forward => None,
        Decision::Redirect { location } => {
            Some(String::from_utf8_lossy(location.as_bytes()).into_owned())
        }
    };

    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    Ok(Report {
        language,
        redirect,
        uri: request.uri().to_string(),
        accept_language,
    })
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Negotiate {
                accept_language,
                uri,
                strategy,
            } => {
                let _span = info_span!("cli.debug.negotiate").entered();
                let config = LanguageConfig::extract(figment)
                    .map_err(anyhow::Error::from_boxed)
                    .context("failed to load the language config")?;

                let mut settings = negotiator_settings_from_config(&config);
                if let Some(strategy) = strategy {
                    settings.strategy = strategy;
                }
                let negotiator =
                    LanguageNegotiator::new(settings).context("invalid language configuration")?;

                let report = negotiate(&negotiator, &accept_language, &uri)?;

                let mut stdout = std::io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
