// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{net::SocketAddr, process::ExitCode, time::Duration};

use anyhow::Context;
use clap::Parser;
use figment::Figment;
use lang_redirect_config::{
    ConfigurationSection, ConfigurationSectionExt, HttpConfig, LanguageConfig,
};
use tracing::{info, info_span};

use crate::{
    server::{build_router, run_server},
    shutdown::ShutdownManager,
    util::negotiator_from_config,
};

#[derive(Parser, Debug)]
pub(super) struct Options {
    /// Address to listen on, overriding `http.listen` from the configuration
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// How many seconds in-flight requests get to finish on shutdown
    #[arg(long, default_value_t = 30)]
    shutdown_timeout: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            listen: None,
            shutdown_timeout: 30,
        }
    }
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let span = info_span!("cli.run.init").entered();

        let http_config = HttpConfig::extract_or_default(figment)
            .map_err(anyhow::Error::from_boxed)
            .context("failed to load the http config")?;
        let language_config = LanguageConfig::extract(figment)
            .map_err(anyhow::Error::from_boxed)
            .context("failed to load the language config")?;

        let negotiator = negotiator_from_config(&language_config)?;
        info!(
            strategy = %negotiator.strategy().kind(),
            default_language = negotiator.languages().fallback(),
            redirect = language_config.redirect_after_handling,
            "Language negotiation ready"
        );

        let router = build_router(negotiator);
        let listen = self.listen.unwrap_or(http_config.listen);

        let shutdown =
            ShutdownManager::new()?.with_timeout(Duration::from_secs(self.shutdown_timeout));
        let soft_shutdown_token = shutdown.soft_shutdown_token();
        let hard_shutdown_token = shutdown.hard_shutdown_token();

        shutdown.task_tracker().spawn(async move {
            if let Err(err) = run_server(
                listen,
                router,
                soft_shutdown_token.clone(),
                hard_shutdown_token,
            )
            .await
            {
                tracing::error!(
                    error = &*err as &dyn std::error::Error,
                    "Server stopped unexpectedly"
                );
                // Bring everything else down with us
                soft_shutdown_token.cancel();
            }
        });

        span.exit();

        Ok(shutdown.run().await)
    }
}
