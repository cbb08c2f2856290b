// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use lang_redirect_config::{ConfigurationSection, RootConfig};
use tokio::io::AsyncWriteExt;
use tracing::{info, info_span};

use crate::util::negotiator_from_config;

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Dump the current config as YAML
    Dump {
        /// The path to the config file to dump
        ///
        /// If not specified, the config will be written to stdout
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Check a config file
    Check,

    /// Generate a sample config file
    Generate {
        /// The path to the config file to generate
        ///
        /// If not specified, the config will be written to stdout
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

/// Write the config as YAML to the given file, or to stdout
async fn write_config(config: &RootConfig, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let config = serde_yaml::to_string(config)?;

    if let Some(output) = output {
        info!("Writing configuration to {output:?}");
        let mut file = tokio::fs::File::create(output).await?;
        file.write_all(config.as_bytes()).await?;
    } else {
        info!("Writing configuration to standard output");
        tokio::io::stdout().write_all(config.as_bytes()).await?;
    }

    Ok(())
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Dump { output } => {
                let _span = info_span!("cli.config.dump").entered();

                let config = RootConfig::extract(figment)
                    .map_err(anyhow::Error::from_boxed)
                    .context("invalid configuration")?;
                write_config(&config, output).await?;
            }

            SC::Check => {
                let _span = info_span!("cli.config.check").entered();

                let config = RootConfig::extract(figment)
                    .map_err(anyhow::Error::from_boxed)
                    .context("invalid configuration")?;
                // Also go through the same checks the server does on startup
                let _negotiator = negotiator_from_config(&config.language)?;
                info!("Configuration file looks good");
            }

            SC::Generate { output } => {
                let _span = info_span!("cli.config.generate").entered();

                let config = RootConfig::generate();
                write_config(&config, output).await?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
