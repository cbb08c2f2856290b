// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{process::ExitCode, time::Duration};

use tokio::signal::unix::{Signal, SignalKind};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Listens for SIGTERM and SIGINT, and drives the shutdown of the tasks it
/// tracks.
///
/// The first signal triggers a soft shutdown: servers stop accepting new
/// connections and finish in-flight requests. A second signal, or the grace
/// period running out, triggers a hard shutdown where everything is dropped.
pub struct ShutdownManager {
    hard_shutdown_token: CancellationToken,
    soft_shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
    sigterm: Signal,
    sigint: Signal,
    timeout: Duration,
}

impl ShutdownManager {
    /// Create a new shutdown manager, installing the signal handlers
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handler could not be installed
    pub fn new() -> Result<Self, std::io::Error> {
        let hard_shutdown_token = CancellationToken::new();
        let soft_shutdown_token = hard_shutdown_token.child_token();
        let sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
        let sigint = tokio::signal::unix::signal(SignalKind::interrupt())?;

        Ok(Self {
            hard_shutdown_token,
            soft_shutdown_token,
            task_tracker: TaskTracker::new(),
            sigterm,
            sigint,
            timeout: Duration::from_secs(30),
        })
    }

    /// Set how long in-flight requests get to finish after the first signal
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn task_tracker(&self) -> &TaskTracker {
        &self.task_tracker
    }

    #[must_use]
    pub fn hard_shutdown_token(&self) -> CancellationToken {
        self.hard_shutdown_token.clone()
    }

    #[must_use]
    pub fn soft_shutdown_token(&self) -> CancellationToken {
        self.soft_shutdown_token.clone()
    }

    /// Run until every tracked task is done, or until the shutdown is forced.
    ///
    /// Returns a failure exit code if the shutdown was triggered by a task
    /// rather than by a signal.
    pub async fn run(mut self) -> ExitCode {
        let likely_crashed = tokio::select! {
            () = self.soft_shutdown_token.cancelled() => {
                tracing::warn!("A task triggered a shutdown, it likely crashed! Shutting down");
                true
            },
            _ = self.sigterm.recv() => {
                tracing::info!("Shutdown signal received (SIGTERM), shutting down");
                false
            },
            _ = self.sigint.recv() => {
                tracing::info!("Shutdown signal received (SIGINT), shutting down");
                false
            },
        };

        self.soft_shutdown_token.cancel();
        self.task_tracker.close();

        let timeout = tokio::time::sleep(self.timeout);
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::warn!("Second shutdown signal received (SIGTERM), abort");
            },
            _ = self.sigint.recv() => {
                tracing::warn!("Second shutdown signal received (SIGINT), abort");
            },
            () = timeout => {
                tracing::warn!("Shutdown timeout reached, abort");
            },
            () = self.task_tracker.wait() => {},
        }

        self.hard_shutdown_token.cancel();
        self.task_tracker.wait().await;

        tracing::info!("All tasks are done, exiting");

        if likely_crashed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
