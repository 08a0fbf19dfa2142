// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux-backed multiplexer client.

use super::{MuxClient, MuxError, Pane};
use crate::env;
use async_trait::async_trait;
use muster_core::PaneId;
use std::path::Path;
use tokio::process::Command;

/// Multiplexer client shelling out to `tmux`.
#[derive(Clone, Default)]
pub struct TmuxMux;

impl TmuxMux {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        let output = tokio::time::timeout(
            env::mux_timeout(),
            Command::new(env::tmux_bin()).args(args).output(),
        )
        .await
        .map_err(|_| MuxError::Unavailable("tmux call timed out".to_string()))?
        .map_err(|e| MuxError::Unavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("can't find session") {
                return Err(MuxError::SessionNotFound(stderr));
            }
            if stderr.contains("can't find pane") || stderr.contains("can't find window") {
                return Err(MuxError::PaneNotFound(stderr));
            }
            return Err(MuxError::CommandFailed(stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl MuxClient for TmuxMux {
    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        let out = self
            .run(&["list-sessions", "-F", "#{session_name}"])
            .await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    async fn list_panes(&self, session: &str) -> Result<Vec<Pane>, MuxError> {
        let out = self
            .run(&[
                "list-panes",
                "-t",
                session,
                "-F",
                "#{pane_id}\t#{pane_index}\t#{pane_title}\t#{@variant}",
            ])
            .await?;
        let mut panes = Vec::new();
        for line in out.lines() {
            let mut parts = line.splitn(4, '\t');
            let (Some(id), Some(index), Some(title)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            let Ok(index) = index.parse() else { continue };
            panes.push(Pane {
                id: PaneId::new(id),
                index,
                title: title.to_string(),
                variant: parts.next().unwrap_or_default().to_string(),
            });
        }
        panes.sort_by_key(|p| p.index);
        Ok(panes)
    }

    async fn capture_pane(&self, id: &PaneId, lines: u32) -> Result<String, MuxError> {
        let start = format!("-{}", lines);
        self.run(&["capture-pane", "-p", "-t", id.as_str(), "-S", &start])
            .await
    }

    async fn send_keys(&self, id: &PaneId, text: &str, enter: bool) -> Result<(), MuxError> {
        // -l = literal mode, -- = end of options
        self.run(&["send-keys", "-t", id.as_str(), "-l", "--", text])
            .await?;
        if enter {
            self.run(&["send-keys", "-t", id.as_str(), "Enter"]).await?;
        }
        Ok(())
    }

    async fn set_pane_title(&self, id: &PaneId, title: &str) -> Result<(), MuxError> {
        self.run(&["select-pane", "-t", id.as_str(), "-T", title])
            .await?;
        Ok(())
    }

    async fn split_window(&self, session: &str, cwd: &Path) -> Result<PaneId, MuxError> {
        let cwd = cwd.to_string_lossy();
        let out = self
            .run(&[
                "split-window",
                "-t",
                session,
                "-c",
                &cwd,
                "-P",
                "-F",
                "#{pane_id}",
            ])
            .await?;
        let id = out.trim();
        if id.is_empty() {
            return Err(MuxError::CommandFailed(
                "split-window returned no pane id".to_string(),
            ));
        }
        Ok(PaneId::new(id))
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        self.run(&["kill-session", "-t", session]).await?;
        Ok(())
    }

    async fn pane_last_activity(&self, id: &PaneId) -> Result<u64, MuxError> {
        let out = self
            .run(&[
                "display-message",
                "-p",
                "-t",
                id.as_str(),
                "#{window_activity}",
            ])
            .await?;
        let secs: u64 = out
            .trim()
            .parse()
            .map_err(|_| MuxError::CommandFailed(format!("bad activity timestamp: {}", out)))?;
        Ok(secs * 1_000)
    }
}
