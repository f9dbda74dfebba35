//! JSON-Lines Invocation Handler
//!
//! Inbound adapter that reads one skill invocation per line, runs the tune
//! service, and writes one reply per line.

use crate::application::{TuneOutcome, TuneService};
use crate::domain::entities::DeviceIdentity;
use crate::domain::services::TimeOfDayClassifier;
use crate::domain::value_objects::ResolutionSource;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::Instrument;

/// Permission scope needed to read the device's country and postal code.
pub const ADDRESS_PERMISSION: &str = "read::alexa:device:all:address:country_and_postal_code";

/// One request from the voice platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInvocation {
    pub device_id: String,
    pub api_access_token: String,
    pub api_endpoint: String,
    /// Request time, RFC 3339 (e.g. "2024-03-10T06:45:00Z")
    pub timestamp: String,
    /// Present once the user has granted address permission
    #[serde(default)]
    pub consent_token: Option<String>,
    #[serde(default)]
    pub play_from_beginning: bool,
}

/// Reply written back for each invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SkillReply {
    #[serde(rename_all = "camelCase")]
    Play {
        hour: u8,
        label: String,
        offset_in_milliseconds: i64,
        source: ResolutionSource,
        local_time_unavailable: bool,
    },
    AskForPermissions { permissions: Vec<String> },
    Error { message: String },
}

impl SkillReply {
    fn ask_for_permissions() -> Self {
        Self::AskForPermissions {
            permissions: vec![ADDRESS_PERMISSION.to_string()],
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Inbound adapter driving the tune service.
pub struct InvocationHandler {
    service: Arc<TuneService>,
}

impl InvocationHandler {
    pub fn new(service: Arc<TuneService>) -> Self {
        Self { service }
    }

    /// Handle one invocation.
    pub async fn handle(&self, invocation: SkillInvocation) -> SkillReply {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("invocation", %request_id, device_id = %invocation.device_id);

        async move {
            if invocation.consent_token.is_none() {
                tracing::info!("user has not authorized the skill, asking for permissions");
                return SkillReply::ask_for_permissions();
            }

            let timestamp_millis = match DateTime::parse_from_rfc3339(&invocation.timestamp) {
                Ok(ts) => ts.timestamp_millis(),
                Err(e) => {
                    tracing::warn!("invalid request timestamp {:?}: {}", invocation.timestamp, e);
                    return SkillReply::error(format!("invalid timestamp: {}", e));
                }
            };

            let identity = DeviceIdentity::new(
                invocation.device_id,
                invocation.api_access_token,
                invocation.api_endpoint,
            );

            let outcome = self
                .service
                .select_tune(&identity, timestamp_millis, invocation.play_from_beginning)
                .await;

            Self::reply_for(outcome)
        }
        .instrument(span)
        .await
    }

    /// Parse and handle one JSON line.
    pub async fn handle_line(&self, line: &str) -> SkillReply {
        match serde_json::from_str::<SkillInvocation>(line) {
            Ok(invocation) => self.handle(invocation).await,
            Err(e) => {
                tracing::warn!("malformed invocation: {}", e);
                SkillReply::error(format!("malformed invocation: {}", e))
            }
        }
    }

    /// Serve invocations until the reader is exhausted.
    ///
    /// Blank lines are skipped. Returns the number of replies written.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let reply = self.handle_line(&line).await;
            let mut encoded = serde_json::to_vec(&reply)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
            handled += 1;
        }

        Ok(handled)
    }

    fn reply_for(outcome: TuneOutcome) -> SkillReply {
        match outcome {
            TuneOutcome::Play {
                selection, source, ..
            } => SkillReply::Play {
                hour: selection.hour_bucket,
                label: TimeOfDayClassifier::hour_label(selection.hour_bucket),
                offset_in_milliseconds: selection.within_hour_offset_millis,
                source,
                local_time_unavailable: source.is_fallback(),
            },
            TuneOutcome::PermissionRequired => SkillReply::ask_for_permissions(),
        }
    }
}
