//! Slack delivery of state changes through `chat.postMessage`.

use std::time::Duration;

use async_trait::async_trait;
use eir_core::Status;
use serde::{Deserialize, Serialize};

use crate::notifier::{NotifyError, Notifier, StateChange};

/// Production Slack Web API endpoint.
const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// `chat.postMessage` request body.
#[derive(Debug, Serialize)]
pub struct SlackMessage {
    pub channel: String,
    pub text: String,
    pub as_user: bool,
    pub mrkdwn: bool,
    pub attachments: Vec<SlackAttachment>,
}

/// One attachment per probe of the new snapshot.
#[derive(Debug, Serialize)]
pub struct SlackAttachment {
    pub color: &'static str,
    pub title: String,
    pub text: String,
    pub mrkdwn_in: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Attachment color for a probe status.
pub fn status_color(status: Status) -> &'static str {
    match status {
        Status::Ok => "good",
        Status::Warning => "warning",
        Status::Critical => "danger",
        Status::Unknown => "#eeeeee",
    }
}

/// Build the message posted for `change`.
pub fn build_message(channel: &str, change: &StateChange) -> SlackMessage {
    let attachments = change
        .current
        .probes
        .iter()
        .map(|probe| SlackAttachment {
            color: status_color(probe.status),
            title: format!("{} is {}", probe.name, probe.status),
            text: probe.detail.clone(),
            mrkdwn_in: vec!["text", "pretext"],
        })
        .collect();

    SlackMessage {
        channel: channel.to_string(),
        text: change.summary(),
        as_user: true,
        mrkdwn: true,
        attachments,
    }
}

/// Posts state changes to a Slack channel.
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
    api_url: String,
}

impl SlackNotifier {
    /// Create a notifier whose requests time out after `timeout`.
    pub fn new(
        token: impl Into<String>,
        channel: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.into(),
            channel: channel.into(),
            api_url: SLACK_POST_MESSAGE_URL.to_string(),
        })
    }

    /// Point the notifier at another `chat.postMessage` endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn notify(&self, change: &StateChange) -> Result<(), NotifyError> {
        let message = build_message(&self.channel, change);
        tracing::debug!(channel = %self.channel, "Notifying on Slack");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }

        let body: SlackResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Slack(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(channel = %self.channel, "Posted message on Slack");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
