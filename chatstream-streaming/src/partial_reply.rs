//! Assistant reply accumulation.
//!
//! Collects streamed fragments into the reply a chat view renders:
//! answer text, reasoning text, and a status that moves from pending to
//! success or error.

use crate::consumer::StreamConsumer;
use crate::error::StreamError;
use async_trait::async_trait;
use chatstream_core::{now_utc, Correlation, ReplyStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A reply under construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyAccumulator {
    content: String,
    reasoning_content: String,
    status: ReplyStatus,
    fragments: usize,
    correlation: Option<Correlation>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for ReplyAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyAccumulator {
    /// Create an empty, pending reply.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: String::new(),
            reasoning_content: String::new(),
            status: ReplyStatus::Pending,
            fragments: 0,
            correlation: None,
            error: None,
            created_at: now_utc(),
            finished_at: None,
        }
    }

    /// Append answer text.
    pub fn push_content(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.content.push_str(text);
        self.mark_streaming();
    }

    /// Append reasoning text.
    pub fn push_reasoning(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.reasoning_content.push_str(text);
        self.mark_streaming();
    }

    /// Mark the reply complete.
    pub fn complete(&mut self, correlation: Option<Correlation>) {
        if self.status.is_final() {
            return;
        }
        self.status = ReplyStatus::Success;
        self.correlation = correlation;
        self.finished_at = Some(now_utc());
    }

    /// Mark the reply failed. Text received so far is kept.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_final() {
            return;
        }
        self.status = ReplyStatus::Error;
        self.error = Some(error.into());
        self.finished_at = Some(now_utc());
    }

    /// Answer text so far.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Reasoning text so far.
    #[must_use]
    pub fn reasoning_content(&self) -> &str {
        &self.reasoning_content
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ReplyStatus {
        self.status
    }

    /// Number of non-empty fragments received.
    #[must_use]
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Correlation from a structured `done`, if one arrived.
    #[must_use]
    pub fn correlation(&self) -> Option<&Correlation> {
        self.correlation.as_ref()
    }

    /// Rendered error, if the reply failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When accumulation started.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the reply reached a final status.
    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Whether the reply reached a final status.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_final()
    }

    fn mark_streaming(&mut self) {
        self.fragments += 1;
        if self.status == ReplyStatus::Pending {
            debug!("first reply fragment received");
            self.status = ReplyStatus::Streaming;
        }
    }
}

#[async_trait]
impl StreamConsumer for ReplyAccumulator {
    async fn on_message(&mut self, text: &str) {
        self.push_content(text);
    }

    async fn on_thinking(&mut self, text: &str) {
        self.push_reasoning(text);
    }

    async fn on_done(&mut self, correlation: Option<&Correlation>) {
        self.complete(correlation.cloned());
    }

    async fn on_error(&mut self, error: &StreamError) {
        self.fail(error.to_string());
    }
}
