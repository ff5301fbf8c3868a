//! Contact-form submission contract.
//!
//! Delivering the message (SMTP, a mail API, a queue) is the job of a
//! [`Notifier`]. This module only fixes the shape of a submission and the
//! policy around sending it: one attempt, no retry, and exactly two outcomes
//! the visitor can see.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::locale::Locale;

/// Fields of the contact form, already validated by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub message: String,
}

/// Something that can deliver a submission.
pub trait Notifier {
    fn send(&self, submission: &ContactSubmission) -> impl Future<Output = Result<(), NotifyError>>;
}

/// What the visitor is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent,
    Failed,
}

impl SubmissionOutcome {
    /// Message shown under the form.
    pub fn message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SubmissionOutcome::Sent, Locale::English) => "Thanks! We'll be in touch shortly.",
            (SubmissionOutcome::Sent, Locale::Thai) => "ขอบคุณครับ เราจะติดต่อกลับโดยเร็ว",
            (SubmissionOutcome::Failed, Locale::English) => {
                "Something went wrong. Please try again later."
            }
            (SubmissionOutcome::Failed, Locale::Thai) => "เกิดข้อผิดพลาด กรุณาลองใหม่ภายหลัง",
        }
    }
}

/// Send once and map the result to what the visitor sees.
///
/// Failure details are logged, never shown.
pub async fn submit<N: Notifier>(notifier: &N, submission: &ContactSubmission) -> SubmissionOutcome {
    match notifier.send(submission).await {
        Ok(()) => {
            info!(company = %submission.company, "contact submission delivered");
            SubmissionOutcome::Sent
        }
        Err(err) => {
            warn!(error = %err, "contact submission failed");
            SubmissionOutcome::Failed
        }
    }
}

/// Notifier that writes the submission to the log as JSON.
///
/// Stands in for a mail service when running the scene locally.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        let body = serde_json::to_string(submission).map_err(|e| NotifyError::new(e.to_string()))?;
        info!(%body, "contact submission");
        Ok(())
    }
}
