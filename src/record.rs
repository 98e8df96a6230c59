use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use crate::notify::Notify;

pub const FEEDBACK_ACK: &str =
    "I've recorded your question for our team to review. Is there anything else I can help you with?";

const LEAD_NOTIFY_CHARS: usize = 50;
const FEEDBACK_NOTIFY_CHARS: usize = 100;

/// Records a visitor lead: one appended log line, then one best-effort push
/// notification. The notification result never affects the returned
/// confirmation; a failed append does propagate.
pub struct InterestRecorder<N> {
    log_path: PathBuf,
    notifier: N,
}

impl<N: Notify> InterestRecorder<N> {
    pub fn new(log_path: PathBuf, notifier: N) -> Self {
        Self { log_path, notifier }
    }

    pub async fn record(&self, email: &str, name: &str, message: &str) -> Result<String> {
        let line = format!(
            "[LEAD] {} | Name: {name} | Email: {email} | Message: {message}",
            current_timestamp()
        );
        append_line(&self.log_path, &line).with_context(|| {
            format!("failed to append lead record to {}", self.log_path.display())
        })?;

        let push = format!(
            "New Lead: {name} ({email}) - {}...",
            truncate_chars(message, LEAD_NOTIFY_CHARS)
        );
        if !self.notifier.notify(&push).await {
            eprintln!("[record] lead notification was not delivered");
        }

        Ok(format!(
            "Thank you {name}! We've recorded your interest and will contact you at {email} soon."
        ))
    }
}

/// Same pattern for unanswered questions, with a fixed acknowledgment.
pub struct FeedbackRecorder<N> {
    log_path: PathBuf,
    notifier: N,
}

impl<N: Notify> FeedbackRecorder<N> {
    pub fn new(log_path: PathBuf, notifier: N) -> Self {
        Self { log_path, notifier }
    }

    pub async fn record(&self, question: &str) -> Result<String> {
        let line = format!("[FEEDBACK] {} | Question: {question}", current_timestamp());
        append_line(&self.log_path, &line).with_context(|| {
            format!(
                "failed to append feedback record to {}",
                self.log_path.display()
            )
        })?;

        let push = format!(
            "Unanswered Question: {}...",
            truncate_chars(question, FEEDBACK_NOTIFY_CHARS)
        );
        if !self.notifier.notify(&push).await {
            eprintln!("[record] feedback notification was not delivered");
        }

        Ok(FEEDBACK_ACK.to_string())
    }
}

// Counts characters, not bytes, so multi-byte text is never split.
fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

// Open-append-close per record so concurrent writers interleave whole lines.
fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

fn current_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
