//! Broadcast service implementation
//!
//! Creates, schedules, and dispatches admin broadcasts. Dispatch fans out
//! over an abstract message sink with a bounded number of in-flight
//! deliveries; per-recipient failures are counted and never abort the
//! batch. Job rows keep the status they were created with; the outcome
//! counts are logged and reported to the invoking admin.

use std::future::Future;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use futures::StreamExt;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use thiserror::Error;
use tracing::{info, warn, debug};

use crate::database::DatabaseService;
use crate::models::broadcast::{BroadcastJob, BroadcastTarget, CreateBroadcastRequest};
use crate::utils::errors::Result;
use crate::utils::logging::log_broadcast_result;

/// Destination-agnostic delivery seam, implemented by the Telegram bot
/// in production and by mocks in tests.
pub trait MessageSink {
    fn deliver(&self, chat_id: ChatId, text: &str) -> impl Future<Output = Result<()>> + Send;
}

impl MessageSink for Bot {
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }
}

/// Aggregated result of one dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Why a schedule input was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unrecognized schedule format")]
    InvalidFormat,
    #[error("scheduled time must be in the future")]
    NotInFuture,
}

/// Parse a broadcast schedule input against the current time.
///
/// Accepts exactly `YYYY-MM-DD HH:MM` or `HH:MM` (meaning today), and
/// the resulting instant must be strictly in the future.
pub fn parse_schedule(input: &str, now: DateTime<Utc>) -> std::result::Result<DateTime<Utc>, ScheduleError> {
    let input = input.trim();

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .or_else(|_| {
            NaiveTime::parse_from_str(input, "%H:%M")
                .map(|time| now.date_naive().and_time(time))
        })
        .map_err(|_| ScheduleError::InvalidFormat)?;

    let scheduled = naive.and_utc();
    if scheduled <= now {
        return Err(ScheduleError::NotInFuture);
    }

    Ok(scheduled)
}

/// Broadcast job management and dispatch
#[derive(Debug, Clone)]
pub struct BroadcastService {
    database: DatabaseService,
    max_in_flight: usize,
}

impl BroadcastService {
    pub fn new(database: DatabaseService, max_in_flight: usize) -> Self {
        Self {
            database,
            max_in_flight,
        }
    }

    /// Create a new broadcast job
    pub async fn create_job(&self, request: CreateBroadcastRequest) -> Result<BroadcastJob> {
        let job = self.database.broadcasts.create(request).await?;
        info!(
            broadcast_id = %job.id,
            target = job.target.name(),
            scheduled = job.scheduled_at.is_some(),
            "Broadcast job created"
        );
        Ok(job)
    }

    /// Delete a job by id; deleting a nonexistent id returns false
    pub async fn delete_job(&self, id: &str) -> Result<bool> {
        let deleted = self.database.broadcasts.delete(id).await?;
        if deleted {
            info!(broadcast_id = id, "Broadcast job deleted");
        } else {
            debug!(broadcast_id = id, "No broadcast job to delete");
        }
        Ok(deleted)
    }

    /// List pending jobs, soonest first
    pub async fn list_pending(&self) -> Result<Vec<BroadcastJob>> {
        self.database.broadcasts.list_pending().await
    }

    /// Resolve recipient chat ids for a target audience
    pub async fn resolve_recipients(&self, target: BroadcastTarget) -> Result<Vec<i64>> {
        let mut recipients = self.database.users.list_telegram_ids().await?;

        if target == BroadcastTarget::UsersAndGroups {
            recipients.extend(self.database.groups.list_telegram_ids().await?);
        }

        recipients.sort_unstable();
        recipients.dedup();
        Ok(recipients)
    }

    /// Deliver a job to all recipients through the sink.
    ///
    /// One attempt per recipient; failures are counted and the batch
    /// always runs to completion.
    pub async fn dispatch<S: MessageSink + Sync>(&self, sink: &S, job: &BroadcastJob) -> Result<DispatchOutcome> {
        let recipients = self.resolve_recipients(job.target).await?;
        let outcome = dispatch_to(sink, &recipients, &job.message, self.max_in_flight).await;

        log_broadcast_result(&job.id, outcome.recipients, outcome.sent, outcome.failed);
        Ok(outcome)
    }
}

/// Fan a message out to the given chats with bounded concurrency.
pub async fn dispatch_to<S: MessageSink + Sync>(
    sink: &S,
    recipients: &[i64],
    message: &str,
    max_in_flight: usize,
) -> DispatchOutcome {
    let deliveries = futures::stream::iter(recipients.iter().copied())
        .map(|chat_id| async move {
            match sink.deliver(ChatId(chat_id), message).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(chat_id = chat_id, error = %e, "Broadcast delivery failed");
                    false
                }
            }
        })
        .buffer_unordered(max_in_flight.max(1));

    let (sent, failed) = deliveries
        .fold((0usize, 0usize), |(sent, failed), ok| async move {
            if ok {
                (sent + 1, failed)
            } else {
                (sent, failed + 1)
            }
        })
        .await;

    DispatchOutcome {
        recipients: recipients.len(),
        sent,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use chrono::TimeZone;
    use crate::utils::errors::DownMateError;

    struct RecordingSink {
        delivered: Mutex<Vec<i64>>,
        fail_for: Vec<i64>,
    }

    impl RecordingSink {
        fn new(fail_for: Vec<i64>) -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                fail_for,
            }
        }
    }

    impl MessageSink for RecordingSink {
        async fn deliver(&self, chat_id: ChatId, _text: &str) -> Result<()> {
            if self.fail_for.contains(&chat_id.0) {
                return Err(DownMateError::InvalidInput("unreachable chat".to_string()));
            }
            self.delivered.lock().unwrap().push(chat_id.0);
            Ok(())
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_counts_failures_without_aborting() {
        let sink = RecordingSink::new(vec![2]);
        let outcome = dispatch_to(&sink, &[1, 2, 3], "hello", 4).await;

        assert_eq!(outcome.recipients, 3);
        assert_eq!(outcome.sent, 2);
        assert_eq!(outcome.failed, 1);

        let mut delivered = sink.delivered.lock().unwrap().clone();
        delivered.sort_unstable();
        assert_eq!(delivered, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_dispatch_empty_recipient_list() {
        let sink = RecordingSink::new(vec![]);
        let outcome = dispatch_to(&sink, &[], "hello", 4).await;
        assert_eq!(outcome, DispatchOutcome { recipients: 0, sent: 0, failed: 0 });
    }

    #[test]
    fn test_parse_schedule_full_format() {
        let now = at(2024, 3, 10, 12, 0);
        let parsed = parse_schedule("2024-03-11 09:30", now).unwrap();
        assert_eq!(parsed, at(2024, 3, 11, 9, 30));
    }

    #[test]
    fn test_parse_schedule_time_only_means_today() {
        let now = at(2024, 3, 10, 12, 0);
        let parsed = parse_schedule("18:45", now).unwrap();
        assert_eq!(parsed, at(2024, 3, 10, 18, 45));
    }

    #[test]
    fn test_parse_schedule_rejects_past_times() {
        let now = at(2024, 3, 10, 12, 0);
        assert_eq!(parse_schedule("2024-03-09 09:00", now), Err(ScheduleError::NotInFuture));
        assert_eq!(parse_schedule("08:00", now), Err(ScheduleError::NotInFuture));
        // Exactly now is not strictly future.
        assert_eq!(parse_schedule("12:00", now), Err(ScheduleError::NotInFuture));
    }

    #[test]
    fn test_parse_schedule_rejects_garbage() {
        let now = at(2024, 3, 10, 12, 0);
        assert_eq!(parse_schedule("tomorrow", now), Err(ScheduleError::InvalidFormat));
        assert_eq!(parse_schedule("2024/03/11 09:30", now), Err(ScheduleError::InvalidFormat));
        assert_eq!(parse_schedule("", now), Err(ScheduleError::InvalidFormat));
    }
}
