//! Broadcast fan-out and schedule parsing behavior.

use std::sync::Mutex;
use chrono::{DateTime, TimeZone, Utc};
use teloxide::types::ChatId;

use DownMate::services::broadcast::{MessageSink, ScheduleError, dispatch_to, parse_schedule};
use DownMate::utils::errors::{DownMateError, Result};

#[derive(Default)]
struct FlakySink {
    delivered: Mutex<Vec<(i64, String)>>,
    fail_for: Vec<i64>,
}

impl MessageSink for FlakySink {
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.fail_for.contains(&chat_id.0) {
            return Err(DownMateError::InvalidInput("blocked by recipient".to_string()));
        }
        self.delivered.lock().unwrap().push((chat_id.0, text.to_string()));
        Ok(())
    }
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[tokio::test]
async fn all_recipients_get_one_attempt_despite_failures() {
    let sink = FlakySink {
        fail_for: vec![20, 40],
        ..Default::default()
    };

    let outcome = dispatch_to(&sink, &[10, 20, 30, 40, 50], "release notes", 2).await;

    assert_eq!(outcome.recipients, 5);
    assert_eq!(outcome.sent, 3);
    assert_eq!(outcome.failed, 2);

    let mut ids: Vec<i64> = sink
        .delivered
        .lock()
        .unwrap()
        .iter()
        .map(|(id, _)| *id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10, 30, 50]);
}

#[tokio::test]
async fn zero_in_flight_limit_still_delivers() {
    let sink = FlakySink::default();
    let outcome = dispatch_to(&sink, &[1, 2], "hi", 0).await;
    assert_eq!(outcome.sent, 2);
}

#[test]
fn schedule_accepts_exactly_two_formats() {
    let now = at(2024, 6, 1, 10, 0);

    assert_eq!(parse_schedule("2024-06-02 08:15", now), Ok(at(2024, 6, 2, 8, 15)));
    assert_eq!(parse_schedule("23:59", now), Ok(at(2024, 6, 1, 23, 59)));
    assert_eq!(parse_schedule("  14:30  ", now), Ok(at(2024, 6, 1, 14, 30)));

    assert_eq!(parse_schedule("June 2nd", now), Err(ScheduleError::InvalidFormat));
    assert_eq!(parse_schedule("2024-06-02", now), Err(ScheduleError::InvalidFormat));
    assert_eq!(parse_schedule("08:15", now), Err(ScheduleError::NotInFuture));
    assert_eq!(parse_schedule("2024-05-31 10:00", now), Err(ScheduleError::NotInFuture));
}
