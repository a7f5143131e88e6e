use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as TimeDelta, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::i18n::{format_display_date, labels, Language};
use crate::models::Task;
use crate::tasks::{due_date_only, TaskService};

/// Tasks due within this many days of today count as "due soon".
pub const LEAD_DAYS: i64 = 1;
/// Local wall-clock hour reminders fire at.
pub const TRIGGER_HOUR: u32 = 9;

/// One entry of the batch handed to the native notification plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Notification {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub scheduled_at: NaiveDateTime,
}

/// Contract of the native local-notification plugin. The embedding shell
/// provides the real implementation; tests use a recording fake.
pub trait NotificationBackend: Send + Sync {
    /// False outside a native runtime; scheduling is then a no-op.
    fn available(&self) -> bool;
    fn request_permission(&self) -> bool;
    fn pending_ids(&self) -> Vec<i32>;
    fn cancel(&self, ids: &[i32]);
    fn schedule(&self, batch: Vec<Notification>);
}

/// Backend for environments without native notifications (plain web view):
/// reports unavailable, so every refresh is a no-op.
pub struct NoopBackend;

impl NotificationBackend for NoopBackend {
    fn available(&self) -> bool {
        false
    }

    fn request_permission(&self) -> bool {
        false
    }

    fn pending_ids(&self) -> Vec<i32> {
        Vec::new()
    }

    fn cancel(&self, _ids: &[i32]) {}

    fn schedule(&self, _batch: Vec<Notification>) {}
}

/// Due today or tomorrow, date-only and inclusive on both ends.
pub fn is_due_soon(due_date: &str, today: NaiveDate) -> bool {
    match due_date_only(due_date) {
        Some(date) => date >= today && date <= today + TimeDelta::days(LEAD_DAYS),
        None => false,
    }
}

/// 09:00 on the due date, pushed one day ahead when that instant has already
/// passed (a task due earlier today still gets a reminder, tomorrow morning).
pub fn trigger_time(due: NaiveDate, now: NaiveDateTime) -> NaiveDateTime {
    let mut trigger = due.and_hms_opt(TRIGGER_HOUR, 0, 0).unwrap_or(now);
    if trigger <= now {
        trigger += TimeDelta::days(1);
    }
    trigger
}

/// Derives the full batch for the current due-soon set: sequential ids from
/// 1, warning text for tasks already flagged overdue, reminder text with the
/// formatted due date otherwise.
pub fn build_notifications(
    tasks: &[Task],
    now: NaiveDateTime,
    language: Language,
) -> Vec<Notification> {
    let today = now.date();
    let labels = labels(language);
    tasks
        .iter()
        .filter(|task| is_due_soon(&task.due_date, today))
        .enumerate()
        .map(|(index, task)| {
            let due = due_date_only(&task.due_date).unwrap_or(today);
            let body = if task.overdue {
                format!("{}: {}", labels.overdue_prefix, task.title)
            } else {
                format!(
                    "{}: {} - {}: {}",
                    labels.reminder_prefix,
                    task.title,
                    labels.due_label,
                    format_display_date(due)
                )
            };
            Notification {
                id: index as i32 + 1,
                title: labels.notification_title.to_string(),
                body,
                scheduled_at: trigger_time(due, now),
            }
        })
        .collect()
}

/// Keeps the native notification schedule in sync with the task list by full
/// rebuild: cancel everything pending, re-derive the due-soon set, schedule
/// one batch. Runs after every task mutation and periodically from the
/// refresh loop.
#[derive(Clone)]
pub struct ReminderScheduler {
    tasks: TaskService,
    backend: Arc<dyn NotificationBackend>,
    language: Language,
}

impl ReminderScheduler {
    pub fn new(tasks: TaskService, backend: Arc<dyn NotificationBackend>, language: Language) -> Self {
        Self {
            tasks,
            backend,
            language,
        }
    }

    pub fn refresh(&self) {
        self.refresh_at(Local::now().naive_local());
    }

    fn refresh_at(&self, now: NaiveDateTime) {
        if !self.backend.available() {
            return;
        }
        if !self.backend.request_permission() {
            log::warn!("reminders: notification permission not granted");
            return;
        }

        let pending = self.backend.pending_ids();
        if !pending.is_empty() {
            self.backend.cancel(&pending);
        }

        let notifications = build_notifications(&self.tasks.get_all(), now, self.language);
        if notifications.is_empty() {
            log::debug!("reminders: nothing due soon");
            return;
        }
        log::info!("reminders: scheduling count={}", notifications.len());
        self.backend.schedule(notifications);
    }
}

/// Periodic rebuild so the due-soon set tracks wall-clock time even without
/// task mutations (midnight rollover, the 09:00 boundary).
pub fn start_refresh_loop(
    scheduler: ReminderScheduler,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            scheduler.refresh();
        }
    })
}
