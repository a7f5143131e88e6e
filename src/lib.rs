pub mod calendar;
pub mod categories;
pub mod commands;
pub mod draft;
pub mod holidays;
pub mod i18n;
pub mod ids;
pub mod logging;
pub mod models;
pub mod projects;
pub mod reminders;
pub mod store;
pub mod tasks;

pub use calendar::{month_grid, CalendarDay, CalendarView};
pub use categories::CategoryService;
pub use commands::{CommandResult, Services};
pub use draft::{DraftStep, TaskDraft, MAX_IMAGE_BYTES};
pub use holidays::{Holiday, HolidayService};
pub use i18n::Language;
pub use models::{Category, NewTask, Project, Task};
pub use projects::ProjectService;
pub use reminders::{
    start_refresh_loop, NoopBackend, Notification, NotificationBackend, ReminderScheduler,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use tasks::TaskService;
