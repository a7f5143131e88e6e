use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;

use crate::models::Task;
use crate::tasks::due_date_only;

pub const WEEKS_PER_GRID: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

/// One cell of the monthly grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarDay {
    /// Calendar date of the cell, time-of-day already zeroed by construction.
    pub date: NaiveDate,
    /// Day-of-month number as displayed (1-31).
    pub day: u32,
    /// False for the leading/trailing cells borrowed from adjacent months.
    pub in_month: bool,
    pub is_today: bool,
    /// Tasks whose due date (date-only) falls on this cell.
    pub tasks: Vec<Task>,
    /// How many of those tasks are overdue.
    pub overdue_count: usize,
    /// Local holiday name when the cell date is a public holiday.
    pub holiday: Option<String>,
}

/// Normalizes a zero-based month offset into `(year, 1-based month)`.
/// Month -1 becomes the previous December, month 12 the next January; the
/// arithmetic handles any distance, not just single steps.
fn normalize(year: i32, month0: i32) -> (i32, u32) {
    let total = year as i64 * 12 + month0 as i64;
    (total.div_euclid(12) as i32, total.rem_euclid(12) as u32 + 1)
}

fn first_of_month(year: i32, month0: i32) -> NaiveDate {
    let (y, m) = normalize(year, month0);
    // Safe for every normalized (year, month) the app can reach.
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_default()
}

/// Number of days in the displayed month.
pub fn days_in_month(year: i32, month0: i32) -> u32 {
    let first = first_of_month(year, month0);
    let next = first_of_month(year, month0 + 1);
    (next - first).num_days() as u32
}

/// Builds the fixed 6x7 grid for a month. Weeks start on Sunday; leading and
/// trailing cells are filled with the adjacent months' days so the grid shape
/// never changes with the month's length.
pub fn month_grid(
    year: i32,
    month0: i32,
    tasks: &[Task],
    holidays: &HashMap<String, String>,
    today: NaiveDate,
) -> Vec<Vec<CalendarDay>> {
    let first = first_of_month(year, month0);
    let (grid_year, grid_month) = normalize(year, month0);
    let leading = first.weekday().num_days_from_sunday() as i64;
    let start = first - Duration::days(leading);

    let mut by_date: HashMap<NaiveDate, Vec<Task>> = HashMap::new();
    for task in tasks {
        if let Some(date) = due_date_only(&task.due_date) {
            by_date.entry(date).or_default().push(task.clone());
        }
    }

    let mut weeks = Vec::with_capacity(WEEKS_PER_GRID);
    for week in 0..WEEKS_PER_GRID {
        let mut days = Vec::with_capacity(DAYS_PER_WEEK);
        for weekday in 0..DAYS_PER_WEEK {
            let date = start + Duration::days((week * DAYS_PER_WEEK + weekday) as i64);
            let tasks = by_date.remove(&date).unwrap_or_default();
            let overdue_count = tasks.iter().filter(|task| task.overdue).count();
            days.push(CalendarDay {
                date,
                day: date.day(),
                in_month: date.year() == grid_year && date.month() == grid_month,
                is_today: date == today,
                overdue_count,
                holiday: holidays.get(&date.format("%Y-%m-%d").to_string()).cloned(),
                tasks,
            });
        }
        weeks.push(days);
    }
    weeks
}

/// The month currently on screen plus the holiday map for its year.
/// Navigation reports year changes so the caller can refetch holidays before
/// regenerating the grid.
#[derive(Debug, Clone)]
pub struct CalendarView {
    year: i32,
    month0: i32,
    holidays: HashMap<String, String>,
}

impl CalendarView {
    pub fn new(year: i32, month0: i32) -> Self {
        let (year, month) = normalize(year, month0);
        Self {
            year,
            month0: month as i32 - 1,
            holidays: HashMap::new(),
        }
    }

    /// Opens on the current month.
    pub fn at_today() -> Self {
        let today = Local::now().date_naive();
        Self::new(today.year(), today.month() as i32 - 1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month on display.
    pub fn month0(&self) -> i32 {
        self.month0
    }

    pub fn set_holidays(&mut self, holidays: HashMap<String, String>) {
        self.holidays = holidays;
    }

    pub fn holidays(&self) -> &HashMap<String, String> {
        &self.holidays
    }

    /// Moves the view by whole months. Returns true when the displayed year
    /// changed and the holiday map is stale.
    pub fn shift_month(&mut self, delta: i32) -> bool {
        let (year, month) = normalize(self.year, self.month0 + delta);
        let year_changed = year != self.year;
        self.year = year;
        self.month0 = month as i32 - 1;
        year_changed
    }

    pub fn previous_month(&mut self) -> bool {
        self.shift_month(-1)
    }

    pub fn next_month(&mut self) -> bool {
        self.shift_month(1)
    }

    /// Jumps back to the month containing `today`.
    pub fn go_to(&mut self, today: NaiveDate) -> bool {
        let year_changed = today.year() != self.year;
        self.year = today.year();
        self.month0 = today.month() as i32 - 1;
        year_changed
    }

    pub fn grid(&self, tasks: &[Task], today: NaiveDate) -> Vec<Vec<CalendarDay>> {
        month_grid(self.year, self.month0, tasks, &self.holidays, today)
    }
}
