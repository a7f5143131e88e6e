use std::collections::HashMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://date.nager.at/api/v3";
/// Country whose public holidays the calendar shows; fixed at configuration
/// time.
pub const DEFAULT_COUNTRY_CODE: &str = "PT";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One public holiday as served by the Nager.Date API. Field names follow the
/// remote contract, not this crate's conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub local_name: String,
    pub name: String,
    pub country_code: String,
    pub fixed: bool,
    pub global: bool,
    pub counties: Option<Vec<String>>,
    pub launch_year: Option<i32>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Builds the `YYYY-MM-DD -> local name` map the calendar annotates cells
/// with.
pub fn holiday_map(holidays: &[Holiday]) -> HashMap<String, String> {
    holidays
        .iter()
        .map(|holiday| (holiday.date.clone(), holiday.local_name.clone()))
        .collect()
}

/// Filters a year's holidays down to one month (1-12).
pub fn holidays_in_month(holidays: &[Holiday], month: u32) -> Vec<Holiday> {
    holidays
        .iter()
        .filter(|holiday| {
            NaiveDate::parse_from_str(&holiday.date, "%Y-%m-%d")
                .map(|date| date.month() == month)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Read-only client for the public-holiday endpoint. Results are never
/// persisted; the calendar refetches when the displayed year changes.
pub struct HolidayService {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
}

impl HolidayService {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(DEFAULT_BASE_URL, DEFAULT_COUNTRY_CODE)
    }

    pub fn with_config(base_url: &str, country_code: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country_code: country_code.to_string(),
        })
    }

    /// Fetches a year's holidays. Any failure (network, HTTP status, parse)
    /// degrades to an empty list so the calendar renders without holidays
    /// instead of failing.
    pub async fn fetch_year(&self, year: i32) -> Vec<Holiday> {
        match self.try_fetch_year(year).await {
            Ok(holidays) => holidays,
            Err(err) => {
                log::error!("holidays: fetch failed year={year}: {err}");
                Vec::new()
            }
        }
    }

    async fn try_fetch_year(&self, year: i32) -> Result<Vec<Holiday>, reqwest::Error> {
        let url = format!(
            "{}/PublicHolidays/{year}/{}",
            self.base_url, self.country_code
        );
        let response = self.client.get(&url).send().await?.error_for_status()?;
        response.json().await
    }

    /// Convenience for the calendar: a year's holidays as the date -> name
    /// map, empty on failure.
    pub async fn fetch_year_map(&self, year: i32) -> HashMap<String, String> {
        holiday_map(&self.fetch_year(year).await)
    }

    /// Name of the holiday on one date, if any.
    pub async fn holiday_name_on(&self, date: NaiveDate) -> Option<String> {
        let holidays = self.fetch_year(date.year()).await;
        let formatted = date.format("%Y-%m-%d").to_string();
        holidays
            .into_iter()
            .find(|holiday| holiday.date == formatted)
            .map(|holiday| holiday.local_name)
    }
}
