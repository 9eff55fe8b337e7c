//! Date window filtering for incoming box stock listings.
//!
//! Day boundaries are computed in the filter's time zone (the host's local
//! zone by default), so "today" means the caller's calendar day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::incoming_box_stock_model::ListBoxStocksRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Yesterday,
    Week,
    Month,
    Quarter,
    Custom,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Quarter => "quarter",
            DateRange::Custom => "custom",
        }
    }

    /// Unknown labels fall back to `All`, i.e. no filtering.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(DateRange::All)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDateRange(pub String);

impl fmt::Display for UnknownDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown date range: {}", self.0)
    }
}

impl std::error::Error for UnknownDateRange {}

impl FromStr for DateRange {
    type Err = UnknownDateRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "yesterday" => Ok(DateRange::Yesterday),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "quarter" => Ok(DateRange::Quarter),
            "custom" => Ok(DateRange::Custom),
            _ => Err(UnknownDateRange(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DateFilter<Tz: TimeZone = Local> {
    selected: DateRange,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    tz: Tz,
}

impl Default for DateFilter<Local> {
    fn default() -> Self {
        DateFilter::new(Local)
    }
}

impl<Tz: TimeZone> DateFilter<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            selected: DateRange::All,
            start_date: None,
            end_date: None,
            tz,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.handle_date_range_change(range);
        self
    }

    pub fn with_custom_bounds(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.selected = DateRange::Custom;
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn selected(&self) -> DateRange {
        self.selected
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Leaving `Custom` drops both bounds so stale dates never override the
    /// newly selected range.
    pub fn handle_date_range_change(&mut self, range: DateRange) {
        self.selected = range;
        if range != DateRange::Custom {
            self.start_date = None;
            self.end_date = None;
        }
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date;
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.end_date = date;
    }

    pub fn is_in_range(&self, timestamp: DateTime<Utc>) -> bool {
        self.is_in_range_at(timestamp, Utc::now())
    }

    pub fn is_in_range_at(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let timestamp = timestamp.with_timezone(&self.tz);

        // Explicit bounds win over whatever named range is selected.
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            let start = self.start_of_day(start);
            let end = self.end_of_day(end);
            return start <= timestamp && timestamp <= end;
        }

        let today_date = now.with_timezone(&self.tz).date_naive();
        let today = self.start_of_day(today_date);

        match self.selected {
            DateRange::All | DateRange::Custom => true,
            DateRange::Today => timestamp >= today,
            DateRange::Yesterday => {
                let yesterday = self.start_of_day(today_date - Duration::days(1));
                yesterday <= timestamp && timestamp < today
            }
            DateRange::Week => {
                let days_since_sunday = i64::from(today_date.weekday().num_days_from_sunday());
                timestamp >= self.start_of_day(today_date - Duration::days(days_since_sunday))
            }
            DateRange::Month => timestamp >= self.start_of_day(today_date.with_day(1).unwrap_or(today_date)),
            DateRange::Quarter => {
                let quarter_month = today_date.month0() / 3 * 3 + 1;
                let quarter_start =
                    NaiveDate::from_ymd_opt(today_date.year(), quarter_month, 1).unwrap_or(today_date);
                timestamp >= self.start_of_day(quarter_start)
            }
        }
    }

    pub fn filter<'a, T, F>(&'a self, items: &'a [T], timestamp_of: F) -> impl Iterator<Item = &'a T> + 'a
    where
        F: Fn(&T) -> DateTime<Utc> + 'a,
    {
        let now = Utc::now();
        items
            .iter()
            .filter(move |item| self.is_in_range_at(timestamp_of(item), now))
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        let midnight = date.and_time(NaiveTime::MIN);
        // A DST gap can swallow local midnight; fall back to reading it as UTC.
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&midnight))
    }

    /// Last millisecond of `date`.
    fn end_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next) - Duration::milliseconds(1),
            None => self.start_of_day(date),
        }
    }
}

impl From<&ListBoxStocksRequest> for DateFilter<Local> {
    /// Explicit bounds are kept even when the label is not `custom`; they
    /// take precedence over the named range anyway.
    fn from(request: &ListBoxStocksRequest) -> Self {
        let mut filter = DateFilter::default().with_range(DateRange::from_label(
            request.date_range.as_deref().unwrap_or_default(),
        ));
        filter.set_start_date(request.start_date);
        filter.set_end_date(request.end_date);
        filter
    }
}
