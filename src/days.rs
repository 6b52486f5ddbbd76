use crate::settings::{MAX_DAYS_COUNT, MIN_DAYS_COUNT};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

pub const DEFAULT_WEEK_START: Weekday = Weekday::Mon;

const MONTH_NAMES: [&str; 12] = [
    "січень", "лютий", "березень", "квітень", "травень", "червень",
    "липень", "серпень", "вересень", "жовтень", "листопад", "грудень",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn label(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_week_start: bool,
}

impl DayEntry {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::of(self.date)
    }

    pub fn day_number(&self) -> u32 {
        self.date.day()
    }
}

/// Header cell spanning one consecutive run of days in the same month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup {
    pub key: MonthKey,
    pub label: String,
    pub span: usize,
}

/// Contiguous run of calendar days ending at `today`, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    today: NaiveDate,
    entries: Vec<DayEntry>,
}

impl DayWindow {
    pub fn generate(today: NaiveDate, count: u32) -> Self {
        Self::generate_with_week_start(today, count, DEFAULT_WEEK_START)
    }

    pub fn generate_with_week_start(today: NaiveDate, count: u32, week_start: Weekday) -> Self {
        let count = count.clamp(MIN_DAYS_COUNT, MAX_DAYS_COUNT);
        let entries = (0..count)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(i64::from(offset));
                DayEntry {
                    date,
                    is_today: offset == 0,
                    is_week_start: date.weekday() == week_start,
                }
            })
            .collect();
        Self { today, entries }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn entries(&self) -> &[DayEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn months(&self) -> Vec<MonthGroup> {
        let mut groups: Vec<MonthGroup> = Vec::new();
        for entry in &self.entries {
            let key = entry.month_key();
            match groups.last_mut() {
                Some(group) if group.key == key => group.span += 1,
                _ => groups.push(MonthGroup {
                    key,
                    label: key.label(),
                    span: 1,
                }),
            }
        }
        groups
    }
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
