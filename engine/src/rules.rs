//! Reference rule grammar.
//!
//! Covers a handful of common English forms relative to the anchor's calendar
//! day:
//! - Relative days: `today`, `tomorrow`, `yesterday`
//! - Time of day: `noon`
//! - Weekdays: `wednesday` (the occurrence in the anchor's ISO week)
//! - Relative periods: `last week`, `this month`, `next year`
//! - Holidays: `christmas`, `new year's day`
//! - Month and year: `march, 2000`, `mar 2000`
//! - Numeric dates: `4/14/2022`, `5/13, 2012`, `6-15`, `2024-01-02`

use std::sync::OnceLock;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

use timex_types::{AnchorPoint, EngineFailure};

use crate::{CancellationToken, PeriodUnit, Temporal, TemporalEngine, checkpoint};

/// Deterministic regex-driven grammar for a small set of expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TemporalEngine for RuleEngine {
    fn parse(
        &self,
        text: &str,
        anchor: &AnchorPoint,
        cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        let input = text.trim().trim_end_matches('.').to_lowercase();
        let today = anchor.date_part();
        for rule in RULES {
            checkpoint(cancel)?;
            if let Some(result) = rule(&input, today) {
                return result;
            }
        }
        Err(unsupported(text))
    }
}

/// `None` when the rule does not apply; `Some(Err)` when it applies but the
/// referenced date does not exist.
type Rule = fn(&str, NaiveDate) -> Option<Result<Temporal, EngineFailure>>;

const RULES: &[Rule] = &[
    relative_day,
    noon,
    weekday,
    relative_period,
    holiday,
    month_year,
    numeric_date,
];

const MONTH_NAME: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

fn patterns() -> &'static RulePatterns {
    static PATTERNS: OnceLock<RulePatterns> = OnceLock::new();
    PATTERNS.get_or_init(RulePatterns::new)
}

struct RulePatterns {
    relative_period: Regex,
    month_year: Regex,
    month_day_year: Regex,
    month_day_comma_year: Regex,
    month_dash_day: Regex,
    iso_date: Regex,
}

impl RulePatterns {
    fn new() -> Self {
        Self {
            relative_period: Regex::new(r"^(last|this|next) (week|month|year)$")
                .expect("relative period pattern is valid"),
            month_year: Regex::new(&format!(r"^{MONTH_NAME},? (\d{{4}})$"))
                .expect("month year pattern is valid"),
            // 4/14/2022
            month_day_year: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$")
                .expect("month/day/year pattern is valid"),
            // 5/13, 2012
            month_day_comma_year: Regex::new(r"^(\d{1,2})/(\d{1,2}), ?(\d{4})$")
                .expect("month/day, year pattern is valid"),
            // 6-15
            month_dash_day: Regex::new(r"^(\d{1,2})-(\d{1,2})$")
                .expect("month-day pattern is valid"),
            iso_date: Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("iso date pattern is valid"),
        }
    }
}

fn relative_day(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let date = match input {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        _ => return None,
    };
    Some(date.map_or_else(|| Err(out_of_range(input)), day_span))
}

fn noon(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    if input != "noon" {
        return None;
    }
    let start = today.and_time(NaiveTime::from_hms_opt(12, 0, 0)?);
    let end = today.and_time(NaiveTime::from_hms_opt(13, 0, 0)?);
    Some(Ok(Temporal::span(
        start.format("%Y-%m-%dT%H:%M").to_string(),
        start,
        end,
        PeriodUnit::Hours,
    )))
}

fn weekday(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let target: Weekday = input.parse().ok()?;
    // Bare weekday abbreviations like "mon" are too ambiguous in free text.
    if input.len() < 6 {
        return None;
    }
    let monday = week_start(today)?;
    let date = monday.checked_add_days(Days::new(u64::from(target.num_days_from_monday())));
    Some(date.map_or_else(|| Err(out_of_range(input)), day_span))
}

fn relative_period(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let caps = patterns().relative_period.captures(input)?;
    let direction = match &caps[1] {
        "last" => -1,
        "next" => 1,
        _ => 0,
    };
    let span = match &caps[2] {
        "week" => week_start(today)
            .and_then(|monday| shift_days(monday, 7 * direction))
            .and_then(week_span),
        "month" => first_of_month(today.year(), today.month())
            .and_then(|first| shift_months(first, direction))
            .and_then(|first| month_span(first.year(), first.month())),
        _ => today
            .year()
            .checked_add(direction as i32)
            .and_then(year_span),
    };
    Some(span.ok_or_else(|| out_of_range(input)))
}

fn holiday(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let (month, day) = match input {
        "christmas" | "christmas day" => (12, 25),
        "new year's day" | "new years day" | "new year's" => (1, 1),
        _ => return None,
    };
    Some(
        NaiveDate::from_ymd_opt(today.year(), month, day)
            .map_or_else(|| Err(out_of_range(input)), day_span),
    )
}

fn month_year(input: &str, _today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let caps = patterns().month_year.captures(input)?;
    let month = month_number(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    Some(month_span(year, month).ok_or_else(|| out_of_range(input)))
}

fn numeric_date(input: &str, today: NaiveDate) -> Option<Result<Temporal, EngineFailure>> {
    let p = patterns();
    let (year, month, day) = if let Some(caps) = p.month_day_year.captures(input) {
        (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else if let Some(caps) = p.month_day_comma_year.captures(input) {
        (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else if let Some(caps) = p.month_dash_day.captures(input) {
        (today.year(), caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else if let Some(caps) = p.iso_date.captures(input) {
        (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else {
        return None;
    };
    Some(
        NaiveDate::from_ymd_opt(year, month, day)
            .map_or_else(|| Err(unsupported(input)), day_span),
    )
}

fn day_span(date: NaiveDate) -> Result<Temporal, EngineFailure> {
    let end = date
        .succ_opt()
        .ok_or_else(|| out_of_range(&date.to_string()))?;
    Ok(Temporal::span(
        date.format("%Y-%m-%d").to_string(),
        date.and_time(NaiveTime::MIN),
        end.and_time(NaiveTime::MIN),
        PeriodUnit::Days,
    ))
}

fn week_span(monday: NaiveDate) -> Option<Temporal> {
    let end = monday.checked_add_days(Days::new(7))?;
    Some(Temporal::span(
        monday.format("%G-W%V").to_string(),
        monday.and_time(NaiveTime::MIN),
        end.and_time(NaiveTime::MIN),
        PeriodUnit::Weeks,
    ))
}

fn month_span(year: i32, month: u32) -> Option<Temporal> {
    let first = first_of_month(year, month)?;
    let end = first.checked_add_months(Months::new(1))?;
    Some(Temporal::span(
        first.format("%Y-%m").to_string(),
        first.and_time(NaiveTime::MIN),
        end.and_time(NaiveTime::MIN),
        PeriodUnit::Months,
    ))
}

fn year_span(year: i32) -> Option<Temporal> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?;
    Some(Temporal::span(
        format!("{year:04}"),
        first.and_time(NaiveTime::MIN),
        end.and_time(NaiveTime::MIN),
        PeriodUnit::Years,
    ))
}

fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(
        date.weekday().num_days_from_monday(),
    )))
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let delta = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn unsupported(text: &str) -> EngineFailure {
    EngineFailure::new(format!("unsupported expression: {text}"))
}

fn out_of_range(text: &str) -> EngineFailure {
    EngineFailure::new(format!(
        "unsupported expression: {text} falls outside the calendar range"
    ))
}
