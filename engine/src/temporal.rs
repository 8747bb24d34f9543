use chrono::NaiveDateTime;

use timex_types::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl PeriodUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PeriodUnit::Hours => "Hours",
            PeriodUnit::Days => "Days",
            PeriodUnit::Weeks => "Weeks",
            PeriodUnit::Months => "Months",
            PeriodUnit::Years => "Years",
        }
    }
}

/// A recognized temporal value in both of its string forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Temporal {
    value: String,
    structured: String,
}

impl Temporal {
    /// Engines with their own structured rendering construct values directly.
    pub fn new(value: impl Into<String>, structured: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            structured: structured.into(),
        }
    }

    /// A half-open span `[start, end)` one `unit` long.
    pub fn span(
        value: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        unit: PeriodUnit,
    ) -> Self {
        let structured = format!(
            "TimeSpan({},{},Period(Map({} -> 1),Exact),Exact)",
            start.format("%Y-%m-%dT%H:%MZ"),
            end.format("%Y-%m-%dT%H:%MZ"),
            unit.as_str()
        );
        Self::new(value, structured)
    }

    /// Compact calendar value (`2012-05-13`, `2024-W01`, `2000-03`).
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn structured(&self) -> &str {
        &self.structured
    }

    #[must_use]
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Simple => self.value.clone(),
            OutputFormat::Structured => self.structured.clone(),
        }
    }
}
