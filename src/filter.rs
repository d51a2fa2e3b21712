use chrono::{Duration, NaiveDate, Utc};

use crate::models::{Severity, SurveyRecord};

/// Relative date window for the dashboard filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    LastWeek,
    LastMonth,
    LastQuarter,
    LastYear,
    #[default]
    All,
}

impl DateRange {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "semana" | "last-week" => Some(Self::LastWeek),
            "mes" | "last-month" => Some(Self::LastMonth),
            "trimestre" | "last-quarter" => Some(Self::LastQuarter),
            "anio" | "last-year" => Some(Self::LastYear),
            "all" | "todos" => Some(Self::All),
            _ => None,
        }
    }

    /// Cutoff relative to `today`; `None` means the window is unbounded.
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            Self::LastWeek => 7,
            Self::LastMonth => 30,
            Self::LastQuarter => 90,
            Self::LastYear => 365,
            Self::All => return None,
        };
        Some(today - Duration::days(days))
    }
}

/// Named age brackets offered by the dashboard filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeBracket {
    From18To30,
    From31To45,
    From46To60,
    Over60,
    #[default]
    All,
}

impl AgeBracket {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "18-30" => Some(Self::From18To30),
            "31-45" => Some(Self::From31To45),
            "46-60" => Some(Self::From46To60),
            "60+" => Some(Self::Over60),
            "all" | "todos" => Some(Self::All),
            _ => None,
        }
    }

    fn contains(self, age: i32) -> bool {
        match self {
            Self::From18To30 => (18..=30).contains(&age),
            Self::From31To45 => (31..=45).contains(&age),
            Self::From46To60 => (46..=60).contains(&age),
            Self::Over60 => age > 60,
            Self::All => true,
        }
    }
}

/// Dashboard filter selection. Defaults pass everything.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub date_range: DateRange,
    /// Normalized diagnosis selector value; `None` means "all".
    pub diagnosis: Option<String>,
    pub age_bracket: AgeBracket,
    /// `None` means "all".
    pub severity: Option<Severity>,
}

/// Lowercase with spaces collapsed to hyphens, the selector-value form the
/// diagnosis dropdown uses.
pub fn normalize_diagnosis(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

/// Applies the four ANDed dashboard predicates over the record set.
///
/// Records without a completed survey never pass; they are invisible to
/// every aggregate view downstream. Relative order of survivors is
/// preserved.
pub fn filter_records(records: &[SurveyRecord], params: &FilterParams) -> Vec<SurveyRecord> {
    let today = Utc::now().date_naive();
    let cutoff = params.date_range.cutoff(today);

    records
        .iter()
        .filter(|record| record.survey_completed)
        .filter(|record| match cutoff {
            // A record with no usable date is excluded from bounded windows.
            Some(cutoff) => match record.effective_date() {
                Some(date) => date >= cutoff,
                None => false,
            },
            None => true,
        })
        .filter(|record| match params.diagnosis.as_deref() {
            Some(wanted) => match record.diagnosis.as_deref() {
                Some(diagnosis) => normalize_diagnosis(diagnosis) == wanted,
                None => false,
            },
            None => true,
        })
        .filter(|record| match params.age_bracket {
            AgeBracket::All => true,
            bracket => match record.age {
                Some(age) => bracket.contains(age),
                None => false,
            },
        })
        .filter(|record| match params.severity {
            Some(wanted) => record.severity == Some(wanted),
            None => true,
        })
        .cloned()
        .collect()
}
