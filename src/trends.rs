use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{MonthlyTrendPoint, SurveyRecord};

const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// "Dic 2023" style label for a bucket date.
pub fn month_label(month: NaiveDate) -> String {
    format!("{} {}", MONTHS[month.month0() as usize], month.year())
}

/// Per-month survey and conversion counts over the record set.
///
/// Buckets are keyed by the first day of the month so the output is sorted
/// on the actual date, never on the formatted label (Spanish labels sort
/// "Dic" after "Ene" alphabetically, which would misorder year boundaries).
/// Records without any usable date are skipped.
pub fn monthly_trends(records: &[SurveyRecord]) -> Vec<MonthlyTrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();

    for record in records {
        let date = match record.effective_date() {
            Some(date) => date,
            None => continue,
        };
        let month = match NaiveDate::from_ymd_opt(date.year(), date.month(), 1) {
            Some(month) => month,
            None => continue,
        };
        let entry = buckets.entry(month).or_insert((0, 0));
        entry.0 += 1;
        if record.decided_to_operate == Some(true) {
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (surveys, conversions))| MonthlyTrendPoint {
            month,
            label: month_label(month),
            surveys,
            conversions,
            conversion_rate: if surveys == 0 {
                0.0
            } else {
                conversions as f64 / surveys as f64
            },
        })
        .collect()
}
