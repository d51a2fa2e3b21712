use std::collections::HashMap;

use crate::models::{ChartDatum, SurveyRecord};

/// Counts records per distinct value of the selected field.
///
/// Records where the selector yields `None` or an empty string are skipped.
/// `labels` maps wire codes to display names; codes without an entry are
/// shown as-is. Output is sorted by descending count with ties broken by
/// first-encountered order, tracked explicitly so the ordering does not
/// depend on sort stability for equal keys.
pub fn aggregate<F>(
    records: &[SurveyRecord],
    selector: F,
    labels: Option<&HashMap<String, String>>,
) -> Vec<ChartDatum>
where
    F: Fn(&SurveyRecord) -> Option<String>,
{
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut next_seen = 0usize;

    for record in records {
        let raw = match selector(record) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        let name = labels
            .and_then(|map| map.get(&raw).cloned())
            .unwrap_or(raw);
        let entry = counts.entry(name).or_insert_with(|| {
            let seen = next_seen;
            next_seen += 1;
            (0, seen)
        });
        entry.0 += 1;
    }

    let mut data: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(name, (count, seen))| (name, count, seen))
        .collect();
    data.sort_by_key(|&(_, count, seen)| (std::cmp::Reverse(count), seen));

    data.into_iter()
        .map(|(name, value, _)| ChartDatum {
            name,
            value,
            color: None,
        })
        .collect()
}

/// Arithmetic mean of the selected numeric field across the record set.
///
/// Only finite values count; a record missing the field shrinks the
/// denominator instead of contributing zero. Returns `None` when no record
/// carries a usable value, so callers can render "N/A" rather than a fake 0.
pub fn average<F>(records: &[SurveyRecord], selector: F) -> Option<f64>
where
    F: Fn(&SurveyRecord) -> Option<f64>,
{
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| selector(record))
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_diagnosis(code: &str) -> SurveyRecord {
        SurveyRecord {
            diagnosis: Some(code.to_string()),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn counts_descending_with_first_seen_ties() {
        let records = vec![
            with_diagnosis("a"),
            with_diagnosis("b"),
            with_diagnosis("a"),
        ];
        let data = aggregate(&records, |r| r.diagnosis.clone(), None);
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].name, "a");
        assert_eq!(data[0].value, 2);
        assert_eq!(data[1].name, "b");
        assert_eq!(data[1].value, 1);
    }

    #[test]
    fn equal_counts_keep_first_encountered_order() {
        let records = vec![
            with_diagnosis("zeta"),
            with_diagnosis("alfa"),
            with_diagnosis("media"),
        ];
        let data = aggregate(&records, |r| r.diagnosis.clone(), None);
        let names: Vec<_> = data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alfa", "media"]);
    }

    #[test]
    fn missing_and_empty_fields_are_skipped() {
        let records = vec![
            with_diagnosis("a"),
            SurveyRecord::default(),
            with_diagnosis(""),
        ];
        let data = aggregate(&records, |r| r.diagnosis.clone(), None);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].value, 1);
    }

    #[test]
    fn totals_match_records_carrying_the_field() {
        let records = vec![
            with_diagnosis("a"),
            with_diagnosis("b"),
            with_diagnosis("b"),
            SurveyRecord::default(),
        ];
        let carrying = records.iter().filter(|r| r.diagnosis.is_some()).count();
        let data = aggregate(&records, |r| r.diagnosis.clone(), None);
        let total: usize = data.iter().map(|d| d.value).sum();
        assert_eq!(total, carrying);
    }

    #[test]
    fn label_map_renames_known_codes_only() {
        let mut labels = HashMap::new();
        labels.insert("vesicula".to_string(), "Vesícula Biliar".to_string());
        let records = vec![with_diagnosis("vesicula"), with_diagnosis("otro")];
        let data = aggregate(&records, |r| r.diagnosis.clone(), Some(&labels));
        let names: Vec<_> = data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Vesícula Biliar", "otro"]);
    }

    #[test]
    fn average_of_empty_set_is_none() {
        assert_eq!(average(&[], |r| r.pain_intensity.map(f64::from)), None);
    }

    #[test]
    fn average_with_no_valid_values_is_none() {
        let records = vec![SurveyRecord::default(), SurveyRecord::default()];
        assert_eq!(average(&records, |r| r.pain_intensity.map(f64::from)), None);
    }

    #[test]
    fn average_excludes_missing_values_from_denominator() {
        let records = vec![
            SurveyRecord {
                pain_intensity: Some(5),
                ..SurveyRecord::default()
            },
            SurveyRecord::default(),
            SurveyRecord {
                pain_intensity: Some(7),
                ..SurveyRecord::default()
            },
        ];
        let mean = average(&records, |r| r.pain_intensity.map(f64::from)).unwrap();
        assert!((mean - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_of_constant_field_is_that_constant() {
        let records: Vec<SurveyRecord> = (0..4)
            .map(|_| SurveyRecord {
                surgery_probability: Some(0.4),
                ..SurveyRecord::default()
            })
            .collect();
        let mean = average(&records, |r| r.surgery_probability).unwrap();
        assert!((mean - 0.4).abs() < 1e-12);
    }

    #[test]
    fn non_finite_values_are_dropped() {
        let records = vec![
            SurveyRecord {
                surgery_probability: Some(f64::NAN),
                ..SurveyRecord::default()
            },
            SurveyRecord {
                surgery_probability: Some(0.8),
                ..SurveyRecord::default()
            },
        ];
        let mean = average(&records, |r| r.surgery_probability).unwrap();
        assert!((mean - 0.8).abs() < 1e-12);
    }
}
