use crate::aggregate;
use crate::models::{Severity, SurveyRecord, Timeframe};
use crate::risk::{self, PRIORITY_THRESHOLD};

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Fixed battery of threshold checks over the filtered set, one sentence
/// per check whose share is above zero, always in the same order. An empty
/// population yields an empty list, never a division error.
pub fn generate_insights(records: &[SurveyRecord]) -> Vec<String> {
    let mut insights = Vec::new();
    let total = records.len();
    if total == 0 {
        return insights;
    }

    let diagnoses = aggregate::aggregate(records, |r| r.diagnosis.clone(), None);
    if let Some(top) = diagnoses.first() {
        insights.push(format!(
            "El diagnóstico más frecuente es {} ({:.0}% de los pacientes).",
            top.name,
            percent(top.value, total)
        ));
    }

    let severe = records
        .iter()
        .filter(|r| r.severity == Some(Severity::Severa))
        .count();
    if severe > 0 {
        insights.push(format!(
            "{:.0}% de los pacientes presentan síntomas severos.",
            percent(severe, total)
        ));
    }

    let high_pain = records
        .iter()
        .filter(|r| matches!(r.pain_intensity, Some(p) if p >= 7))
        .count();
    if high_pain > 0 {
        insights.push(format!(
            "{:.0}% reportan dolor alto (7 o más de 10).",
            percent(high_pain, total)
        ));
    }

    let with_comorbidities = records
        .iter()
        .filter(|r| !r.comorbidities.is_empty())
        .count();
    if with_comorbidities > 0 {
        insights.push(format!(
            "{:.0}% tienen al menos una comorbilidad.",
            percent(with_comorbidities, total)
        ));
    }

    let urgent = records
        .iter()
        .filter(|r| r.desired_timeframe == Some(Timeframe::Urgente))
        .count();
    if urgent > 0 {
        insights.push(format!(
            "{:.0}% buscan una resolución urgente.",
            percent(urgent, total)
        ));
    }

    let priority = records
        .iter()
        .filter(|r| risk::clinical_risk_index(r) >= PRIORITY_THRESHOLD)
        .count();
    if priority > 0 {
        insights.push(format!(
            "{:.0}% superan el umbral de paciente prioritario.",
            percent(priority, total)
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymptomDuration;

    #[test]
    fn empty_population_yields_no_insights() {
        assert!(generate_insights(&[]).is_empty());
    }

    #[test]
    fn quiet_records_yield_no_insights() {
        let records = vec![SurveyRecord::default(), SurveyRecord::default()];
        assert!(generate_insights(&records).is_empty());
    }

    #[test]
    fn sentences_follow_the_fixed_order() {
        let record = SurveyRecord {
            age: Some(70),
            diagnosis: Some("vesicula".to_string()),
            severity: Some(Severity::Severa),
            pain_intensity: Some(9),
            functional_limitation: Some(Severity::Severa),
            symptom_duration: Some(SymptomDuration::MasUnAnio),
            comorbidities: vec!["diabetes".to_string()],
            desired_timeframe: Some(Timeframe::Urgente),
            ..SurveyRecord::default()
        };
        let insights = generate_insights(&[record]);
        assert_eq!(insights.len(), 6);
        assert!(insights[0].contains("diagnóstico más frecuente"));
        assert!(insights[0].contains("vesicula"));
        assert!(insights[0].contains("100%"));
        assert!(insights[1].contains("severos"));
        assert!(insights[2].contains("dolor alto"));
        assert!(insights[3].contains("comorbilidad"));
        assert!(insights[4].contains("urgente"));
        assert!(insights[5].contains("prioritario"));
    }

    #[test]
    fn checks_are_independent() {
        let record = SurveyRecord {
            pain_intensity: Some(8),
            ..SurveyRecord::default()
        };
        let insights = generate_insights(&[record]);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("dolor alto"));
    }

    #[test]
    fn shares_reflect_the_population() {
        let severe = SurveyRecord {
            severity: Some(Severity::Severa),
            ..SurveyRecord::default()
        };
        let records = vec![
            severe,
            SurveyRecord::default(),
            SurveyRecord::default(),
            SurveyRecord::default(),
        ];
        let insights = generate_insights(&records);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("25%"));
    }
}
