use std::cmp::Reverse;

use crate::models::{
    PriorityPatientView, RiskLevel, Severity, SurveyRecord, SymptomDuration, Timeframe,
};

/// Default cutoff for the priority-patient list.
pub const PRIORITY_THRESHOLD: i64 = 40;

const SYMPTOM_JAUNDICE: &str = "ictericia";
const SYMPTOM_FEVER: &str = "fiebre";

/// Weighted clinical-risk index for one record.
///
/// Additive and pure: every triggered addend contributes, with the age,
/// severity, pain, limitation, duration and comorbidity pairs being
/// either/or within themselves. There is no cap.
pub fn clinical_risk_index(record: &SurveyRecord) -> i64 {
    let mut score = 0i64;

    match record.age {
        Some(age) if age > 65 => score += 10,
        Some(age) if age > 50 => score += 5,
        _ => {}
    }

    match record.severity {
        Some(Severity::Severa) => score += 15,
        Some(Severity::Moderada) => score += 8,
        _ => {}
    }

    match record.pain_intensity {
        Some(pain) if pain >= 8 => score += 12,
        Some(pain) if pain >= 5 => score += 6,
        _ => {}
    }

    match record.functional_limitation {
        Some(Severity::Severa) => score += 15,
        Some(Severity::Moderada) => score += 8,
        _ => {}
    }

    match record.symptom_duration {
        Some(SymptomDuration::MasUnAnio) => score += 10,
        Some(SymptomDuration::SeisADoceMeses) => score += 7,
        Some(SymptomDuration::TresASeisMeses) => score += 5,
        _ => {}
    }

    let comorbidities = record.comorbidities.len();
    if comorbidities > 2 {
        score += 8;
    } else if comorbidities > 0 {
        score += 4;
    }

    if record.symptoms.iter().any(|s| s == SYMPTOM_JAUNDICE) {
        score += 10;
    }
    if record.symptoms.iter().any(|s| s == SYMPTOM_FEVER) {
        score += 8;
    }

    if record.desired_timeframe == Some(Timeframe::Urgente) {
        score += 10;
    }

    score
}

/// Tier boundaries are inclusive on the low side: 50 is Alto, 30 Moderado.
pub fn risk_level(score: i64) -> RiskLevel {
    if score >= 50 {
        RiskLevel::Alto
    } else if score >= 30 {
        RiskLevel::Moderado
    } else {
        RiskLevel::Bajo
    }
}

/// Records at or above the threshold, highest score first. Equal scores
/// keep their original relative order (std sort is stable).
pub fn priority_patients(records: &[SurveyRecord], threshold: i64) -> Vec<SurveyRecord> {
    let mut scored: Vec<(i64, SurveyRecord)> = records
        .iter()
        .map(|record| (clinical_risk_index(record), record.clone()))
        .filter(|(score, _)| *score >= threshold)
        .collect();
    scored.sort_by_key(|(score, _)| Reverse(*score));
    scored.into_iter().map(|(_, record)| record).collect()
}

/// Dashboard rows for the priority list, one per qualifying record.
pub fn priority_views(records: &[SurveyRecord], threshold: i64) -> Vec<PriorityPatientView> {
    priority_patients(records, threshold)
        .into_iter()
        .map(|record| PriorityPatientView {
            id: record.id,
            display_name: record.display_name(),
            age: record.age,
            diagnosis: record.diagnosis.clone(),
            risk_score: clinical_risk_index(&record),
            surgery_probability: record.surgery_probability,
            last_contact: record.effective_date(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_risk_record() -> SurveyRecord {
        SurveyRecord {
            age: Some(70),
            severity: Some(Severity::Severa),
            pain_intensity: Some(9),
            symptom_duration: Some(SymptomDuration::MasUnAnio),
            comorbidities: vec![
                "diabetes".to_string(),
                "hipertension".to_string(),
                "obesidad".to_string(),
            ],
            symptoms: vec!["ictericia".to_string()],
            desired_timeframe: Some(Timeframe::Urgente),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn worked_example_scores_seventy_five() {
        // 10 age + 15 severity + 12 pain + 10 duration + 8 comorbidities
        // + 10 jaundice + 10 urgent
        let score = clinical_risk_index(&high_risk_record());
        assert_eq!(score, 75);
        assert_eq!(risk_level(score), RiskLevel::Alto);
        assert_eq!(risk_level(score).label(), "Alto");
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(clinical_risk_index(&SurveyRecord::default()), 0);
    }

    #[test]
    fn age_tiers_are_mutually_exclusive() {
        let mut record = SurveyRecord::default();
        record.age = Some(55);
        assert_eq!(clinical_risk_index(&record), 5);
        record.age = Some(66);
        assert_eq!(clinical_risk_index(&record), 10);
        record.age = Some(40);
        assert_eq!(clinical_risk_index(&record), 0);
    }

    #[test]
    fn fever_and_jaundice_add_independently() {
        let record = SurveyRecord {
            symptoms: vec!["fiebre".to_string(), "ictericia".to_string()],
            ..SurveyRecord::default()
        };
        assert_eq!(clinical_risk_index(&record), 18);
    }

    #[test]
    fn raising_pain_never_lowers_the_score() {
        let mut record = high_risk_record();
        record.pain_intensity = Some(4);
        let base = clinical_risk_index(&record);
        record.pain_intensity = Some(9);
        assert!(clinical_risk_index(&record) >= base);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(risk_level(50), RiskLevel::Alto);
        assert_eq!(risk_level(49), RiskLevel::Moderado);
        assert_eq!(risk_level(30), RiskLevel::Moderado);
        assert_eq!(risk_level(29), RiskLevel::Bajo);
        assert_eq!(risk_level(0), RiskLevel::Bajo);
    }

    #[test]
    fn tier_display_variants() {
        assert_eq!(RiskLevel::Alto.tier(), "destructive");
        assert_eq!(RiskLevel::Moderado.tier(), "default");
        assert_eq!(RiskLevel::Bajo.tier(), "outline");
    }

    #[test]
    fn priority_list_respects_threshold_and_order() {
        let low = SurveyRecord {
            age: Some(55),
            ..SurveyRecord::default()
        };
        // 15 + 12 + 10 + 8 = 45
        let mid = SurveyRecord {
            severity: Some(Severity::Severa),
            pain_intensity: Some(9),
            symptom_duration: Some(SymptomDuration::MasUnAnio),
            functional_limitation: Some(Severity::Moderada),
            ..SurveyRecord::default()
        };
        let high = high_risk_record();
        let records = vec![low, high.clone(), mid.clone()];

        let priority = priority_patients(&records, PRIORITY_THRESHOLD);
        assert_eq!(priority.len(), 2);
        assert_eq!(priority[0].id, high.id);
        assert_eq!(priority[1].id, mid.id);
        for record in &priority {
            assert!(clinical_risk_index(record) >= PRIORITY_THRESHOLD);
        }
    }

    #[test]
    fn equal_scores_keep_original_order() {
        let first = high_risk_record();
        let second = high_risk_record();
        let priority = priority_patients(&[first.clone(), second.clone()], 40);
        assert_eq!(priority[0].id, first.id);
        assert_eq!(priority[1].id, second.id);
    }
}
