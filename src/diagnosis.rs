use std::collections::BTreeMap;

use crate::models::SurveyRecord;

const SYMPTOM_VISIBLE_LUMP: &str = "bulto_visible";
const SYMPTOM_EXERTION_PAIN: &str = "dolor_esfuerzo";
const SYMPTOM_POST_MEAL_PAIN: &str = "dolor_comidas";
const SYMPTOM_JAUNDICE: &str = "ictericia";

/// Probable-diagnosis buckets shown on the dashboard. `Ord` drives the
/// display order of the grouped map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosisCategory {
    HerniaInguinal,
    HerniaUmbilical,
    HerniaIncisional,
    Vesicula,
    Otro,
}

impl DiagnosisCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::HerniaInguinal => "Hernia Inguinal",
            Self::HerniaUmbilical => "Hernia Umbilical",
            Self::HerniaIncisional => "Hernia Incisional",
            Self::Vesicula => "Vesícula",
            Self::Otro => "Otro",
        }
    }
}

/// Heuristic classifier, not a diagnostic tool. An explicit prior-diagnosis
/// text always wins over symptom inference, and keyword matching is
/// first-match-wins in the order below; reordering changes outcomes for
/// ambiguous records.
pub fn classify(record: &SurveyRecord) -> DiagnosisCategory {
    if record.prior_diagnosis {
        if let Some(detail) = record.prior_diagnosis_detail.as_deref() {
            let detail = detail.to_lowercase();
            if detail.contains("inguinal") {
                return DiagnosisCategory::HerniaInguinal;
            }
            if detail.contains("umbilical") {
                return DiagnosisCategory::HerniaUmbilical;
            }
            if detail.contains("incisional") {
                return DiagnosisCategory::HerniaIncisional;
            }
            if detail.contains("vesícula")
                || detail.contains("vesicula")
                || detail.contains("biliar")
            {
                return DiagnosisCategory::Vesicula;
            }
            return DiagnosisCategory::Otro;
        }
    }

    let has = |code: &str| record.symptoms.iter().any(|s| s == code);
    if has(SYMPTOM_VISIBLE_LUMP) && has(SYMPTOM_EXERTION_PAIN) {
        return DiagnosisCategory::HerniaInguinal;
    }
    if has(SYMPTOM_VISIBLE_LUMP) {
        return DiagnosisCategory::HerniaUmbilical;
    }
    if has(SYMPTOM_POST_MEAL_PAIN) || has(SYMPTOM_JAUNDICE) {
        return DiagnosisCategory::Vesicula;
    }
    DiagnosisCategory::Otro
}

/// Partitions the record set into the fixed category buckets. Only
/// categories with at least one record appear in the map.
pub fn group_by_probable_diagnosis(
    records: &[SurveyRecord],
) -> BTreeMap<DiagnosisCategory, Vec<SurveyRecord>> {
    let mut groups: BTreeMap<DiagnosisCategory, Vec<SurveyRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(classify(record)).or_default().push(record.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_detail(detail: &str) -> SurveyRecord {
        SurveyRecord {
            prior_diagnosis: true,
            prior_diagnosis_detail: Some(detail.to_string()),
            ..SurveyRecord::default()
        }
    }

    fn with_symptoms(symptoms: &[&str]) -> SurveyRecord {
        SurveyRecord {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(
            classify(&with_detail("Hernia INGUINAL derecha")),
            DiagnosisCategory::HerniaInguinal
        );
        assert_eq!(
            classify(&with_detail("piedras en la vesícula")),
            DiagnosisCategory::Vesicula
        );
        assert_eq!(
            classify(&with_detail("colico biliar recurrente")),
            DiagnosisCategory::Vesicula
        );
    }

    #[test]
    fn unmatched_detail_falls_to_otro() {
        assert_eq!(classify(&with_detail("apendicitis")), DiagnosisCategory::Otro);
    }

    #[test]
    fn explicit_detail_wins_over_symptoms() {
        let mut record = with_detail("hernia umbilical");
        record.symptoms = vec!["dolor_comidas".to_string(), "ictericia".to_string()];
        assert_eq!(classify(&record), DiagnosisCategory::HerniaUmbilical);
    }

    #[test]
    fn ambiguous_detail_takes_first_keyword_in_order() {
        // Mentions both inguinal and vesícula; inguinal is checked first.
        let record = with_detail("hernia inguinal y vesícula");
        assert_eq!(classify(&record), DiagnosisCategory::HerniaInguinal);
    }

    #[test]
    fn symptom_inference_precedence() {
        assert_eq!(
            classify(&with_symptoms(&["bulto_visible", "dolor_esfuerzo"])),
            DiagnosisCategory::HerniaInguinal
        );
        assert_eq!(
            classify(&with_symptoms(&["bulto_visible"])),
            DiagnosisCategory::HerniaUmbilical
        );
        assert_eq!(
            classify(&with_symptoms(&["dolor_comidas"])),
            DiagnosisCategory::Vesicula
        );
        assert_eq!(
            classify(&with_symptoms(&["ictericia"])),
            DiagnosisCategory::Vesicula
        );
        assert_eq!(classify(&with_symptoms(&["fiebre"])), DiagnosisCategory::Otro);
        assert_eq!(classify(&with_symptoms(&[])), DiagnosisCategory::Otro);
    }

    #[test]
    fn prior_flag_without_detail_uses_symptoms() {
        let record = SurveyRecord {
            prior_diagnosis: true,
            prior_diagnosis_detail: None,
            symptoms: vec!["bulto_visible".to_string()],
            ..SurveyRecord::default()
        };
        assert_eq!(classify(&record), DiagnosisCategory::HerniaUmbilical);
    }

    #[test]
    fn grouping_partitions_every_record_once() {
        let records = vec![
            with_symptoms(&["bulto_visible"]),
            with_symptoms(&["ictericia"]),
            with_detail("hernia incisional"),
            SurveyRecord::default(),
        ];
        let groups = group_by_probable_diagnosis(&records);
        let total: usize = groups.values().map(|v| v.len()).sum();
        assert_eq!(total, records.len());
        assert_eq!(groups[&DiagnosisCategory::HerniaUmbilical].len(), 1);
        assert_eq!(groups[&DiagnosisCategory::Vesicula].len(), 1);
        assert_eq!(groups[&DiagnosisCategory::HerniaIncisional].len(), 1);
        assert_eq!(groups[&DiagnosisCategory::Otro].len(), 1);
    }
}
