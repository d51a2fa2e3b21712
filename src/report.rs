use std::collections::HashMap;
use std::fmt::Write;

use chrono::Utc;

use crate::aggregate::{aggregate, average};
use crate::diagnosis;
use crate::insights::generate_insights;
use crate::models::SurveyRecord;
use crate::risk::{self, PRIORITY_THRESHOLD};
use crate::trends::monthly_trends;

/// Display dictionaries for coded field values, keyed by the selector name
/// the `charts` subcommand accepts. Built fresh per call and handed to
/// `aggregate` by the caller; the engine holds no label state of its own.
pub fn display_labels() -> HashMap<&'static str, HashMap<String, String>> {
    let pairs: [(&str, &[(&str, &str)]); 6] = [
        (
            "diagnosis",
            &[
                ("hernia-inguinal", "Hernia Inguinal"),
                ("hernia-umbilical", "Hernia Umbilical"),
                ("hernia-incisional", "Hernia Incisional"),
                ("vesicula", "Vesícula Biliar"),
            ],
        ),
        (
            "severity",
            &[
                ("leve", "Leve"),
                ("moderada", "Moderada"),
                ("severa", "Severa"),
            ],
        ),
        (
            "duration",
            &[
                ("menos_1_mes", "Menos de 1 mes"),
                ("1_3_meses", "1 a 3 meses"),
                ("3_6_meses", "3 a 6 meses"),
                ("6_12_meses", "6 a 12 meses"),
                ("mas_1_anio", "Más de 1 año"),
            ],
        ),
        (
            "insurance",
            &[
                ("imss", "IMSS"),
                ("issste", "ISSSTE"),
                ("privado", "Seguro privado"),
                ("ninguno", "Sin seguro"),
            ],
        ),
        (
            "sentiment",
            &[
                ("positivo", "Positivo"),
                ("negativo", "Negativo"),
                ("neutral", "Neutral"),
            ],
        ),
        (
            "timeframe",
            &[
                ("urgente", "Urgente"),
                ("1_3_meses", "1 a 3 meses"),
                ("3_6_meses", "3 a 6 meses"),
                ("sin_prisa", "Sin prisa"),
            ],
        ),
    ];

    pairs
        .into_iter()
        .map(|(field, entries)| {
            let map = entries
                .iter()
                .map(|(code, label)| (code.to_string(), label.to_string()))
                .collect();
            (field, map)
        })
        .collect()
}

fn fmt_average(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}"),
        None => "N/A".to_string(),
    }
}

/// Markdown dashboard over an already-filtered record set.
pub fn build_report(filter_label: &str, records: &[SurveyRecord]) -> String {
    let labels = display_labels();
    let mut output = String::new();

    let _ = writeln!(output, "# Panel de Encuestas de Pacientes");
    let _ = writeln!(
        output,
        "Generado el {} para {} ({} encuestas completadas)",
        Utc::now().date_naive(),
        filter_label,
        records.len()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Diagnóstico Probable");
    let groups = diagnosis::group_by_probable_diagnosis(records);
    if groups.is_empty() {
        let _ = writeln!(output, "Sin encuestas en este periodo.");
    } else {
        for (category, members) in groups.iter() {
            let _ = writeln!(output, "- {}: {} pacientes", category.label(), members.len());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Severidad de Síntomas");
    let severity_mix = aggregate(
        records,
        |r| r.severity.map(|s| s.as_code().to_string()),
        labels.get("severity"),
    );
    if severity_mix.is_empty() {
        let _ = writeln!(output, "Sin datos de severidad.");
    } else {
        for datum in severity_mix.iter() {
            let _ = writeln!(output, "- {}: {}", datum.name, datum.value);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Promedios");
    let _ = writeln!(
        output,
        "- Dolor actual (0-10): {}",
        fmt_average(average(records, |r| r.pain_intensity.map(f64::from)))
    );
    let _ = writeln!(
        output,
        "- Probabilidad de cirugía: {}",
        fmt_average(average(records, |r| r.surgery_probability))
    );
    let _ = writeln!(
        output,
        "- Preocupación por dolor (1-5): {}",
        fmt_average(average(records, |r| r.concerns.pain.map(f64::from)))
    );
    let _ = writeln!(
        output,
        "- Preocupación por costos (1-5): {}",
        fmt_average(average(records, |r| r.concerns.cost.map(f64::from)))
    );
    let _ = writeln!(
        output,
        "- Preocupación por recuperación (1-5): {}",
        fmt_average(average(records, |r| r.concerns.recovery.map(f64::from)))
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Tendencia Mensual");
    let trends = monthly_trends(records);
    if trends.is_empty() {
        let _ = writeln!(output, "Sin encuestas con fecha en este periodo.");
    } else {
        for point in trends.iter() {
            let _ = writeln!(
                output,
                "- {}: {} encuestas, {} conversiones ({:.0}%)",
                point.label,
                point.surveys,
                point.conversions,
                point.conversion_rate * 100.0
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pacientes Prioritarios");
    let priority = risk::priority_views(records, PRIORITY_THRESHOLD);
    if priority.is_empty() {
        let _ = writeln!(output, "Ningún paciente supera el umbral de prioridad.");
    } else {
        for view in priority.iter().take(10) {
            let age = view
                .age
                .map(|a| a.to_string())
                .unwrap_or_else(|| "?".to_string());
            let _ = writeln!(
                output,
                "- {} ({} años) riesgo {} [{}], último contacto {}",
                view.display_name,
                age,
                view.risk_score,
                risk::risk_level(view.risk_score).label(),
                view.last_contact
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "sin fecha".to_string())
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");
    let insights = generate_insights(records);
    if insights.is_empty() {
        let _ = writeln!(output, "Sin hallazgos destacables en este periodo.");
    } else {
        for insight in insights.iter() {
            let _ = writeln!(output, "- {insight}");
        }
    }

    output
}
