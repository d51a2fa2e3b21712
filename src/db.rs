use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{ConcernRatings, Sentiment, Severity, SurveyRecord, SymptomDuration, Timeframe};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS clinic_analytics")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinic_analytics.patients (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            age INTEGER CHECK (age >= 0),
            diagnosis TEXT,
            survey_completed BOOLEAN NOT NULL DEFAULT FALSE,
            submitted_at DATE,
            updated_at DATE,
            decided_to_operate BOOLEAN,
            surgery_probability DOUBLE PRECISION,
            pain_intensity INTEGER,
            severity TEXT,
            functional_limitation TEXT,
            symptom_duration TEXT,
            comorbidities TEXT[],
            symptoms TEXT[],
            desired_timeframe TEXT,
            insurance TEXT,
            comment TEXT,
            comment_sentiment TEXT,
            concern_pain INTEGER,
            concern_anesthesia INTEGER,
            concern_cost INTEGER,
            concern_recovery INTEGER,
            concern_complications INTEGER,
            concern_time_off INTEGER,
            concern_scarring INTEGER,
            concern_outcome INTEGER,
            prior_diagnosis BOOLEAN NOT NULL DEFAULT FALSE,
            prior_diagnosis_detail TEXT,
            source_key TEXT UNIQUE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Keeps a rating only when it is inside the form's 1-5 scale.
fn rating(value: Option<i32>) -> Option<i32> {
    value.filter(|v| (1..=5).contains(v))
}

/// Keeps a pain score only when it is inside the 0-10 scale.
fn pain(value: Option<i32>) -> Option<i32> {
    value.filter(|v| (0..=10).contains(v))
}

/// Keeps a probability only when it is inside [0, 1].
fn probability(value: Option<f64>) -> Option<f64> {
    value.filter(|v| (0.0..=1.0).contains(v))
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let rows: Vec<(&str, &str, &str, i32, Option<&str>, &str, &str, i32, &str, NaiveDate, bool)> = vec![
        (
            "seed-001",
            "María",
            "García",
            68,
            Some("vesicula"),
            "severa",
            "mas_1_anio",
            9,
            "urgente",
            NaiveDate::from_ymd_opt(2026, 7, 14).context("invalid date")?,
            true,
        ),
        (
            "seed-002",
            "Luis",
            "Pérez",
            42,
            Some("hernia-inguinal"),
            "moderada",
            "3_6_meses",
            5,
            "1_3_meses",
            NaiveDate::from_ymd_opt(2026, 7, 28).context("invalid date")?,
            false,
        ),
        (
            "seed-003",
            "Carmen",
            "Lozano",
            55,
            None,
            "leve",
            "1_3_meses",
            3,
            "sin_prisa",
            NaiveDate::from_ymd_opt(2026, 8, 6).context("invalid date")?,
            false,
        ),
    ];

    for (key, first, last, age, diagnosis, severity, duration, pain, timeframe, date, operate) in
        rows
    {
        sqlx::query(
            r#"
            INSERT INTO clinic_analytics.patients
            (id, first_name, last_name, age, diagnosis, survey_completed,
             submitted_at, decided_to_operate, pain_intensity, severity,
             symptom_duration, desired_timeframe, source_key)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(first)
        .bind(last)
        .bind(age)
        .bind(diagnosis)
        .bind(date)
        .bind(operate)
        .bind(pain)
        .bind(severity)
        .bind(duration)
        .bind(timeframe)
        .bind(key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_records(pool: &PgPool) -> anyhow::Result<Vec<SurveyRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, first_name, last_name, age, diagnosis, survey_completed,
               submitted_at, updated_at, decided_to_operate, surgery_probability,
               pain_intensity, severity, functional_limitation, symptom_duration,
               comorbidities, symptoms, desired_timeframe, insurance, comment,
               comment_sentiment, concern_pain, concern_anesthesia, concern_cost,
               concern_recovery, concern_complications, concern_time_off,
               concern_scarring, concern_outcome, prior_diagnosis,
               prior_diagnosis_detail
        FROM clinic_analytics.patients
        ORDER BY submitted_at NULLS LAST, id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("failed to load survey records")?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let severity: Option<String> = row.get("severity");
        let limitation: Option<String> = row.get("functional_limitation");
        let duration: Option<String> = row.get("symptom_duration");
        let timeframe: Option<String> = row.get("desired_timeframe");
        let sentiment: Option<String> = row.get("comment_sentiment");

        records.push(SurveyRecord {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            age: row.get::<Option<i32>, _>("age").filter(|a| *a >= 0),
            diagnosis: row.get("diagnosis"),
            survey_completed: row.get("survey_completed"),
            submitted_at: row.get("submitted_at"),
            updated_at: row.get("updated_at"),
            decided_to_operate: row.get("decided_to_operate"),
            surgery_probability: probability(row.get("surgery_probability")),
            pain_intensity: pain(row.get("pain_intensity")),
            // Unknown codes degrade to None, never an error.
            severity: severity.as_deref().and_then(Severity::from_code),
            functional_limitation: limitation.as_deref().and_then(Severity::from_code),
            symptom_duration: duration.as_deref().and_then(SymptomDuration::from_code),
            comorbidities: row
                .get::<Option<Vec<String>>, _>("comorbidities")
                .unwrap_or_default(),
            symptoms: row
                .get::<Option<Vec<String>>, _>("symptoms")
                .unwrap_or_default(),
            desired_timeframe: timeframe.as_deref().and_then(Timeframe::from_code),
            insurance: row.get("insurance"),
            comment: row.get("comment"),
            comment_sentiment: sentiment.as_deref().and_then(Sentiment::from_code),
            concerns: ConcernRatings {
                pain: rating(row.get("concern_pain")),
                anesthesia: rating(row.get("concern_anesthesia")),
                cost: rating(row.get("concern_cost")),
                recovery: rating(row.get("concern_recovery")),
                complications: rating(row.get("concern_complications")),
                time_off: rating(row.get("concern_time_off")),
                scarring: rating(row.get("concern_scarring")),
                outcome: rating(row.get("concern_outcome")),
            },
            prior_diagnosis: row.get("prior_diagnosis"),
            prior_diagnosis_detail: row.get("prior_diagnosis_detail"),
        });
    }

    Ok(records)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        first_name: String,
        last_name: String,
        #[serde(default)]
        age: Option<i32>,
        #[serde(default)]
        diagnosis: Option<String>,
        survey_completed: bool,
        #[serde(default)]
        submitted_at: Option<NaiveDate>,
        #[serde(default)]
        updated_at: Option<NaiveDate>,
        #[serde(default)]
        decided_to_operate: Option<bool>,
        #[serde(default)]
        surgery_probability: Option<f64>,
        #[serde(default)]
        pain_intensity: Option<i32>,
        #[serde(default)]
        severity: Option<String>,
        #[serde(default)]
        functional_limitation: Option<String>,
        #[serde(default)]
        symptom_duration: Option<String>,
        /// Semicolon-separated list.
        #[serde(default)]
        comorbidities: Option<String>,
        /// Semicolon-separated list.
        #[serde(default)]
        symptoms: Option<String>,
        #[serde(default)]
        desired_timeframe: Option<String>,
        #[serde(default)]
        insurance: Option<String>,
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        comment_sentiment: Option<String>,
        #[serde(default)]
        prior_diagnosis: Option<bool>,
        #[serde(default)]
        prior_diagnosis_detail: Option<String>,
        #[serde(default)]
        source_key: Option<String>,
    }

    fn split_list(field: Option<&str>) -> Vec<String> {
        field
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO clinic_analytics.patients
            (id, first_name, last_name, age, diagnosis, survey_completed,
             submitted_at, updated_at, decided_to_operate, surgery_probability,
             pain_intensity, severity, functional_limitation, symptom_duration,
             comorbidities, symptoms, desired_timeframe, insurance, comment,
             comment_sentiment, prior_diagnosis, prior_diagnosis_detail,
             source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(row.age.filter(|a| *a >= 0))
        .bind(&row.diagnosis)
        .bind(row.survey_completed)
        .bind(row.submitted_at)
        .bind(row.updated_at)
        .bind(row.decided_to_operate)
        .bind(probability(row.surgery_probability))
        .bind(pain(row.pain_intensity))
        .bind(&row.severity)
        .bind(&row.functional_limitation)
        .bind(&row.symptom_duration)
        .bind(split_list(row.comorbidities.as_deref()))
        .bind(split_list(row.symptoms.as_deref()))
        .bind(&row.desired_timeframe)
        .bind(&row.insurance)
        .bind(&row.comment)
        .bind(&row.comment_sentiment)
        .bind(row.prior_diagnosis.unwrap_or(false))
        .bind(&row.prior_diagnosis_detail)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
