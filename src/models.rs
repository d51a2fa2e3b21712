use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Symptom severity and functional limitation share the same three-step
/// scale on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Leve,
    Moderada,
    Severa,
}

impl Severity {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "leve" => Some(Self::Leve),
            "moderada" => Some(Self::Moderada),
            "severa" => Some(Self::Severa),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Leve => "leve",
            Self::Moderada => "moderada",
            Self::Severa => "severa",
        }
    }
}

/// How long the patient reports having had symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymptomDuration {
    MenosUnMes,
    UnoATresMeses,
    TresASeisMeses,
    SeisADoceMeses,
    MasUnAnio,
}

impl SymptomDuration {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "menos_1_mes" => Some(Self::MenosUnMes),
            "1_3_meses" => Some(Self::UnoATresMeses),
            "3_6_meses" => Some(Self::TresASeisMeses),
            "6_12_meses" => Some(Self::SeisADoceMeses),
            "mas_1_anio" => Some(Self::MasUnAnio),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::MenosUnMes => "menos_1_mes",
            Self::UnoATresMeses => "1_3_meses",
            Self::TresASeisMeses => "3_6_meses",
            Self::SeisADoceMeses => "6_12_meses",
            Self::MasUnAnio => "mas_1_anio",
        }
    }
}

/// Timeframe in which the patient wants the problem resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Urgente,
    UnoATresMeses,
    TresASeisMeses,
    SinPrisa,
}

impl Timeframe {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "urgente" => Some(Self::Urgente),
            "1_3_meses" => Some(Self::UnoATresMeses),
            "3_6_meses" => Some(Self::TresASeisMeses),
            "sin_prisa" => Some(Self::SinPrisa),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Urgente => "urgente",
            Self::UnoATresMeses => "1_3_meses",
            Self::TresASeisMeses => "3_6_meses",
            Self::SinPrisa => "sin_prisa",
        }
    }
}

/// Sentiment assigned to the free-text comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positivo,
    Negativo,
    Neutral,
}

impl Sentiment {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "positivo" => Some(Self::Positivo),
            "negativo" => Some(Self::Negativo),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Positivo => "positivo",
            Self::Negativo => "negativo",
            Self::Neutral => "neutral",
        }
    }
}

/// The eight 1-5 concern scales from the final survey step. A missing or
/// out-of-range answer is `None` and drops out of averages.
#[derive(Debug, Clone, Default)]
pub struct ConcernRatings {
    pub pain: Option<i32>,
    pub anesthesia: Option<i32>,
    pub cost: Option<i32>,
    pub recovery: Option<i32>,
    pub complications: Option<i32>,
    pub time_off: Option<i32>,
    pub scarring: Option<i32>,
    pub outcome: Option<i32>,
}

/// One patient's intake survey plus derived clinical fields. Read-only to
/// the aggregation stages; every derived view is a fresh structure.
#[derive(Debug, Clone)]
pub struct SurveyRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub diagnosis: Option<String>,
    pub survey_completed: bool,
    pub submitted_at: Option<NaiveDate>,
    pub updated_at: Option<NaiveDate>,
    pub decided_to_operate: Option<bool>,
    pub surgery_probability: Option<f64>,
    pub pain_intensity: Option<i32>,
    pub severity: Option<Severity>,
    pub functional_limitation: Option<Severity>,
    pub symptom_duration: Option<SymptomDuration>,
    pub comorbidities: Vec<String>,
    pub symptoms: Vec<String>,
    pub desired_timeframe: Option<Timeframe>,
    pub insurance: Option<String>,
    pub comment: Option<String>,
    pub comment_sentiment: Option<Sentiment>,
    pub concerns: ConcernRatings,
    pub prior_diagnosis: bool,
    pub prior_diagnosis_detail: Option<String>,
}

impl SurveyRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Survey date with the last-update date as fallback.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.submitted_at.or(self.updated_at)
    }
}

impl Default for SurveyRecord {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: String::new(),
            last_name: String::new(),
            age: None,
            diagnosis: None,
            survey_completed: true,
            submitted_at: None,
            updated_at: None,
            decided_to_operate: None,
            surgery_probability: None,
            pain_intensity: None,
            severity: None,
            functional_limitation: None,
            symptom_duration: None,
            comorbidities: Vec::new(),
            symptoms: Vec::new(),
            desired_timeframe: None,
            insurance: None,
            comment: None,
            comment_sentiment: None,
            concerns: ConcernRatings::default(),
            prior_diagnosis: false,
            prior_diagnosis_detail: None,
        }
    }
}

/// One chart slice: display name plus occurrence count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub name: String,
    pub value: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Row in the priority-patient list, recomputed on every filter change.
#[derive(Debug, Clone)]
pub struct PriorityPatientView {
    pub id: Uuid,
    pub display_name: String,
    pub age: Option<i32>,
    pub diagnosis: Option<String>,
    pub risk_score: i64,
    pub surgery_probability: Option<f64>,
    pub last_contact: Option<NaiveDate>,
}

/// Per-month survey volume and conversion figures.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrendPoint {
    /// First day of the bucket's month; the sort key.
    pub month: NaiveDate,
    pub label: String,
    pub surveys: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

/// Risk tier derived from the clinical risk index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Alto,
    Moderado,
    Bajo,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Alto => "Alto",
            Self::Moderado => "Moderado",
            Self::Bajo => "Bajo",
        }
    }

    /// Badge variant the dashboard renders this tier with.
    pub fn tier(self) -> &'static str {
        match self {
            Self::Alto => "destructive",
            Self::Moderado => "default",
            Self::Bajo => "outline",
        }
    }
}
