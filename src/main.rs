use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod aggregate;
mod db;
mod diagnosis;
mod filter;
mod insights;
mod models;
mod report;
mod risk;
mod trends;

use filter::{AgeBracket, DateRange, FilterParams};
use models::Severity;

#[derive(Parser)]
#[command(name = "clinic-survey-analytics")]
#[command(about = "Survey analytics for the clinic patient dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Date window: semana, mes, trimestre, anio, all
    #[arg(long, default_value = "all")]
    range: String,
    /// Diagnosis selector value, e.g. "hernia-inguinal"
    #[arg(long)]
    diagnosis: Option<String>,
    /// Age bracket: 18-30, 31-45, 46-60, 60+, all
    #[arg(long, default_value = "all")]
    age: String,
    /// Symptom severity: leve, moderada, severa
    #[arg(long)]
    severity: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import survey records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate the markdown dashboard report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List priority patients by clinical risk index
    Priority {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = risk::PRIORITY_THRESHOLD)]
        threshold: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the monthly survey and conversion trend
    Trends {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the insight sentences for the filtered set
    Insights {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Emit chart data as JSON for one field
    Charts {
        #[command(flatten)]
        filters: FilterArgs,
        /// One of: diagnosis, severity, duration, insurance, sentiment, timeframe
        #[arg(long)]
        field: String,
    },
}

fn parse_filters(args: &FilterArgs) -> anyhow::Result<FilterParams> {
    let date_range = DateRange::from_code(&args.range)
        .with_context(|| format!("unknown date range '{}'", args.range))?;
    let age_bracket = AgeBracket::from_code(&args.age)
        .with_context(|| format!("unknown age bracket '{}'", args.age))?;
    let severity = args
        .severity
        .as_deref()
        .map(|code| {
            Severity::from_code(code).with_context(|| format!("unknown severity '{code}'"))
        })
        .transpose()?;
    let diagnosis = args
        .diagnosis
        .as_deref()
        .map(filter::normalize_diagnosis)
        .filter(|d| d != "all");

    Ok(FilterParams {
        date_range,
        diagnosis,
        age_bracket,
        severity,
    })
}

fn filter_label(args: &FilterArgs) -> String {
    let mut parts = vec![format!("rango {}", args.range)];
    if let Some(diagnosis) = &args.diagnosis {
        parts.push(format!("diagnóstico {diagnosis}"));
    }
    if args.age != "all" {
        parts.push(format!("edad {}", args.age));
    }
    if let Some(severity) = &args.severity {
        parts.push(format!("severidad {severity}"));
    }
    parts.join(", ")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} records from {}.", csv.display());
        }
        Commands::Report { filters, out } => {
            let params = parse_filters(&filters)?;
            let records = db::fetch_records(&pool).await?;
            let filtered = filter::filter_records(&records, &params);
            let report = report::build_report(&filter_label(&filters), &filtered);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Priority {
            filters,
            threshold,
            limit,
        } => {
            let params = parse_filters(&filters)?;
            let records = db::fetch_records(&pool).await?;
            let filtered = filter::filter_records(&records, &params);
            let views = risk::priority_views(&filtered, threshold);

            if views.is_empty() {
                println!("No patients at or above threshold {threshold}.");
                return Ok(());
            }

            println!("Priority patients (threshold {threshold}):");
            for view in views.iter().take(limit) {
                let level = risk::risk_level(view.risk_score);
                println!(
                    "- {} score {} [{}] diagnosis {} last contact {}",
                    view.display_name,
                    view.risk_score,
                    level.label(),
                    view.diagnosis.as_deref().unwrap_or("?"),
                    view.last_contact
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
            }
        }
        Commands::Trends { filters } => {
            let params = parse_filters(&filters)?;
            let records = db::fetch_records(&pool).await?;
            let filtered = filter::filter_records(&records, &params);
            let points = trends::monthly_trends(&filtered);

            if points.is_empty() {
                println!("No dated surveys in this window.");
                return Ok(());
            }

            for point in points {
                println!(
                    "{}: {} surveys, {} conversions ({:.0}%)",
                    point.label,
                    point.surveys,
                    point.conversions,
                    point.conversion_rate * 100.0
                );
            }
        }
        Commands::Insights { filters } => {
            let params = parse_filters(&filters)?;
            let records = db::fetch_records(&pool).await?;
            let filtered = filter::filter_records(&records, &params);
            let insights = insights::generate_insights(&filtered);

            if insights.is_empty() {
                println!("No insights for this window.");
                return Ok(());
            }

            for insight in insights {
                println!("- {insight}");
            }
        }
        Commands::Charts { filters, field } => {
            let params = parse_filters(&filters)?;
            let records = db::fetch_records(&pool).await?;
            let filtered = filter::filter_records(&records, &params);
            let labels = report::display_labels();

            let data = match field.as_str() {
                "diagnosis" => aggregate::aggregate(
                    &filtered,
                    |r| r.diagnosis.clone(),
                    labels.get("diagnosis"),
                ),
                "severity" => aggregate::aggregate(
                    &filtered,
                    |r| r.severity.map(|s| s.as_code().to_string()),
                    labels.get("severity"),
                ),
                "duration" => aggregate::aggregate(
                    &filtered,
                    |r| r.symptom_duration.map(|d| d.as_code().to_string()),
                    labels.get("duration"),
                ),
                "insurance" => aggregate::aggregate(
                    &filtered,
                    |r| r.insurance.clone(),
                    labels.get("insurance"),
                ),
                "sentiment" => aggregate::aggregate(
                    &filtered,
                    |r| r.comment_sentiment.map(|s| s.as_code().to_string()),
                    labels.get("sentiment"),
                ),
                "timeframe" => aggregate::aggregate(
                    &filtered,
                    |r| r.desired_timeframe.map(|t| t.as_code().to_string()),
                    labels.get("timeframe"),
                ),
                other => anyhow::bail!("unknown chart field '{other}'"),
            };

            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}
