use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

use appraisal_engine::config::EngineConfig;
use appraisal_engine::scoring;
use appraisal_engine::sequence::{CodePosition, CounterStore, SequenceGenerator, SequenceType};
use appraisal_engine::telemetry::{
    create_engine_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
use appraisal_engine::OperationTimer;

#[derive(Parser)]
#[command(name = "appraisal-engine")]
#[command(about = "Reference codes, period scores and grades for the appraisal platform")]
#[command(long_about = "Operator tooling over the appraisal engine. Issues sequence reference codes \
                       from the persistent counter store and evaluates the scoring rules used by \
                       the period-score pipeline. All output is JSON on stdout.")]
struct Cli {
    /// Configuration file to layer over the defaults
    #[arg(long, global = true, default_value = "appraisal-engine.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue the next reference code for a sequence type
    NextCode {
        /// Sequence type id (1 work product, 2 objective, 3 review period, 4 task, ...)
        #[arg(long = "type")]
        sequence_type: i32,
        /// Zero-padded width of the numeric part
        #[arg(long, help = "Digit width; defaults to sequence.default_digit_width")]
        width: Option<usize>,
        /// Text attached to the number
        #[arg(long, default_value = "")]
        concat: String,
        /// Attach the text after the number instead of before it
        #[arg(long)]
        suffix: bool,
    },
    /// Map a score percentage to its grade band
    Grade { percentage: Decimal },
    /// Assemble a graded period score from its components
    PeriodScore {
        #[arg(long)]
        work_product: Decimal,
        #[arg(long)]
        objective: Decimal,
        #[arg(long)]
        competency: Decimal,
        #[arg(long)]
        max_points: Decimal,
        #[arg(long, default_value = "0")]
        hrd_deduction: Decimal,
    },
    /// Check that category weights sum to 100 within tolerance
    Weights {
        #[arg(required = true, allow_negative_numbers = true)]
        weights: Vec<Decimal>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    EngineConfig::load_env_file()?;
    let config = EngineConfig::load_from(&cli.config)?;
    init_telemetry(&config.observability)?;

    let output = match cli.command {
        Commands::NextCode {
            sequence_type,
            width,
            concat,
            suffix,
        } => {
            let position = if suffix {
                CodePosition::After
            } else {
                CodePosition::Before
            };
            tokio::runtime::Runtime::new()?.block_on(next_code(
                &config,
                SequenceType(sequence_type),
                width,
                &concat,
                position,
            ))?
        }
        Commands::Grade { percentage } => {
            let grade = scoring::determine_grade(percentage);
            json!({
                "percentage": percentage,
                "grade": grade,
                "is_under_performing": grade.is_under_performing(),
            })
        }
        Commands::PeriodScore {
            work_product,
            objective,
            competency,
            max_points,
            hrd_deduction,
        } => serde_json::to_value(scoring::calculate_period_score(
            work_product,
            objective,
            competency,
            max_points,
            hrd_deduction,
        ))?,
        Commands::Weights { weights } => {
            scoring::validate_category_weights(&weights)?;
            json!({
                "balanced": true,
                "total": weights
                    .iter()
                    .fold(Decimal::ZERO, |sum, w| sum.saturating_add(*w)),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    shutdown_telemetry();
    Ok(())
}

async fn next_code(
    config: &EngineConfig,
    sequence_type: SequenceType,
    width: Option<usize>,
    concat: &str,
    position: CodePosition,
) -> Result<serde_json::Value> {
    let correlation_id = generate_correlation_id();
    let span = create_engine_span("next-code", None, None, Some(&correlation_id));

    async {
        let timer = OperationTimer::new("next-code");
        let (store, db) = open_counter_store(config).await?;
        let generator = SequenceGenerator::new(store, config.sequence.clone());

        let width = width.unwrap_or(config.sequence.default_digit_width);
        let code = generator
            .generate_code(sequence_type, width, concat, position)
            .await;

        release_counter_store(db).await;
        let code = code?;
        generator.metrics().log_stats();
        timer.finish();

        Ok::<_, anyhow::Error>(json!({
            "sequence_type": sequence_type,
            "description": sequence_type.description(),
            "code": code,
        }))
    }
    .instrument(span)
    .await
}

#[cfg(feature = "database")]
type Backend = appraisal_engine::DatabaseManager;
#[cfg(not(feature = "database"))]
type Backend = ();

#[cfg(feature = "database")]
async fn open_counter_store(config: &EngineConfig) -> Result<(Arc<dyn CounterStore>, Backend)> {
    let db_config = config.database.clone().unwrap_or_default();
    let db = appraisal_engine::DatabaseManager::new(&db_config).await?;
    Ok((Arc::new(db.counter_store()), db))
}

#[cfg(not(feature = "database"))]
async fn open_counter_store(_config: &EngineConfig) -> Result<(Arc<dyn CounterStore>, Backend)> {
    tracing::warn!("Database feature not enabled, issuing codes from a process-local counter");
    Ok((
        Arc::new(appraisal_engine::sequence::InMemoryCounterStore::new()),
        (),
    ))
}

#[cfg(feature = "database")]
async fn release_counter_store(db: Backend) {
    db.shutdown().await;
}

#[cfg(not(feature = "database"))]
async fn release_counter_store(_db: Backend) {}
