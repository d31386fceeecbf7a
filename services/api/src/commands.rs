use crate::infra::resolve_model_path;
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::scoring::{
    ApplicantRecord, Decision, ModelArtifact, ModelTrainer, RuleBasedAssessor, ScoringService,
    SyntheticConfig, SyntheticGenerator, TrainingError, TrainingOutcome,
};
use loan_risk::telemetry;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct TrainArgs {
    /// Number of synthetic applicants to generate (defaults to APP_TRAIN_SAMPLES)
    #[arg(long)]
    pub(crate) samples: Option<usize>,
    /// Seed for data generation, splitting, and the forest (defaults to APP_TRAIN_SEED)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Number of trees in the forest (defaults to APP_FOREST_TREES)
    #[arg(long)]
    pub(crate) trees: Option<usize>,
    /// Where to write the model artifact (defaults to APP_MODEL_PATH)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Destination CSV file
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Number of rows to generate
    #[arg(long)]
    pub(crate) samples: Option<usize>,
    /// Generator seed
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Model artifact to score against (defaults to APP_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Use the rule-based assessor instead of the model
    #[arg(long)]
    pub(crate) rules: bool,
    /// Applicant payload as inline JSON
    pub(crate) payload: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Model artifact to score against (defaults to APP_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut settings = config.training.clone();
    if let Some(samples) = args.samples {
        settings.samples = samples;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(trees) = args.trees {
        settings.trees = trees;
    }
    let output = resolve_model_path(&config, args.output);

    let outcome = ModelTrainer::new(settings.training_config()).run()?;
    outcome.persist(&output)?;
    render_training_summary(&outcome, &output);
    Ok(())
}

pub(crate) fn render_training_summary(outcome: &TrainingOutcome, output: &Path) {
    let metadata = &outcome.artifact.metadata;
    let evaluation = &outcome.evaluation;

    println!("Loan approval model training");
    println!(
        "- {} synthetic applicants (seed {}) | {} train / {} test",
        metadata.training_samples, metadata.seed, evaluation.train_rows, evaluation.test_rows
    );
    println!(
        "- {} trees | feature schema v{}",
        outcome.artifact.model.trees().len(),
        metadata.schema_version
    );
    println!("Model Accuracy: {:.4}", evaluation.report.accuracy);
    println!("Classification Report:\n{}", evaluation.report);
    println!(
        "Model saved to {} (trained {})",
        output.display(),
        metadata
            .trained_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let defaults = SyntheticConfig::default();
    let config = SyntheticConfig {
        samples: args.samples.unwrap_or(defaults.samples),
        seed: args.seed.unwrap_or(defaults.seed),
        ..defaults
    };

    let dataset = SyntheticGenerator::new(config)
        .generate()
        .map_err(TrainingError::from)?;
    let file = File::create(&args.output)?;
    dataset.write_csv(file)?;

    println!(
        "Wrote {} applicants ({} approved) to {}",
        dataset.len(),
        dataset.approved_count(),
        args.output.display()
    );
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let decision = if args.rules {
        RuleBasedAssessor::default().assess_body(args.payload.as_bytes())?
    } else {
        let config = AppConfig::load()?;
        let path = resolve_model_path(&config, args.model);
        let service = ScoringService::from_artifact(ModelArtifact::load(path)?);
        service.score_body(args.payload.as_bytes())?
    };

    println!("{}", render_decision(&decision)?);
    Ok(())
}

pub(crate) fn render_decision(decision: &Decision) -> Result<String, AppError> {
    serde_json::to_string_pretty(decision).map_err(|err| AppError::Io(err.into()))
}

/// Named applicant profile used by the demo walkthrough.
#[derive(Debug, Clone)]
pub(crate) struct Scenario {
    pub(crate) name: &'static str,
    pub(crate) applicant: ApplicantRecord,
}

fn applicant(
    monthly_income: f64,
    credit_score: f64,
    principal: f64,
    tenure_months: f64,
    existing_debt: f64,
    employment_status: &str,
    loan_purpose: &str,
) -> ApplicantRecord {
    ApplicantRecord {
        monthly_income: Some(monthly_income),
        credit_score: Some(credit_score),
        principal: Some(principal),
        tenure_months: Some(tenure_months),
        existing_debt: Some(existing_debt),
        employment_status: Some(employment_status.to_string()),
        loan_purpose: Some(loan_purpose.to_string()),
        interest_rate: None,
    }
}

pub(crate) fn canonical_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "Ideal candidate (high income, high credit, low loan)",
            applicant: applicant(80_000.0, 800.0, 100_000.0, 24.0, 5_000.0, "SALARIED", "HOME"),
        },
        Scenario {
            name: "Low income, high loan",
            applicant: applicant(1_000.0, 700.0, 200_000.0, 24.0, 10_000.0, "SALARIED", "HOME"),
        },
        Scenario {
            name: "High debt ratio",
            applicant: applicant(50_000.0, 700.0, 200_000.0, 24.0, 40_000.0, "SALARIED", "PERSONAL"),
        },
        Scenario {
            name: "Poor credit score",
            applicant: applicant(60_000.0, 500.0, 100_000.0, 12.0, 5_000.0, "SALARIED", "EDUCATION"),
        },
        Scenario {
            name: "Unemployed",
            applicant: applicant(0.0, 650.0, 50_000.0, 12.0, 0.0, "UNEMPLOYED", "PERSONAL"),
        },
        Scenario {
            name: "Self-employed, good stats",
            applicant: applicant(70_000.0, 750.0, 300_000.0, 36.0, 10_000.0, "SELF_EMPLOYED", "BUSINESS"),
        },
        Scenario {
            name: "Borderline (mid income, mid credit)",
            applicant: applicant(30_000.0, 650.0, 100_000.0, 24.0, 5_000.0, "SALARIED", "PERSONAL"),
        },
        Scenario {
            name: "High loan, long tenure",
            applicant: applicant(90_000.0, 780.0, 500_000.0, 60.0, 20_000.0, "SALARIED", "HOME"),
        },
        Scenario {
            name: "Very low income, small loan",
            applicant: applicant(5_000.0, 700.0, 10_000.0, 12.0, 0.0, "SALARIED", "PERSONAL"),
        },
        Scenario {
            name: "Student loan (low income, education)",
            applicant: applicant(10_000.0, 650.0, 50_000.0, 48.0, 0.0, "STUDENT", "EDUCATION"),
        },
        Scenario {
            name: "High income, bad credit",
            applicant: applicant(100_000.0, 550.0, 200_000.0, 24.0, 10_000.0, "SALARIED", "HOME"),
        },
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = resolve_model_path(&config, args.model);
    let service = ScoringService::from_artifact(ModelArtifact::load(&path)?);
    let rules = RuleBasedAssessor::default();

    println!("Loan approval demo against {}", path.display());
    for (index, scenario) in canonical_scenarios().iter().enumerate() {
        println!("\n{}. {}", index + 1, scenario.name);
        match service.score(&scenario.applicant) {
            Ok(decision) => println!("  model: {}", describe(&decision)),
            Err(err) => println!("  model: unavailable ({})", err),
        }
        match rules.assess(&scenario.applicant) {
            Ok(decision) => println!("  rules: {}", describe(&decision)),
            Err(err) => println!("  rules: not applicable ({})", err),
        }
    }

    Ok(())
}

fn describe(decision: &Decision) -> String {
    let verdict = if decision.is_approved {
        "APPROVED"
    } else {
        "REJECTED"
    };
    format!(
        "{} (risk score {:.3}) - {}",
        verdict, decision.risk_score, decision.reason
    )
}
