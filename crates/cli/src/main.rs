use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{
    PREDICTED_GENRE_COLUMN, read_table, records_from_table, write_table_with_column_to_path,
};
use server::{InferenceService, ModelBundle, ServeConfig, TrainingConfig, TrainingOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Genre - predict a movie's genre from its description and metadata
#[derive(Parser)]
#[command(name = "genre")]
#[command(about = "Train and serve a movie genre classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a labelled CSV and save the bundle
    Train(TrainArgs),

    /// Predict a genre for every row of an unlabelled CSV
    Predict {
        /// CSV with a Description column
        #[arg(short, long)]
        input: PathBuf,

        /// Bundle directory written by `genre train`
        #[arg(short, long, env = "GENRE_BUNDLE_DIR", default_value = "models")]
        bundle: PathBuf,

        /// Write the input plus a Predicted_Genre column here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a bundle contains
    Inspect {
        #[arg(short, long, env = "GENRE_BUNDLE_DIR", default_value = "models")]
        bundle: PathBuf,
    },

    /// Serve the prediction web form
    Serve {
        #[arg(short, long, env = "GENRE_BUNDLE_DIR", default_value = "models")]
        bundle: PathBuf,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, env = "GENRE_PORT", default_value = "5000")]
        port: u16,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Labelled CSV with Description and Genre columns
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the bundle
    #[arg(short, long, env = "GENRE_BUNDLE_DIR", default_value = "models")]
    bundle: PathBuf,

    /// Optional TOML file with training settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of description terms
    #[arg(long)]
    vocabulary_size: Option<usize>,

    /// Number of trees in the forest
    #[arg(long)]
    n_estimators: Option<usize>,

    /// Maximum tree depth (unlimited when unset)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Share of rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for both the split and the forest
    #[arg(long)]
    seed: Option<u64>,
}

impl TrainArgs {
    /// Defaults, then the config file, then flags
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(vocabulary_size) = self.vocabulary_size {
            config.encoder = config.encoder.with_vocabulary_size(vocabulary_size);
        }
        if let Some(n_estimators) = self.n_estimators {
            config.forest = config.forest.with_n_estimators(n_estimators);
        }
        if let Some(max_depth) = self.max_depth {
            config.forest = config.forest.with_max_depth(Some(max_depth));
        }
        if let Some(test_fraction) = self.test_fraction {
            config.test_fraction = test_fraction;
        }
        if let Some(seed) = self.seed {
            config.split_seed = seed;
            config.forest = config.forest.with_random_seed(seed);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => handle_train(args).await?,
        Commands::Predict {
            input,
            bundle,
            output,
        } => handle_predict(&input, &bundle, output.as_deref())?,
        Commands::Inspect { bundle } => handle_inspect(&bundle)?,
        Commands::Serve { bundle, host, port } => {
            handle_serve(ServeConfig {
                bundle_dir: bundle,
                host,
                port,
            })
            .await?
        }
    }

    Ok(())
}

/// Handle the 'train' command
async fn handle_train(args: TrainArgs) -> Result<()> {
    let config = args.training_config()?;
    println!(
        "Training on {} ({} trees, {} terms, {:.0}% held out)...",
        args.input.display(),
        config.forest.n_estimators,
        config.encoder.vocabulary_size,
        config.test_fraction * 100.0
    );

    let start = Instant::now();
    let input = args.input.clone();
    let bundle_dir = args.bundle.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        TrainingOrchestrator::new(config).run(&input, &bundle_dir)
    })
    .await
    .context("Training task panicked")??;

    println!(
        "{} Trained on {} rows, evaluated on {} rows in {:.2?}",
        "✓".green(),
        outcome.train_rows,
        outcome.test_rows,
        start.elapsed()
    );
    println!();
    println!("{}", "Evaluation:".bold().blue());
    println!("{}", outcome.report);
    println!(
        "{} Bundle {} saved to {}",
        "✓".green(),
        outcome.bundle.version(),
        args.bundle.display()
    );
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(input: &Path, bundle: &Path, output: Option<&Path>) -> Result<()> {
    let service = InferenceService::load(bundle)
        .with_context(|| format!("Failed to load model bundle from {}", bundle.display()))?;
    println!(
        "{} Loaded bundle {}",
        "✓".green(),
        service.bundle().version()
    );

    let table = read_table(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records = records_from_table(&table, false)?;

    let start = Instant::now();
    let outcomes = service.predict_batch(&records);
    let predictions: Vec<String> = outcomes
        .into_iter()
        .enumerate()
        .map(|(row, outcome)| match outcome {
            Ok(genre) => genre,
            Err(err) => {
                warn!("Row {} left unclassified: {}", row, err);
                String::new()
            }
        })
        .collect();
    let failed = predictions.iter().filter(|p| p.is_empty()).count();

    match output {
        Some(path) => {
            write_table_with_column_to_path(path, &table, PREDICTED_GENRE_COLUMN, &predictions)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} predictions to {} in {:.2?}",
                "✓".green(),
                predictions.len() - failed,
                path.display(),
                start.elapsed()
            );
        }
        None => print_predictions(&records, &predictions),
    }

    if failed > 0 {
        println!(
            "{} {} of {} rows could not be classified",
            "!".yellow(),
            failed,
            predictions.len()
        );
    }
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(bundle: &Path) -> Result<()> {
    let manifest = ModelBundle::load_manifest(bundle)
        .with_context(|| format!("Failed to read bundle at {}", bundle.display()))?;

    println!("{}", format!("Bundle {}", manifest.bundle_version).bold().blue());
    println!("{}Created: {}", "• ".green(), manifest.created_at.to_rfc3339());
    println!("{}Format version: {}", "• ".green(), manifest.format_version);
    println!("{}Training rows: {}", "• ".green(), manifest.training_rows);
    println!(
        "{}Features: {} ({} terms, {} categorical, 4 numeric)",
        "• ".cyan(),
        manifest.n_features,
        manifest.vocabulary_size,
        manifest.schema_size
    );
    println!(
        "{}Forest: {} trees, max depth {}, seed {}",
        "• ".cyan(),
        manifest.forest.n_estimators,
        manifest
            .forest
            .max_depth
            .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
        manifest.forest.random_seed
    );
    println!("Genres ({}):", manifest.classes.len());
    for genre in &manifest.classes {
        println!("  - {}", genre);
    }
    Ok(())
}

/// Handle the 'serve' command
async fn handle_serve(config: ServeConfig) -> Result<()> {
    let service = InferenceService::load(&config.bundle_dir).with_context(|| {
        format!(
            "Failed to load model bundle from {}",
            config.bundle_dir.display()
        )
    })?;
    println!(
        "{} Loaded bundle {} ({} genres)",
        "✓".green(),
        service.bundle().version(),
        service.bundle().labels().len()
    );

    server::run_server(Arc::new(service), &config).await
}

/// Print description / genre pairs
fn print_predictions(records: &[data_loader::Record], predictions: &[String]) {
    println!("{}", "Predictions:".bold().blue());
    for (record, genre) in records.iter().zip(predictions) {
        let genre = if genre.is_empty() {
            "-".dimmed().to_string()
        } else {
            genre.green().to_string()
        };
        println!("{} => {}", record.description_or_empty(), genre);
    }
}
