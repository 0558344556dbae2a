//! # Training Orchestrator
//!
//! Runs one training pass end to end:
//! 1. Load the labelled CSV and drop rows without `Description` or `Genre`
//! 2. Fit the vocabulary, categorical schema and label codec on every row
//! 3. Encode every row
//! 4. Split train/test (seeded)
//! 5. Fit the forest on the training rows
//! 6. Evaluate on the held-out rows
//! 7. Persist the bundle and the evaluation report
//!
//! Any failure aborts the run; the bundle is only written at the very end,
//! and atomically, so a failed run never leaves a partial bundle behind.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use classifier::{ClassificationReport, LabelCodec, RandomForestClassifier};
use data_loader::Dataset;

use crate::bundle::ModelBundle;
use crate::config::TrainingConfig;

/// What a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ModelBundle,
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Coordinates a training run with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct TrainingOrchestrator {
    config: TrainingConfig,
}

impl TrainingOrchestrator {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train from `input` and save the bundle into `bundle_dir`.
    pub fn run(&self, input: &Path, bundle_dir: &Path) -> Result<TrainingOutcome> {
        let start = Instant::now();

        let dataset = Dataset::load_training(input)
            .with_context(|| format!("Failed to load training data from {:?}", input))?;
        let outcome = self.train(&dataset)?;

        outcome
            .bundle
            .save(bundle_dir, Some(&outcome.report.to_string()))
            .context("Failed to save model bundle")?;

        info!(
            "Training run finished in {:.2?}: bundle {} at {}",
            start.elapsed(),
            outcome.bundle.version(),
            bundle_dir.display()
        );
        Ok(outcome)
    }

    /// Fit every artifact on an in-memory dataset (nothing is written).
    #[instrument(skip_all, fields(rows = dataset.len()))]
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        if dataset.is_empty() {
            bail!("No trainable rows: every row is missing a description or a genre");
        }
        let records = dataset.records();
        let genres = dataset.genres();
        debug!("Genre distribution: {:?}", dataset.genre_counts());

        // Fit encoders and labels on the full dataset
        let (vocabulary, schema) = pipeline::fit(records, &self.config.encoder)
            .context("Failed to fit the feature encoder")?;
        let labels = LabelCodec::fit(&genres).context("Failed to fit the label codec")?;
        let y = labels.encode_all(&genres).context("Failed to encode labels")?;

        let x = pipeline::encode(records, &vocabulary, &schema)
            .context("Failed to encode training rows")?;
        info!(
            "Encoded {} rows into {} features ({} terms, {} categorical columns)",
            x.n_rows(),
            x.n_cols(),
            vocabulary.len(),
            schema.len()
        );

        // Hold out the evaluation rows
        let split = classifier::train_test_split(
            x.n_rows(),
            self.config.test_fraction,
            self.config.split_seed,
        )
        .context("Failed to split the dataset")?;
        let pick = |indices: &[usize]| indices.iter().map(|&i| y[i]).collect::<Vec<_>>();
        let (y_train, y_test) = (pick(&split.train), pick(&split.test));
        info!(
            "Split {} rows into {} train / {} test",
            x.n_rows(),
            split.train.len(),
            split.test.len()
        );

        let model = RandomForestClassifier::fit(
            &x.select_rows(&split.train),
            &y_train,
            labels.len(),
            &self.config.forest,
        )
        .context("Failed to train the classifier")?;

        let predicted = model
            .predict(&x.select_rows(&split.test))
            .context("Failed to predict the test rows")?;
        let report = ClassificationReport::new(&y_test, &predicted, labels.classes())
            .context("Failed to build the evaluation report")?;
        info!("Held-out accuracy: {:.3}", report.accuracy);

        let bundle = ModelBundle::new(
            model,
            labels,
            vocabulary,
            schema,
            self.config.encoder,
            split.train.len(),
        )
        .context("Trained artifacts do not form a consistent bundle")?;

        Ok(TrainingOutcome {
            bundle,
            report,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        })
    }
}
