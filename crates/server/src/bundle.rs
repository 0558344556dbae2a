//! # Model Bundle
//!
//! The four learned artifacts of one training run, saved and loaded as a
//! matched set.
//!
//! ## On-disk layout
//! ```text
//! models/
//!   manifest.json               bundle version, creation time, dimensions, classes
//!   genre_model.json            random forest
//!   genre_label_encoder.json    label codec
//!   desc_vectorizer.json        vocabulary + IDF weights
//!   categorical_columns.json    one-hot schema
//!   evaluation.txt              held-out report (informational)
//! ```
//!
//! Every artifact file carries the manifest's `bundle_version`. Loading
//! refuses artifacts from different runs and checks that their dimensions
//! agree, so a half-replaced directory can never serve predictions.

use crate::error::ArtifactLoadError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use classifier::{ForestConfig, LabelCodec, RandomForestClassifier};
use data_loader::NumericField;
use pipeline::{CategoricalSchema, EncoderConfig, FeatureEncoder, Vocabulary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MODEL_FILE: &str = "genre_model.json";
pub const LABELS_FILE: &str = "genre_label_encoder.json";
pub const VOCABULARY_FILE: &str = "desc_vectorizer.json";
pub const SCHEMA_FILE: &str = "categorical_columns.json";
pub const EVALUATION_FILE: &str = "evaluation.txt";

/// Layout version of the bundle directory
pub const FORMAT_VERSION: u32 = 1;

// ============================================================================
// Manifest and artifact envelope
// ============================================================================

/// Summary of a bundle, readable without loading the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub bundle_version: Uuid,
    pub created_at: DateTime<Utc>,
    pub n_features: usize,
    pub vocabulary_size: usize,
    pub schema_size: usize,
    pub classes: Vec<String>,
    pub training_rows: usize,
    pub encoder: EncoderConfig,
    pub forest: ForestConfig,
}

/// Artifact file contents: the payload tagged with its bundle version
#[derive(Serialize, Deserialize)]
struct Versioned<T> {
    bundle_version: Uuid,
    artifact: T,
}

// ============================================================================
// Bundle
// ============================================================================

/// Immutable, matched set of trained artifacts.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    manifest: Manifest,
    model: RandomForestClassifier,
    labels: LabelCodec,
    vocabulary: Vocabulary,
    schema: CategoricalSchema,
}

impl ModelBundle {
    /// Assemble a new bundle with a fresh version id.
    ///
    /// Fails if the pieces do not fit together.
    pub fn new(
        model: RandomForestClassifier,
        labels: LabelCodec,
        vocabulary: Vocabulary,
        schema: CategoricalSchema,
        encoder: EncoderConfig,
        training_rows: usize,
    ) -> Result<Self, ArtifactLoadError> {
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            bundle_version: Uuid::new_v4(),
            created_at: Utc::now(),
            n_features: model.n_features(),
            vocabulary_size: vocabulary.len(),
            schema_size: schema.len(),
            classes: labels.classes().to_vec(),
            training_rows,
            encoder,
            forest: *model.config(),
        };

        let bundle = Self {
            manifest,
            model,
            labels,
            vocabulary,
            schema,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn version(&self) -> Uuid {
        self.manifest.bundle_version
    }

    pub fn model(&self) -> &RandomForestClassifier {
        &self.model
    }

    pub fn labels(&self) -> &LabelCodec {
        &self.labels
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn schema(&self) -> &CategoricalSchema {
        &self.schema
    }

    /// Feature encoder bound to this bundle's vocabulary and schema
    pub fn encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.vocabulary, &self.schema)
    }

    /// Check that every artifact agrees with the manifest and each other
    fn validate(&self) -> Result<(), ArtifactLoadError> {
        let expected_features =
            self.vocabulary.len() + self.schema.len() + NumericField::ALL.len();
        let checks = [
            (
                self.model.n_features() == expected_features,
                format!(
                    "model expects {} features, vocabulary + schema + numeric give {}",
                    self.model.n_features(),
                    expected_features
                ),
            ),
            (
                self.model.n_classes() == self.labels.len(),
                format!(
                    "model has {} classes, label codec has {}",
                    self.model.n_classes(),
                    self.labels.len()
                ),
            ),
            (
                self.model.is_well_formed(),
                "model trees are malformed".to_string(),
            ),
            (
                self.manifest.n_features == expected_features
                    && self.manifest.vocabulary_size == self.vocabulary.len()
                    && self.manifest.schema_size == self.schema.len(),
                "manifest dimensions do not match the artifacts".to_string(),
            ),
            (
                self.manifest.classes == self.labels.classes(),
                "manifest classes do not match the label codec".to_string(),
            ),
        ];

        match checks.into_iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(ArtifactLoadError::Inconsistent(reason)),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Write the bundle to `dir`, replacing whatever is there.
    ///
    /// Files are written into a staging directory next to `dir`, which is
    /// renamed into place only once everything is on disk. On failure the
    /// staging directory is removed and `dir` is left untouched.
    pub fn save(&self, dir: &Path, evaluation: Option<&str>) -> Result<()> {
        let staging = sibling_path(dir, "staging", self.version())?;
        fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create staging directory {:?}", staging))?;

        if let Err(err) = self.write_files(&staging, evaluation) {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }

        let backup = sibling_path(dir, "previous", self.version())?;
        if let Err(err) = swap_into_place(&staging, dir, &backup) {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }

        info!(
            "Saved bundle {} to {} ({} features, {} classes)",
            self.version(),
            dir.display(),
            self.manifest.n_features,
            self.manifest.classes.len()
        );
        Ok(())
    }

    fn write_files(&self, dir: &Path, evaluation: Option<&str>) -> Result<()> {
        let version = self.version();
        write_json(&dir.join(MANIFEST_FILE), &self.manifest)?;
        write_artifact(&dir.join(MODEL_FILE), version, &self.model)?;
        write_artifact(&dir.join(LABELS_FILE), version, &self.labels)?;
        write_artifact(&dir.join(VOCABULARY_FILE), version, &self.vocabulary)?;
        write_artifact(&dir.join(SCHEMA_FILE), version, &self.schema)?;
        if let Some(text) = evaluation {
            let path = dir.join(EVALUATION_FILE);
            fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
        }
        Ok(())
    }

    /// Read only the manifest of the bundle in `dir`
    pub fn load_manifest(dir: &Path) -> Result<Manifest, ArtifactLoadError> {
        let manifest: Manifest = read_json(&dir.join(MANIFEST_FILE))?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(ArtifactLoadError::UnsupportedFormat {
                found: manifest.format_version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(manifest)
    }

    /// Load and validate the bundle in `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactLoadError> {
        info!("Loading bundle from {}", dir.display());
        let manifest = Self::load_manifest(dir)?;
        let version = manifest.bundle_version;

        let model = read_artifact(dir, MODEL_FILE, version)?;
        let labels = read_artifact(dir, LABELS_FILE, version)?;
        let vocabulary = read_artifact(dir, VOCABULARY_FILE, version)?;
        let schema = read_artifact(dir, SCHEMA_FILE, version)?;

        let bundle = Self {
            manifest,
            model,
            labels,
            vocabulary,
            schema,
        };
        bundle.validate()?;

        info!(
            "Loaded bundle {} created {} ({} features, classes: {})",
            version,
            bundle.manifest.created_at,
            bundle.manifest.n_features,
            bundle.manifest.classes.join(", ")
        );
        Ok(bundle)
    }
}

// ============================================================================
// File helpers
// ============================================================================

/// `<parent>/.<name>.<tag>-<version>`, next to `dir`
fn sibling_path(dir: &Path, tag: &str, version: Uuid) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .with_context(|| format!("Bundle path {:?} has no directory name", dir))?
        .to_string_lossy();
    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(parent.join(format!(".{}.{}-{}", name, tag, version)))
}

/// Rename `staging` to `dir`, moving any existing `dir` to `backup` first.
///
/// If the final rename fails the previous bundle is moved back, so `dir`
/// always holds either the old bundle or the new one.
fn swap_into_place(staging: &Path, dir: &Path, backup: &Path) -> Result<()> {
    let replaced = dir.exists();
    if replaced {
        fs::rename(dir, backup)
            .with_context(|| format!("Failed to move existing bundle {:?} aside", dir))?;
    }

    if let Err(err) = fs::rename(staging, dir) {
        if replaced {
            if let Err(restore) = fs::rename(backup, dir) {
                warn!("Could not restore previous bundle from {:?}: {}", backup, restore);
            }
        }
        return Err(err).with_context(|| format!("Failed to move bundle into {:?}", dir));
    }

    if replaced {
        if let Err(err) = fs::remove_dir_all(backup) {
            warn!("Could not remove previous bundle at {:?}: {}", backup, err);
        }
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn write_artifact<T: Serialize>(path: &Path, bundle_version: Uuid, artifact: &T) -> Result<()> {
    write_json(
        path,
        &Versioned {
            bundle_version,
            artifact,
        },
    )
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactLoadError::Missing {
                path: display.clone(),
            }
        } else {
            ArtifactLoadError::Io {
                path: display.clone(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Corrupt {
        path: display,
        source,
    })
}

fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    file: &'static str,
    expected: Uuid,
) -> Result<T, ArtifactLoadError> {
    let versioned: Versioned<T> = read_json(&dir.join(file))?;
    if versioned.bundle_version != expected {
        return Err(ArtifactLoadError::VersionMismatch {
            artifact: file,
            expected,
            found: versioned.bundle_version,
        });
    }
    Ok(versioned.artifact)
}
