//! Held-out evaluation: per-class precision, recall and F1.
//!
//! Only classes that occur in the true or predicted labels are reported,
//! and the macro average is taken over those. A ratio with a zero
//! denominator is reported as 0.

use crate::error::ModelError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Scores for one class (or one averaging row).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Report over one evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build a report from class ids.
    ///
    /// `class_names[id]` names class `id`.
    pub fn new(
        y_true: &[usize],
        y_pred: &[usize],
        class_names: &[String],
    ) -> Result<Self, ModelError> {
        if y_true.len() != y_pred.len() {
            return Err(ModelError::LabelCountMismatch {
                rows: y_true.len(),
                labels: y_pred.len(),
            });
        }
        if let Some(&label) = y_true
            .iter()
            .chain(y_pred)
            .find(|&&label| label >= class_names.len())
        {
            return Err(ModelError::LabelOutOfRange {
                label,
                n_classes: class_names.len(),
            });
        }

        let present: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();
        let classes: Vec<ClassMetrics> = present
            .into_iter()
            .map(|class| class_metrics(class, &class_names[class], y_true, y_pred))
            .collect();

        let n = y_true.len();
        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let accuracy = ratio(correct, n);

        let macro_avg = average("macro avg", &classes, |_| 1.0);
        let weighted_avg = average("weighted avg", &classes, |m| m.support as f64);

        Ok(Self {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
        })
    }

    /// Number of evaluated samples
    pub fn support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn class_metrics(class: usize, name: &str, y_true: &[usize], y_pred: &[usize]) -> ClassMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_count = 0;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == class, p == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_count += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_count);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        name: name.to_string(),
        precision,
        recall,
        f1,
        support: tp + fn_count,
    }
}

fn average(name: &str, classes: &[ClassMetrics], weight: impl Fn(&ClassMetrics) -> f64) -> ClassMetrics {
    let total_weight: f64 = classes.iter().map(&weight).sum();
    let mean = |value: fn(&ClassMetrics) -> f64| {
        if total_weight == 0.0 {
            0.0
        } else {
            classes.iter().map(|m| value(m) * weight(m)).sum::<f64>() / total_weight
        }
    };

    ClassMetrics {
        name: name.to_string(),
        precision: mean(|m| m.precision),
        recall: mean(|m| m.recall),
        f1: mean(|m| m.f1),
        support: classes.iter().map(|m| m.support).sum(),
    }
}

impl fmt::Display for ClassificationReport {
    /// Fixed-width table with two decimals, one row per class.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.name, m.precision, m.recall, m.f1, m.support
            )
        };

        for class in &self.classes {
            row(f, class)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Action".into(), "Comedy".into(), "Drama".into()]
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 2, 0];
        let report = ClassificationReport::new(&y, &y, &names()).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert!(report.classes.iter().all(|c| c.f1 == 1.0));
        assert_eq!(report.classes[0].support, 2);
        assert_eq!(report.weighted_avg.support, 4);
    }

    #[test]
    fn test_per_class_scores() {
        // Action: tp=1 fp=1 fn=1; Drama: tp=1 fp=1 fn=1; Comedy absent
        let y_true = vec![0, 0, 2, 2];
        let y_pred = vec![0, 2, 2, 0];
        let report = ClassificationReport::new(&y_true, &y_pred, &names()).unwrap();

        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].name, "Action");
        assert_eq!(report.classes[0].precision, 0.5);
        assert_eq!(report.classes[0].recall, 0.5);
        assert_eq!(report.classes[1].name, "Drama");
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.macro_avg.f1, 0.5);
    }

    #[test]
    fn test_zero_division_is_zero() {
        // Comedy is predicted but never true: recall 0/0
        let report = ClassificationReport::new(&[0], &[1], &names()).unwrap();
        let comedy = report.classes.iter().find(|c| c.name == "Comedy").unwrap();
        assert_eq!(comedy.precision, 0.0);
        assert_eq!(comedy.recall, 0.0);
        assert_eq!(comedy.support, 0);
        // weighted average only counts classes with support
        assert_eq!(report.weighted_avg.f1, 0.0);
    }

    #[test]
    fn test_weighted_average_uses_support() {
        // Action: 3 true, all right. Drama: 1 true, predicted Action.
        let report =
            ClassificationReport::new(&[0, 0, 0, 2], &[0, 0, 0, 0], &names()).unwrap();
        let action = &report.classes[0];
        assert_eq!(action.precision, 0.75);
        assert_eq!(action.recall, 1.0);
        let expected = (action.f1 * 3.0 + 0.0) / 4.0;
        assert!((report.weighted_avg.f1 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_display_layout() {
        let report = ClassificationReport::new(&[0, 2], &[0, 2], &names()).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].ends_with("precision    recall  f1-score   support"));
        assert_eq!(lines[2], "      Action      1.00      1.00      1.00         1");
        assert!(text.contains("    accuracy                          1.00         2"));
        assert!(text.contains("weighted avg      1.00      1.00      1.00         2"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ClassificationReport::new(&[0, 1], &[0], &names()).is_err());
        assert!(ClassificationReport::new(&[7], &[0], &names()).is_err());
    }
}
