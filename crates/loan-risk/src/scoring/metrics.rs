use std::fmt;

use serde::Serialize;

use super::schema::Label;

/// Precision, recall, F1, and support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation summary. Diagnostic only; nothing downstream gates on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub rejected: ClassMetrics,
    pub approved: ClassMetrics,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_metrics(actual: &[Label], predicted: &[Label], class: Label) -> ClassMetrics {
    let mut true_positive = 0;
    let mut predicted_positive = 0;
    let mut support = 0;
    for (&truth, &guess) in actual.iter().zip(predicted) {
        if guess == class {
            predicted_positive += 1;
        }
        if truth == class {
            support += 1;
            if guess == class {
                true_positive += 1;
            }
        }
    }

    let precision = ratio(true_positive, predicted_positive);
    let recall = ratio(true_positive, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}

impl ClassificationReport {
    /// Compare predictions against ground truth. Classes with no predicted members score a
    /// precision of zero.
    pub fn from_predictions(actual: &[Label], predicted: &[Label]) -> Self {
        let total = actual.len().min(predicted.len());
        let actual = &actual[..total];
        let predicted = &predicted[..total];

        let correct = actual
            .iter()
            .zip(predicted)
            .filter(|(truth, guess)| truth == guess)
            .count();

        let rejected = class_metrics(actual, predicted, Label::Rejected);
        let approved = class_metrics(actual, predicted, Label::Approved);

        let macro_avg = ClassMetrics {
            precision: (rejected.precision + approved.precision) / 2.0,
            recall: (rejected.recall + approved.recall) / 2.0,
            f1: (rejected.f1 + approved.f1) / 2.0,
            support: total,
        };

        let weight = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                (metric(&rejected) * rejected.support as f64
                    + metric(&approved) * approved.support as f64)
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: total,
        };

        Self {
            accuracy: ratio(correct, total),
            rejected,
            approved,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn support(&self) -> usize {
        self.macro_avg.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, metrics) in [("0", &self.rejected), ("1", &self.approved)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        for (name, metrics) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Approved as A, Rejected as R};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn computes_per_class_and_averages() {
        let actual = [A, A, A, R, R];
        let predicted = [A, A, R, R, A];
        let report = ClassificationReport::from_predictions(&actual, &predicted);

        assert!(close(report.accuracy, 0.6));
        assert!(close(report.approved.precision, 2.0 / 3.0));
        assert!(close(report.approved.recall, 2.0 / 3.0));
        assert_eq!(report.approved.support, 3);
        assert!(close(report.rejected.precision, 0.5));
        assert!(close(report.rejected.recall, 0.5));
        assert!(close(report.rejected.f1, 0.5));
        assert!(close(report.macro_avg.recall, (2.0 / 3.0 + 0.5) / 2.0));
        assert!(close(
            report.weighted_avg.recall,
            (2.0 / 3.0 * 3.0 + 0.5 * 2.0) / 5.0
        ));
        assert_eq!(report.support(), 5);
    }

    #[test]
    fn missing_predictions_zero_out_precision() {
        let report = ClassificationReport::from_predictions(&[A, R], &[R, R]);
        assert_eq!(report.approved.precision, 0.0);
        assert_eq!(report.approved.f1, 0.0);
        assert!(close(report.rejected.precision, 0.5));
    }

    #[test]
    fn empty_inputs_do_not_divide_by_zero() {
        let report = ClassificationReport::from_predictions(&[], &[]);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.weighted_avg.f1, 0.0);
    }

    #[test]
    fn renders_table() {
        let report = ClassificationReport::from_predictions(&[A, R], &[A, R]);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.00"));
    }
}
