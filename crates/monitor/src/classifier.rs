use std::fmt;

use common::models::{DividendObservation, DividendRecord};
use rust_decimal::Decimal;

/// 20%: changes at or above this fraction are significant.
pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
    /// Same amount under a new effective date.
    Unchanged,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increased => write!(f, "increased"),
            Self::Decreased => write!(f, "decreased"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Outcome of comparing a fresh observation against the stored record.
/// Percentages are absolute, e.g. `25` for a 25% move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeVerdict {
    NoChange,
    FirstObservation,
    ModerateChange(Direction, Decimal),
    SignificantChange(Direction, Decimal),
}

impl ChangeVerdict {
    pub fn is_alert_worthy(&self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "No change",
            Self::FirstObservation => "First dividend recorded",
            Self::ModerateChange(..) => "Moderate change",
            Self::SignificantChange(..) => "Significant change",
        }
    }

    /// One-line human summary used in alert bodies and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::NoChange | Self::FirstObservation => self.label().to_string(),
            Self::ModerateChange(direction, percent) | Self::SignificantChange(direction, percent) => {
                match direction {
                    Direction::Unchanged => format!("{}: amount unchanged", self.label()),
                    _ => format!(
                        "{}: {} by {:.1}%",
                        self.label(),
                        direction,
                        percent.round_dp(1)
                    ),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeClassifier {
    threshold: Decimal,
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ChangeClassifier {
    /// `threshold` is a fraction: `0.2` flags moves of 20% or more.
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// A new event is recognised by a different effective date; an equal date
    /// means nothing new happened even if the provider revised the amount.
    pub fn classify(
        &self,
        previous: Option<&DividendRecord>,
        current: &DividendObservation,
    ) -> ChangeVerdict {
        if !current.has_dividend() {
            return ChangeVerdict::NoChange;
        }

        let Some(previous) = previous else {
            return ChangeVerdict::FirstObservation;
        };

        if previous.effective_date() == Some(current.effective_date()) {
            return ChangeVerdict::NoChange;
        }

        if previous.amount().is_zero() {
            return ChangeVerdict::FirstObservation;
        }

        let change = (current.amount() - previous.amount()) / previous.amount();
        let percent = change.abs() * Decimal::ONE_HUNDRED;

        let direction = if change.is_zero() {
            Direction::Unchanged
        } else if change.is_sign_positive() {
            Direction::Increased
        } else {
            Direction::Decreased
        };

        if percent >= self.threshold * Decimal::ONE_HUNDRED {
            ChangeVerdict::SignificantChange(direction, percent)
        } else {
            ChangeVerdict::ModerateChange(direction, percent)
        }
    }
}
