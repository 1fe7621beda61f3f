use common::models::{DATE_FORMAT, DividendObservation, DividendRecord};
use rust_decimal::Decimal;

use crate::classifier::ChangeVerdict;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

pub fn render_alert(
    symbol: &str,
    current: &DividendObservation,
    previous: Option<&DividendRecord>,
    verdict: &ChangeVerdict,
) -> Alert {
    let mut lines = vec![
        format!("Stock: {}", symbol),
        format!(
            "New dividend: {} (on {})",
            money(current.amount()),
            current.effective_date().format(DATE_FORMAT)
        ),
        verdict.describe(),
    ];

    if let Some(previous) = previous.filter(|_| *verdict != ChangeVerdict::FirstObservation) {
        lines.push(format!(
            "Previous: {} (on {})",
            money(previous.amount()),
            previous.date_label()
        ));
    }

    Alert {
        subject: format!("New Dividend: {}", symbol),
        body: lines.join("\n"),
    }
}
