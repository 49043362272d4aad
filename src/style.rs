//! Visual encoding of accounts and transactions for the rendering surface.
//!
//! Only values are decided here; drawing belongs to the renderer.

use crate::graph::model::{Account, Transaction};
use crate::types::risk::RiskTier;
use serde::Serialize;

/// Amounts strictly above this get the highlighted edge colour.
pub const EDGE_HIGHLIGHT_AMOUNT: f64 = 10_000.0;

const EDGE_COLOR_HIGHLIGHT: &str = "rgba(245, 158, 11, 0.4)";
const EDGE_COLOR_DEFAULT: &str = "rgba(255, 255, 255, 0.1)";

impl RiskTier {
    /// Node fill colour.
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Critical => "#DC2626",
            RiskTier::Suspicious => "#F59E0B",
            RiskTier::Neutral => "#00A86B",
        }
    }

    pub fn legend_label(&self) -> &'static str {
        match self {
            RiskTier::Critical => "Critical (>80)",
            RiskTier::Suspicious => "Suspicious (50-80)",
            RiskTier::Neutral => "Neutral (<50)",
        }
    }
}

/// Legend entries, highest tier first.
pub fn legend() -> [RiskTier; 3] {
    [RiskTier::Critical, RiskTier::Suspicious, RiskTier::Neutral]
}

/// Edge stroke width. A zero (or missing) amount draws at width 1.
pub fn edge_width(amount: f64) -> f64 {
    if amount == 0.0 {
        return 1.0;
    }
    (amount.log10() * 0.5).max(0.5)
}

pub fn edge_color(amount: f64) -> &'static str {
    if amount > EDGE_HIGHLIGHT_AMOUNT {
        EDGE_COLOR_HIGHLIGHT
    } else {
        EDGE_COLOR_DEFAULT
    }
}

/// Group an amount en-US style with at most three fraction digits.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = whole == "0" && fraction.is_empty();
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn amount_label(amount: f64) -> String {
    format!("${}", format_amount(amount))
}

/// Hover data for an account node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTooltip {
    pub id: String,
    pub score: f64,
    pub tier: RiskTier,
    pub color: &'static str,
}

impl From<&Account> for NodeTooltip {
    fn from(account: &Account) -> Self {
        let tier = account.tier();
        Self {
            id: account.id.clone(),
            score: account.suspicion_score,
            tier,
            color: tier.color(),
        }
    }
}

/// Render attributes of one transaction edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStyle {
    pub width: f64,
    pub color: &'static str,
    /// Amount label, only when amounts are shown and the amount is non-zero
    pub label: Option<String>,
}

pub fn link_style(link: &Transaction, show_amounts: bool) -> LinkStyle {
    LinkStyle {
        width: edge_width(link.amount),
        color: edge_color(link.amount),
        label: (show_amounts && link.amount != 0.0).then(|| amount_label(link.amount)),
    }
}
