use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::donation::DonationRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total_minor: i64,
    pub donation_count: usize,
}

/// Public aggregate of everything a recipient has received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationSummary {
    /// One entry per currency, sorted by currency code.
    pub totals: Vec<CurrencyTotal>,
    pub donation_count: usize,
    /// Anonymous donations still count towards distinct donors.
    pub distinct_donors: usize,
    pub latest_donation_at: Option<DateTime<Utc>>,
}

pub fn summarize(donations: &[DonationRow]) -> DonationSummary {
    let mut per_currency: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    let mut donors = HashSet::new();
    let mut latest: Option<DateTime<Utc>> = None;

    for donation in donations {
        let slot = per_currency.entry(donation.currency.as_str()).or_default();
        slot.0 = slot.0.saturating_add(donation.amount_minor);
        slot.1 += 1;
        donors.insert(donation.donor_id);
        latest = latest.max(Some(donation.created_at));
    }

    DonationSummary {
        totals: per_currency
            .into_iter()
            .map(|(currency, (total_minor, donation_count))| CurrencyTotal {
                currency: currency.to_string(),
                total_minor,
                donation_count,
            })
            .collect(),
        donation_count: donations.len(),
        distinct_donors: donors.len(),
        latest_donation_at: latest,
    }
}

/// ISO 4217 currencies whose minor unit is not the usual hundredth.
const ZERO_DECIMAL: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];
const THREE_DECIMAL: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// Number of decimal places in `currency`'s minor unit.
pub fn minor_unit_exponent(currency: &str) -> u32 {
    if ZERO_DECIMAL.contains(&currency) {
        0
    } else if THREE_DECIMAL.contains(&currency) {
        3
    } else {
        2
    }
}

/// Renders a minor-unit amount as `INR 1,250.00` or `JPY 5,000`.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    let exponent = minor_unit_exponent(currency);
    let scale = 10i64.pow(exponent);
    let major = (amount_minor / scale).unsigned_abs().to_string();
    let fraction = (amount_minor % scale).unsigned_abs();

    let mut grouped = String::with_capacity(major.len() + major.len() / 3);
    for (i, digit) in major.chars().enumerate() {
        if i > 0 && (major.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount_minor < 0 { "-" } else { "" };
    match exponent {
        0 => format!("{currency} {sign}{grouped}"),
        places => format!(
            "{currency} {sign}{grouped}.{fraction:0width$}",
            width = places as usize
        ),
    }
}

/// `INR 750.00 and USD 15.00`, or `nothing yet` when there are no totals.
pub fn describe_totals(totals: &[CurrencyTotal]) -> String {
    let parts: Vec<String> = totals
        .iter()
        .map(|t| format_amount(t.total_minor, &t.currency))
        .collect();
    match parts.len() {
        0 => "nothing yet".to_string(),
        1 => parts[0].clone(),
        n => format!("{} and {}", parts[..n - 1].join(", "), parts[n - 1]),
    }
}
