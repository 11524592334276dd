//! NGO impact reports built from platform metrics.
//!
//! Metrics are computed from the database and always returned as-is; the model
//! only writes prose around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::donations::summary::{describe_totals, format_amount, CurrencyTotal, DonationSummary};
use crate::llm_client::prompts::{json_system, CULTURAL_RESPECT_INSTRUCTION};
use crate::llm_client::{clean_ai_text, generate_json, LlmError, TextGenerator};
use crate::models::art_story::ContentSource;
use crate::sponsors::prompts::{IMPACT_PROMPT_TEMPLATE, IMPACT_SYSTEM_ROLE};

const MAX_LIST_ITEMS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ImpactMetrics {
    pub donation_count: usize,
    pub distinct_donors: usize,
    pub totals: Vec<CurrencyTotal>,
    pub accepted_connections: i64,
    pub latest_donation_at: Option<DateTime<Utc>>,
}

impl ImpactMetrics {
    pub fn new(summary: DonationSummary, accepted_connections: i64) -> Self {
        ImpactMetrics {
            donation_count: summary.donation_count,
            distinct_donors: summary.distinct_donors,
            totals: summary.totals,
            accepted_connections,
            latest_donation_at: summary.latest_donation_at,
        }
    }

    /// Plain-text bullet list for the prompt.
    fn describe(&self) -> String {
        let latest = self
            .latest_donation_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "- Donations received: {}\n- Distinct donors: {}\n- Total received: {}\n\
             - Artisans connected: {}\n- Most recent donation: {latest}",
            self.donation_count,
            self.distinct_donors,
            describe_totals(&self.totals),
            self.accepted_connections,
        )
    }
}

#[derive(Debug, Deserialize)]
struct ImpactDraft {
    headline: String,
    narrative: String,
    #[serde(default)]
    highlights: Vec<String>,
    #[serde(default)]
    next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub headline: String,
    pub narrative: String,
    pub highlights: Vec<String>,
    pub next_steps: Vec<String>,
    pub metrics: ImpactMetrics,
    pub source: ContentSource,
}

pub async fn compose_report(
    generator: &dyn TextGenerator,
    organisation: &str,
    metrics: ImpactMetrics,
) -> ImpactReport {
    let prompt = IMPACT_PROMPT_TEMPLATE
        .replace("{organisation}", organisation)
        .replace("{metrics}", &metrics.describe())
        .replace("{respect_instruction}", CULTURAL_RESPECT_INSTRUCTION);
    let system = json_system(IMPACT_SYSTEM_ROLE);

    match generate_json::<ImpactDraft>(generator, &prompt, &system).await {
        Ok(draft) => {
            let headline = clean_ai_text(&draft.headline);
            let narrative = clean_ai_text(&draft.narrative);
            if !headline.is_empty() && !narrative.is_empty() {
                info!("Generated impact report for {organisation} via {}", generator.backend());
                return ImpactReport {
                    headline,
                    narrative,
                    highlights: clean_list(&draft.highlights),
                    next_steps: clean_list(&draft.next_steps),
                    metrics,
                    source: ContentSource::Llm,
                };
            }
            warn!("Impact report reply had an empty headline or narrative");
        }
        Err(LlmError::Disabled) => info!("Text generation disabled, serving metric-based report"),
        Err(e) => warn!("Impact report via {} failed: {e}", generator.backend()),
    }

    fallback_report(organisation, metrics)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| clean_ai_text(item))
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Report written directly from the metrics.
pub fn fallback_report(organisation: &str, metrics: ImpactMetrics) -> ImpactReport {
    let artisans = plural(
        usize::try_from(metrics.accepted_connections).unwrap_or(0),
        "artisan",
        "artisans",
    );

    let (headline, narrative) = if metrics.donation_count == 0 {
        (
            format!("{organisation} is building its supporter base"),
            format!(
                "{organisation} has not yet received donations through CraftConnect and is \
                 currently connected with {artisans}.\n\nSharing artisan stories and \
                 products with supporters is the quickest way to receive a first donation."
            ),
        )
    } else {
        (
            format!(
                "{organisation} has received {} from {}",
                describe_totals(&metrics.totals),
                plural(metrics.distinct_donors, "supporter", "supporters"),
            ),
            format!(
                "Through CraftConnect, {organisation} has received {} totalling {} and works \
                 with {artisans} through accepted connections.\n\nThese funds support \
                 artisans to keep practising their crafts and reach new buyers.",
                plural(metrics.donation_count, "donation", "donations"),
                describe_totals(&metrics.totals),
            ),
        )
    };

    let mut highlights = vec![
        format!("{} received", plural(metrics.donation_count, "donation", "donations")),
        format!("{artisans} connected"),
    ];
    for total in &metrics.totals {
        highlights.push(format!(
            "{} raised",
            format_amount(total.total_minor, &total.currency)
        ));
    }

    let mut next_steps = vec![
        "Share an update with donors on what their support made possible.".to_string(),
        "Publish artisan stories and products to reach new supporters.".to_string(),
    ];
    if metrics.accepted_connections == 0 {
        next_steps.insert(0, "Connect with artisans on the platform to start partnerships.".to_string());
    }

    ImpactReport {
        headline,
        narrative,
        highlights,
        next_steps,
        metrics,
        source: ContentSource::Fallback,
    }
}
