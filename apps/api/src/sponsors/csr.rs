//! CSR sponsor approach guidance.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::donations::summary::format_amount;
use crate::llm_client::prompts::{json_system, CULTURAL_RESPECT_INSTRUCTION};
use crate::llm_client::{clean_ai_text, generate_json, LlmError, TextGenerator};
use crate::models::art_story::ContentSource;
use crate::sponsors::prompts::{CSR_PROMPT_TEMPLATE, CSR_SYSTEM_ROLE};

const MAX_LIST_ITEMS: usize = 8;

#[derive(Debug, Clone)]
pub struct CsrRequest {
    pub focus_area: String,
    pub region: Option<String>,
    pub organisation: String,
    pub funding_need_minor: Option<i64>,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
struct CsrDraft {
    summary: String,
    #[serde(default)]
    target_sectors: Vec<String>,
    #[serde(default)]
    pitch_points: Vec<String>,
    #[serde(default)]
    outreach_steps: Vec<String>,
    #[serde(default)]
    email_template: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CsrGuidance {
    pub summary: String,
    pub target_sectors: Vec<String>,
    pub pitch_points: Vec<String>,
    pub outreach_steps: Vec<String>,
    pub email_template: String,
    pub source: ContentSource,
}

impl CsrRequest {
    fn funding_line(&self) -> Option<String> {
        self.funding_need_minor
            .map(|amount| format_amount(amount, &self.currency))
    }

    fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or("the communities we serve")
    }
}

pub async fn compose_guidance(generator: &dyn TextGenerator, request: &CsrRequest) -> CsrGuidance {
    let prompt = build_csr_prompt(request);
    let system = json_system(CSR_SYSTEM_ROLE);

    match generate_json::<CsrDraft>(generator, &prompt, &system).await {
        Ok(draft) => match finalize_draft(draft) {
            Some(guidance) => {
                info!(
                    "Generated CSR guidance for {:?} via {}",
                    request.focus_area,
                    generator.backend()
                );
                return guidance;
            }
            None => warn!("CSR reply was missing a summary or outreach steps"),
        },
        Err(LlmError::Disabled) => info!("Text generation disabled, serving static CSR guidance"),
        Err(e) => warn!("CSR guidance via {} failed: {e}", generator.backend()),
    }

    fallback_guidance(request)
}

fn build_csr_prompt(request: &CsrRequest) -> String {
    CSR_PROMPT_TEMPLATE
        .replace("{organisation}", &request.organisation)
        .replace("{focus_area}", &request.focus_area)
        .replace("{region}", request.region.as_deref().unwrap_or("not specified"))
        .replace(
            "{funding_need}",
            &request
                .funding_line()
                .unwrap_or_else(|| "not specified".to_string()),
        )
        .replace("{respect_instruction}", CULTURAL_RESPECT_INSTRUCTION)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .map(|item| clean_ai_text(item))
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

fn finalize_draft(draft: CsrDraft) -> Option<CsrGuidance> {
    let summary = clean_ai_text(&draft.summary);
    let outreach_steps = clean_list(draft.outreach_steps);
    if summary.is_empty() || outreach_steps.is_empty() {
        return None;
    }
    Some(CsrGuidance {
        summary,
        target_sectors: clean_list(draft.target_sectors),
        pitch_points: clean_list(draft.pitch_points),
        outreach_steps,
        email_template: draft.email_template.trim().to_string(),
        source: ContentSource::Llm,
    })
}

/// Static guidance, filled in with the request's focus area, region and ask.
pub fn fallback_guidance(request: &CsrRequest) -> CsrGuidance {
    let focus = &request.focus_area;
    let region = request.region_or_default();
    let ask = request.funding_line();

    let mut pitch_points = vec![
        format!("Explain how support for {focus} preserves a living craft tradition in {region}."),
        "Show livelihood outcomes: artisans reached, income earned, skills passed on.".to_string(),
        "Offer visibility the company can use: stories, product collaborations, employee visits."
            .to_string(),
        "Commit to simple, regular reporting on how funds are used.".to_string(),
    ];
    if let Some(ask) = &ask {
        pitch_points.insert(
            1,
            format!("Make a clear ask of {ask}, broken down by activity and timeline."),
        );
    }

    let ask_sentence = ask
        .as_ref()
        .map(|a| format!(" We are seeking {a} to take this work further."))
        .unwrap_or_default();

    CsrGuidance {
        summary: format!(
            "Position {focus} in {region} as heritage preservation and livelihood work. CSR \
             funders respond to clear outcomes, a credible implementing partner and simple \
             reporting, so lead with the artisans you support and what funding will change."
        ),
        target_sectors: vec![
            "Textiles, apparel and retail".to_string(),
            "Banking and financial services".to_string(),
            "Information technology".to_string(),
            "Consumer goods".to_string(),
            "Hospitality and tourism".to_string(),
        ],
        pitch_points,
        outreach_steps: vec![
            format!("List companies with offices or operations in {region}."),
            "Read their published CSR policies and annual CSR reports for heritage, culture or livelihood themes.".to_string(),
            "Find the CSR head or foundation lead and request a short introductory call.".to_string(),
            "Send a two-page concept note with budget, outcomes and reporting plan.".to_string(),
            "Invite the team to meet artisans or see work in progress.".to_string(),
            "Follow up within two weeks and share a progress update after any grant.".to_string(),
        ],
        email_template: format!(
            "Subject: Partnering on {focus} in {region}\n\n\
             Dear [Contact Name],\n\n\
             I am writing from {org} about our work with artisans practising {focus} in {region}. \
             Your CSR commitments to heritage and livelihoods align closely with what we do.{ask_sentence}\n\n\
             Could we schedule a short call to share our plans and outcomes with [Company]?\n\n\
             Warm regards,\n{org}",
            org = request.organisation,
        ),
        source: ContentSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::StubGenerator;

    fn request(funding: Option<i64>) -> CsrRequest {
        CsrRequest {
            focus_area: "Chikankari embroidery".to_string(),
            region: Some("Lucknow".to_string()),
            organisation: "Sanatkada Trust".to_string(),
            funding_need_minor: funding,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_fallback_is_parameterised() {
        let guidance = fallback_guidance(&request(Some(50_000_000)));
        assert_eq!(guidance.source, ContentSource::Fallback);
        assert!(guidance.summary.contains("Chikankari embroidery in Lucknow"));
        assert!(guidance.pitch_points[1].contains("INR 500,000.00"));
        assert!(guidance.email_template.contains("Sanatkada Trust"));
        assert!(guidance.email_template.contains("We are seeking INR 500,000.00"));
    }

    #[test]
    fn test_fallback_without_region_or_ask() {
        let mut req = request(None);
        req.region = None;
        let guidance = fallback_guidance(&req);
        assert!(guidance.summary.contains("the communities we serve"));
        assert_eq!(guidance.pitch_points.len(), 4);
        assert!(!guidance.email_template.contains("seeking"));
    }

    #[test]
    fn test_prompt_mentions_request_details() {
        let prompt = build_csr_prompt(&request(Some(100_000)));
        assert!(prompt.contains("Organisation: Sanatkada Trust"));
        assert!(prompt.contains("Funding need: INR 1,000.00"));
        assert!(!prompt.contains("{focus_area}"));
    }

    #[tokio::test]
    async fn test_model_guidance_is_cleaned() {
        let stub = StubGenerator::replying(
            r#"{
                "summary": "**Lead** with heritage.",
                "target_sectors": ["Retail", " "],
                "pitch_points": ["Livelihoods"],
                "outreach_steps": ["* Research funders", "Send a note"],
                "email_template": "Dear [Contact Name],"
            }"#,
        );
        let guidance = compose_guidance(&stub, &request(None)).await;
        assert_eq!(guidance.source, ContentSource::Llm);
        assert_eq!(guidance.summary, "Lead with heritage.");
        assert_eq!(guidance.target_sectors, vec!["Retail".to_string()]);
        assert_eq!(guidance.outreach_steps[0], "- Research funders");
    }

    #[tokio::test]
    async fn test_reply_without_steps_falls_back() {
        let stub = StubGenerator::replying(r#"{"summary": "Something", "outreach_steps": []}"#);
        let guidance = compose_guidance(&stub, &request(None)).await;
        assert_eq!(guidance.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn test_failed_backend_falls_back() {
        let guidance = compose_guidance(&StubGenerator::failing(), &request(None)).await;
        assert_eq!(guidance.source, ContentSource::Fallback);
        assert!(!guidance.outreach_steps.is_empty());
    }
}
