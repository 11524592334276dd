// Prompt templates for the sponsor-facing features.

pub const CSR_SYSTEM_ROLE: &str = "You are a fundraising advisor who helps craft NGOs and \
    artisan collectives approach companies for Corporate Social Responsibility (CSR) funding.";

/// Replace: {focus_area}, {region}, {organisation}, {funding_need}, {respect_instruction}
pub const CSR_PROMPT_TEMPLATE: &str = r#"Prepare CSR sponsor approach guidance.

Organisation: {organisation}
Focus area: {focus_area}
Region: {region}
Funding need: {funding_need}

{respect_instruction}

Return a JSON object with this EXACT schema:
{
  "summary": "Two or three sentences on how to position this work for CSR funders",
  "target_sectors": ["Industry sectors likely to fund this, at most 6"],
  "pitch_points": ["Concrete points for the pitch, at most 6"],
  "outreach_steps": ["Ordered steps to approach a company, at most 8"],
  "email_template": "A short first-contact email with [Company] and [Contact Name] placeholders"
}

RULES:
1. Do not name specific companies or people
2. Do not quote legal thresholds or percentages unless you are certain of them
3. Return ONLY the JSON object"#;

pub const IMPACT_SYSTEM_ROLE: &str = "You are a communications writer for craft NGOs. You \
    turn plain platform metrics into a short, honest impact report for donors and partners.";

/// Replace: {organisation}, {metrics}, {respect_instruction}
pub const IMPACT_PROMPT_TEMPLATE: &str = r#"Write an impact report for {organisation}.

Platform metrics (the ONLY figures you may use):
{metrics}

{respect_instruction}

Return a JSON object with this EXACT schema:
{
  "headline": "One sentence headline",
  "narrative": "Two short paragraphs describing the impact",
  "highlights": ["Short highlights drawn from the metrics, at most 5"],
  "next_steps": ["Suggested next steps for the organisation, at most 5"]
}

RULES:
1. Never invent numbers beyond the metrics above
2. If the metrics are small or zero, say so plainly and focus on next steps
3. Return ONLY the JSON object"#;
