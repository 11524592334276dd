// Shared prompt fragments. Each feature module keeps its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that writes about living craft traditions.
pub const CULTURAL_RESPECT_INSTRUCTION: &str = "\
    Write respectfully about living craft communities. \
    Do NOT invent named individuals, dates, statistics, or awards. \
    When a detail is uncertain, describe it in general terms rather than guessing. \
    Prefer the names artisans themselves use for techniques and tools.";

/// Builds a system prompt from a role description plus the JSON-only rule.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_system_appends_json_rule() {
        let system = json_system("You are a CSR advisor.");
        assert!(system.starts_with("You are a CSR advisor."));
        assert!(system.ends_with(JSON_ONLY_SYSTEM));
    }
}
