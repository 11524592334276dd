//! Art story composition: prompt → text model → validated draft, or a canned story.
//!
//! `compose_story` never fails. Any generation problem (disabled backend, transport
//! error, unparseable or empty reply) ends in `fallback_story` with
//! `source = fallback`, so the endpoint always has something to persist.

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::prompts::{json_system, CULTURAL_RESPECT_INSTRUCTION};
use crate::llm_client::{clean_ai_text, generate_json, LlmError, TextGenerator};
use crate::models::art_story::{ContentSource, StorySection};
use crate::stories::fallback::fallback_story;
use crate::stories::prompts::{DEFAULT_AUDIENCE, STORY_PROMPT_TEMPLATE, STORY_SYSTEM_ROLE};

/// Extra attempts when the reply parses but fails validation, or does not parse.
const MAX_STORY_RETRIES: u32 = 1;
const MAX_SECTIONS: usize = 6;
const MAX_KEY_FACTS: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub art_form: String,
    pub region: Option<String>,
    pub audience: Option<String>,
}

/// The model's reply, before cleaning.
#[derive(Debug, Deserialize)]
struct StoryDraft {
    title: String,
    summary: String,
    sections: Vec<StorySection>,
    #[serde(default)]
    key_facts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedStory {
    pub title: String,
    pub summary: String,
    pub sections: Vec<StorySection>,
    pub key_facts: Vec<String>,
    pub source: ContentSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

pub async fn compose_story(generator: &dyn TextGenerator, request: &StoryRequest) -> GeneratedStory {
    let prompt = build_story_prompt(request);
    let system = json_system(STORY_SYSTEM_ROLE);

    for attempt in 0..=MAX_STORY_RETRIES {
        match generate_json::<StoryDraft>(generator, &prompt, &system).await {
            Ok(draft) => {
                if let Some(story) = finalize_draft(draft) {
                    info!(
                        "Generated story for {:?} via {} ({} sections)",
                        request.art_form,
                        generator.backend(),
                        story.sections.len()
                    );
                    return story;
                }
                warn!(
                    "Story attempt {}/{}: reply had no usable title or sections",
                    attempt + 1,
                    MAX_STORY_RETRIES + 1
                );
            }
            Err(LlmError::Disabled) => {
                info!("Text generation disabled, serving fallback story");
                break;
            }
            Err(LlmError::Parse(e)) => {
                warn!(
                    "Story attempt {}/{}: reply was not valid JSON: {e}",
                    attempt + 1,
                    MAX_STORY_RETRIES + 1
                );
            }
            Err(e) => {
                // The client already retried transport-level failures.
                warn!("Story generation via {} failed: {e}", generator.backend());
                break;
            }
        }
    }

    fallback_story(&request.art_form, request.region.as_deref())
}

fn build_story_prompt(request: &StoryRequest) -> String {
    let region_line = match &request.region {
        Some(region) => format!("Focus on the tradition as practised in {region}."),
        None => "Cover the tradition in its main regions of practice.".to_string(),
    };
    STORY_PROMPT_TEMPLATE
        .replace("{art_form}", &request.art_form)
        .replace("{region_line}", &region_line)
        .replace(
            "{audience}",
            request.audience.as_deref().unwrap_or(DEFAULT_AUDIENCE),
        )
        .replace("{respect_instruction}", CULTURAL_RESPECT_INSTRUCTION)
}

/// Cleans every text field and drops empty sections and facts.
/// `None` when nothing worth showing is left.
fn finalize_draft(draft: StoryDraft) -> Option<GeneratedStory> {
    let title = clean_ai_text(&draft.title);
    if title.is_empty() {
        return None;
    }

    let sections: Vec<StorySection> = draft
        .sections
        .into_iter()
        .filter_map(|s| {
            let heading = clean_ai_text(&s.heading);
            let body = clean_ai_text(&s.body);
            (!body.is_empty()).then_some(StorySection { heading, body })
        })
        .take(MAX_SECTIONS)
        .collect();
    if sections.is_empty() {
        return None;
    }

    let key_facts = draft
        .key_facts
        .iter()
        .map(|f| clean_ai_text(f))
        .filter(|f| !f.is_empty())
        .take(MAX_KEY_FACTS)
        .collect();

    Some(GeneratedStory {
        title,
        summary: clean_ai_text(&draft.summary),
        sections,
        key_facts,
        source: ContentSource::Llm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::StubGenerator;
    use crate::llm_client::DisabledGenerator;

    fn request() -> StoryRequest {
        StoryRequest {
            art_form: "Kalamkari".to_string(),
            region: Some("Srikalahasti".to_string()),
            audience: None,
        }
    }

    const GOOD_REPLY: &str = r###"{
        "title": "**Pen and Dye**",
        "summary": "A textile tradition drawn by hand.",
        "sections": [
            {"heading": "## Origins", "body": "Temple cloths came first."},
            {"heading": "Empty", "body": "   "}
        ],
        "key_facts": ["Natural dyes are used", ""]
    }"###;

    #[test]
    fn test_prompt_fills_every_placeholder() {
        let prompt = build_story_prompt(&request());
        assert!(prompt.contains("\"Kalamkari\""));
        assert!(prompt.contains("as practised in Srikalahasti"));
        assert!(prompt.contains(DEFAULT_AUDIENCE));
        assert!(prompt.contains(CULTURAL_RESPECT_INSTRUCTION));
        assert!(!prompt.contains("{art_form}"));
        assert!(!prompt.contains("{region_line}"));
    }

    #[tokio::test]
    async fn test_good_reply_is_cleaned_and_marked_llm() {
        let stub = StubGenerator::replying(GOOD_REPLY);
        let story = compose_story(&stub, &request()).await;

        assert_eq!(story.source, ContentSource::Llm);
        assert_eq!(story.title, "Pen and Dye");
        assert_eq!(story.sections.len(), 1);
        assert_eq!(story.sections[0].heading, "Origins");
        assert_eq!(story.key_facts, vec!["Natural dyes are used".to_string()]);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let fenced = format!("```json\n{GOOD_REPLY}\n```");
        let stub = StubGenerator::replying(&fenced);
        let story = compose_story(&stub, &request()).await;
        assert_eq!(story.source, ContentSource::Llm);
    }

    #[tokio::test]
    async fn test_garbage_reply_retries_then_falls_back() {
        let stub = StubGenerator::replying("I'm sorry, I can't help with that.");
        let story = compose_story(&stub, &request()).await;

        assert_eq!(story.source, ContentSource::Fallback);
        assert!(story.title.contains("Kalamkari"));
        assert_eq!(stub.call_count(), (MAX_STORY_RETRIES + 1) as usize);
    }

    #[tokio::test]
    async fn test_reply_without_sections_falls_back() {
        let stub = StubGenerator::replying(
            r#"{"title": "Untold", "summary": "", "sections": [], "key_facts": []}"#,
        );
        let story = compose_story(&stub, &request()).await;
        assert_eq!(story.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_without_retry() {
        let stub = StubGenerator::failing();
        let story = compose_story(&stub, &request()).await;
        assert_eq!(story.source, ContentSource::Fallback);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_backend_serves_fallback() {
        let story = compose_story(&DisabledGenerator, &request()).await;
        assert_eq!(story.source, ContentSource::Fallback);
        assert!(!story.sections.is_empty());
    }
}
