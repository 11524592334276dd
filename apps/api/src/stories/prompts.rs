// Prompt templates for art story generation.

pub const STORY_SYSTEM_ROLE: &str = "You are a cultural writer for a marketplace that \
    supports traditional artisans. You write vivid, accurate, accessible long-form \
    stories about craft traditions.";

/// Replace: {art_form}, {region_line}, {audience}, {respect_instruction}
pub const STORY_PROMPT_TEMPLATE: &str = r#"Write an art story about the traditional art form "{art_form}".
{region_line}
Audience: {audience}

{respect_instruction}

Return a JSON object with this EXACT schema:
{
  "title": "An evocative title, at most 12 words",
  "summary": "Two or three sentences introducing the art form",
  "sections": [
    {"heading": "Origins", "body": "Two to four paragraphs"},
    {"heading": "Materials and Technique", "body": "..."},
    {"heading": "Symbols and Meaning", "body": "..."},
    {"heading": "The Artisans Today", "body": "..."}
  ],
  "key_facts": ["Short factual statements, at most 6"]
}

RULES:
1. Between 3 and 6 sections, each body plain prose without markdown
2. key_facts must be general knowledge about the art form, never invented figures
3. Return ONLY the JSON object"#;

pub const DEFAULT_AUDIENCE: &str = "curious buyers and supporters with no prior knowledge";
