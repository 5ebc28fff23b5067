//! Prompt and response schema for a single extraction step.

use serde_json::{Value, json};

/// Stand-in when the caller supplied no document description.
pub const NO_DESCRIPTION: &str = "No description provided";

pub const SCHEMA_NAME: &str = "topics";

/// JSON schema the model's answer must follow.
///
/// Strict structured output needs every property listed in `required` and
/// `additionalProperties: false` on every object.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "topics": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "snake_case identifier derived from the topic title"
                        },
                        "topic": {
                            "type": "string",
                            "description": "Concise, descriptive topic title"
                        },
                        "contents": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Short summary bullets for this page"
                        },
                        "goal": {
                            "type": "string",
                            "description": "What a reader should take away from this topic"
                        },
                        "importance": {
                            "type": "string",
                            "enum": ["high", "medium", "low"]
                        }
                    },
                    "required": ["id", "topic", "contents", "goal", "importance"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["topics"],
        "additionalProperties": false
    })
}

/// Build the system turn for one chunk.
///
/// `titles` are the topics accumulated so far, offered for reuse.
/// `content_count` is the number of bullets already extracted.
pub fn system_prompt(description: &str, titles: &[&str], content_count: usize) -> String {
    let description = if description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        description.trim()
    };
    let current_topics = if titles.is_empty() {
        "(none yet)".to_string()
    } else {
        titles.join(", ")
    };

    format!(
        r#"### ROLE ###
You analyse the text of a PDF document one chunk at a time and return a structured list of topics.

### GOAL ###
Extract only significant, substantive topics and a short summary of what this chunk says about each.
Keep the number of topics low: fold related content into existing topics wherever possible.
Each call sees a single chunk of the document. The topics collected across all chunks must later fit into a single model call, so stay brief.
{content_count} content items have been extracted so far.

### CONTEXT ###
* Document description: {description}
* Current topics (reuse these): {current_topics}
* The chunk text follows as the user message.

### OUTPUT ###
Return an object with a "topics" array. Each element has:
* "id": snake_case form of the title, e.g. "gradient_descent"
* "topic": the topic title
* "contents": list of short summary bullets
* "goal": one sentence on what the reader should understand, e.g. "Understand the basics of ..."
* "importance": "high", "medium" or "low"

### RULES ###
1. Substance only. A topic is a distinct concept, argument, method or data set explained in the text.
2. Never create topics for:
   * page numbers ("Page 5", "- 5 -")
   * running headers and footers, confidentiality notices
   * table of contents entries, unless the whole chunk is the table of contents
   * reference lists and bibliographies, unless the topic itself is "References"
   * formatting artifacts (stray characters, broken line breaks)
   * isolated tables or images without explanatory prose
   * agenda, learning objectives, index or similar non-content pages
3. Reuse first. If the content continues one of the current topics ({current_topics}), return it under exactly that title, character for character. Only create a new title for new and significant content, and aim for at most one new topic per chunk.
4. Summarise. Each content item is one short, informative bullet. Merge related points into one bullet. Aim for about 3 bullets per topic.
5. Empty chunks. If nothing substantive remains after rule 2, return an empty "topics" array. Do not invent topics.
6. Importance:
   * "high": primary topics, major sections ("Introduction", "Methodology", a chapter), or content central to the document description
   * "medium": standard sub-topics and complete arguments within a larger section
   * "low": minor points, sidebars, detailed examples, tangential material"#
    )
}
