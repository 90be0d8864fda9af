//! Prompt text sent to the generator.

use std::fmt::Write;

use roadmap_core::types::TopicEntry;

/// Renders topics as readable blocks for the generator's context window.
pub fn format_topics_for_context(topics: &[TopicEntry]) -> String {
    let mut out = String::new();
    for (i, t) in topics.iter().enumerate() {
        let prereqs = if t.prerequisites.is_empty() { "None".to_string() } else { t.prerequisites.join(", ") };
        let _ = write!(
            out,
            "\n---\nTopic {}: {}\nDomain: {}\nDifficulty: {} ({} hours estimated)\nPrerequisites: {}\nDescription: {}\n\nResources:",
            i + 1,
            t.topic,
            t.domain,
            t.difficulty,
            t.hours(),
            prereqs,
            t.description
        );
        for r in &t.resources {
            let _ = write!(out, "\n  - [{}] {}: {}", capitalize(&r.kind), r.title, r.url);
        }
        if i + 1 < topics.len() {
            out.push('\n');
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => "Link".to_string(),
    }
}

pub fn summary_prompt(query: &str, topics: &[TopicEntry]) -> String {
    format!(
        r#"You are an expert learning advisor. Based on these topics, write a brief, motivating overview (2-3 paragraphs) for a student learning: "{query}"

AVAILABLE TOPICS:
{context}

Write a personalized introduction that:
1. Acknowledges their goal
2. Explains the learning progression
3. Provides encouragement and strategy tips
4. Mentions total time commitment

Keep it concise, actionable, and motivating."#,
        context = format_topics_for_context(topics)
    )
}

const URL_RULES: &str = r#"CRITICAL: URL GENERATION RULES (MUST FOLLOW STRICTLY)

You MUST generate ONLY valid, working, fully qualified URLs.

RULE 1 - NO HALLUCINATED LINKS:
Only use real, well-known domains: youtube.com, google.com, github.com,
developer.mozilla.org, docs.python.org, docs.oracle.com, wikipedia.org,
geeksforgeeks.org, w3schools.com, freecodecamp.org, leetcode.com,
hackerrank.com, or official documentation websites.

RULE 2 - USE SEARCH FALLBACKS WHEN UNCERTAIN:
If you are not certain a specific page exists, use these formats:
YouTube: https://www.youtube.com/results?search_query=<topic+name+tutorial>
Google: https://www.google.com/search?q=<topic+name+tutorial>
GeeksforGeeks: https://www.geeksforgeeks.org/<topic-name-hyphenated>/

RULE 3 - URL FORMAT REQUIREMENTS:
Every URL must use the https:// prefix, a full domain name and a complete
path. No placeholders like "..." or "<insert>". No embed links.

RULE 4 - NEVER OUTPUT:
Dead links, made-up video ids, placeholder text in URLs, experimental
domains or embed links."#;

pub fn knowledge_only_prompt(query: &str, domain: Option<&str>, num_topics: usize) -> String {
    format!(
        r#"You are an expert learning advisor. A student wants to learn: "{query}"

Your database doesn't have specific resources for this topic, so create a comprehensive learning roadmap from your own knowledge.

TASK:
Create a detailed, structured learning roadmap with {num_topics} topics organized into learning phases.

REQUIREMENTS:
1. Break the learning path into 2-4 phases (Fundamentals -> Intermediate -> Advanced)
2. Each phase should have 2-5 topics
3. For EACH topic, provide: a clear topic name, a detailed description, a difficulty level (easy/medium/hard), estimated hours to complete, 3-4 FREE learning resources and prerequisites (if any)
4. Resources MUST include at least 1 video tutorial, at least 1 article or documentation link and at least 1 hands-on practice resource where applicable
5. Total topics: {num_topics}
6. Domain context: {domain}

{rules}

FORMAT YOUR RESPONSE AS VALID JSON:
{{
  "title": "Learning Path: [Topic Name]",
  "description": "Brief overview of the roadmap",
  "total_hours": <sum of all estimated hours>,
  "ai_summary": "Motivating 2-3 paragraph overview explaining the learning path, progression, and tips",
  "phases": [
    {{
      "phase_number": 1,
      "phase_name": "Fundamentals",
      "description": "Phase description",
      "total_hours": <sum>,
      "topics": [
        {{
          "id": "topic_01",
          "topic": "Topic Name",
          "description": "What you'll learn and why it matters, in 3-4 sentences.",
          "difficulty": "easy",
          "estimated_hours": 5,
          "prerequisites": [],
          "resources": [
            {{"title": "Resource Title", "type": "video", "url": "https://www.youtube.com/results?search_query=topic+name+tutorial"}},
            {{"title": "Resource Title", "type": "article", "url": "https://www.geeksforgeeks.org/topic-name/"}},
            {{"title": "Resource Title", "type": "practice", "url": "https://leetcode.com/tag/topic-name/"}}
          ],
          "order": 1
        }}
      ]
    }}
  ]
}}

IMPORTANT:
- Return ONLY valid JSON, no markdown formatting
- ALL URLs must follow the rules above
- Ensure logical progression from basics to advanced
- Total topics should be around {num_topics}

Generate the complete roadmap now:"#,
        domain = domain.unwrap_or("general"),
        rules = URL_RULES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_core::types::{Difficulty, Resource};

    fn topic() -> TopicEntry {
        TopicEntry {
            id: "dsa_01".into(),
            topic: "Arrays".into(),
            domain: "dsa".into(),
            subdomain: "basics".into(),
            difficulty: Difficulty::Easy,
            estimated_hours: None,
            description: "Contiguous storage".into(),
            prerequisites: vec![],
            resources: vec![Resource { title: "Arrays Tutorial".into(), kind: "video".into(), url: "https://youtu.be/x".into() }],
        }
    }

    #[test]
    fn context_block_lists_fields_and_resources() {
        let ctx = format_topics_for_context(&[topic()]);
        assert!(ctx.contains("Topic 1: Arrays"));
        assert!(ctx.contains("Difficulty: easy (3 hours estimated)"));
        assert!(ctx.contains("Prerequisites: None"));
        assert!(ctx.contains("  - [Video] Arrays Tutorial: https://youtu.be/x"));
    }

    #[test]
    fn knowledge_prompt_names_query_domain_and_count() {
        let p = knowledge_only_prompt("rust lifetimes", None, 7);
        assert!(p.contains("\"rust lifetimes\""));
        assert!(p.contains("Domain context: general"));
        assert!(p.contains("Total topics: 7"));
        assert!(p.contains("search_query="));
    }
}
