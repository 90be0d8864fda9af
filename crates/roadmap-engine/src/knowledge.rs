//! Parsing and normalising roadmaps written by the generator.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use roadmap_core::types::{
    Difficulty, Phase, Resource, Roadmap, RoadmapMetadata, RoadmapMode, RoadmapSource, RoadmapTopic,
    DEFAULT_ESTIMATED_HOURS,
};

use crate::assembler::template_summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    JsonParseFailed,
    InvalidRoadmapShape,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::JsonParseFailed => "json_parse_failed",
            FallbackReason::InvalidRoadmapShape => "invalid_roadmap_shape",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeOnly {
    Parsed(Roadmap),
    Fallback { reason: FallbackReason, detail: String },
}

#[derive(Debug, Deserialize)]
struct RawRoadmap {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ai_summary: Option<String>,
    #[serde(default)]
    phases: Option<Vec<RawPhase>>,
}

#[derive(Debug, Deserialize)]
struct RawPhase {
    #[serde(default)]
    phase_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topics: Option<Vec<RawTopic>>,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    subdomain: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    estimated_hours: Option<Value>,
    #[serde(default)]
    prerequisites: Option<Vec<String>>,
    #[serde(default)]
    resources: Option<Vec<RawResource>>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Strips markdown fences and any prose around the outermost JSON object.
pub fn strip_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(nl) => &rest[nl + 1..],
            None => rest.trim_start_matches("json"),
        };
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Escapes raw control characters that appear inside JSON string literals.
pub fn escape_control_chars(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

/// Upper bound on the hours a generated topic may claim.
pub const MAX_TOPIC_HOURS: u32 = 1_000;

fn hours_from(value: Option<&Value>) -> u32 {
    let hours = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64),
        _ => None,
    };
    hours.map(|h| h.min(u64::from(MAX_TOPIC_HOURS)) as u32).unwrap_or(DEFAULT_ESTIMATED_HOURS)
}

fn difficulty_from(value: Option<&str>) -> Difficulty {
    match value.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("easy") | Some("beginner") => Difficulty::Easy,
        Some("medium") | Some("intermediate") => Difficulty::Medium,
        Some("hard") | Some("advanced") => Difficulty::Hard,
        _ => Difficulty::Unknown,
    }
}

fn checked_hours(hours: impl IntoIterator<Item = u32>) -> Option<u32> {
    hours.into_iter().try_fold(0u32, u32::checked_add)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parses a generator reply into a roadmap, renumbering phases and topics and
/// recomputing every total. Metadata is always rebuilt from the request.
pub fn parse_roadmap(reply: &str, query: &str, domain: Option<&str>) -> KnowledgeOnly {
    let cleaned = escape_control_chars(strip_fences(reply));
    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(v) => v,
        Err(e) => return KnowledgeOnly::Fallback { reason: FallbackReason::JsonParseFailed, detail: e.to_string() },
    };
    let raw: RawRoadmap = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => return KnowledgeOnly::Fallback { reason: FallbackReason::InvalidRoadmapShape, detail: e.to_string() },
    };
    let raw_phases = raw.phases.unwrap_or_default();
    if raw_phases.is_empty() {
        return KnowledgeOnly::Fallback { reason: FallbackReason::InvalidRoadmapShape, detail: "no phases".into() };
    }

    let mut next_id = 1usize;
    let mut phases = Vec::with_capacity(raw_phases.len());
    for (p, raw_phase) in raw_phases.into_iter().enumerate() {
        let raw_topics = raw_phase.topics.unwrap_or_default();
        let mut topics = Vec::with_capacity(raw_topics.len());
        for (t, raw_topic) in raw_topics.into_iter().enumerate() {
            let Some(name) = non_empty(raw_topic.topic) else {
                return KnowledgeOnly::Fallback {
                    reason: FallbackReason::InvalidRoadmapShape,
                    detail: format!("phase {} topic {} has no name", p + 1, t + 1),
                };
            };
            let id = non_empty(raw_topic.id).unwrap_or_else(|| format!("topic_{next_id:02}"));
            next_id += 1;
            topics.push(RoadmapTopic {
                id,
                topic: name,
                domain: raw_topic.domain.or_else(|| domain.map(str::to_string)).unwrap_or_default(),
                subdomain: raw_topic.subdomain.unwrap_or_default(),
                description: raw_topic.description.unwrap_or_default(),
                difficulty: difficulty_from(raw_topic.difficulty.as_deref()),
                estimated_hours: hours_from(raw_topic.estimated_hours.as_ref()),
                prerequisites: raw_topic.prerequisites.unwrap_or_default(),
                resources: raw_topic
                    .resources
                    .unwrap_or_default()
                    .into_iter()
                    .map(|r| Resource {
                        title: r.title.unwrap_or_default(),
                        kind: r.kind.unwrap_or_default(),
                        url: r.url.unwrap_or_default(),
                    })
                    .collect(),
                order: t as u32 + 1,
            });
        }
        let Some(total_hours) = checked_hours(topics.iter().map(|t| t.estimated_hours)) else {
            return KnowledgeOnly::Fallback {
                reason: FallbackReason::InvalidRoadmapShape,
                detail: format!("phase {} hours overflow", p + 1),
            };
        };
        phases.push(Phase {
            phase_number: p as u32 + 1,
            phase_name: non_empty(raw_phase.phase_name).unwrap_or_else(|| format!("Phase {}", p + 1)),
            description: raw_phase.description.unwrap_or_default(),
            topics,
            total_hours,
        });
    }

    let total_topics: usize = phases.iter().map(|p| p.topics.len()).sum();
    let Some(total_hours) = checked_hours(phases.iter().map(|p| p.total_hours)) else {
        return KnowledgeOnly::Fallback { reason: FallbackReason::InvalidRoadmapShape, detail: "roadmap hours overflow".into() };
    };
    KnowledgeOnly::Parsed(Roadmap {
        title: non_empty(raw.title).unwrap_or_else(|| format!("Learning Path: {query}")),
        description: non_empty(raw.description).unwrap_or_else(|| format!("AI-generated roadmap for {query}")),
        total_topics,
        total_hours,
        phases,
        ai_summary: non_empty(raw.ai_summary).unwrap_or_else(|| template_summary(query, total_topics)),
        metadata: RoadmapMetadata {
            query: query.to_string(),
            domain: domain.map(str::to_string),
            mode: RoadmapMode::KnowledgeOnly,
            source: RoadmapSource::AiGenerated,
            best_distance: None,
            generated_at: Utc::now(),
            error: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_and_prose_are_removed() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("Here you go:\n{\"a\":1}\nEnjoy"), "{\"a\":1}");
    }

    #[test]
    fn control_chars_inside_strings_are_escaped_only_there() {
        let raw = "{\n\"d\": \"line one\nline\ttwo \\\" still\"\n}";
        let fixed = escape_control_chars(raw);
        assert_eq!(fixed, "{\n\"d\": \"line one\\nline\\ttwo \\\" still\"\n}");
        let v: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(v["d"], "line one\nline\ttwo \" still");
    }

    #[test]
    fn hours_accept_numbers_and_strings() {
        assert_eq!(hours_from(Some(&serde_json::json!(5))), 5);
        assert_eq!(hours_from(Some(&serde_json::json!(2.6))), 3);
        assert_eq!(hours_from(Some(&serde_json::json!("4"))), 4);
        assert_eq!(hours_from(Some(&serde_json::json!(-2))), DEFAULT_ESTIMATED_HOURS);
        assert_eq!(hours_from(Some(&serde_json::json!(3_000_000_000u64))), MAX_TOPIC_HOURS);
        assert_eq!(hours_from(None), DEFAULT_ESTIMATED_HOURS);
    }

    #[test]
    fn hour_totals_stop_at_overflow() {
        assert_eq!(checked_hours([1, 2, 3]), Some(6));
        assert_eq!(checked_hours([u32::MAX, 1]), None);
    }
}
