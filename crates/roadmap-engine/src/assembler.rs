//! Turns a flat topic list into phased roadmaps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use roadmap_core::traits::Generator;
use roadmap_core::types::{
    Phase, Roadmap, RoadmapMetadata, RoadmapMode, RoadmapSource, RoadmapTopic, SearchHit, TopicEntry,
};
use roadmap_core::Result;

use crate::knowledge::{self, KnowledgeOnly};
use crate::{prompts, upstream};

/// Stable sort by difficulty rank, then by prerequisite count.
pub fn sort_topics(topics: &mut [TopicEntry]) {
    topics.sort_by_key(|t| (t.difficulty.rank(), t.prerequisites.len()));
}

/// Phase layout for `n` topics: (name, description, topic count) per phase.
pub fn phase_plan(n: usize) -> Vec<(&'static str, &'static str, usize)> {
    match n {
        0 => Vec::new(),
        1..=5 => vec![("Core Concepts", "Master the fundamentals", n)],
        6..=10 => {
            let mid = n / 2;
            vec![("Foundation", "Build strong fundamentals", mid), ("Advanced Topics", "Level up your skills", n - mid)]
        }
        _ => {
            let third = n / 3;
            vec![
                ("Fundamentals", "Start with the basics", third),
                ("Intermediate", "Build problem-solving skills", third),
                ("Advanced", "Master complex concepts", n - 2 * third),
            ]
        }
    }
}

/// Sorts `topics` and buckets them into phases. Zero topics yield zero phases.
pub fn organize_into_phases(mut topics: Vec<TopicEntry>) -> Vec<Phase> {
    sort_topics(&mut topics);
    let plan = phase_plan(topics.len());
    let mut remaining = topics.into_iter();
    plan.into_iter()
        .enumerate()
        .map(|(i, (name, description, count))| {
            let members: Vec<RoadmapTopic> = remaining
                .by_ref()
                .take(count)
                .enumerate()
                .map(|(j, entry)| RoadmapTopic::from_entry(entry, j as u32 + 1))
                .collect();
            let total_hours = saturating_hours(members.iter().map(|t| t.estimated_hours));
            Phase {
                phase_number: i as u32 + 1,
                phase_name: name.to_string(),
                description: description.to_string(),
                topics: members,
                total_hours,
            }
        })
        .collect()
}

/// Sum of `hours`, pinned at `u32::MAX` instead of wrapping.
pub fn saturating_hours(hours: impl IntoIterator<Item = u32>) -> u32 {
    hours.into_iter().fold(0u32, u32::saturating_add)
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn template_summary(query: &str, n: usize) -> String {
    format!("Master {query} through this structured learning path with {n} carefully selected topics.")
}

/// A roadmap overview, either written by the generator or the fixed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Generated(String),
    Templated { text: String, reason: String },
}

impl Summary {
    pub fn into_text(self) -> String {
        match self {
            Summary::Generated(text) | Summary::Templated { text, .. } => text,
        }
    }
}

pub struct Assembler {
    generator: Arc<dyn Generator>,
    generate_timeout: Duration,
}

impl Assembler {
    pub fn new(generator: Arc<dyn Generator>, generate_timeout: Duration) -> Self {
        Self { generator, generate_timeout }
    }

    /// Asks the generator for an overview; any failure falls back to the template.
    pub async fn summarize(&self, query: &str, topics: &[TopicEntry]) -> Summary {
        let prompt = prompts::summary_prompt(query, topics);
        let context = format!("summary of '{query}'");
        match upstream::generate(self.generator.as_ref(), &prompt, self.generate_timeout, &context).await {
            Ok(text) if !text.trim().is_empty() => Summary::Generated(text.trim().to_string()),
            Ok(_) => {
                warn!(query, "generator returned an empty summary, using template");
                Summary::Templated { text: template_summary(query, topics.len()), reason: "empty reply".into() }
            }
            Err(e) => {
                warn!(query, error = %e, "summary generation failed, using template");
                Summary::Templated { text: template_summary(query, topics.len()), reason: e.to_string() }
            }
        }
    }

    /// Roadmap built from retrieved hits. Never fails: the summary degrades to
    /// the template.
    pub async fn grounded(&self, query: &str, domain: Option<&str>, hits: Vec<SearchHit>) -> Roadmap {
        let best_distance = hits.first().map(|h| h.distance);
        let topics: Vec<TopicEntry> = hits.into_iter().map(|h| h.topic).collect();
        let ai_summary = self.summarize(query, &topics).await.into_text();
        let n = topics.len();
        let phases = organize_into_phases(topics);
        let total_hours = saturating_hours(phases.iter().map(|p| p.total_hours));
        info!(query, topics = n, phases = phases.len(), total_hours, "assembled grounded roadmap");
        Roadmap {
            title: format!("Learning Path: {}", title_case(query)),
            description: format!("Comprehensive roadmap with {n} topics from our curated database"),
            total_topics: n,
            total_hours,
            phases,
            ai_summary,
            metadata: RoadmapMetadata {
                query: query.to_string(),
                domain: domain.map(str::to_string),
                mode: RoadmapMode::Grounded,
                source: RoadmapSource::Database,
                best_distance,
                generated_at: Utc::now(),
                error: None,
            },
        }
    }

    /// Roadmap written entirely by the generator. Generator failures propagate;
    /// an unusable reply yields the minimal roadmap with `metadata.error` set.
    pub async fn knowledge_only(
        &self,
        query: &str,
        domain: Option<&str>,
        num_topics: usize,
        best_distance: Option<f32>,
    ) -> Result<Roadmap> {
        let prompt = prompts::knowledge_only_prompt(query, domain, num_topics);
        let context = format!("knowledge-only roadmap for '{query}'");
        let reply = upstream::generate(self.generator.as_ref(), &prompt, self.generate_timeout, &context).await?;
        let mut roadmap = match knowledge::parse_roadmap(&reply, query, domain) {
            KnowledgeOnly::Parsed(roadmap) => {
                info!(query, topics = roadmap.total_topics, phases = roadmap.phases.len(), "parsed generated roadmap");
                roadmap
            }
            KnowledgeOnly::Fallback { reason, detail } => {
                warn!(query, reason = reason.as_str(), detail = %detail, "generated roadmap unusable, returning fallback");
                Roadmap::minimal(query, domain, reason.as_str())
            }
        };
        roadmap.metadata.best_distance = best_distance;
        Ok(roadmap)
    }
}
