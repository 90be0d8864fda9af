//! Domain types shared by the index, the loader and the assembler.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type TopicId = String;

/// Hours assumed for a topic that carries no estimate.
pub const DEFAULT_ESTIMATED_HOURS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Anything else a generator produced. Rejected by the corpus and the index.
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    /// Sort rank used by the assembler; unknown ranks with medium.
    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium | Difficulty::Unknown => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unknown => "unknown",
        }
    }

    /// Strict parse used when reading rows back from the index.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(Error::Validation(format!("unknown difficulty '{other}'"))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// A raw corpus entry: a topic without its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub id: TopicId,
    pub topic: String,
    pub domain: String,
    #[serde(default)]
    pub subdomain: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<u32>,
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<TopicId>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl TopicEntry {
    pub fn hours(&self) -> u32 {
        self.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS)
    }

    /// Shape checks shared by the corpus loader and the index writer.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("topic id must not be empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(Error::Validation(format!("topic '{}' has an empty name", self.id)));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation(format!("topic '{}' has an empty description", self.id)));
        }
        if self.difficulty == Difficulty::Unknown {
            return Err(Error::Validation(format!(
                "topic '{}' has a difficulty outside easy/medium/hard",
                self.id
            )));
        }
        if self.hours() > i32::MAX as u32 {
            return Err(Error::Validation(format!(
                "topic '{}' estimated_hours {} does not fit the index column",
                self.id,
                self.hours()
            )));
        }
        Ok(())
    }
}

/// A learning unit as stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    pub topic: String,
    pub domain: String,
    pub subdomain: String,
    pub difficulty: Difficulty,
    pub estimated_hours: u32,
    pub description: String,
    pub prerequisites: Vec<TopicId>,
    pub resources: Vec<Resource>,
    pub vector: Vec<f32>,
}

impl TopicRecord {
    pub fn from_entry(entry: TopicEntry, vector: Vec<f32>) -> Self {
        let estimated_hours = entry.hours();
        Self {
            id: entry.id,
            topic: entry.topic,
            domain: entry.domain,
            subdomain: entry.subdomain,
            difficulty: entry.difficulty,
            estimated_hours,
            description: entry.description,
            prerequisites: entry.prerequisites,
            resources: entry.resources,
            vector,
        }
    }

    /// Validates the record against an index of dimension `dim`.
    pub fn validate(&self, dim: usize) -> Result<()> {
        self.entry().validate()?;
        if self.vector.len() != dim {
            return Err(Error::Validation(format!(
                "topic '{}' has vector dimension {}, index expects {}",
                self.id,
                self.vector.len(),
                dim
            )));
        }
        if self.vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::Validation(format!("topic '{}' has a non-finite vector component", self.id)));
        }
        Ok(())
    }

    pub fn entry(&self) -> TopicEntry {
        TopicEntry {
            id: self.id.clone(),
            topic: self.topic.clone(),
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            difficulty: self.difficulty,
            estimated_hours: Some(self.estimated_hours),
            description: self.description.clone(),
            prerequisites: self.prerequisites.clone(),
            resources: self.resources.clone(),
        }
    }
}

/// A search result: the stored topic fields plus its distance to the query.
///
/// The vector payload is not carried; `distance` is non-negative and smaller
/// means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub topic: TopicEntry,
    pub distance: f32,
}

impl SearchHit {
    pub fn id(&self) -> &str {
        &self.topic.id
    }
}

/// A topic placed inside a roadmap phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapTopic {
    pub id: TopicId,
    pub topic: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub subdomain: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_hours: u32,
    pub prerequisites: Vec<TopicId>,
    pub resources: Vec<Resource>,
    pub order: u32,
}

impl RoadmapTopic {
    pub fn from_entry(entry: TopicEntry, order: u32) -> Self {
        let estimated_hours = entry.hours();
        Self {
            id: entry.id,
            topic: entry.topic,
            domain: entry.domain,
            subdomain: entry.subdomain,
            description: entry.description,
            difficulty: entry.difficulty,
            estimated_hours,
            prerequisites: entry.prerequisites,
            resources: entry.resources,
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_number: u32,
    pub phase_name: String,
    pub description: String,
    pub topics: Vec<RoadmapTopic>,
    pub total_hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapMode {
    Grounded,
    KnowledgeOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapSource {
    Database,
    AiGenerated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapMetadata {
    pub query: String,
    pub domain: Option<String>,
    pub mode: RoadmapMode,
    pub source: RoadmapSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_distance: Option<f32>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    pub description: String,
    pub total_topics: usize,
    pub total_hours: u32,
    pub phases: Vec<Phase>,
    pub ai_summary: String,
    pub metadata: RoadmapMetadata,
}

impl Roadmap {
    /// Well-formed empty roadmap returned when a generated roadmap cannot be used.
    pub fn minimal(query: &str, domain: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            title: format!("Learning Path: {query}"),
            description: "AI-generated roadmap (parsing error, showing fallback)".to_string(),
            total_topics: 0,
            total_hours: 0,
            phases: Vec::new(),
            ai_summary: format!(
                "We're working on generating a roadmap for '{query}'. Please try again or contact support."
            ),
            metadata: RoadmapMetadata {
                query: query.to_string(),
                domain: domain.map(str::to_string),
                mode: RoadmapMode::KnowledgeOnly,
                source: RoadmapSource::AiGenerated,
                best_distance: None,
                generated_at: chrono::Utc::now(),
                error: Some(error.into()),
            },
        }
    }
}
