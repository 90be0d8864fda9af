#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use roadmap_core::traits::{Embedder, Generator, TopicIndex};
use roadmap_core::types::{Difficulty, Resource, SearchHit, TopicEntry, TopicRecord};
use roadmap_core::Result;
use roadmap_embed::FakeEmbedder;

pub fn entry(id: &str, difficulty: Difficulty, prereqs: usize, hours: Option<u32>) -> TopicEntry {
    TopicEntry {
        id: id.to_string(),
        topic: format!("Topic {id}"),
        domain: "dsa".to_string(),
        subdomain: "core".to_string(),
        difficulty,
        estimated_hours: hours,
        description: format!("Everything about {id}"),
        prerequisites: (0..prereqs).map(|i| format!("pre_{i}")).collect(),
        resources: vec![Resource {
            title: format!("{id} video"),
            kind: "video".to_string(),
            url: format!("https://www.youtube.com/results?search_query={id}"),
        }],
    }
}

pub fn hit(id: &str, distance: f32) -> SearchHit {
    SearchHit { topic: entry(id, Difficulty::Medium, 0, Some(2)), distance }
}

/// Wraps the fake embedder and records every batch it receives.
pub struct CountingEmbedder {
    inner: FakeEmbedder,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl CountingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { inner: FakeEmbedder::new(dim), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Embedder for CountingEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.lock().unwrap().push(texts.to_vec());
        self.inner.embed_batch(texts)
    }
}

/// Returns the same vector for every text.
pub struct FixedEmbedder(pub Vec<f32>);

impl Embedder for FixedEmbedder {
    fn dim(&self) -> usize { self.0.len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| self.0.clone()).collect())
    }
}

pub enum Misbehaviour {
    Fail,
    Slow(Duration),
    DropOne,
    /// One vector component too many for every text.
    WrongDim,
}

pub struct BrokenEmbedder {
    pub dim: usize,
    pub mode: Misbehaviour,
}

impl Embedder for BrokenEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        match self.mode {
            Misbehaviour::Fail => Err(anyhow::anyhow!("model crashed")),
            Misbehaviour::Slow(d) => {
                std::thread::sleep(d);
                Ok(texts.iter().map(|_| vec![0.0; self.dim]).collect())
            }
            Misbehaviour::DropOne => Ok(texts.iter().skip(1).map(|_| vec![0.0; self.dim]).collect()),
            Misbehaviour::WrongDim => Ok(texts.iter().map(|_| vec![0.0; self.dim + 1]).collect()),
        }
    }
}

/// Canned generator reply, optionally delayed, recording prompts.
pub struct StubGenerator {
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), delay: None, prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: Err(message.to_string()), delay: None, prompts: Mutex::new(Vec::new()) }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { reply: Ok("late".to_string()), delay: Some(delay), prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    fn model_id(&self) -> &str { "stub" }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.reply.clone().map_err(|m| anyhow::anyhow!(m))
    }
}

/// Index that answers every search with a fixed hit list.
pub struct CannedIndex {
    pub dim: usize,
    pub hits: Vec<SearchHit>,
}

#[async_trait]
impl TopicIndex for CannedIndex {
    fn dimension(&self) -> usize { self.dim }
    async fn ensure_schema(&self) -> Result<()> { Ok(()) }
    async fn list_ids(&self) -> Result<HashSet<String>> {
        Ok(self.hits.iter().map(|h| h.id().to_string()).collect())
    }
    async fn count(&self) -> Result<usize> { Ok(self.hits.len()) }
    async fn insert(&self, records: &[TopicRecord]) -> Result<usize> { Ok(records.len()) }
    async fn search(&self, _query: &[f32], limit: usize, _domain: Option<&str>) -> Result<Vec<SearchHit>> {
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

pub const GENERATED_ROADMAP: &str = r#"```json
{
  "title": "Learning Path: Quantum Computing",
  "description": "From qubits to algorithms",
  "total_hours": 999,
  "ai_summary": "Start small.
Then grow.",
  "phases": [
    {
      "phase_number": 4,
      "phase_name": "Fundamentals",
      "description": "Basics",
      "total_hours": 1,
      "topics": [
        {"id": "q_1", "topic": "Qubits", "description": "State vectors", "difficulty": "easy", "estimated_hours": 4,
         "prerequisites": [], "resources": [{"title": "Intro", "type": "video", "url": "https://www.youtube.com/results?search_query=qubits"}], "order": 7},
        {"topic": "Gates", "description": "Unitary ops", "difficulty": "Medium", "order": 2}
      ]
    },
    {
      "phase_name": "Algorithms",
      "description": "Shor and Grover",
      "topics": [
        {"topic": "Grover", "description": "Search", "difficulty": "hard", "estimated_hours": "6"}
      ]
    }
  ],
  "metadata": {"query": "something else", "mode": "llm_only"}
}
```"#;
