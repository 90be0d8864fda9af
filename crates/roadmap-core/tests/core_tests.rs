use std::fs;
use tempfile::TempDir;

use roadmap_core::corpus::CorpusLoader;
use roadmap_core::types::{Difficulty, TopicEntry, TopicRecord, DEFAULT_ESTIMATED_HOURS};
use roadmap_core::Error;

fn entry_json(id: &str, difficulty: &str) -> String {
    format!(
        r#"{{"id":"{id}","topic":"Topic {id}","domain":"dsa","subdomain":"basics","difficulty":"{difficulty}",
            "estimated_hours":4,"description":"Learn {id}","prerequisites":[],
            "resources":[{{"title":"GFG","type":"article","url":"https://www.geeksforgeeks.org/"}}]}}"#
    )
}

#[test]
fn load_dir_reads_every_json_file_in_order() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("b.json"), format!("[{}]", entry_json("b_01", "hard"))).unwrap();
    fs::write(
        tmp.path().join("a.json"),
        format!("[{},{}]", entry_json("a_01", "easy"), entry_json("a_02", "medium")),
    )
    .unwrap();
    fs::write(tmp.path().join("notes.txt"), "not a corpus file").unwrap();

    let corpus = CorpusLoader::new().load_dir(tmp.path()).expect("load");

    let ids: Vec<&str> = corpus.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a_01", "a_02", "b_01"]);
    assert!(corpus.skipped.is_empty());
    assert_eq!(corpus.entries[0].resources[0].kind, "article");
}

#[test]
fn malformed_file_is_skipped_and_others_still_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("good.json"), format!("[{}]", entry_json("g_01", "easy"))).unwrap();
    fs::write(tmp.path().join("broken.json"), "[{\"id\": ").unwrap();
    fs::write(tmp.path().join("bad_difficulty.json"), format!("[{}]", entry_json("x_01", "legendary"))).unwrap();

    let corpus = CorpusLoader::new().load_dir(tmp.path()).expect("load");

    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.entries[0].id, "g_01");
    assert_eq!(corpus.skipped.len(), 2, "both the unparsable and the invalid file are skipped");
}

#[test]
fn missing_directory_is_a_corpus_error() {
    let tmp = TempDir::new().unwrap();
    let err = CorpusLoader::new().load_dir(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::Corpus(_)));
}

#[test]
fn optional_fields_take_defaults() {
    let raw = r#"[{"id":"os_01","topic":"Processes","domain":"os","difficulty":"medium","description":"What a process is"}]"#;
    let entries: Vec<TopicEntry> = serde_json::from_str(raw).unwrap();
    let e = &entries[0];
    assert_eq!(e.subdomain, "");
    assert!(e.prerequisites.is_empty());
    assert!(e.resources.is_empty());
    assert_eq!(e.hours(), DEFAULT_ESTIMATED_HOURS);
    assert!(e.validate().is_ok());
}

#[test]
fn difficulty_ranks_and_unknown_catch_all() {
    let parsed: Vec<Difficulty> = serde_json::from_str(r#"["easy","medium","hard","expert"]"#).unwrap();
    assert_eq!(parsed, vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Unknown]);
    assert_eq!(Difficulty::Easy.rank(), 1);
    assert_eq!(Difficulty::Unknown.rank(), Difficulty::Medium.rank());
    assert_eq!(Difficulty::Hard.rank(), 3);
    assert!(Difficulty::parse("Hard").is_err(), "index values are case-sensitive");
}

#[test]
fn record_validation_rejects_wrong_dimension() {
    let entries: Vec<TopicEntry> = serde_json::from_str(&format!("[{}]", entry_json("v_01", "easy"))).unwrap();
    let record = TopicRecord::from_entry(entries[0].clone(), vec![0.5; 3]);
    assert!(record.validate(3).is_ok());
    let err = record.validate(4).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("v_01"));
}
