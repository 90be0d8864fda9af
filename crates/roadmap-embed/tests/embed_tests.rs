use roadmap_core::config::EmbeddingSettings;
use roadmap_core::traits::Embedder;
use roadmap_embed::{default_embedder, resolve_model_dir, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { fake: true, ..EmbeddingSettings::default() };
    let embedder = default_embedder(&settings, 1024).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_preserves_batch_order_and_dimension() {
    let embedder = FakeEmbedder::new(8);
    let texts: Vec<String> = ["graphs", "binary trees", "graphs"].iter().map(|s| s.to_string()).collect();
    let embs = embedder.embed_batch(&texts).unwrap();
    assert_eq!(embs.len(), 3);
    assert!(embs.iter().all(|v| v.len() == 8));
    assert_eq!(embs[0], embs[2]);
    assert_ne!(embs[0], embs[1]);
    assert!(embedder.embed_batch(&[]).unwrap().is_empty());
}

#[test]
fn fake_embedder_ignores_case_and_punctuation() {
    let embedder = FakeEmbedder::new(64);
    let embs = embedder
        .embed_batch(&["Dynamic Programming!".to_string(), "dynamic programming".to_string()])
        .unwrap();
    assert_eq!(embs[0], embs[1]);
}

#[test]
fn configured_model_dir_wins_when_present() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = resolve_model_dir(Some(tmp.path())).expect("resolved");
    assert_eq!(dir, tmp.path());
}
