use std::path::Path;

use figment::providers::{Format, Toml};
use figment::{Figment, Jail};
use roadmap_core::config::{Config, DistanceMetric, Pooling, Settings};

#[test]
fn defaults_apply_without_any_file() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "dev");
        let settings = Config::load().expect("load").settings().expect("settings");
        assert_eq!(settings.index.table_name, "topics");
        assert_eq!(settings.index.dimension, 1024);
        assert_eq!(settings.index.metric, DistanceMetric::L2);
        assert_eq!(settings.embedding.pooling, Pooling::Cls);
        assert!((settings.retrieval.relevance_threshold - 0.95).abs() < f32::EPSILON);
        assert_eq!(settings.retrieval.default_limit, 5);
        assert!(settings.data.corpus_dir.ends_with("data"));
        Ok(())
    });
}

#[test]
fn env_file_and_app_vars_layer_over_base_file() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "dev");
        jail.create_file(
            "config.toml",
            r#"
            [index]
            table_name = "topics_base"
            metric = "cosine"

            [retrieval]
            relevance_threshold = 0.8
            "#,
        )?;
        jail.create_file("config.dev.toml", "[index]\ntable_name = \"topics_dev\"\n")?;
        jail.set_env("APP_RETRIEVAL__RELEVANCE_THRESHOLD", "0.5");

        let config = Config::load().expect("load");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.index.table_name, "topics_dev");
        assert_eq!(settings.index.metric, DistanceMetric::Cosine);
        assert!((settings.retrieval.relevance_threshold - 0.5).abs() < 1e-6);
        let name: String = config.get("index.table_name").expect("get");
        assert_eq!(name, "topics_dev");
        Ok(())
    });
}

#[test]
fn production_refuses_fake_embeddings() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "prod");
        jail.create_file("config.prod.toml", "[embedding]\nfake = true\n")?;
        let err = Config::load().expect("load").settings().unwrap_err();
        assert!(err.to_string().contains("production"));
        Ok(())
    });
}

#[test]
fn invalid_limits_are_rejected() {
    let figment = Figment::from(figment::providers::Serialized::defaults(Settings::default()))
        .merge(Toml::string("[retrieval]\ndefault_limit = 50\nmax_limit = 20\n"));
    let config = Config::from_figment(figment, Path::new("/srv/roadmap"));
    let err = config.settings().unwrap_err();
    assert!(err.to_string().contains("default_limit"));
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    let figment = Figment::from(figment::providers::Serialized::defaults(Settings::default()))
        .merge(Toml::string("[data]\ncorpus_dir = \"corpus\"\nlancedb_dir = \"/var/lib/roadmap/lance\"\n"));
    let settings = Config::from_figment(figment, Path::new("/srv/roadmap")).settings().expect("settings");
    assert_eq!(settings.data.corpus_dir, Path::new("/srv/roadmap/corpus"));
    assert_eq!(settings.data.lancedb_dir, Path::new("/var/lib/roadmap/lance"));
}
