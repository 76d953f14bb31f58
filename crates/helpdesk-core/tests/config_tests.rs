use std::fs;

use helpdesk_core::config::{resolve_with_base, Config, Settings};
use helpdesk_core::types::Corpus;
use tempfile::TempDir;

#[test]
fn defaults_match_the_reference_pipeline() {
    let settings = Settings::default();
    settings.validate().expect("defaults are valid");

    assert_eq!(settings.chunking.chunk_size, 1000);
    assert_eq!(settings.chunking.chunk_overlap, 200);
    assert_eq!(settings.rerank.top_n, 4);
    assert!(settings.rerank.enabled);
    assert_eq!(settings.generator.model, "llama3");

    let names: Vec<&str> = settings.retrieval.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["code", "chat"]);
    assert!(settings.retrieval.sources.iter().all(|s| s.top_k == 6));
    assert_eq!(settings.retrieval.source_for(Corpus::Chat).map(|s| s.table.as_str()), Some("chat_chunks"));
}

#[test]
fn toml_overrides_and_relative_paths() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        r#"
[rerank]
enabled = false
top_n = 2

[audit]
path = "logs/audit.log"

[[retrieval.sources]]
name = "chat"
corpus = "chat"
table = "discord"
top_k = 3
"#,
    )
    .unwrap();

    let config = Config::load_from(tmp.path()).expect("load");
    let settings = config.settings().expect("settings");

    assert!(!settings.rerank.enabled);
    assert_eq!(settings.rerank.top_n, 2);
    assert_eq!(settings.retrieval.sources.len(), 1);
    assert_eq!(settings.retrieval.sources[0].top_k, 3);
    assert_eq!(settings.audit.path, tmp.path().join("logs/audit.log").to_string_lossy());
    assert_eq!(config.get::<usize>("rerank.top_n").expect("raw key"), 2);
}

#[test]
fn invalid_settings_are_rejected_on_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        r#"
[chunking]
chunk_size = 100
chunk_overlap = 150
"#,
    )
    .unwrap();
    assert!(Config::load_from(tmp.path()).is_err());
}

#[test]
fn duplicate_source_names_are_rejected() {
    let mut settings = Settings::default();
    let dup = settings.retrieval.sources[0].clone();
    settings.retrieval.sources.push(dup);
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.retrieval.sources[1].top_k = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn absolute_paths_are_kept() {
    let tmp = TempDir::new().unwrap();
    let abs = tmp.path().join("x.json");
    assert_eq!(resolve_with_base(tmp.path(), abs.to_string_lossy()), abs);
    assert_eq!(resolve_with_base(tmp.path(), "y.json"), tmp.path().join("y.json"));
}
