use std::fs;

use sha2::{Digest, Sha256};
use sleuth_cli::config::TableConfig;
use sleuth_cli::report;
use sleuth_cli::session;
use tempfile::tempdir;

fn load_config(dir: &std::path::Path) -> TableConfig {
    let yaml = format!(
        r#"
players: ["Ann", "Bob", "Cat", "Dan"]
observer: "Cat"
mode: "extended"
contradictions: "reject"
logging:
  enable_structured: false
  tracing_level: "info"
  log_file: "{log}"
"#,
        log = dir.join("sleuth.log.jsonl").display()
    );
    let path = dir.join("table.yaml");
    fs::write(&path, yaml).expect("config written");
    TableConfig::from_path(&path).expect("config validates")
}

fn digest(json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn simulated_record_replays_to_identical_grid() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let setup = config.to_setup().expect("setup");

    let outcome = session::simulate(&setup, 4242, 36).expect("simulation runs");
    assert!(outcome.disagreements.is_empty(), "{:?}", outcome.disagreements);

    let record_path = dir.path().join("games").join("game.json");
    session::save_record(&record_path, &outcome.table).expect("record saved");
    assert!(record_path.exists(), "record missing on disk");

    let record = session::load_record(&record_path).expect("record loads");
    assert_eq!(record.events.len(), 36);
    let replayed = session::open_table(&config, &record).expect("record replays");

    let live = serde_json::to_string(&outcome.table.grid_snapshot()).expect("encode live grid");
    let restored = serde_json::to_string(&replayed.grid_snapshot()).expect("encode replayed grid");
    assert_eq!(digest(&live), digest(&restored));
    assert_eq!(replayed, outcome.table);

    let text = report::render_text(&replayed);
    assert!(text.contains("36 events"));
    let json = report::render_json(&replayed).expect("json report");
    let value: serde_json::Value = serde_json::from_str(&json).expect("report decodes");
    assert_eq!(value["history"].as_array().map(Vec::len), Some(36));
}

#[test]
fn same_seed_writes_byte_identical_records() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let setup = config.to_setup().expect("setup");

    let mut digests = Vec::new();
    for name in ["first.json", "second.json"] {
        let outcome = session::simulate(&setup, 7, 20).expect("simulation runs");
        let path = dir.path().join(name);
        session::save_record(&path, &outcome.table).expect("record saved");
        let json = fs::read_to_string(&path).expect("record readable");
        digests.push(digest(&json));
    }
    assert_eq!(digests[0], digests[1]);

    let other = session::simulate(&setup, 8, 20).expect("simulation runs");
    let other_json = sleuth_core::game::serialization::GameRecord::to_json(&other.table)
        .expect("encode");
    assert_ne!(digest(&other_json), digests[0]);
}

#[test]
fn broken_config_reports_the_field() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("table.yaml");
    fs::write(&path, "players: [Ann, Bob]\nobserver: Zed\n").expect("config written");
    let err = TableConfig::from_path(&path).expect_err("unknown observer");
    assert_eq!(err.path(), path.as_path());
    assert!(err.to_string().contains("observer"));
}
