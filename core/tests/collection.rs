//! Collection pipeline tests: discovery, parsing, cache round-trips, and
//! lifecycle signals, against a real temporary directory.

use odessen_core::{Collection, CollectionSignal, EntityKey, Error, ParseState};
use std::path::Path;
use std::sync::{Arc, Mutex};

const LOG_NAME: &str = "combat_2024-03-01_19_57_38_000000.txt";

const LOG_CONTENT: &str = "\
[19:57:38.930] [@Hero#100|(1.0,2.0,3.0,4.0)|(300/300)] [=] [Safe Login {836045448953666}] []\n\
[19:57:39.229] [@Hero#100] [=] [] [AreaEntered {836045448953664}: Coruscant {3}] (he4000) <7.0>\n\
[19:58:02.100] [@Hero#100] [Boss {200}:123] [Strike {400}] [ApplyEffect {836045448945477}: Damage {836045448945501}] (100 kinetic {1}) <100>\n";

fn write_log(dir: &Path) {
    std::fs::write(dir.join(LOG_NAME), LOG_CONTENT).unwrap();
}

/// Replace the log's content with same-length garbage. The filename+size
/// identity is unchanged, so a cache hit must not notice.
fn scramble_log(dir: &Path) {
    std::fs::write(dir.join(LOG_NAME), "x".repeat(LOG_CONTENT.len())).unwrap();
}

fn collect_signals(collection: &mut Collection) -> Arc<Mutex<Vec<&'static str>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    collection.add_signal_handler(Box::new(move |signal: &CollectionSignal| {
        let name = match signal {
            CollectionSignal::AllLogsFound { .. } => "allLogsFound",
            CollectionSignal::CacheLoaded { .. } => "logCacheLoaded",
            CollectionSignal::LogParsed { .. } => "logParsed",
            CollectionSignal::AllLogsParsed => "allLogsParsed",
            CollectionSignal::CacheSaved => "logCacheSaved",
        };
        sink.lock().unwrap().push(name);
    }));
    seen
}

#[tokio::test]
async fn end_to_end_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut collection = Collection::new(dir.path());
    let signals = collect_signals(&mut collection);
    collection.run(false).await.unwrap();

    let log = collection.log(LOG_NAME).unwrap();
    assert_eq!(log.state, ParseState::Parsed);

    let character = log.character.as_ref().unwrap();
    assert_eq!(character.unique().unwrap().to_string(), "100");
    assert_eq!(log.server, "Darth Malgus");
    assert_eq!(log.server_id, "he4000");
    assert_eq!(log.patch, "7.0");
    assert_eq!(log.areas.len(), 1);
    assert_eq!(log.areas.as_slice()[0].area, "Coruscant");
    assert_eq!(log.enemies.len(), 1);
    assert!(log.enemies.contains(EntityKey::Npc(200)));
    assert!(log.players.is_empty());

    assert_eq!(
        *signals.lock().unwrap(),
        [
            "allLogsFound",
            "logCacheLoaded",
            "logParsed",
            "allLogsParsed",
            "logCacheSaved",
        ]
    );
    assert!(dir.path().join("logDataCache.json").exists());
}

#[tokio::test]
async fn cache_hit_skips_the_file_entirely() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut first = Collection::new(dir.path());
    first.run(false).await.unwrap();

    // Same name and size, different bytes: a second run must come from the
    // cache, field for field, without reading the file.
    scramble_log(dir.path());

    let mut second = Collection::new(dir.path());
    let signals = collect_signals(&mut second);
    second.run(false).await.unwrap();

    let cached = second.log(LOG_NAME).unwrap();
    let fresh = first.log(LOG_NAME).unwrap();
    assert_eq!(cached.state, ParseState::Parsed);
    assert_eq!(cached.character, fresh.character);
    assert_eq!(cached.server, fresh.server);
    assert_eq!(cached.patch, fresh.patch);
    assert_eq!(cached.areas, fresh.areas);
    assert_eq!(cached.players, fresh.players);
    assert_eq!(cached.enemies, fresh.enemies);

    // Nothing fresh this run, so the cache is not rewritten.
    assert!(!second.cache_dirty());
    assert!(!signals.lock().unwrap().contains(&"logCacheSaved"));
}

#[tokio::test]
async fn size_change_invalidates_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut first = Collection::new(dir.path());
    first.run(false).await.unwrap();

    // Rewritten file with a different size: the snapshot no longer applies.
    std::fs::write(
        dir.path().join(LOG_NAME),
        "[20:00:00.000] [@Other#500] [=] [Safe Login {836045448953666}] []\n",
    )
    .unwrap();

    let mut second = Collection::new(dir.path());
    second.run(false).await.unwrap();

    let log = second.log(LOG_NAME).unwrap();
    assert_eq!(
        log.character.as_ref().unwrap().unique(),
        Some(EntityKey::Player(500))
    );
}

#[tokio::test]
async fn version_mismatch_forces_reparse() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut first = Collection::new(dir.path());
    first.run(false).await.unwrap();

    let cache_path = dir.path().join("logDataCache.json");
    let mut document: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&cache_path).unwrap()).unwrap();
    document["logVersion"] = serde_json::json!(2);
    std::fs::write(&cache_path, serde_json::to_vec(&document).unwrap()).unwrap();

    // Same size, different bytes: only a real re-read can tell.
    scramble_log(dir.path());

    let mut second = Collection::new(dir.path());
    second.run(false).await.unwrap();

    let log = second.log(LOG_NAME).unwrap();
    assert_eq!(log.state, ParseState::Parsed);
    assert!(log.character.is_none(), "stale snapshot must not be reused");
    assert!(log.skipped_lines > 0);
}

#[tokio::test]
async fn force_bypasses_cache_and_parsed_state() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut collection = Collection::new(dir.path());
    collection.run(false).await.unwrap();
    scramble_log(dir.path());

    collection.parse_file(LOG_NAME, true).unwrap();
    let log = collection.log(LOG_NAME).unwrap();
    assert!(log.character.is_none());
    assert_eq!(collection.parsed_count(), 1);
}

#[tokio::test]
async fn malformed_lines_do_not_abort_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!(
        "{}garbage that matches nothing\n{}",
        "[19:57:38.930] [@Hero#100] [=] [Safe Login {836045448953666}] []\n",
        "[19:57:39.229] [@Hero#100] [=] [] [AreaEntered {836045448953664}: Coruscant {3}] (he4000) <7.0>\n",
    );
    std::fs::write(dir.path().join(LOG_NAME), content).unwrap();

    let mut collection = Collection::new(dir.path());
    collection.run(false).await.unwrap();

    let log = collection.log(LOG_NAME).unwrap();
    assert_eq!(log.state, ParseState::Parsed);
    assert_eq!(log.skipped_lines, 1);
    assert!(log.character.is_some());
    assert_eq!(log.areas.len(), 1);
}

#[tokio::test]
async fn unreadable_file_fails_but_completes() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut collection = Collection::new(dir.path());
    let signals = collect_signals(&mut collection);

    collection.discover().await.unwrap();
    collection.load_cache().await.unwrap();

    // Vanishes between discovery and parse: the open fails.
    std::fs::remove_file(dir.path().join(LOG_NAME)).unwrap();
    collection.parse_all(false).await.unwrap();

    let log = collection.log(LOG_NAME).unwrap();
    assert_eq!(log.state, ParseState::Failed);
    assert_eq!(collection.parsed_count(), 1);

    let seen = signals.lock().unwrap();
    assert!(seen.contains(&"logParsed"));
    assert!(seen.contains(&"allLogsParsed"));
    // A failed file is never cached.
    assert!(!seen.contains(&"logCacheSaved"));
}

#[tokio::test]
async fn parsing_requires_discovery_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());

    let mut collection = Collection::new(dir.path());
    assert!(matches!(
        collection.parse_all(false).await,
        Err(Error::NotReady)
    ));

    collection.discover().await.unwrap();
    assert!(matches!(
        collection.parse_file(LOG_NAME, false),
        Err(Error::NotReady)
    ));
}

#[tokio::test]
async fn discovery_is_idempotent_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());
    std::fs::write(dir.path().join("notes.txt"), "not a log").unwrap();
    std::fs::write(dir.path().join("combat_old.log"), "wrong extension").unwrap();

    let mut collection = Collection::new(dir.path());
    assert_eq!(collection.discover().await.unwrap(), 1);
    assert_eq!(collection.discover().await.unwrap(), 1);
    assert_eq!(collection.len(), 1);
}

#[tokio::test]
async fn corrupt_cache_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path());
    std::fs::write(dir.path().join("logDataCache.json"), "{not json").unwrap();

    let mut collection = Collection::new(dir.path());
    assert!(matches!(
        collection.load_cache().await,
        Err(Error::CacheFormat { .. })
    ));
}
