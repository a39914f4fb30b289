mod helper;

use chrono::{TimeDelta, TimeZone, Utc};
use tempfile::TempDir;

use helper::{MemoryStore, StaticFetcher, UnreachableFetcher, asset_url, feed};
use release_query::config::QueryConfig;
use release_query::release::cache::FileCacheStore;
use release_query::release::error::{ConfigError, PatternKind};
use release_query::release::selector::ReleaseSelector;
use release_query::release::types::SelectionResult;

const SOURCE: &str = "https://api.github.com/repos/owner/app/releases";

fn config(asset_pattern: &str) -> QueryConfig {
    QueryConfig {
        releases_url: SOURCE.to_string(),
        asset_pattern: asset_pattern.to_string(),
        ..QueryConfig::default()
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000, 0).unwrap()
}

#[tokio::test]
async fn selects_newest_release_whose_asset_matches() {
    let fetcher = StaticFetcher::new(feed(&[
        ("v2.0.0", vec!["app-v2.0.0.tar.gz"]),
        ("v1.5.0", vec!["app-v1.5.0.tar.gz"]),
    ]));
    let store = MemoryStore::default();

    let selector =
        ReleaseSelector::new(config(r"app-v2.*\.tar\.gz$"), &fetcher, &store).unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(
        result,
        SelectionResult {
            version: "v2.0.0".to_string(),
            browser_download_url: asset_url("v2.0.0", "app-v2.0.0.tar.gz"),
        }
    );
    assert_eq!(fetcher.requested(), vec![SOURCE.to_string()]);
}

#[tokio::test]
async fn excluded_tags_are_never_selected() {
    let fetcher = StaticFetcher::new(feed(&[
        ("v3.0.0-rc", vec!["app.tar.gz"]),
        ("v1.0.0", vec!["app.tar.gz"]),
    ]));
    let store = MemoryStore::default();

    let selector = ReleaseSelector::new(
        QueryConfig {
            exclude_patterns: vec!["-rc$".to_string()],
            ..config(r"\.tar\.gz$")
        },
        &fetcher,
        &store,
    )
    .unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(result.version, "v1.0.0");
    assert_eq!(
        result.browser_download_url,
        asset_url("v1.0.0", "app.tar.gz")
    );
}

#[tokio::test]
async fn lenient_parsing_orders_prefixed_tags() {
    let payload = feed(&[
        ("release-1", vec!["app.zip"]),
        ("release-3", vec!["app.zip"]),
    ]);

    let strict_fetcher = StaticFetcher::new(payload.clone());
    let strict_store = MemoryStore::default();
    let strict = ReleaseSelector::new(config(r"\.zip$"), &strict_fetcher, &strict_store)
        .unwrap()
        .select_at(now())
        .await
        .unwrap();

    let lenient_fetcher = StaticFetcher::new(payload);
    let lenient_store = MemoryStore::default();
    let lenient = ReleaseSelector::new(
        QueryConfig {
            lenient_versions: true,
            ..config(r"\.zip$")
        },
        &lenient_fetcher,
        &lenient_store,
    )
    .unwrap()
    .select_at(now())
    .await
    .unwrap();

    // both tags are unparseable in strict mode, so feed order wins
    assert_eq!(strict.version, "release-1");
    assert_eq!(lenient.version, "release-3");
}

#[tokio::test]
async fn no_matching_asset_yields_empty_result() {
    let fetcher = StaticFetcher::new(feed(&[
        ("v2.0.0", vec!["app-v2.0.0.tar.gz"]),
        ("v1.0.0", vec!["app-v1.0.0.tar.gz"]),
    ]));
    let store = MemoryStore::default();

    let selector = ReleaseSelector::new(config(r"\.msi$"), &fetcher, &store).unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(result, SelectionResult::default());
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"version":"","browser_download_url":""}"#
    );
}

#[test]
fn invalid_asset_pattern_fails_before_any_access() {
    let store = MemoryStore::default();

    let result = ReleaseSelector::new(config(r"app-(v2"), UnreachableFetcher, &store);

    assert!(matches!(
        result,
        Err(ConfigError::InvalidPattern {
            kind: PatternKind::Asset,
            ..
        })
    ));
    assert_eq!(store.accesses(), 0);
}

#[test]
fn invalid_exclude_pattern_fails_before_any_access() {
    let store = MemoryStore::default();

    let result = ReleaseSelector::new(
        QueryConfig {
            exclude_patterns: vec!["*rc".to_string()],
            ..config(".*")
        },
        UnreachableFetcher,
        &store,
    );

    assert!(matches!(
        result,
        Err(ConfigError::InvalidPattern {
            kind: PatternKind::Exclude,
            ..
        })
    ));
    assert_eq!(store.accesses(), 0);
}

#[tokio::test]
async fn repeated_runs_are_deterministic() {
    let payload = feed(&[
        ("v1.0.0", vec!["a.zip", "b.zip"]),
        ("v1.0", vec!["c.zip"]),
        ("nightly", vec!["d.zip"]),
        ("v0.9.0", vec!["e.zip"]),
    ]);

    let mut results = Vec::new();
    for _ in 0..3 {
        let fetcher = StaticFetcher::new(payload.clone());
        let store = MemoryStore::default();
        let selector = ReleaseSelector::new(
            QueryConfig {
                disable_cache: true,
                ..config(r"\.zip$")
            },
            &fetcher,
            &store,
        )
        .unwrap();
        results.push(selector.select_at(now()).await.unwrap());
    }

    assert_eq!(results[0], SelectionResult::found("v1.0.0", &asset_url("v1.0.0", "a.zip")));
    assert!(results.iter().all(|r| *r == results[0]));
}

#[tokio::test]
async fn fresh_cache_entry_is_used_instead_of_fetching() {
    let cached = feed(&[("v9.0.0", vec!["app.tar.gz"])]);
    let store = MemoryStore::with_entry(SOURCE, &cached, now() - TimeDelta::minutes(30));

    let selector =
        ReleaseSelector::new(config(r"\.tar\.gz$"), UnreachableFetcher, &store).unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(result.version, "v9.0.0");
}

#[tokio::test]
async fn stale_cache_entry_is_replaced_by_fetched_payload() {
    let fresh = feed(&[("v2.0.0", vec!["app.tar.gz"])]);
    let fetcher = StaticFetcher::new(fresh.clone());
    let store = MemoryStore::with_entry(
        SOURCE,
        &feed(&[("v1.0.0", vec!["app.tar.gz"])]),
        now() - TimeDelta::hours(1),
    );

    let selector = ReleaseSelector::new(config(r"\.tar\.gz$"), &fetcher, &store).unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(result.version, "v2.0.0");
    assert_eq!(fetcher.calls(), 1);

    let entry = store.entry(SOURCE).unwrap();
    assert_eq!(entry.payload, fresh);
    assert_eq!(entry.stored_at, now());
}

#[tokio::test]
async fn disabled_cache_is_neither_read_nor_written() {
    let fetcher = StaticFetcher::new(feed(&[("v2.0.0", vec!["app.tar.gz"])]));
    let store = MemoryStore::with_entry(
        SOURCE,
        &feed(&[("v1.0.0", vec!["app.tar.gz"])]),
        now(),
    );

    let selector = ReleaseSelector::new(
        QueryConfig {
            disable_cache: true,
            ..config(r"\.tar\.gz$")
        },
        &fetcher,
        &store,
    )
    .unwrap();
    let result = selector.select_at(now()).await.unwrap();

    assert_eq!(result.version, "v2.0.0");
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.accesses(), 0);
}

#[tokio::test]
async fn file_cache_serves_second_run_without_fetching() {
    let temp_dir = TempDir::new().unwrap();
    let payload = feed(&[("v1.2.0", vec!["tool-linux.tar.gz"])]);

    let first_fetcher = StaticFetcher::new(payload);
    let first = ReleaseSelector::new(
        QueryConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            ..config("linux")
        },
        &first_fetcher,
        FileCacheStore::new(temp_dir.path()),
    )
    .unwrap()
    .select()
    .await
    .unwrap();

    let second = ReleaseSelector::new(
        QueryConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            ..config("linux")
        },
        UnreachableFetcher,
        FileCacheStore::new(temp_dir.path()),
    )
    .unwrap()
    .select()
    .await
    .unwrap();

    assert_eq!(first_fetcher.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(second.version, "v1.2.0");
}
