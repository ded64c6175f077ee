//! Integration tests for the source engine: dispatch, ranking, admin
//! changes and resolution working together.

mod common;

use std::time::Duration;

use common::{movie, FakeProvider, TestHarness};
use sourcepool::config::{Config, SortKey};
use sourcepool::source::SourceCandidate;
use sourcepool_common::{Direction, Quality, VideoType};

fn urls(candidates: &[SourceCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.url.as_str()).collect()
}

#[tokio::test]
async fn registration_order_decides_ranking() {
    let h = TestHarness::new(vec![
        FakeProvider::new("alpha").sources(&["a1", "a2"]).delay_ms(30),
        FakeProvider::new("bravo").sources(&["b1"]),
    ]);

    // bravo answers first, alpha still ranks first.
    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["a1", "a2", "b1"]);
}

#[tokio::test]
async fn reorder_changes_next_round() {
    let h = TestHarness::new(vec![
        FakeProvider::new("alpha").sources(&["a1"]),
        FakeProvider::new("bravo").sources(&["b1"]),
    ]);

    h.engine
        .registry()
        .reorder("bravo", Direction::Up, "alpha")
        .unwrap();

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["b1", "a1"]);
}

#[tokio::test(start_paused = true)]
async fn deadline_drops_slow_provider() {
    let mut config = Config::default();
    config.dispatch.source_timeout_secs = 1;

    let h = TestHarness::with_config(
        config,
        vec![
            FakeProvider::new("fast").sources(&["f1"]).delay_ms(100),
            FakeProvider::new("slow").sources(&["s1"]).delay_ms(5_000),
        ],
    );

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["f1"]);
    assert_eq!(report.timed_out, vec!["slow"]);
    assert!(report.elapsed >= Duration::from_secs(1));

    let slow = h.engine.stats().get("slow").unwrap();
    assert_eq!((slow.try_count, slow.success_count), (1, 0));
}

#[tokio::test(start_paused = true)]
async fn max_results_stops_early() {
    let mut config = Config::default();
    config.dispatch.max_results = 2;

    let h = TestHarness::with_config(
        config,
        vec![
            FakeProvider::new("one").sources(&["1a", "1b", "1c"]).delay_ms(10),
            FakeProvider::new("two").sources(&["2a"]).delay_ms(10_000),
        ],
    );

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert!(report.early_exit);
    assert_eq!(urls(&report.results), vec!["1a", "1b", "1c"]);
    assert!(report.elapsed < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn early_exit_keeps_slower_higher_priority_candidates() {
    let mut config = Config::default();
    config.dispatch.max_results = 4;

    let h = TestHarness::with_config(
        config,
        vec![
            FakeProvider::new("high").sources(&["h1", "h2", "h3"]).delay_ms(20),
            FakeProvider::new("low").sources(&["l1", "l2", "l3"]).delay_ms(10),
            FakeProvider::new("late").sources(&["x1"]).delay_ms(5_000),
        ],
    );

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert!(report.early_exit);
    assert_eq!(report.succeeded, vec!["low", "high"]);
    assert_eq!(urls(&report.results), vec!["h1", "h2", "h3", "l1", "l2", "l3"]);
}

#[tokio::test]
async fn secondary_keys_follow_config() {
    let mut config = Config::default();
    config.sort.keys = vec![SortKey::Views];

    let h = TestHarness::with_config(
        config,
        vec![FakeProvider::new("alpha").candidates(vec![
            SourceCandidate::new("alpha", "hd").with_quality(Quality::Hd).with_views(1),
            SourceCandidate::new("alpha", "popular").with_quality(Quality::Low).with_views(500),
        ])],
    );

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["popular", "hd"]);
}

#[tokio::test]
async fn unknown_hosts_filtered_when_enabled() {
    let mut config = Config::default();
    config.sort.filter_unknown_hosts = true;
    config.hosts.known = vec!["alpha.example".to_string()];

    let h = TestHarness::with_config(
        config,
        vec![
            FakeProvider::new("alpha").sources(&["a1"]),
            FakeProvider::new("bravo").sources(&["b1"]),
        ],
    );

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["a1"]);
}

#[tokio::test]
async fn failures_do_not_abort_the_round() {
    let h = TestHarness::new(vec![
        FakeProvider::new("broken").failing(),
        FakeProvider::new("working").sources(&["w1"]),
    ]);

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["w1"]);
    assert_eq!(report.failed, vec!["broken"]);

    let overview = h.engine.provider_overview().unwrap();
    let broken = overview.iter().find(|p| p.name == "broken").unwrap();
    assert_eq!((broken.try_count, broken.success_rate), (1, 0));
}

#[tokio::test]
async fn capability_filter_applies() {
    let h = TestHarness::new(vec![
        FakeProvider::new("movies").only(&[VideoType::Movie]).sources(&["m1"]),
        FakeProvider::new("shows").only(&[VideoType::Episode]).sources(&["e1"]),
    ]);

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert_eq!(urls(&report.results), vec!["m1"]);
    assert_eq!(h.engine.stats().get("shows").unwrap().try_count, 0);
}

#[tokio::test(start_paused = true)]
async fn related_urls_cover_every_provider() {
    let mut config = Config::default();
    config.dispatch.source_timeout_secs = 1;

    let h = TestHarness::with_config(
        config,
        vec![
            FakeProvider::new("alpha").url("/movie/bbb"),
            FakeProvider::new("bravo"),
            FakeProvider::new("charlie").url("/late").delay_ms(3_000),
        ],
    );

    let report = h.engine.related_urls(&movie()).await.unwrap();
    let pairs: Vec<_> = report
        .results
        .iter()
        .map(|r| (r.provider.as_str(), r.url.as_deref()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("alpha", Some("/movie/bbb")),
            ("bravo", None),
            ("charlie", None)
        ]
    );
}

#[tokio::test]
async fn auto_play_takes_best_ranked() {
    let h = TestHarness::new(vec![
        FakeProvider::new("alpha").candidates(vec![
            SourceCandidate::new("alpha", "https://alpha.example/part1").multi_part(true),
            SourceCandidate::new("alpha", "https://alpha.example/full"),
        ]),
        FakeProvider::new("bravo").sources(&["https://bravo.example/full"]),
    ]);

    let report = h.engine.get_sources(&movie()).await.unwrap();
    let (candidate, url) = h.engine.auto_play(&report.results).await.unwrap();
    assert_eq!(candidate.provider, "alpha");
    assert_eq!(url, "https://alpha.example/full");
}

#[tokio::test]
async fn disabled_state_persists_in_database() {
    let h = TestHarness::new(vec![FakeProvider::new("alpha").sources(&["a1"])]);
    h.engine.registry().disable("alpha").unwrap();

    let conn = h.db.get().unwrap();
    let row = sourcepool_db::queries::providers::get(&conn, "alpha")
        .unwrap()
        .unwrap();
    assert!(!row.enabled);
    drop(conn);

    let report = h.engine.get_sources(&movie()).await.unwrap();
    assert!(report.results.is_empty());
}
