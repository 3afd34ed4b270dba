use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use tokio::time::Duration;

use super::hotness::{calculate_hotness, rank_clusters};
use crate::article::Article;
use crate::clustering::Cluster;
use crate::market::MarketDataProvider;

const LOOKUP_DEADLINE: Duration = Duration::from_millis(200);

struct StubMarket {
    change: Option<f64>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubMarket {
    fn returning(change: Option<f64>) -> Self {
        StubMarket {
            change,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        StubMarket {
            change: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn recent_change(&self, _ticker: &str) -> Result<Option<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("provider unavailable"));
        }
        Ok(self.change)
    }
}

struct SlowMarket;

#[async_trait]
impl MarketDataProvider for SlowMarket {
    async fn recent_change(&self, _ticker: &str) -> Result<Option<f64>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Some(0.5))
    }
}

fn article(minute_offset: i64, sentiment: Option<f64>) -> Article {
    Article {
        id: None,
        title: "Quarterly results beat expectations".to_string(),
        content: String::new(),
        summary: String::new(),
        published_at: Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
            + ChronoDuration::minutes(minute_offset),
        url: format!("https://example.com/{}", minute_offset),
        source: "Example Wire".to_string(),
        language: None,
        entities: Vec::new(),
        sentiment,
        category: None,
    }
}

fn cluster(id: &str, articles: Vec<Article>, entities: &[&str]) -> Cluster {
    Cluster {
        id: id.to_string(),
        articles,
        entities: entities.iter().map(|e| e.to_string()).collect(),
    }
}

#[test]
fn hotness_matches_reference_scenario() {
    // Three duplicates within one hour, sentiment 0.6, 5% move:
    // 0.5*(3/10) + 0.3*0.8 + 0.2*0.05 = 0.40
    let c = cluster(
        "cluster_0",
        vec![
            article(0, Some(0.6)),
            article(30, Some(0.6)),
            article(60, Some(0.6)),
        ],
        &["XYZ"],
    );

    let hotness = calculate_hotness(&c, 0.05);
    assert!((hotness - 0.40).abs() < 1e-9);
}

#[test]
fn velocity_floor_applies_to_single_articles() {
    // One article, neutral sentiment, no impact:
    // 0.5*(1/10) + 0.3*0.5 + 0 = 0.20
    let c = cluster("singleton_0", vec![article(0, Some(0.0))], &[]);

    let hotness = calculate_hotness(&c, 0.0);
    assert!((hotness - 0.20).abs() < 1e-9);
}

#[test]
fn missing_sentiment_counts_as_neutral() {
    let with_missing = cluster("singleton_0", vec![article(0, None)], &[]);
    let with_zero = cluster("singleton_0", vec![article(0, Some(0.0))], &[]);

    assert_eq!(
        calculate_hotness(&with_missing, 0.0),
        calculate_hotness(&with_zero, 0.0)
    );
}

#[test]
fn hotness_is_clamped_to_one() {
    // 40 articles at the same instant: velocity 40 alone would blow past 1.0.
    let articles: Vec<Article> = (0..40).map(|_| article(0, Some(1.0))).collect();
    let c = cluster("cluster_0", articles, &["XYZ"]);

    let hotness = calculate_hotness(&c, 3.0);
    assert_eq!(hotness, 1.0);
}

#[test]
fn hotness_stays_in_bounds_for_all_neutral_input() {
    let c = cluster("singleton_0", vec![article(0, Some(-1.0))], &[]);

    let hotness = calculate_hotness(&c, 0.0);
    assert!((0.0..=1.0).contains(&hotness));
}

#[tokio::test]
async fn ranking_is_descending_and_stable() {
    let hot = cluster(
        "cluster_0",
        vec![
            article(0, Some(0.8)),
            article(10, Some(0.8)),
            article(20, Some(0.8)),
        ],
        &[],
    );
    // Two structurally identical clusters: equal scores, input order kept.
    let warm_a = cluster("singleton_1", vec![article(0, Some(0.2))], &[]);
    let warm_b = cluster("singleton_2", vec![article(0, Some(0.2))], &[]);
    let cold = cluster("singleton_3", vec![article(0, Some(-0.9))], &[]);

    let market = StubMarket::returning(None);
    let ranked = rank_clusters(vec![cold, warm_a, warm_b, hot], &market, LOOKUP_DEADLINE).await;

    let ids: Vec<&str> = ranked.iter().map(|r| r.cluster.id.as_str()).collect();
    assert_eq!(ids, vec!["cluster_0", "singleton_1", "singleton_2", "singleton_3"]);

    for pair in ranked.windows(2) {
        assert!(pair[0].hotness >= pair[1].hotness);
    }
}

#[tokio::test]
async fn reranking_sorted_input_is_idempotent() {
    let clusters = vec![
        cluster("cluster_0", vec![article(0, Some(0.9))], &[]),
        cluster("singleton_1", vec![article(0, Some(0.1))], &[]),
        cluster("singleton_2", vec![article(0, Some(-0.5))], &[]),
    ];

    let market = StubMarket::returning(None);
    let first = rank_clusters(clusters, &market, LOOKUP_DEADLINE).await;
    let order: Vec<String> = first.iter().map(|r| r.cluster.id.clone()).collect();

    let again = rank_clusters(
        first.into_iter().map(|r| r.cluster).collect(),
        &market,
        LOOKUP_DEADLINE,
    )
    .await;
    let order_again: Vec<String> = again.iter().map(|r| r.cluster.id.clone()).collect();

    assert_eq!(order, order_again);
}

#[tokio::test]
async fn market_failure_degrades_to_zero_impact() {
    let c = cluster("cluster_0", vec![article(0, Some(0.6))], &["XYZ"]);

    let market = StubMarket::failing();
    let ranked = rank_clusters(vec![c.clone()], &market, LOOKUP_DEADLINE).await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].hotness, calculate_hotness(&c, 0.0));
}

#[tokio::test]
async fn missing_market_data_is_not_an_error() {
    let c = cluster("cluster_0", vec![article(0, Some(0.6))], &["UNKNOWN"]);

    let market = StubMarket::returning(None);
    let ranked = rank_clusters(vec![c.clone()], &market, LOOKUP_DEADLINE).await;

    assert_eq!(ranked[0].hotness, calculate_hotness(&c, 0.0));
}

#[tokio::test]
async fn clusters_without_entities_skip_the_lookup() {
    let c = cluster("singleton_0", vec![article(0, None)], &[]);

    let market = StubMarket::returning(Some(0.5));
    rank_clusters(vec![c], &market, LOOKUP_DEADLINE).await;

    assert_eq!(market.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_lookups_hit_the_deadline_and_score_zero() {
    let c = cluster("cluster_0", vec![article(0, Some(0.0))], &["XYZ"]);

    let ranked = rank_clusters(vec![c.clone()], &SlowMarket, Duration::from_millis(20)).await;

    assert_eq!(ranked[0].hotness, calculate_hotness(&c, 0.0));
}

#[tokio::test]
async fn empty_cluster_list_yields_empty_ranking() {
    let market = StubMarket::returning(None);
    let ranked = rank_clusters(Vec::new(), &market, LOOKUP_DEADLINE).await;
    assert!(ranked.is_empty());
}
