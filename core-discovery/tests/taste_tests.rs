//! Integration tests for tag aggregation

mod common;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::music::{Tag, TaggingServiceClient};
use common::seed;
use core_discovery::TagAggregator;
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

mock! {
    Tagging {}

    #[async_trait]
    impl TaggingServiceClient for Tagging {
        async fn top_tags_for_artist(&self, artist_name: &str) -> BridgeResult<Vec<Tag>>;
    }
}

fn tags(values: &[&str]) -> Vec<Tag> {
    values.iter().map(|v| v.to_string()).collect()
}

fn aggregator(mock: MockTagging) -> TagAggregator {
    TagAggregator::new(Arc::new(mock), Duration::from_secs(2))
}

#[tokio::test]
async fn test_tie_break_follows_first_seen_order() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .times(2)
        .returning(|artist| match artist {
            "A" => Ok(tags(&["rock", "pop"])),
            "B" => Ok(tags(&["pop", "jazz"])),
            _ => Ok(Vec::new()),
        });

    let result = aggregator(mock)
        .aggregate(&[seed("One", "A"), seed("Two", "B")], 30)
        .await;

    assert_eq!(result, tags(&["pop", "rock", "jazz"]));
}

#[tokio::test]
async fn test_tags_are_case_folded_before_counting() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .returning(|artist| match artist {
            "A" => Ok(tags(&["Indie", "Electronic"])),
            "B" => Ok(tags(&["electronic", " INDIE "])),
            _ => Ok(tags(&["ELECTRONIC"])),
        });

    let tally = aggregator(mock)
        .tally(&[seed("1", "A"), seed("2", "B"), seed("3", "C")])
        .await;

    assert_eq!(tally.count("electronic"), 3);
    assert_eq!(tally.count("indie"), 2);
    assert_eq!(tally.top(1), tags(&["electronic"]));
}

#[tokio::test]
async fn test_failed_seed_contributes_nothing() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .returning(|artist| match artist {
            "Broken" => Err(BridgeError::Http {
                status: 500,
                message: "tagging down".to_string(),
            }),
            _ => Ok(tags(&["shoegaze"])),
        });

    let result = aggregator(mock)
        .aggregate(&[seed("1", "Broken"), seed("2", "Fine")], 30)
        .await;

    assert_eq!(result, tags(&["shoegaze"]));
}

#[tokio::test]
async fn test_every_seed_failing_yields_empty_profile() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .returning(|_| Err(BridgeError::OperationFailed("offline".to_string())));

    let result = aggregator(mock)
        .aggregate(&[seed("1", "A"), seed("2", "B")], 30)
        .await;

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_empty_seed_list_makes_no_calls() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist().never();

    assert!(aggregator(mock).aggregate(&[], 30).await.is_empty());
}

#[tokio::test]
async fn test_repeated_artist_is_queried_per_seed() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .times(3)
        .returning(|artist| match artist {
            "Frequent" => Ok(tags(&["dream pop"])),
            _ => Ok(tags(&["metal", "doom"])),
        });

    let tally = aggregator(mock)
        .tally(&[
            seed("1", "Frequent"),
            seed("2", "Other"),
            seed("3", "Frequent"),
        ])
        .await;

    assert_eq!(tally.count("dream pop"), 2);
    assert_eq!(tally.total(), 4);
    assert_eq!(tally.top(3), tags(&["dream pop", "metal", "doom"]));
}

#[tokio::test]
async fn test_result_is_truncated_to_top_n() {
    let mut mock = MockTagging::new();
    mock.expect_top_tags_for_artist()
        .returning(|_| Ok((0..50).map(|i| format!("tag {}", i)).collect()));

    let result = aggregator(mock).aggregate(&[seed("1", "A")], 30).await;

    assert_eq!(result.len(), 30);
    assert_eq!(result[0], "tag 0");
    assert_eq!(result[29], "tag 29");
}

struct SlowTagging;

#[async_trait]
impl TaggingServiceClient for SlowTagging {
    async fn top_tags_for_artist(&self, artist_name: &str) -> BridgeResult<Vec<Tag>> {
        if artist_name == "Slow" {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        Ok(tags(&["ambient"]))
    }
}

#[tokio::test]
async fn test_timed_out_seed_is_skipped() {
    let aggregator = TagAggregator::new(Arc::new(SlowTagging), Duration::from_millis(50));

    let tally = aggregator
        .tally(&[seed("1", "Slow"), seed("2", "Quick")])
        .await;

    assert_eq!(tally.count("ambient"), 1);
}

#[tokio::test]
async fn test_concurrent_lookups_keep_seed_order() {
    struct StaggeredTagging;

    #[async_trait]
    impl TaggingServiceClient for StaggeredTagging {
        async fn top_tags_for_artist(&self, artist_name: &str) -> BridgeResult<Vec<Tag>> {
            // The first artist answers last
            let delay = if artist_name == "First" { 60 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(tags(&[artist_name]))
        }
    }

    let aggregator =
        TagAggregator::new(Arc::new(StaggeredTagging), Duration::from_secs(2)).with_concurrency(4);

    let result = aggregator
        .aggregate(&[seed("1", "First"), seed("2", "Second"), seed("3", "Third")], 30)
        .await;

    assert_eq!(result, tags(&["first", "second", "third"]));
}
