//! # Interaction Flows
//!
//! Likes, comments and downloads on stores handed out by a loaded feed.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_pending, assert_ready};

    use crate::fixtures::{post_json, TestClient};
    use feed_sync::{
        DownloadResult, FeedClientConfig, FeedCoordinator, FeedError, FsAssetSink, GatewayError,
        InMemoryCredentials, IntentOutcome, LikeFailurePolicy, MockApiGateway,
        RecordingNavigator, SkipReason, StoreDeps,
    };

    async fn loaded(config: FeedClientConfig, post: serde_json::Value) -> TestClient {
        let client = TestClient::signed_in(config);
        client.gateway.respond("fetch_posts", Ok(json!([post])));
        client.feed.load().await.unwrap();
        client
    }

    fn server_error() -> GatewayError {
        GatewayError::Rejected {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    }

    // =========================================================================
    // COMMENTS
    // =========================================================================

    #[tokio::test]
    async fn test_comment_scenario() {
        let client = loaded(FeedClientConfig::for_testing(), post_json("p1", "hello")).await;
        let store = client.store("p1").unwrap();
        client.gateway.respond(
            "create_comment",
            Ok(json!({"id": 5, "author": {"username": "ada"}, "content": "nice!"})),
        );

        assert_eq!(
            store.submit_comment("  ").await,
            IntentOutcome::Skipped(SkipReason::EmptyComment)
        );
        assert_eq!(client.gateway.call_count("create_comment"), 0);

        store.set_draft("nice!");
        assert!(store.submit_draft().await.is_applied());
        let view = store.view();
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].content, "nice!");
        assert_eq!(view.draft_text, "");
    }

    #[test]
    fn test_comment_while_submitting_issues_no_call() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("fetch_posts", Ok(json!([post_json("p1", "hello")])));
        let mut load = tokio_test::task::spawn(client.feed.load());
        assert!(assert_ready!(load.poll()).is_ok());
        drop(load);

        let store = client.store("p1").unwrap();
        let gate = client
            .gateway
            .respond_held("create_comment", Ok(json!({"id": 1, "content": "a"})));

        let mut first = tokio_test::task::spawn(store.submit_comment("a"));
        assert_pending!(first.poll());
        let mut second = tokio_test::task::spawn(store.submit_comment("b"));
        assert!(assert_ready!(second.poll()).is_skipped());

        gate.release();
        assert!(assert_ready!(first.poll()).is_applied());
        assert_eq!(client.gateway.call_count("create_comment"), 1);
        assert_eq!(store.view().comments.len(), 1);
    }

    // =========================================================================
    // LIKE FAILURE POLICY
    // =========================================================================

    #[tokio::test]
    async fn test_like_failure_reverts_with_default_config() {
        let client = loaded(FeedClientConfig::for_testing(), post_json("p1", "hello")).await;
        let store = client.store("p1").unwrap();
        client.gateway.respond("create_like", Err(server_error()));

        assert!(matches!(
            store.like().await,
            IntentOutcome::Failed(FeedError::RejectedByServer { status: 500, .. })
        ));
        let view = store.view();
        assert_eq!((view.like_count, view.has_liked, view.can_like), (0, false, true));
        assert!(view.last_error.is_some());
    }

    #[tokio::test]
    async fn test_like_failure_kept_when_configured() {
        let config = FeedClientConfig {
            like_failure_policy: LikeFailurePolicy::Keep,
            ..FeedClientConfig::for_testing()
        };
        let client = loaded(config, post_json("p1", "hello")).await;
        let store = client.store("p1").unwrap();
        client.gateway.respond("create_like", Err(server_error()));

        assert!(matches!(store.like().await, IntentOutcome::Failed(_)));
        let view = store.view();
        assert_eq!((view.like_count, view.has_liked), (1, true));
    }

    #[tokio::test]
    async fn test_like_and_comment_in_flight_together() {
        let client = loaded(FeedClientConfig::for_testing(), post_json("p1", "hello")).await;
        let store = client.store("p1").unwrap();
        client.gateway.respond("create_like", Ok(json!({})));
        client
            .gateway
            .respond("create_comment", Ok(json!({"id": 2, "content": "hey"})));

        let (like, comment) = tokio::join!(store.like(), store.submit_comment("hey"));
        assert!(like.is_applied());
        assert!(comment.is_applied());
        let view = store.view();
        assert_eq!((view.like_count, view.comments.len()), (1, 1));
    }

    // =========================================================================
    // DOWNLOAD
    // =========================================================================

    #[tokio::test]
    async fn test_download_falls_back_then_fails() {
        let client = loaded(
            FeedClientConfig::for_testing(),
            json!({"id": "p1", "image": "/media/cat.jpg"}),
        )
        .await;
        let store = client.store("p1").unwrap();
        client
            .gateway
            .respond_asset(Err(GatewayError::Network("offline".to_string())));
        client.assets.fail_opens();

        let outcome = store.download_affordance().unwrap().download().await;
        assert!(matches!(outcome, IntentOutcome::Failed(FeedError::Asset(_))));
        assert!(store.view().last_error.is_some());
        assert!(!store.view().is_downloading);
    }

    #[tokio::test]
    async fn test_download_save_failure_opens_externally() {
        let client = loaded(
            FeedClientConfig::for_testing(),
            json!({"id": "p1", "image": "https://cdn.test/cat.jpg"}),
        )
        .await;
        let store = client.store("p1").unwrap();
        client.gateway.respond_asset(Ok(vec![0xFF, 0xD8]));
        client.assets.fail_saves();

        let outcome = store.download_affordance().unwrap().download().await;
        assert_eq!(
            outcome,
            IntentOutcome::Applied(DownloadResult::OpenedExternally {
                uri: "https://cdn.test/cat.jpg".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_download_to_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(MockApiGateway::new());
        let deps = StoreDeps {
            gateway: gateway.clone(),
            credentials: Arc::new(InMemoryCredentials::signed_in("t")),
            assets: Arc::new(FsAssetSink::new(dir.path())),
        };
        let feed = FeedCoordinator::new(
            &FeedClientConfig::for_testing(),
            deps,
            Arc::new(RecordingNavigator::new()),
        );
        gateway.respond(
            "fetch_posts",
            Ok(json!([{"id": 9, "image": "media/posts/dog.png"}])),
        );
        gateway.respond_asset(Ok(vec![1, 2, 3, 4]));

        feed.load().await.unwrap();
        let store = feed.store(&feed_sync::PostId::new("9")).unwrap();
        let affordance = store.download_affordance().unwrap();
        assert_eq!(affordance.uri(), "http://feed.test/media/posts/dog.png");

        match affordance.download().await {
            IntentOutcome::Applied(DownloadResult::Saved(saved)) => {
                assert_eq!(saved.file_name, "dog.png");
                assert_eq!(std::fs::read(dir.path().join("dog.png")).unwrap(), vec![1, 2, 3, 4]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_image_no_affordance() {
        let client = loaded(FeedClientConfig::for_testing(), post_json("p1", "hello")).await;
        assert!(client.store("p1").unwrap().download_affordance().is_none());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    fn run<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn prop_like_calls_stop_after_first_success(
            initial in 0u64..1000,
            results in prop::collection::vec(any::<bool>(), 1..12),
            keep in any::<bool>(),
        ) {
            let policy = if keep { LikeFailurePolicy::Keep } else { LikeFailurePolicy::Revert };
            let config = FeedClientConfig { like_failure_policy: policy, ..FeedClientConfig::for_testing() };
            let client = TestClient::signed_in(config);
            client.gateway.respond("fetch_posts", Ok(json!([{"id": "p", "likes_count": initial}])));
            for ok in &results {
                let result = if *ok { Ok(json!({})) } else { Err(server_error()) };
                client.gateway.respond("create_like", result);
            }

            let (expected_calls, calls, view) = run(async {
                client.feed.load().await.unwrap();
                let store = client.store("p").unwrap();
                let mut expected_calls = 0;
                let mut liked = false;
                for ok in &results {
                    let outcome = store.like().await;
                    if liked {
                        assert!(outcome.is_skipped());
                        continue;
                    }
                    expected_calls += 1;
                    liked = *ok || keep;
                    let view = store.view();
                    assert!(view.like_count == initial || view.like_count == initial + 1);
                    assert_eq!(view.has_liked, view.like_count == initial + 1);
                }
                (expected_calls, client.gateway.call_count("create_like"), store.view())
            });

            prop_assert_eq!(calls, expected_calls);
            let liked_now = results.iter().any(|ok| *ok) || keep;
            prop_assert_eq!(view.has_liked, liked_now);
            prop_assert_eq!(view.like_count, initial + u64::from(liked_now));
        }

        #[test]
        fn prop_comments_append_only_for_accepted_text(
            texts in prop::collection::vec("[ a-z!]{0,8}", 1..10),
        ) {
            let client = TestClient::signed_in(FeedClientConfig::for_testing());
            client.gateway.respond("fetch_posts", Ok(json!([{"id": "p"}])));
            client.gateway.respond_always("create_comment", Ok(json!({})));

            let (contents, calls) = run(async {
                client.feed.load().await.unwrap();
                let store = client.store("p").unwrap();
                for text in &texts {
                    store.submit_comment(text).await;
                }
                let contents: Vec<String> =
                    store.view().comments.into_iter().map(|c| c.content).collect();
                (contents, client.gateway.call_count("create_comment"))
            });

            let expected: Vec<String> = texts
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            prop_assert_eq!(calls, expected.len());
            prop_assert_eq!(contents, expected);
        }
    }
}
