//! # Feed Flows
//!
//! Loading, retrying and reloading the feed through the coordinator, with
//! the stores it hands out.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready};

    use crate::fixtures::{post_json, TestClient};
    use feed_sync::{
        CommentId, FeedApi, FeedClientConfig, FeedError, FeedPhase, GatewayError, LoadOutcome,
        PostId, Route,
    };

    // =========================================================================
    // LOAD
    // =========================================================================

    #[tokio::test]
    async fn test_like_scenario_through_loaded_feed() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("fetch_posts", Ok(json!([post_json("p1", "hello")])));
        client.gateway.respond("create_like", Ok(json!({"id": 1})));

        client.feed.load().await.unwrap();
        let store = client.store("p1").unwrap();
        assert_eq!(store.view().post.content, "hello");

        assert!(store.like().await.is_applied());
        let view = store.view();
        assert_eq!((view.like_count, view.has_liked), (1, true));

        assert!(store.like().await.is_skipped());
        let view = store.view();
        assert_eq!((view.like_count, view.has_liked), (1, true));
        assert_eq!(client.gateway.call_count("create_like"), 1);
    }

    #[tokio::test]
    async fn test_load_without_credential_goes_to_sign_up() {
        let client = TestClient::anonymous(FeedClientConfig::for_testing());

        assert_eq!(client.feed.load().await, Err(FeedError::NoCredential));
        assert_eq!(client.feed.phase(), FeedPhase::SignUpRequired);
        assert_eq!(client.navigator.routes(), vec![Route::SignUp]);
        assert!(client.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_paginated_envelope_and_bad_entries() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client.gateway.respond(
            "fetch_posts",
            Ok(json!({"results": [post_json("1", "a"), {"content": "no id"}, "junk", post_json("2", "b")]})),
        );

        client.feed.load().await.unwrap();
        assert_eq!(
            client.feed.post_ids(),
            vec![PostId::new("1"), PostId::new("2")]
        );
    }

    #[tokio::test]
    async fn test_failed_load_keeps_posts_then_retry() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("fetch_posts", Ok(json!([post_json("1", "a")])));
        client.gateway.respond(
            "fetch_posts",
            Err(GatewayError::Rejected {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
        );
        client.gateway.respond(
            "fetch_posts",
            Ok(json!([post_json("2", "b"), post_json("1", "a")])),
        );

        client.feed.load().await.unwrap();
        let store_before = client.store("1").unwrap();

        assert!(client.feed.load().await.is_err());
        match client.feed.phase() {
            FeedPhase::Errored { error, retryable } => {
                assert!(retryable);
                assert_eq!(
                    error,
                    FeedError::RejectedByServer {
                        status: 503,
                        message: "Service Unavailable".to_string()
                    }
                );
            }
            other => panic!("unexpected phase: {other:?}"),
        }
        assert!(std::sync::Arc::ptr_eq(&store_before, &client.store("1").unwrap()));

        client.feed.retry().await.unwrap();
        assert_eq!(client.feed.phase(), FeedPhase::Loaded);
        assert_eq!(
            client.feed.post_ids(),
            vec![PostId::new("2"), PostId::new("1")]
        );
        assert_eq!(client.gateway.call_count("fetch_posts"), 3);
    }

    #[tokio::test]
    async fn test_retry_from_idle_loads() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client.gateway.respond("fetch_posts", Ok(json!([])));

        let report = client.feed.retry().await.unwrap();
        assert_eq!(report.outcome, LoadOutcome::Applied { post_count: 0 });
        assert!(client.feed.is_empty());
    }

    // =========================================================================
    // OVERLAPPING LOADS
    // =========================================================================

    #[test]
    fn test_first_load_resolving_last_is_discarded() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        let slow = client
            .gateway
            .respond_held("fetch_posts", Ok(json!([post_json("stale", "old")])));
        let fast = client
            .gateway
            .respond_held("fetch_posts", Ok(json!([post_json("fresh", "new")])));

        let mut first = tokio_test::task::spawn(client.feed.load());
        let mut second = tokio_test::task::spawn(client.feed.load());
        assert_pending!(first.poll());
        assert_pending!(second.poll());

        fast.release();
        assert!(assert_ready!(second.poll()).unwrap().is_applied());
        slow.release();
        assert_eq!(
            assert_ready!(first.poll()).unwrap().outcome,
            LoadOutcome::Superseded
        );

        assert_eq!(client.feed.post_ids(), vec![PostId::new("fresh")]);
        assert!(client.store("stale").is_none());
    }

    #[test]
    fn test_loads_resolving_in_order_both_apply() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        let a = client
            .gateway
            .respond_held("fetch_posts", Ok(json!([post_json("a", "1")])));
        let b = client
            .gateway
            .respond_held("fetch_posts", Ok(json!([post_json("b", "2")])));

        let mut first = tokio_test::task::spawn(client.feed.load());
        let mut second = tokio_test::task::spawn(client.feed.load());
        assert_pending!(first.poll());
        assert_pending!(second.poll());

        a.release();
        assert!(assert_ready!(first.poll()).unwrap().is_applied());
        assert_eq!(client.feed.post_ids(), vec![PostId::new("a")]);

        b.release();
        assert!(assert_ready!(second.poll()).unwrap().is_applied());
        assert_eq!(client.feed.post_ids(), vec![PostId::new("b")]);
    }

    // =========================================================================
    // RELOAD
    // =========================================================================

    #[tokio::test]
    async fn test_reload_replaces_pending_comment_ids() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("fetch_posts", Ok(json!([post_json("1", "a")])));
        client
            .gateway
            .respond("create_comment", Ok(json!({"content": "first!"})));
        client.gateway.respond(
            "fetch_posts",
            Ok(json!([{
                "id": "1",
                "content": "a",
                "comments": [{"id": 77, "author": "bo", "content": "first!"}]
            }])),
        );

        client.feed.load().await.unwrap();
        let store = client.store("1").unwrap();
        assert!(store.submit_comment("first!").await.is_applied());
        assert!(matches!(store.view().comments[0].id, CommentId::Pending(_)));

        client.feed.load().await.unwrap();
        let comments = client.store("1").unwrap().view().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, CommentId::Confirmed("77".to_string()));
    }

    #[tokio::test]
    async fn test_load_hydrates_like_state_for_current_user() {
        let config = FeedClientConfig {
            hydrate_likes: true,
            ..FeedClientConfig::for_testing()
        };
        let client = TestClient::signed_in(config);
        client.gateway.respond(
            "fetch_posts",
            Ok(json!([post_json("1", "a"), post_json("2", "b")])),
        );
        client
            .gateway
            .respond("current_user", Ok(json!({"id": 3, "username": "ada"})));
        client
            .gateway
            .respond_always("query_likes", Ok(json!([{"user": 3, "post": 1}])));
        client.gateway.respond("create_like", Ok(json!({})));

        client.feed.load().await.unwrap();
        let liked = client.store("1").unwrap();
        let unliked = client.store("2").unwrap();
        assert!(liked.view().has_liked);
        assert!(!unliked.view().has_liked);

        assert!(liked.like().await.is_skipped());
        assert!(unliked.like().await.is_applied());
        assert_eq!(client.gateway.call_count("create_like"), 1);
    }
}
