//! # Session Flows
//!
//! Logout and the post composer as seen from the feed.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::fixtures::{post_json, TestClient};
    use feed_sync::{FeedClientConfig, FeedError, FeedPhase, PostId, Route};

    #[tokio::test]
    async fn test_logout_then_load_redirects_to_sign_up() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("fetch_posts", Ok(json!([post_json("1", "a")])));
        client.feed.load().await.unwrap();
        assert!(client.session.is_authenticated());

        client.session.logout();
        assert!(!client.session.is_authenticated());
        assert!(client.store("1").is_none());
        assert_eq!(client.feed.phase(), FeedPhase::Idle);
        assert_eq!(client.navigator.last(), Some(Route::Login));

        assert_eq!(client.feed.load().await, Err(FeedError::NoCredential));
        assert_eq!(client.navigator.last(), Some(Route::SignUp));
        assert_eq!(client.gateway.call_count("fetch_posts"), 1);
    }

    #[test]
    fn test_logout_discards_load_in_flight() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        let gate = client
            .gateway
            .respond_held("fetch_posts", Ok(json!([post_json("1", "a")])));

        let mut load = tokio_test::task::spawn(client.feed.load());
        tokio_test::assert_pending!(load.poll());

        client.session.logout();
        gate.release();
        let report = tokio_test::assert_ready!(load.poll()).unwrap();
        assert!(!report.is_applied());
        assert!(client.feed.stores().is_empty());
        assert_eq!(client.feed.phase(), FeedPhase::Idle);
    }

    #[tokio::test]
    async fn test_composer_without_credential_goes_to_login() {
        let client = TestClient::anonymous(FeedClientConfig::for_testing());
        assert_eq!(
            client.composer().create("hello").await,
            Err(FeedError::NoCredential)
        );
        assert_eq!(client.navigator.routes(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_created_post_appears_after_reload() {
        let client = TestClient::signed_in(FeedClientConfig::for_testing());
        client
            .gateway
            .respond("create_post", Ok(post_json("new", "fresh post")));
        client.gateway.respond(
            "fetch_posts",
            Ok(json!([post_json("new", "fresh post"), post_json("1", "a")])),
        );

        let post = client.composer().create("fresh post").await.unwrap();
        assert_eq!(client.navigator.last(), Some(Route::Feed));

        client.feed.load().await.unwrap();
        assert_eq!(client.feed.stores()[0].id(), &post.id);
        assert_eq!(post.id, PostId::new("new"));
    }
}
