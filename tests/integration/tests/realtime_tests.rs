//! Live reaction updates through the API, Redis and the realtime gateway
//!
//! Require PostgreSQL and Redis (`DATABASE_URL`, `REDIS_URL`, `JWT_SECRET`).
//!
//! Run with: cargo test -p integration-tests --test realtime_tests

use std::sync::Arc;
use std::time::Duration;

use hearth_client::{
    HttpGateway, LoadStatus, ReactionAggregateCache, ReactionToggleController, ReactionView,
    RemoteGateway, Session, ToggleOutcome,
};
use hearth_core::{ReactionKind, Snowflake};
use integration_tests::{assert_json, check_test_env, fixtures::*, TestServer};
use reqwest::StatusCode;
use tokio::sync::watch;

async fn signed_in(gateway: &HttpGateway) -> Session {
    let request = SignUpRequest::unique();
    gateway
        .sign_up(&request.email, &request.password, &request.display_name)
        .await
        .expect("sign-up failed")
}

async fn wait_for_view(
    updates: &mut watch::Receiver<ReactionView>,
    matches: impl FnMut(&ReactionView) -> bool,
) -> ReactionView {
    tokio::time::timeout(Duration::from_secs(5), updates.wait_for(matches))
        .await
        .expect("timed out waiting for reaction view")
        .expect("cache dropped")
        .clone()
}

#[tokio::test]
async fn test_reaction_reaches_other_viewer() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let http = Arc::new(HttpGateway::new(server.api_url(), server.realtime_url()).unwrap());
    let gateway: Arc<dyn RemoteGateway> = http.clone();

    let author = signed_in(&http).await;
    let viewer = signed_in(&http).await;
    let token = author.principal().map(|p| p.access_token.clone()).unwrap();
    let story: StoryResponse = assert_json(
        server
            .post_auth("/stories", &token, &CreateStoryRequest::public("Someone is listening."))
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await
    .unwrap();
    let story_id: Snowflake = story.id.parse().unwrap();

    let watcher = ReactionAggregateCache::mount(gateway.clone(), viewer.clone(), story_id).await;
    let mut updates = watcher.updates();
    wait_for_view(&mut updates, |v| v.status == LoadStatus::Ready).await;
    assert!(watcher.is_listening());

    let author_cache = ReactionAggregateCache::mount(gateway.clone(), author.clone(), story_id).await;
    let mut author_updates = author_cache.updates();
    wait_for_view(&mut author_updates, |v| v.status == LoadStatus::Ready).await;
    // SUBSCRIBE frames are fire-and-forget; give the gateway a moment to register them.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let controller = ReactionToggleController::new(gateway.clone(), author.clone());
    assert_eq!(
        controller.toggle(&author_cache, ReactionKind::Heart).await,
        ToggleOutcome::Added
    );

    let view = wait_for_view(&mut updates, |v| v.tally.count(ReactionKind::Heart) == 1).await;
    assert!(!view.tally.is_active(ReactionKind::Heart));

    let view = wait_for_view(&mut author_updates, |v| v.tally.is_active(ReactionKind::Heart)).await;
    assert_eq!(view.tally.count(ReactionKind::Heart), 1);

    assert_eq!(
        controller.toggle(&author_cache, ReactionKind::Heart).await,
        ToggleOutcome::Removed
    );
    wait_for_view(&mut updates, |v| v.tally.count(ReactionKind::Heart) == 0).await;

    watcher.unmount();
    author_cache.unmount();
}

#[tokio::test]
async fn test_anonymous_toggle_asks_to_sign_in() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let http = Arc::new(HttpGateway::new(server.api_url(), server.realtime_url()).unwrap());
    let gateway: Arc<dyn RemoteGateway> = http.clone();

    let author = signed_in(&http).await;
    let token = author.principal().map(|p| p.access_token.clone()).unwrap();
    let story: StoryResponse = assert_json(
        server
            .post_auth("/stories", &token, &CreateStoryRequest::public("Quiet story"))
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await
    .unwrap();
    let story_id: Snowflake = story.id.parse().unwrap();

    let cache = ReactionAggregateCache::new(gateway.clone(), Session::Anonymous, story_id);
    let controller = ReactionToggleController::new(gateway, Session::Anonymous);
    let outcome = controller.toggle(&cache, ReactionKind::Hope).await;
    assert!(matches!(outcome, ToggleOutcome::Notice(_)));

    let rows = http.list_reactions(story_id).await.unwrap();
    assert!(rows.is_empty());
    cache.unmount();
}
