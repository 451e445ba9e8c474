//! REST API end-to-end tests
//!
//! Require PostgreSQL and Redis (`DATABASE_URL`, `REDIS_URL`, `JWT_SECRET`).
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, check_test_env, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn sign_up(server: &TestServer) -> AuthResponse {
    let response = server
        .post("/auth/sign-up", &SignUpRequest::unique())
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn create_story(server: &TestServer, token: &str, request: &CreateStoryRequest) -> StoryResponse {
    let response = server.post_auth("/stories", token, request).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let body: Value = assert_json(server.get("/health").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let body: Value = assert_json(server.get("/health/ready").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body["checks"]["database"], true);
    assert_eq!(body["checks"]["redis"], true);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_sign_up_and_sign_in() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignUpRequest::unique();
    let response = server.post("/auth/sign-up", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(auth.user.display_name, request.display_name);
    assert!(!auth.access_token.is_empty());

    let response = server
        .post("/auth/sign-in", &SignInRequest::from_sign_up(&request))
        .await
        .unwrap();
    let signed_in: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(signed_in.user.id, auth.user.id);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignUpRequest::unique();
    server.post("/auth/sign-up", &request).await.unwrap();

    let response = server.post("/auth/sign-up", &request).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignUpRequest::unique();
    server.post("/auth/sign-up", &request).await.unwrap();

    let response = server
        .post(
            "/auth/sign-in",
            &SignInRequest {
                email: request.email.clone(),
                password: "not-the-password".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_admin_sign_in_requires_role() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignUpRequest::unique();
    let auth: AuthResponse =
        assert_json(server.post("/auth/sign-up", &request).await.unwrap(), StatusCode::CREATED)
            .await
            .unwrap();

    let credentials = SignInRequest::from_sign_up(&request);
    let response = server.post("/auth/admin/sign-in", &credentials).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    server
        .grant_role(auth.user.id.parse().unwrap(), hearth_core::RoleName::admin())
        .await
        .unwrap();
    let response = server.post("/auth/admin/sign-in", &credentials).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = sign_up(&server).await;
    let body = json!({ "refresh_token": auth.refresh_token });

    let response = server.post("/auth/refresh", &body).await.unwrap();
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.refresh_token, auth.refresh_token);

    let response = server.post("/auth/refresh", &body).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_me_requires_auth() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/users/@me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Stories
// ============================================================================

#[tokio::test]
async fn test_anonymous_story_hides_author() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = sign_up(&server).await;
    let mut request = CreateStoryRequest::public("I walked by the sea today.");
    request.is_anonymous = true;
    let story = create_story(&server, &auth.access_token, &request).await;

    let fetched: StoryResponse = assert_json(
        server.get(&format!("/stories/{}", story.id)).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(fetched.is_anonymous);
    assert!(fetched.author_id.is_none());
}

#[tokio::test]
async fn test_private_draft_visible_only_to_author() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let reader = sign_up(&server).await;
    let mut request = CreateStoryRequest::public("Not ready yet.");
    request.is_public = false;
    let story = create_story(&server, &author.access_token, &request).await;
    let path = format!("/stories/{}", story.id);

    let response = server.get(&path).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
    let response = server.get_auth(&path, &reader.access_token).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
    let response = server.get_auth(&path, &author.access_token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_only_author_edits() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let other = sign_up(&server).await;
    let story = create_story(&server, &author.access_token, &CreateStoryRequest::public("First draft")).await;
    let path = format!("/stories/{}", story.id);
    let edit = json!({ "content": "Second draft" });

    let response = server.patch_auth(&path, &other.access_token, &edit).await.unwrap();
    assert!(response.status().is_client_error());

    let response = server.patch_auth(&path, &author.access_token, &edit).await.unwrap();
    let updated: StoryResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.content, "Second draft");
}

#[tokio::test]
async fn test_view_counter_increments() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let story = create_story(&server, &author.access_token, &CreateStoryRequest::public("Counted")).await;
    let path = format!("/stories/{}/views", story.id);

    server.post(&path, &json!({})).await.unwrap();
    let body: Value = assert_json(server.post(&path, &json!({})).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body["view_count"], 2);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_insert_and_delete() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let reader = sign_up(&server).await;
    let story = create_story(&server, &author.access_token, &CreateStoryRequest::public("React to me")).await;
    let reaction = format!("/stories/{}/reactions/heart/@me", story.id);

    let response = server.put_auth(&reaction, &reader.access_token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    // Repeating the insert leaves one row.
    server.put_auth(&reaction, &reader.access_token).await.unwrap();

    let rows: Vec<ReactionResponse> = assert_json(
        server.get(&format!("/stories/{}/reactions", story.id)).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "heart");
    assert_eq!(rows[0].user_id, reader.user.id);

    let summary: Value = assert_json(
        server
            .get_auth(&format!("/stories/{}/reactions/summary", story.id), &reader.access_token)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(summary["total"], 1);

    let response = server.delete_auth(&reaction, &reader.access_token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    let rows: Vec<ReactionResponse> = assert_json(
        server.get(&format!("/stories/{}/reactions", story.id)).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unknown_reaction_kind_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let story = create_story(&server, &author.access_token, &CreateStoryRequest::public("Kinds")).await;

    let response = server
        .put_auth(&format!("/stories/{}/reactions/laugh/@me", story.id), &author.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_reaction_requires_auth() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let story = create_story(&server, &author.access_token, &CreateStoryRequest::public("Auth")).await;

    let response = server
        .client
        .put(format!("{}/stories/{}/reactions/hope/@me", server.api_url(), story.id))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Mood tags, RPC, admin
// ============================================================================

#[tokio::test]
async fn test_mood_match_and_dashboard() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = sign_up(&server).await;
    server
        .grant_role(admin.user.id.parse().unwrap(), hearth_core::RoleName::admin())
        .await
        .unwrap();

    let mood = format!("hopeful{}", integration_tests::unique_suffix() % 100_000);
    let response = server
        .post_auth(
            "/mood-tags",
            &admin.access_token,
            &json!({ "name": mood, "description": "Looking ahead", "color": "#f6c177" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let reader = sign_up(&server).await;
    let response = server
        .post_auth("/mood-tags", &reader.access_token, &json!({ "name": "nope", "color": "#000000" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let mut request = CreateStoryRequest::public("Tomorrow will be kinder.");
    request.emotion_tags = vec![mood.clone()];
    let story = create_story(&server, &reader.access_token, &request).await;

    let matched: Value = assert_json(
        server
            .post("/rpc/match_stories_by_moods", &json!({ "moods": [mood] }))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(matched["story_ids"][0], story.id);

    let response = server
        .get_auth("/admin/analytics?days=7", &admin.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let response = server
        .get_auth("/admin/analytics", &reader.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_unknown_emotion_tag_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let author = sign_up(&server).await;
    let mut request = CreateStoryRequest::public("Tagged");
    request.emotion_tags = vec!["no-such-mood-anywhere".to_string()];

    let response = server.post_auth("/stories", &author.access_token, &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Chat proxy
// ============================================================================

#[tokio::test]
async fn test_chat_rejects_empty_messages() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/chat", &json!({ "messages": [] })).await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(
        body.error.message,
        "Messages must be a non-empty list of user or assistant turns"
    );
}
