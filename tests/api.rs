//! End-to-end tests: full router (all middleware) over in-memory stores.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use social_stories::app::build_router;
use social_stories::config::Config;
use social_stories::error::{FORBIDDEN_MESSAGE, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE};
use social_stories::repos::credentials::MemoryCredentialStore;
use social_stories::repos::stories::MemoryStoryRepo;
use social_stories::services::auth::{TokenService, bootstrap};
use social_stories::services::blob::MemoryBlobStore;
use social_stories::state::AppState;

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
const PASSWORD: &str = "Password12!";

async fn app() -> Router {
    app_with(Config::new(KEY)).await
}

async fn app_with(config: Config) -> Router {
    let credentials = Arc::new(MemoryCredentialStore::with_cost(4));
    bootstrap::ensure_roles(credentials.as_ref())
        .await
        .expect("seed roles");

    let state = AppState::new(
        credentials,
        Arc::new(MemoryStoryRepo::new()),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(TokenService::from_config(&config)),
    );
    build_router(state, &config)
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    fn messages(&self) -> Vec<String> {
        self.json()["Message"]
            .as_array()
            .expect("envelope")
            .iter()
            .map(|m| m.as_str().expect("string").to_string())
            .collect()
    }
}

async fn send(router: &Router, req: Request<Body>) -> Reply {
    let res = router.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    Reply {
        status,
        headers,
        body,
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn account(name: &str) -> Value {
    json!({
        "Username": name,
        "Email": format!("{name}@example.com"),
        "MobileNumber": "+61 400 000 000",
        "Password": PASSWORD,
    })
}

async fn register(router: &Router, name: &str) -> Reply {
    send(router, request("POST", "/api/Auth/RegisterUser", None, Some(account(name)))).await
}

async fn login(router: &Router, name: &str) -> String {
    let reply = send(
        router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"Email": format!("{name}@example.com"), "Password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
    reply.messages()[0].clone()
}

async fn user_token(router: &Router, name: &str) -> String {
    assert_eq!(register(router, name).await.status, StatusCode::OK);
    login(router, name).await
}

async fn admin_token(router: &Router) -> String {
    let reply = send(
        router,
        request("POST", "/api/internal/Setup/Initialize", None, Some(account("root"))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    login(router, "root").await
}

fn page(description: &str) -> Value {
    json!({
        "ImageId": "5f0c2b1e-7a49-4d0e-9d65-0d7b4b0f3a11",
        "ImageExtension": "png",
        "Description": description,
    })
}

#[tokio::test]
async fn register_then_login_issues_a_usable_token() {
    let router = app().await;

    let reply = register(&router, "alice").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["alice was successfully registered"]);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"email": "ALICE@example.com", "password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let messages = reply.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].starts_with("Valid from "));
    assert!(messages[1].ends_with(" UTC"));

    let reply = send(
        &router,
        request("GET", "/api/Story/Stories", Some(&messages[0]), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"Stories": []}));
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let router = app().await;
    register(&router, "bob").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"Email": "bob@example.com", "Password": "Wrong12!!"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.messages(), ["Email or password is incorrect!"]);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"Email": "nobody@example.com", "Password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.messages(), ["User is not found on this server."]);
}

#[tokio::test]
async fn registration_conflicts_and_password_policy() {
    let router = app().await;
    register(&router, "carol").await;

    let reply = register(&router, "carol").await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(
        reply.messages(),
        [
            "Failed to add user with Username: carol/Email: carol@example.com",
            "User already exists",
        ]
    );

    let mut weak = account("dave");
    weak["Password"] = json!("password");
    let reply = send(&router, request("POST", "/api/Auth/RegisterUser", None, Some(weak))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let messages = reply.messages();
    assert_eq!(messages[0], "Failed to register dave");
    assert!(messages.len() > 1);
}

#[tokio::test]
async fn validation_failures_are_aggregated_in_order() {
    let router = app().await;

    let reply = send(
        &router,
        request("POST", "/api/Auth/RegisterUser", None, Some(json!({}))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.messages(),
        [
            "The Username field is required.",
            "The Email field is required.",
            "The MobileNumber field is required.",
            "The Password field is required.",
        ]
    );

    let reply = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/api/Auth/Login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.messages().len(), 1);
}

#[tokio::test]
async fn initialize_only_once() {
    let router = app().await;
    admin_token(&router).await;

    let reply = send(
        &router,
        request("POST", "/api/internal/Setup/Initialize", None, Some(account("root2"))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.messages(), ["Admin user already exists."]);

    // the second admin was never created
    let reply = send(
        &router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"Email": "root2@example.com", "Password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_initialize_creates_one_admin() {
    let router = app().await;

    let calls: Vec<_> = (0..6)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let body = account(&format!("root{i}"));
                send(&router, request("POST", "/api/internal/Setup/Initialize", None, Some(body)))
                    .await
                    .status
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for call in calls {
        statuses.push(call.await.expect("join"));
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1, "{statuses:?}");
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::OK || *s == StatusCode::UNAUTHORIZED),
        "{statuses:?}"
    );
}

#[tokio::test]
async fn registration_without_seeded_roles_leaves_no_account() {
    let config = Config::new(KEY);
    let state = AppState::new(
        Arc::new(MemoryCredentialStore::with_cost(4)),
        Arc::new(MemoryStoryRepo::new()),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(TokenService::from_config(&config)),
    );
    let router = build_router(state, &config);

    let reply = register(&router, "orphan").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.messages(), ["Failed to add orphan to User role"]);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Auth/Login",
            None,
            Some(json!({"Email": "orphan@example.com", "Password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn policies_separate_401_from_403() {
    let router = app().await;
    let template = json!({"Type": "social", "Title": "Bedtime", "PageDescriptions": ["Brush teeth"]});

    let reply = send(&router, request("GET", "/api/Story/Stories", None, None)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.messages(), [UNAUTHORIZED_MESSAGE]);

    let user = user_token(&router, "erin").await;
    let reply = send(
        &router,
        request("POST", "/api/TemplateStory/Upload", Some(&user), Some(template.clone())),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.messages(), [FORBIDDEN_MESSAGE]);

    let admin = admin_token(&router).await;
    let reply = send(
        &router,
        request("POST", "/api/TemplateStory/Upload", Some(&admin), Some(template)),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["Successfully stored template story"]);

    // Admin satisfies UserPolicy too.
    let reply = send(
        &router,
        request("GET", "/api/TemplateStory/Stories", Some(&admin), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["Stories"][0]["Title"], "Bedtime");
}

#[tokio::test]
async fn policy_runs_before_body_validation() {
    let router = app().await;

    let reply = send(
        &router,
        request("POST", "/api/Story/Upload", None, Some(json!({}))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_tokens_are_treated_as_anonymous() {
    let router = app().await;
    let token = user_token(&router, "frank").await;

    // lowercase scheme is accepted
    let reply = send(
        &router,
        Request::builder()
            .uri("/api/Story/Stories")
            .header(header::AUTHORIZATION, format!("bearer {token}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);

    let other = app_with(Config::new(vec![7u8; 64])).await;
    let foreign = user_token(&other, "frank").await;
    let reply = send(
        &router,
        request("GET", "/api/Story/Stories", Some(&foreign), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let now = chrono::Utc::now().timestamp();
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS512),
        &json!({
            "iss": "SunsetStories",
            "aud": "SunsetStories users",
            "nbf": now - 7200,
            "exp": now - 3600,
            "email": "frank@example.com",
            "sub": "frank@example.com",
            "nameid": "5f0c2b1e-7a49-4d0e-9d65-0d7b4b0f3a11",
            "role": "User",
        }),
        &EncodingKey::from_secret(KEY),
    )
    .expect("encode");
    let reply = send(
        &router,
        request("GET", "/api/Story/Stories", Some(&expired), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.messages(), [UNAUTHORIZED_MESSAGE]);
}

#[tokio::test]
async fn route_and_method_misses_use_the_envelope() {
    let router = app().await;

    let reply = send(&router, request("GET", "/api/Nope", None, None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.messages(), [NOT_FOUND_MESSAGE]);

    let reply = send(&router, request("GET", "/api/Auth/Login", None, None)).await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(reply.messages(), ["Method Not Allowed"]);
    assert_eq!(
        reply.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[tokio::test]
async fn health_passes_through_the_http_stack() {
    let router = app().await;

    let reply = send(&router, request("GET", "/health", None, None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], "ok");
    assert!(reply.headers.contains_key("x-request-id"));
    assert_eq!(
        reply.headers.get("x-content-type-options").and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
}

#[tokio::test]
async fn stories_are_scoped_to_their_owner() {
    let router = app().await;
    let gina = user_token(&router, "gina").await;
    let hank = user_token(&router, "hank").await;

    let story = json!({
        "TitleStoryPage": page("Going to the park"),
        "Pages": [page("Put on shoes"), page("Walk to the park")],
        "FontType": "Comic Sans",
        "PageCount": 99,
    });
    let reply = send(&router, request("POST", "/api/Story/Upload", Some(&gina), Some(story))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["Successfully stored user story"]);

    let reply = send(&router, request("GET", "/api/Story/Stories", Some(&gina), None)).await;
    let stories = reply.json()["Stories"].clone();
    assert_eq!(stories.as_array().map(Vec::len), Some(1));
    assert_eq!(stories[0]["PageCount"], 2);
    assert_eq!(stories[0]["TitleStoryPage"]["Description"], "Going to the park");
    let id = stories[0]["Id"].as_str().expect("id").to_string();

    let reply = send(&router, request("GET", "/api/Story/Stories", Some(&hank), None)).await;
    assert_eq!(reply.json(), json!({"Stories": []}));

    let update = json!({
        "Id": id,
        "TitleStoryPage": page("Going to the beach"),
        "Pages": [page("Pack a towel")],
        "FontType": "Arial",
    });
    let reply = send(
        &router,
        request("POST", "/api/Story/Update", Some(&hank), Some(update.clone())),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.messages(), [format!("User story doesn't exist: {id}")]);

    let reply = send(&router, request("POST", "/api/Story/Update", Some(&gina), Some(update))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["Successfully stored updated user story"]);

    let uri = format!("/api/Story/Delete?storyId={id}");
    let reply = send(&router, request("DELETE", &uri, Some(&hank), None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&router, request("DELETE", &uri, Some(&gina), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["Successfully deleted user story"]);

    let reply = send(&router, request("DELETE", &uri, Some(&gina), None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn story_delete_requires_story_id() {
    let router = app().await;
    let token = user_token(&router, "ivy").await;

    let reply = send(&router, request("DELETE", "/api/Story/Delete", Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.messages(), ["The storyId field is required."]);
}

#[tokio::test]
async fn file_lifecycle() {
    let router = app().await;
    let token = user_token(&router, "jack").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/File/Upload",
            Some(&token),
            Some(json!({"FileExtension": "'.png'", "EncodedData": "aGVsbG8="})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let messages = reply.messages();
    let id = messages[1].clone();
    assert_eq!(messages[0], format!("File: {id} uploaded to storage"));
    assert_eq!(messages[2], "png");

    let query = format!("fileId={id}&fileExtension=.png");

    let reply = send(&router, request("GET", &format!("/api/File/Exists?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), [format!("File: {id} exists")]);

    let reply = send(&router, request("GET", &format!("/api/File/Download?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(&reply.body[..], b"aGVsbG8=");

    let reply = send(&router, request("DELETE", &format!("/api/File/Delete?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), [format!("File: png/{id} deleted from storage")]);

    let reply = send(&router, request("GET", &format!("/api/File/Exists?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.messages(), [format!("File: {id} was not found")]);

    let reply = send(&router, request("GET", &format!("/api/File/Download?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.messages(),
        [format!("Failed to download file: png/{id}, does NOT exist")]
    );

    let reply = send(&router, request("DELETE", &format!("/api/File/Delete?{query}"), Some(&token), None)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_upload_rejects_non_base64() {
    let router = app().await;
    let token = user_token(&router, "kate").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/File/Upload",
            Some(&token),
            Some(json!({"FileExtension": "png", "EncodedData": "YW Jj"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.messages(), ["The EncodedData field is not in Base64 format."]);
}

#[tokio::test]
async fn file_upload_above_axum_default_limit_is_accepted() {
    use base64::Engine as _;

    let router = app().await;
    let token = user_token(&router, "liam").await;
    let data = base64::engine::general_purpose::STANDARD.encode(vec![7u8; 3 * 1024 * 1024]);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/File/Upload",
            Some(&token),
            Some(json!({"FileExtension": "bin", "EncodedData": data})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
    assert_eq!(reply.messages()[2], "bin");
}

#[tokio::test]
async fn file_upload_over_configured_limit_is_413() {
    let mut config = Config::new(KEY);
    config.max_body_bytes = 4096;
    let router = app_with(config).await;
    let token = user_token(&router, "mona").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/File/Upload",
            Some(&token),
            Some(json!({"FileExtension": "bin", "EncodedData": "QUJD".repeat(2048)})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(reply.json()["Message"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn admin_grants_roles_and_claims() {
    let router = app().await;
    let admin = admin_token(&router).await;
    let user = user_token(&router, "liam").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Admin/AssignRole",
            Some(&user),
            Some(json!({"Email": "liam@example.com", "Role": "Admin"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Admin/AssignRole",
            Some(&admin),
            Some(json!({"Email": "liam@example.com", "Role": "Admin"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.messages(), ["Assigned role Admin to liam@example.com"]);

    let reply = send(
        &router,
        request(
            "POST",
            "/api/Admin/AssignClaim",
            Some(&admin),
            Some(json!({"Email": "nobody@example.com", "Type": "tier", "Value": "gold"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    // a fresh token picks up the new role
    let promoted = login(&router, "liam").await;
    let reply = send(
        &router,
        request(
            "POST",
            "/api/TemplateStory/Upload",
            Some(&promoted),
            Some(json!({"Type": "social", "Title": "Dentist", "PageDescriptions": []})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn fetch_user_returns_public_fields() {
    let router = app().await;
    let token = user_token(&router, "mia").await;

    let reply = send(
        &router,
        request(
            "POST",
            "/api/User/FetchUser",
            Some(&token),
            Some(json!({"Email": "mia@example.com"})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["Username"], "mia");
    assert_eq!(json["Email"], "mia@example.com");
    assert!(json.get("PasswordHash").is_none());
}
