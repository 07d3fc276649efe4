// src/handlers/proxy.rs
// DOCUMENTATION: Backend proxy handlers
// PURPOSE: Forward user, feed and gallery requests to the backend API

use super::access;
use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::{BeltOptions, GalleryPayload, TimelineQuery, TimelineResponse};
use crate::services::{
    BackendClient, BackendResponse, BeltLayoutService, ForwardRequest, GalleryTimeline,
    SessionStore,
};
use actix_web::{
    guard,
    http::{header, Method, StatusCode},
    web, HttpRequest, HttpResponse, Responder,
};
use futures_util::StreamExt;
use std::sync::Arc;
use validator::Validate;

/// Shared dependencies of every proxy route
struct ProxyContext<'a> {
    config: &'a Config,
    backend: &'a BackendClient,
    sessions: &'a SessionStore,
}

/// Turn a backend reply into a gateway response with the same status
pub fn relay(upstream: BackendResponse) -> HttpResponse {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = HttpResponse::build(status);

    match upstream.body {
        Some(body) => builder.json(body),
        None => builder.finish(),
    }
}

/// Read a request body, refusing anything above `limit` bytes
/// Returns None for an empty body
pub async fn read_body(
    req: &HttpRequest,
    mut payload: web::Payload,
    limit: usize,
) -> Result<Option<Vec<u8>>, GatewayError> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if declared.map_or(false, |len| len > limit) {
        return Err(GatewayError::PayloadTooLarge(limit));
    }

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| GatewayError::InvalidInput(format!("Body error: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(GatewayError::PayloadTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }

    if body.is_empty() {
        Ok(None)
    } else {
        Ok(Some(body.to_vec()))
    }
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

fn split_tail(tail: &str) -> impl Iterator<Item = String> + '_ {
    tail.split('/').filter(|s| !s.is_empty()).map(str::to_string)
}

/// Relay the current request to `segments` on the backend
async fn forward(
    req: &HttpRequest,
    payload: web::Payload,
    ctx: &ProxyContext<'_>,
    segments: Vec<String>,
) -> Result<HttpResponse, GatewayError> {
    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|_| GatewayError::InvalidInput(format!("Unsupported method: {}", req.method())))?;

    let body = read_body(req, payload, ctx.config.max_body_bytes).await?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let query = Some(req.query_string().to_string()).filter(|q| !q.is_empty());

    let upstream = ctx
        .backend
        .forward(ForwardRequest {
            method,
            segments,
            query,
            body,
            content_type,
        })
        .await?;

    Ok(relay(upstream))
}

/// ANY /api/users/{username} and /api/users/{username}/{tail}
/// Reads are public; writes require the caller to be `username`
async fn forward_user_scoped(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
    username: String,
    tail: Option<String>,
) -> Result<HttpResponse, GatewayError> {
    let ctx = ProxyContext {
        config: &config,
        backend: &backend,
        sessions: &sessions,
    };

    if !is_read_only(req.method()) {
        access::require_owner(&req, ctx.config, ctx.sessions, &username).await?;
    }

    let mut segments = vec!["users".to_string(), username];
    if let Some(tail) = tail {
        segments.extend(split_tail(&tail));
    }

    forward(&req, payload, &ctx, segments).await
}

pub async fn user_root(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
    path: web::Path<String>,
) -> Result<impl Responder, GatewayError> {
    let username = path.into_inner();
    forward_user_scoped(req, payload, config, backend, sessions, username, None).await
}

pub async fn user_nested(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, GatewayError> {
    let (username, tail) = path.into_inner();
    forward_user_scoped(req, payload, config, backend, sessions, username, Some(tail)).await
}

/// GET /api/for-you/{username}
/// Personal feed, visible to its owner only
pub async fn for_you(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
    path: web::Path<String>,
) -> Result<impl Responder, GatewayError> {
    let username = path.into_inner();
    let ctx = ProxyContext {
        config: &config,
        backend: &backend,
        sessions: &sessions,
    };

    access::require_owner(&req, ctx.config, ctx.sessions, &username).await?;

    forward(&req, payload, &ctx, vec!["for-you".to_string(), username]).await
}

/// ANY /api/gallery and /api/gallery/{tail}
/// Reads are public; writes require a session
pub async fn gallery(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    sessions: web::Data<Arc<SessionStore>>,
) -> Result<impl Responder, GatewayError> {
    let ctx = ProxyContext {
        config: &config,
        backend: &backend,
        sessions: &sessions,
    };

    if !is_read_only(req.method()) {
        access::require_identity(&req, ctx.config, ctx.sessions).await?;
    }

    let mut segments = vec!["gallery".to_string()];
    if let Some(tail) = req.match_info().get("tail") {
        segments.extend(split_tail(tail));
    }

    forward(&req, payload, &ctx, segments).await
}

/// GET /api/users/{username}/repos/{repo}/gallery/timeline
/// Repository gallery grouped by local calendar day
pub async fn gallery_timeline(
    backend: web::Data<BackendClient>,
    path: web::Path<(String, String)>,
    query: web::Query<TimelineQuery>,
) -> Result<impl Responder, GatewayError> {
    let (username, repo) = path.into_inner();
    let offset = GalleryTimeline::offset_from_minutes(query.tz_offset_minutes)?;

    let upstream = backend
        .get(vec![
            "users".to_string(),
            username,
            "repos".to_string(),
            repo,
            "gallery".to_string(),
        ])
        .await?;

    if !upstream.is_success() {
        return Ok(relay(upstream));
    }

    let payload: GalleryPayload = upstream
        .body
        .map(serde_json::from_value::<GalleryPayload>)
        .transpose()
        .map_err(|e| {
            log::error!("Backend gallery payload did not parse: {}", e);
            GatewayError::ExternalApiError(format!("Unexpected gallery payload: {}", e))
        })?
        .unwrap_or(GalleryPayload::List(Vec::new()));

    let images = payload.into_images();
    let total_images = images.len();
    let groups = GalleryTimeline::group_by_date(images, &offset);

    Ok(HttpResponse::Ok().json(TimelineResponse {
        groups,
        total_images,
    }))
}

/// GET /api/users/{username}/belts
/// Keyword/emphasis belts built from the builder's profile theme
pub async fn profile_belts(
    backend: web::Data<BackendClient>,
    path: web::Path<String>,
    query: web::Query<BeltOptions>,
) -> Result<impl Responder, GatewayError> {
    let options = query.into_inner();
    options.validate()?;

    let upstream = backend
        .get(vec!["users".to_string(), path.into_inner()])
        .await?;

    if !upstream.is_success() {
        return Ok(relay(upstream));
    }

    let tags = upstream
        .body
        .as_ref()
        .map(BeltLayoutService::profile_tags)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(BeltLayoutService::build_belts(tags, &options)))
}

/// Configuration for proxy routes
/// Derived GET views are registered ahead of the catch-all forwarders
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/users/{username}/repos/{repo}/gallery/timeline")
                    .guard(guard::Get())
                    .to(gallery_timeline),
            )
            .service(
                web::resource("/users/{username}/belts")
                    .guard(guard::Get())
                    .to(profile_belts),
            )
            .route("/users/{username}", web::route().to(user_root))
            .route("/users/{username}/{tail:.*}", web::route().to(user_nested))
            .route("/for-you/{username}", web::get().to(for_you))
            .route("/gallery", web::route().to(gallery))
            .route("/gallery/{tail:.*}", web::route().to(gallery)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{json_error_handler, query_error_handler};
    use crate::models::GitHubUser;
    use actix_web::{cookie::Cookie, test, App};
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    struct Harness {
        config: Config,
        backend: BackendClient,
        sessions: Arc<SessionStore>,
    }

    impl Harness {
        fn new(backend_url: Option<String>) -> Self {
            let config = Config {
                backend_api_url: backend_url,
                backend_api_token: Some("backend-secret".to_string()),
                max_body_bytes: 64,
                ..Config::default()
            };
            let backend = BackendClient::from_config(reqwest::Client::new(), &config);
            Self {
                config,
                backend,
                sessions: Arc::new(SessionStore::new(60)),
            }
        }

        async fn login(&self, login: &str) -> Cookie<'static> {
            let session = self
                .sessions
                .create(&GitHubUser {
                    login: login.to_string(),
                    id: 7,
                    name: None,
                    avatar_url: None,
                    html_url: None,
                })
                .await;
            Cookie::new(access::SESSION_COOKIE, session.token)
        }
    }

    macro_rules! init_app {
        ($harness:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .app_data(web::Data::new($harness.config.clone()))
                    .app_data(web::Data::new($harness.backend.clone()))
                    .app_data(web::Data::new($harness.sessions.clone()))
                    .configure(config),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_public_read_forwards_with_bearer_and_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/users/octocat/repos")
                    .query_param("sort", "stars")
                    .header("authorization", "Bearer backend-secret");
                then.status(200).json_body(json!([{ "name": "hello-world" }]));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get()
            .uri("/api/users/octocat/repos?sort=stars")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([{ "name": "hello-world" }]));
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn test_write_requires_owner() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/users/octocat/highlights");
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let anonymous = test::TestRequest::put()
            .uri("/api/users/octocat/highlights")
            .set_json(json!({ "repos": ["a"] }))
            .to_request();
        let resp = test::call_service(&app, anonymous).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let intruder = harness.login("mallory").await;
        let req = test::TestRequest::put()
            .uri("/api/users/octocat/highlights")
            .cookie(intruder)
            .set_json(json!({ "repos": ["a"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let owner = harness.login("octocat").await;
        let req = test::TestRequest::put()
            .uri("/api/users/octocat/highlights")
            .cookie(owner)
            .set_json(json!({ "repos": ["a"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        mock.assert_hits_async(1).await;
    }

    #[actix_web::test]
    async fn test_caller_credentials_stay_at_the_gateway() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/users/octocat/highlights")
                    .header("authorization", "Bearer backend-secret")
                    .header_missing("cookie");
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let cookie = harness.login("octocat").await;
        let req = test::TestRequest::put()
            .uri("/api/users/octocat/highlights")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", cookie.value())))
            .cookie(cookie)
            .set_json(json!({ "repos": ["a"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        mock.assert_hits_async(1).await;
    }

    #[actix_web::test]
    async fn test_for_you_is_owner_only() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/for-you/octocat");
                then.status(200).json_body(json!({ "items": [] }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/api/for-you/octocat").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let owner = harness.login("OctoCat").await;
        let req = test::TestRequest::get()
            .uri("/api/for-you/octocat")
            .cookie(owner)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_unconfigured_backend_returns_503() {
        let harness = Harness::new(None);
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/api/gallery").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "BACKEND_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn test_unreachable_backend_returns_503() {
        let harness = Harness::new(Some("http://127.0.0.1:9".to_string()));
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/api/users/octocat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_text_upstream_is_normalized_to_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gallery/featured");
                then.status(500).body("Internal Server Error");
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/api/gallery/featured").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[actix_web::test]
    async fn test_gallery_write_needs_session_and_size_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gallery");
                then.status(201).json_body(json!({ "id": "img_1" }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::post()
            .uri("/api/gallery")
            .set_json(json!({ "url": "https://img/1.png" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let cookie = harness.login("octocat").await;
        let oversized = json!({ "caption": "x".repeat(200) });
        let req = test::TestRequest::post()
            .uri("/api/gallery")
            .cookie(cookie.clone())
            .set_json(oversized)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = test::TestRequest::post()
            .uri("/api/gallery")
            .cookie(cookie)
            .set_json(json!({ "url": "https://img/1.png" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_gallery_timeline_groups_backend_images() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat/repos/hello-world/gallery");
                then.status(200).json_body(json!({
                    "images": [
                        { "url": "old", "takenAt": 1792144800000i64 },
                        { "url": "undated" },
                        { "url": "new", "takenAt": 1792317600000i64, "isHighlight": true }
                    ]
                }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get()
            .uri("/api/users/octocat/repos/hello-world/gallery/timeline?tz_offset_minutes=120")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_images"], 3);
        assert_eq!(body["groups"][0]["date"], "2026-10-18");
        assert_eq!(body["groups"][0]["images"][0]["is_highlight"], true);
        assert_eq!(body["groups"][1]["date"], "2026-10-16");
        assert_eq!(body["groups"][2]["date"], "Unknown");
    }

    #[actix_web::test]
    async fn test_timeline_rejects_bad_offset() {
        let harness = Harness::new(Some("http://127.0.0.1:9".to_string()));
        let app = init_app!(harness);

        let req = test::TestRequest::get()
            .uri("/api/users/octocat/repos/x/gallery/timeline?tz_offset_minutes=9999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_profile_belts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat");
                then.status(200).json_body(json!({
                    "login": "octocat",
                    "theme": {
                        "keywords": ["Rust", "rust", "WebAssembly", "CLI", "Tokio"],
                        "emphasis": ["Performance", "cli"]
                    }
                }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get()
            .uri("/api/users/octocat/belts?chunk_size=3&min_last=2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 5);
        assert_eq!(
            body["belts"],
            json!([["Rust", "WebAssembly", "CLI"], ["Tokio", "Performance"]])
        );
    }

    #[actix_web::test]
    async fn test_profile_belts_relays_missing_user() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/ghost");
                then.status(404).json_body(json!({ "detail": "not found" }));
            })
            .await;

        let harness = Harness::new(Some(server.base_url()));
        let app = init_app!(harness);

        let req = test::TestRequest::get().uri("/api/users/ghost/belts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "not found");
    }
}
