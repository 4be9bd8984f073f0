//! HTTP surface of the portal: router, shared state, middleware, and the
//! request handlers.
//!
//! Identity resolution runs for every route and hands each handler an
//! immutable [`Identity`]; protected routes additionally sit behind
//! [`require_auth`], which redirects anonymous callers to the landing page.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::cadastro::DadosCadastraisService;
use crate::session::{ClaimSet, Identity, SessionStore};
use crate::views::{self, ErrorViewModel};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const SESSION_COOKIE: &str = "portal_session";

/// Correlation id assigned to every request by [`assign_request_id`].
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub cadastro: Arc<dyn DadosCadastraisService>,
    pub start_time: Instant,
    pub req_count: Arc<AtomicUsize>,
    pub dev_mode: bool,
}

impl AppState {
    fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    req_total: u64,
    dev_mode: bool,
}

/// HTTP-level failure rendered through the generic error view.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    request_id: Option<String>,
}

impl AppError {
    fn internal(request_id: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            request_id,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let model = ErrorViewModel {
            request_id: self.request_id,
        };
        (self.status, no_cache_headers(), Html(views::error_page(&model))).into_response()
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    axum::serve(listener, app)
        .await
        .context("portal server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind portal listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind portal listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/hero", get(handle_hero))
        .route("/dados-cadastrais/consultar", get(handle_consultar))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/", get(handle_inicio))
        .route("/inicio", get(handle_inicio))
        .route("/error", get(handle_error))
        .route("/health", get(handle_health))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(middleware::from_fn(assign_request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// -------------------------
// Middleware
// -------------------------

/// Tags the request with a correlation id (honoring an inbound
/// `x-request-id`) and echoes it on the response.
async fn assign_request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Resolves the session token into an [`Identity`] for every route.
///
/// Unknown or missing tokens yield an anonymous identity rather than an
/// error; route guards decide what anonymity means per route.
async fn resolve_identity(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    state.record_request();

    let token = bearer_token(req.headers()).or_else(|| session_cookie(req.headers()));
    let identity = match token {
        Some(token) => match state.sessions.resolve(&token).await {
            Some(claims) => Identity::authenticated(claims),
            None => Identity::anonymous(),
        },
        None => Identity::anonymous(),
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}

/// Guard for protected routes: anonymous callers are sent back to the
/// landing page, standing in for the hosting policy's login challenge.
async fn require_auth(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<Identity>()
        .map(Identity::is_authenticated)
        .unwrap_or(false);

    if !authenticated {
        return Redirect::to("/").into_response();
    }
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn no_cache_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
    ]
}

// -------------------------
// Handlers
// -------------------------

async fn handle_inicio(Extension(identity): Extension<Identity>) -> Response {
    if identity.is_authenticated() {
        return Redirect::to("/hero").into_response();
    }
    Html(views::landing()).into_response()
}

async fn handle_hero() -> Html<String> {
    Html(views::hero())
}

/// Generic error page. Never cached, always carries whatever correlation id
/// the request pipeline produced.
async fn handle_error(request_id: Option<Extension<RequestId>>) -> Response {
    let model = ErrorViewModel {
        request_id: request_id.map(|Extension(id)| id.0),
    };
    (no_cache_headers(), Html(views::error_page(&model))).into_response()
}

async fn handle_consultar(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    request_id: Option<Extension<RequestId>>,
) -> Response {
    // Single guard: no lookup ever runs without a non-empty identifier.
    let Some(usuario_id) = identity.usuario_id() else {
        return (StatusCode::UNAUTHORIZED, Html(views::nao_logado())).into_response();
    };

    match state
        .cadastro
        .obter_dados_cadastrais_por_usuario_id(usuario_id)
        .await
    {
        Ok(Some(dados)) => Html(views::dados_cadastrais(&dados)).into_response(),
        Ok(None) => {
            (StatusCode::NOT_FOUND, Html(views::cadastro_nao_encontrado())).into_response()
        }
        Err(err) => {
            // The identifier itself stays out of the logs.
            error!("cadastro lookup failed: {err}");
            AppError::internal(request_id.map(|Extension(id)| id.0)).into_response()
        }
    }
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let req_total = state.record_request();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_seconds(),
        req_total,
        dev_mode: state.dev_mode,
    })
}

/// Seeds the in-memory stores with a demo session and record so the portal
/// runs standalone in dev mode. `cadastro` is `None` when lookups go to an
/// upstream service instead of the in-memory store.
pub fn seed_dev_data(
    sessions: &crate::session::MemorySessionStore,
    cadastro: Option<&crate::cadastro::MemoryCadastroService>,
) {
    let claims: ClaimSet = [(crate::session::CLAIM_USUARIO_ID, "42")]
        .into_iter()
        .collect();
    sessions.insert_session("dev-token", claims);
    let Some(cadastro) = cadastro else {
        info!("dev mode: seeded demo session token \"dev-token\"");
        return;
    };
    cadastro.insert(crate::cadastro::DadosCadastrais {
        usuario_id: "42".to_string(),
        nome: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        documento: "123.456.789-00".to_string(),
        telefone: Some("+55 11 90000-0000".to_string()),
        endereco: Some("Rua das Flores, 100".to_string()),
    });
    info!("dev mode: seeded demo session token \"dev-token\"");
}
