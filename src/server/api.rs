use crate::agent::{ AgentError, ConciergeAgent };
use crate::cli::Args;
use crate::models::chat::{ ChatReply, ChatRequest, ErrorBody };
use crate::server::cors::{ AllowOrigin, CorsPolicy, ALLOW_HEADERS, ALLOW_METHODS };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{ Request, State },
    http::{ header, HeaderMap, HeaderValue, StatusCode },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use log::{ error, info, warn };
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    agent: Arc<ConciergeAgent>,
    cors: Arc<CorsPolicy>,
}

pub fn router(agent: Arc<ConciergeAgent>, cors: CorsPolicy) -> Router {
    let app_state = AppState {
        agent,
        cors: Arc::new(cors),
    };

    Router::new()
        .route(
            "/api/chat",
            post(chat_handler).get(liveness_handler).options(preflight_handler),
        )
        .layer(middleware::from_fn_with_state(app_state.clone(), apply_cors))
        .with_state(app_state)
}

pub async fn start_http_server(
    args: &Args,
    agent: Arc<ConciergeAgent>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.server_addr.parse::<SocketAddr>()?;
    let cors = CorsPolicy::from_config(
        args.allowed_origins.as_deref(),
        args.default_origin.as_deref(),
    );
    let app = router(agent, cors);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        info!("Starting HTTP server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// Every response, errors and preflight included, carries the CORS
/// headers computed from the configured policy.
async fn apply_cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let mut response = next.run(request).await;

    let resolved = state.cors.resolve(origin.as_deref());
    set_cors_headers(response.headers_mut(), &resolved);

    response
}

fn set_cors_headers(headers: &mut HeaderMap, resolved: &AllowOrigin) {
    if let Ok(value) = HeaderValue::from_str(&resolved.value) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    if resolved.vary_by_origin {
        // Append so a handler's own Vary markers survive.
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // Whole-payload validation: any schema mismatch rejects the request
    // with an opaque message, nothing reaches the provider.
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("Rejected chat payload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid request payload");
        }
    };

    match state.agent.handle_turn(&request).await {
        Ok(reply) => (StatusCode::OK, Json(ChatReply { reply })).into_response(),
        Err(AgentError::MissingCredential) => {
            error!("Chat turn refused: provider credential is not configured");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
        }
        Err(AgentError::Provider(msg)) => {
            error!("Chat provider failure: {}", msg);
            error_response(StatusCode::BAD_GATEWAY, "Upstream model request failed")
        }
    }
}

async fn liveness_handler() -> Response {
    (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
}

async fn preflight_handler() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message.to_string() })).into_response()
}
