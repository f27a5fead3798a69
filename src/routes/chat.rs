use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use crate::middleware::{rate_limiter_middleware, ClientRateLimiter};
use crate::models::{ApiResponse, AppState, BlogRequest, BlogResponse, ChatResponse, RouteDecision};
use tracing::{error, info, warn};
use validator::Validate;

pub fn router(state: AppState, limiter: ClientRateLimiter) -> Router {
    Router::new()
        .route("/chat", post(post_chat))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limiter_middleware))
        .with_state(state)
}

pub async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<BlogRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed request body");
            return (
                rejection.status(),
                Json(serde_json::json!({
                    "error": "Invalid request body",
                    "details": rejection.body_text()
                })),
            )
                .into_response();
        }
    };

    if let Err(errors) = request.validate() {
        warn!(error = %errors, "Request failed validation");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Validation failed",
                "details": errors.to_string()
            })),
        )
            .into_response();
    }

    info!(topic_len = request.topic.len(), tone = %request.tone, "Received chat request");

    Json(dispatch(&state, &request).await).into_response()
}

/// Route one validated request and shape whatever happens into a response
/// body. Never fails.
pub async fn dispatch(state: &AppState, request: &BlogRequest) -> ApiResponse {
    match state.router.classify(&request.topic).await {
        RouteDecision::Chat => match state.chat.respond(&request.topic).await {
            Ok(reply) => ApiResponse::Chat(ChatResponse::from_reply(reply)),
            Err(e) => {
                error!(error = %e, "Chat reply failed");
                ApiResponse::Blog(BlogResponse::unexpected_error())
            }
        },
        RouteDecision::Generate => match state.pipeline.run(&request.topic, request.tone).await {
            Ok(output) => {
                info!(title = %output.title, "Blog generated");
                ApiResponse::Blog(BlogResponse::success(output))
            }
            Err(e) => {
                error!(error = %e, "Blog generation failed");
                ApiResponse::Blog(BlogResponse::from_pipeline_error(&e))
            }
        },
    }
}
