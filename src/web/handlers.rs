use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::GatewayError;
use crate::model::Generator;
use crate::web::models::{ChatRequest, ChatResponse, HealthResponse};
use crate::AppState;

// Health check endpoint
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { ok: true })
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, GatewayError> {
    let response = handle_chat(req.into_inner(), &data.config, data.generator.as_ref()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Validate a chat request against the configured policy, then forward it.
///
/// Checks run in a fixed order and the first failure wins: model allow-list,
/// workshop code (only when one is configured), then total content size.
/// Nothing reaches the generator unless all three pass, and a single attempt
/// is made.
pub async fn handle_chat(
    req: ChatRequest,
    config: &Config,
    generator: &dyn Generator,
) -> Result<ChatResponse, GatewayError> {
    let request_id = Uuid::new_v4();
    let model = req
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    if !config.is_model_allowed(&model) {
        warn!("Chat request {} rejected: model {:?} not allowed", request_id, model);
        return Err(GatewayError::ModelNotAllowed);
    }

    if let Some(expected) = &config.workshop_code {
        if req.workshop_code.as_deref() != Some(expected.as_str()) {
            warn!("Chat request {} rejected: invalid workshop code", request_id);
            return Err(GatewayError::InvalidWorkshopCode);
        }
    }

    let total = req.content_chars();
    if total > config.max_chars {
        warn!(
            "Chat request {} rejected: {} characters exceeds limit of {}",
            request_id, total, config.max_chars
        );
        return Err(GatewayError::MessageTooLarge);
    }

    info!(
        "Chat request {}: model {} ({} messages, {} characters)",
        request_id,
        model,
        req.messages.len(),
        total
    );
    debug!("Chat request {} messages: {:?}", request_id, req.messages);

    match tokio::time::timeout(config.upstream_timeout, generator.generate(&model, &req.messages)).await {
        Ok(Ok(text)) => Ok(ChatResponse { text }),
        Ok(Err(e)) => {
            error!("Chat request {} upstream error: {:#}", request_id, e);
            Err(GatewayError::Upstream(e))
        }
        Err(_) => {
            error!(
                "Chat request {} upstream timed out after {:?}",
                request_id, config.upstream_timeout
            );
            Err(GatewayError::UpstreamTimeout)
        }
    }
}
