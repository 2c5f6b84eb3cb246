use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::web;

use crate::config::Config;
use crate::error::GatewayError;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(
        web::resource("/chat")
            .app_data(json_config(config))
            .route(web::post().to(handlers::chat)),
    )
    .route("/health", web::get().to(handlers::health));
}

fn json_config(config: &Config) -> web::JsonConfig {
    // Raw body cap only; the character limit is enforced after parsing
    web::JsonConfig::default()
        .limit(config.max_body_bytes)
        .error_handler(|err, _req| {
            let err = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    GatewayError::BodyTooLarge
                }
                other => GatewayError::InvalidBody(other.to_string()),
            };
            err.into()
        })
}

/// Cross-origin policy: GET/POST only, any header, no credentials.
pub fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(600);

    if config.allows_any_origin() {
        return cors.allow_any_origin().send_wildcard();
    }

    config
        .cors_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App, HttpResponse};

    fn config(origins: &str) -> Config {
        let origins = origins.to_string();
        Config::from_lookup(|name| match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "CORS_ORIGINS" => Some(origins.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[actix_web::test]
    async fn test_cors_wildcard_by_default() {
        let config = config("*");
        let app = test::init_service(
            App::new()
                .wrap(cors(&config))
                .route("/health", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "https://hub.example.org"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_some());
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[actix_web::test]
    async fn test_cors_preflight_limits_methods() {
        let config = config("https://allowed.example");
        let app = test::init_service(
            App::new()
                .wrap(cors(&config))
                .route("/chat", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/chat")
            .insert_header((header::ORIGIN, "https://allowed.example"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/chat")
            .insert_header((header::ORIGIN, "https://allowed.example"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type, x-custom"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://allowed.example"
        );
    }

    #[actix_web::test]
    async fn test_cors_rejects_unlisted_origin() {
        let config = config("https://allowed.example");
        let app = test::init_service(
            App::new()
                .wrap(cors(&config))
                .route("/health", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        let resp = test::try_call_service(&app, req).await;

        let allowed = resp
            .ok()
            .and_then(|r| r.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).cloned());
        assert!(allowed.is_none());
    }
}
