//! 注册接口：POST JSON `{Path, Url}`，覆盖写入

use actix_web::http::header::ALLOW;
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{error, info, trace, warn};

use crate::config::RoutesConfig;
use crate::errors::{Result, UrlshortError};
use crate::storage::{Mapping, MappingStore};

pub struct CreateService;

impl CreateService {
    pub async fn handle_create(
        req: HttpRequest,
        body: web::Bytes,
        store: web::Data<Arc<dyn MappingStore>>,
        routes: web::Data<RoutesConfig>,
    ) -> impl Responder {
        if req.method() != Method::POST {
            trace!("Rejected {} on registration route", req.method());
            return HttpResponse::build(StatusCode::METHOD_NOT_ALLOWED)
                .insert_header((ALLOW, Method::POST.as_str()))
                .content_type("text/plain; charset=utf-8")
                .body("Method Not Allowed");
        }

        let mapping: Mapping = match serde_json::from_slice(&body) {
            Ok(mapping) => mapping,
            Err(e) => {
                trace!("Undecodable registration body: {}", e);
                return Self::bad_request(e.to_string());
            }
        };

        if let Err(e) = check_path(&mapping, &routes) {
            warn!("Refused to register {}: {}", mapping.path, e.message());
            return Self::bad_request(e.message());
        }

        let path = mapping.path.clone();
        let store = Arc::clone(store.get_ref());
        match web::block(move || store.upsert(&mapping)).await {
            Ok(Ok(())) => {
                info!("Registered {}", path);
                HttpResponse::Ok()
                    .content_type("text/plain; charset=utf-8")
                    .body(format!("Register updated. Short URL: {}", path))
            }
            Ok(Err(e)) => {
                error!("Failed to register {}: {}", path, e);
                Self::bad_request(e.to_string())
            }
            Err(e) => {
                error!("Registration task for {} did not complete: {}", path, e);
                Self::bad_request(e.to_string())
            }
        }
    }

    #[inline]
    fn bad_request(message: impl Into<String>) -> HttpResponse {
        HttpResponse::build(StatusCode::BAD_REQUEST)
            .content_type("text/plain; charset=utf-8")
            .body(message.into())
    }
}

/// The registration route's own path can never become a short link.
fn check_path(mapping: &Mapping, routes: &RoutesConfig) -> Result<()> {
    if mapping.path == routes.create_path {
        return Err(UrlshortError::validation("Path prohibited to use"));
    }
    Ok(())
}

/// Registration route bound at `create_path`, accepting every method so
/// the handler can answer 405 itself.
pub fn create_routes(create_path: &str) -> actix_web::Resource {
    web::resource(create_path).route(web::route().to(CreateService::handle_create))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path_rejects_configured_create_path() {
        let routes = RoutesConfig {
            create_path: "/new".to_string(),
        };

        let err = check_path(&Mapping::new("/new", "https://a.example"), &routes).unwrap_err();
        assert!(matches!(err, UrlshortError::Validation(_)));
        assert_eq!(err.message(), "Path prohibited to use");

        assert!(check_path(&Mapping::new("/create", "https://a.example"), &routes).is_ok());
    }
}
