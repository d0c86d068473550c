//! HTTP layer
//!
//! The resolver middleware wraps the whole app; the app's own routes
//! (registration + greeting) are its fallback.

pub mod middleware;
pub mod services;

use actix_web::web;
use std::sync::Arc;

use crate::config::RoutesConfig;
use crate::storage::MappingStore;
use services::{HelloService, create_routes};

/// 请求体上限
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Register the fallback mux: the registration route plus the greeting as
/// default service. Both the route table and the reserved-path check read
/// `routes.create_path`.
pub fn configure_mux(
    store: Arc<dyn MappingStore>,
    routes: RoutesConfig,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let create_path = routes.create_path.clone();
        cfg.app_data(web::Data::new(store))
            .app_data(web::Data::new(routes))
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .service(create_routes(&create_path))
            .default_service(web::to(HelloService::hello));
    }
}
