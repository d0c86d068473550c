use actix_web::{HttpResponse, Responder};

/// Default handler behind the resolver: anything not otherwise routed.
pub struct HelloService;

impl HelloService {
    pub async fn hello() -> impl Responder {
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body("Hello, world!\n")
    }
}
