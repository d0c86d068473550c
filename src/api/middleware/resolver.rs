//! Redirect resolver
//!
//! 最外层的业务中间件：先查库，命中则 307，未命中才交给内部路由。
//! 查询阶段的读事务在 `web::block` 内打开并关闭，fallback 只会在
//! 读事务结束之后才被调用，因为 fallback 可能进入注册接口并申请写事务。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{
        StatusCode,
        header::{HeaderValue, LOCATION},
    },
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::storage::MappingStore;

/// Middleware factory; wrap it around the app whose routes act as fallback.
#[derive(Clone)]
pub struct RedirectResolver {
    store: Arc<dyn MappingStore>,
}

impl RedirectResolver {
    pub fn new(store: Arc<dyn MappingStore>) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RedirectResolver
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RedirectResolverMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectResolverMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
        }))
    }
}

pub struct RedirectResolverMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn MappingStore>,
}

impl<S, B> Service<ServiceRequest> for RedirectResolverMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let store = self.store.clone();
        let path = decode_path(req.path()).into_owned();

        Box::pin(async move {
            // 阶段一：读事务在 lookup 返回前已关闭
            let target = lookup(store, path.clone()).await;

            // 阶段二：命中则重定向，否则交给 fallback
            match target {
                Some(url) => {
                    trace!("Redirecting {} -> {}", path, url);
                    let response = HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
                        .insert_header((LOCATION, location_value(&url)))
                        .finish();
                    Ok(req.into_response(response).map_into_right_body())
                }
                None => {
                    debug!("No mapping for {}, falling through", path);
                    let res = srv.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

/// Read errors are logged and handled as a miss so the request still gets
/// an answer from the fallback.
async fn lookup(store: Arc<dyn MappingStore>, path: String) -> Option<String> {
    let key = path.clone();
    match web::block(move || store.lookup(&key)).await {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => {
            error!("Lookup for {} failed: {}", path, e);
            None
        }
        Err(e) => {
            error!("Lookup task for {} did not complete: {}", path, e);
            None
        }
    }
}

/// `Location` value for a stored URL.
///
/// Registration accepts any string, so bytes a header cannot carry are
/// rewritten: CR/LF become spaces, everything else outside visible ASCII
/// is percent-escaped.
fn location_value(url: &str) -> HeaderValue {
    if let Ok(value) = HeaderValue::from_str(url) {
        return value;
    }

    let mut escaped = String::with_capacity(url.len() + 8);
    for &b in url.as_bytes() {
        match b {
            b'\r' | b'\n' => escaped.push(' '),
            b'\t' | 0x20..=0x7e => escaped.push(b as char),
            _ => escaped.push_str(&format!("%{:02X}", b)),
        }
    }
    HeaderValue::from_str(&escaped).unwrap_or_else(|_| HeaderValue::from_static("/"))
}

/// Keys are stored decoded (`/a b`, not `/a%20b`).
fn decode_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
