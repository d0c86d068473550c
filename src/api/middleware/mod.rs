pub mod request_id;
pub mod resolver;

pub use request_id::{REQUEST_ID_HEADER, RequestIdMiddleware};
pub use resolver::RedirectResolver;
