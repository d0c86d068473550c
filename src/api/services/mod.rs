pub mod create;
pub mod hello;

pub use create::{CreateService, create_routes};
pub use hello::HelloService;
