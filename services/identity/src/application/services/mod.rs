//! 应用服务

mod session_guard;
mod session_service;

pub use session_guard::*;
pub use session_service::*;
