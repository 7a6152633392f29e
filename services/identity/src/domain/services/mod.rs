//! 领域服务

mod key_exchange_service;
mod password_service;

pub use key_exchange_service::*;
pub use password_service::*;
