//! 领域实体

mod user;

pub use user::*;
