//! 命令/查询处理器

mod login_handler;
mod logout_handler;
mod profile_handler;
mod refresh_token_handler;
mod register_handler;

pub use login_handler::*;
pub use logout_handler::*;
pub use profile_handler::*;
pub use refresh_token_handler::*;
pub use register_handler::*;
