//! 持久化适配器

mod memory;

pub use memory::*;
