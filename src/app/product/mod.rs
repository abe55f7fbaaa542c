//! 产品：只读列表

pub mod decode;
pub mod handler;
pub mod model;
pub mod service;
