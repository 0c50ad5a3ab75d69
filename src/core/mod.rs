//! 核心模块
//!
//! 包含宿主的核心功能：
//! - `error` - 错误类型定义
//! - `host` - 独立宿主入口与引擎生命周期

pub mod error;
pub mod host;

// 重新导出错误类型
pub use error::{HostError, HostResult, ScriptError, ScriptResult};

// 重新导出宿主类型
pub use host::{install_fatal_handler, run, EngineOptions, ScriptHost, NAMESPACE_GLOBAL};
