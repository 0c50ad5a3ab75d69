//! 脚本子系统
//!
//! 执行、诊断、能力注册与内置引导脚本。

pub mod bootstrap;
pub mod diagnostics;
pub mod executor;
pub mod registry;

pub use diagnostics::{report, write_report, PositionalInfo, ScriptDiagnostic};
pub use executor::{execute, ScriptValue, SourceUnit};
pub use registry::{Capability, CapabilityRegistry};
