//! 统一错误处理模块
//!
//! 宿主层的错误分为两层：
//!
//! - **脚本层错误** (`ScriptError`): 脚本编译或执行失败，携带捕获时生成的
//!   诊断信息，供诊断输出使用。
//! - **宿主层错误** (`HostError`): 引擎原生层失败（上下文创建、原生注册等），
//!   包装底层引擎错误。
//!
//! 本层不做任何本地恢复：失败的唯一职责是产出可诊断的报告并确定性终止。

use thiserror::Error;

use crate::scripting::diagnostics::ScriptDiagnostic;

/// 脚本层错误类型
#[derive(Error, Debug)]
pub enum ScriptError {
    /// 源码无法解析
    #[error("compile error in {resource}")]
    Compile {
        resource: String,
        diagnostic: ScriptDiagnostic,
    },

    /// 脚本执行过程中抛出异常
    #[error("runtime error in {resource}")]
    Runtime {
        resource: String,
        diagnostic: ScriptDiagnostic,
    },

    /// 内置引导脚本失败：这是内部缺陷而非用户错误
    #[error("bootstrap defect in {resource}")]
    BootstrapDefect {
        resource: String,
        diagnostic: ScriptDiagnostic,
    },
}

impl ScriptError {
    /// The diagnostic captured when this failure was taken out of the engine.
    pub fn diagnostic(&self) -> &ScriptDiagnostic {
        match self {
            ScriptError::Compile { diagnostic, .. }
            | ScriptError::Runtime { diagnostic, .. }
            | ScriptError::BootstrapDefect { diagnostic, .. } => diagnostic,
        }
    }

    /// Logical filename label of the source unit that failed.
    pub fn resource(&self) -> &str {
        match self {
            ScriptError::Compile { resource, .. }
            | ScriptError::Runtime { resource, .. }
            | ScriptError::BootstrapDefect { resource, .. } => resource,
        }
    }
}

/// 宿主层错误类型
#[derive(Error, Debug)]
pub enum HostError {
    /// 引擎原生层失败
    #[error("engine error: {0}")]
    Engine(#[from] rquickjs::Error),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type ScriptResult<T> = Result<T, ScriptError>;
pub type HostResult<T> = Result<T, HostError>;
