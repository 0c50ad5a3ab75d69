//! # xmljs
//!
//! Embedding layer that hosts a QuickJS context inside a native process and
//! exposes native capabilities (XML parsing facilities) to JavaScript.
//!
//! The layer does four things:
//!
//! - owns the engine and context lifecycle for the standalone host,
//! - registers native capability modules into the `libxml` namespace object,
//! - runs the embedded bootstrap glue once all capabilities are present,
//! - reports script failures with precise location info (file, line,
//!   column span, source snippet or stack trace).
//!
//! The capability modules themselves live elsewhere; they plug in through
//! the [`scripting::registry::Capability`] trait and never own the
//! namespace object they populate.

/// Core host functionality: engine lifecycle and error types
pub mod core;
/// Scripting layer: execution, diagnostics, registration, bootstrap
pub mod scripting;

pub use crate::core::error::{HostError, HostResult, ScriptError, ScriptResult};
pub use crate::core::host::{
    install_fatal_handler, run, EngineOptions, ScriptHost, NAMESPACE_GLOBAL,
};
pub use crate::scripting::registry::{Capability, CapabilityRegistry};

use rquickjs::{Ctx, Object};

/// Plugin entry point.
///
/// When loaded inside an external host runtime (which owns the engine, the
/// context and the final placement of the namespace object), this populates
/// `target` with every native capability and runs the bootstrap glue.
pub fn init_namespace<'js>(ctx: &Ctx<'js>, target: &Object<'js>) -> HostResult<()> {
    CapabilityRegistry::with_defaults().initialize(ctx, target)
}
