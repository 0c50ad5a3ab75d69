//! Capability registration.
//!
//! 原生能力模块通过统一的注册入口挂载到命名空间对象上。注册顺序与添加
//! 顺序一致且跨运行稳定；全部注册完成之后才执行引导脚本，因此引导源码
//! 可以假定所有原生能力均已就位。

use rquickjs::{Ctx, Object};

use crate::core::error::HostError;
use crate::scripting::bootstrap;
use crate::scripting::executor::SourceUnit;

/// A native capability module.
///
/// Registration runs exactly once per process lifetime, synchronously, and
/// must not retain a reference to the namespace object beyond the call.
pub trait Capability {
    /// Stable name, used for logging.
    fn name(&self) -> &'static str;

    /// Install bindings (functions, constructors, constants) into the
    /// namespace object.
    fn register<'js>(&self, ctx: &Ctx<'js>, namespace: &Object<'js>) -> rquickjs::Result<()>;
}

/// Ordered set of capability modules plus the terminal bootstrap step.
pub struct CapabilityRegistry {
    capabilities: Vec<Box<dyn Capability>>,
    bootstrap: SourceUnit,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Empty registry wired to the bundled bootstrap source.
    pub fn new() -> Self {
        Self {
            capabilities: Vec::new(),
            bootstrap: bootstrap::bundled_unit(),
        }
    }

    /// Registry pre-populated with the built-in capabilities.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(VersionCapability);
        registry
    }

    /// Append a capability. Later registrations may rely on earlier ones.
    pub fn add<C: Capability + 'static>(&mut self, capability: C) -> &mut Self {
        self.capabilities.push(Box::new(capability));
        self
    }

    /// Replace the bootstrap unit. Test seam; production hosts run the
    /// compiled-in source.
    pub fn set_bootstrap(&mut self, unit: SourceUnit) -> &mut Self {
        self.bootstrap = unit;
        self
    }

    /// Registered capability names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(|c| c.name()).collect()
    }

    /// Run every registration in order, then the bootstrap step once.
    ///
    /// A native-level registration failure propagates immediately and
    /// aborts the host; there is no partial-success mode.
    pub fn initialize<'js>(&self, ctx: &Ctx<'js>, namespace: &Object<'js>) -> Result<(), HostError> {
        for capability in &self.capabilities {
            tracing::debug!(
                target: "scripting",
                capability = capability.name(),
                "registering capability"
            );
            capability.register(ctx, namespace)?;
        }
        bootstrap::load(ctx, namespace, &self.bootstrap)?;
        Ok(())
    }
}

/// Installs the host version string, mirroring the version constants the
/// native parser modules expose at the same point.
struct VersionCapability;

impl Capability for VersionCapability {
    fn name(&self) -> &'static str {
        "version"
    }

    fn register<'js>(&self, _ctx: &Ctx<'js>, namespace: &Object<'js>) -> rquickjs::Result<()> {
        namespace.set("version", env!("CARGO_PKG_VERSION"))
    }
}
