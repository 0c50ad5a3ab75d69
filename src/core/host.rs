//! Standalone host entry point.
//!
//! Owns the process-wide engine lifecycle: flag forwarding, fatal-error
//! handling, runtime and context creation, namespace installation and
//! disposal. The lifecycle is linear and runs exactly once per process:
//! engine ready, context active, namespace installed, script phase,
//! disposed.

use std::io::Write;
use std::panic;
use std::process;

use rquickjs::{Context, Ctx, Object, Runtime};

use crate::core::error::HostResult;
use crate::scripting::registry::CapabilityRegistry;

/// Global name the namespace object is bound under.
pub const NAMESPACE_GLOBAL: &str = "libxml";

/// Banner for unrecoverable engine-level failures; red, so it stands apart
/// from ordinary script diagnostics.
const FATAL_BANNER: &str = "\x1b[1;31mENGINE FATAL ERROR.\x1b[m";

/// Engine options recognized on the command line.
///
/// These are forwarded to the engine before anything executes; the host
/// defines no flags of its own. Unrecognized arguments pass through
/// untouched as script-phase arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Heap limit in bytes (`--js-memory-limit=N`).
    pub memory_limit: Option<usize>,
    /// Native stack limit in bytes (`--js-stack-size=N`).
    pub max_stack_size: Option<usize>,
    /// GC trigger threshold in bytes (`--js-gc-threshold=N`).
    pub gc_threshold: Option<usize>,
}

impl EngineOptions {
    /// Split engine flags out of `args`, returning the parsed options and
    /// the remaining arguments in their original order.
    pub fn from_args<I>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut rest = Vec::new();
        for arg in args {
            if let Some(value) = arg.strip_prefix("--js-memory-limit=") {
                options.memory_limit = value.parse().ok();
            } else if let Some(value) = arg.strip_prefix("--js-stack-size=") {
                options.max_stack_size = value.parse().ok();
            } else if let Some(value) = arg.strip_prefix("--js-gc-threshold=") {
                options.gc_threshold = value.parse().ok();
            } else {
                rest.push(arg);
            }
        }
        (options, rest)
    }

    fn apply(&self, runtime: &Runtime) {
        if let Some(limit) = self.memory_limit {
            runtime.set_memory_limit(limit);
        }
        if let Some(size) = self.max_stack_size {
            runtime.set_max_stack_size(size);
        }
        if let Some(threshold) = self.gc_threshold {
            runtime.set_gc_threshold(threshold);
        }
    }
}

/// Owns the engine runtime and its single execution context.
///
/// Exactly one instance exists in standalone mode. An embedding host that
/// brings its own context uses [`crate::init_namespace`] instead and never
/// constructs this type.
pub struct ScriptHost {
    #[allow(dead_code)] // kept alive for the context lifetime
    runtime: Runtime,
    context: Context,
}

impl ScriptHost {
    /// Initialize the engine and create the execution context.
    pub fn new(options: &EngineOptions) -> HostResult<Self> {
        let runtime = Runtime::new()?;
        options.apply(&runtime);
        let context = Context::full(&runtime)?;
        tracing::debug!(target: "host", "execution context created");
        Ok(Self { runtime, context })
    }

    /// Enter the context scope.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }

    /// Create a fresh namespace object, run the registrar against it and
    /// bind it under [`NAMESPACE_GLOBAL`] in the context's global object.
    pub fn install_namespace(&self, registry: &CapabilityRegistry) -> HostResult<()> {
        self.context.with(|ctx| -> HostResult<()> {
            let namespace = Object::new(ctx.clone())?;
            registry.initialize(&ctx, &namespace)?;
            ctx.globals().set(NAMESPACE_GLOBAL, namespace)?;
            Ok(())
        })?;
        tracing::debug!(target: "host", global = NAMESPACE_GLOBAL, "namespace installed");
        Ok(())
    }
}

/// Install the process-wide fatal-error handler.
///
/// Unrecoverable engine-level failures (stack exhaustion, allocation
/// failure, internal invariant violations, which surface as panics) print a
/// distinguishable banner and terminate immediately. Ordinary script errors
/// never reach this path; they go through the diagnostic reporter.
pub fn install_fatal_handler() {
    panic::set_hook(Box::new(|info| {
        let message = panic_message(info);
        match info.location() {
            Some(location) => eprintln!("{FATAL_BANNER} {location} {message}"),
            None => eprintln!("{FATAL_BANNER} {message}"),
        }
        let _ = std::io::stderr().flush();
        process::exit(1);
    }));
}

fn panic_message(info: &panic::PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown engine failure".to_string()
    }
}

/// Run the standalone host to completion.
///
/// Engine flags are forwarded first, then the engine and context come up,
/// the namespace is populated and bound, user script arguments pass through
/// the (currently inert) script phase, and the engine is disposed. Errors
/// propagate to `main`, which exits with a non-zero status.
///
/// The fatal handler is installed by the binary entry point, not here, so
/// embedders calling `run` keep their own panic behavior.
pub fn run<I>(args: I) -> HostResult<()>
where
    I: IntoIterator<Item = String>,
{
    let (options, script_args) = EngineOptions::from_args(args);
    tracing::info!(target: "host", "engine starting");

    let host = ScriptHost::new(&options)?;
    let registry = CapabilityRegistry::with_defaults();
    host.install_namespace(&registry)?;

    // Script phase: execution of user-supplied files is not wired up yet;
    // arguments are accepted and skipped.
    for path in &script_args {
        tracing::debug!(target: "host", path = %path, "script phase inert, skipping file");
    }

    drop(host);
    tracing::info!(target: "host", "engine disposed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_flags_are_split_from_script_args() {
        let args = vec![
            "--js-memory-limit=1048576".to_string(),
            "first.js".to_string(),
            "--js-stack-size=262144".to_string(),
            "second.js".to_string(),
        ];
        let (options, rest) = EngineOptions::from_args(args);
        assert_eq!(options.memory_limit, Some(1_048_576));
        assert_eq!(options.max_stack_size, Some(262_144));
        assert_eq!(options.gc_threshold, None);
        assert_eq!(rest, vec!["first.js".to_string(), "second.js".to_string()]);
    }

    #[test]
    fn malformed_flag_values_are_ignored() {
        let args = vec!["--js-memory-limit=lots".to_string()];
        let (options, rest) = EngineOptions::from_args(args);
        assert_eq!(options.memory_limit, None);
        assert!(rest.is_empty());
    }

    #[test]
    fn host_creates_context_with_limits() {
        let options = EngineOptions {
            memory_limit: Some(16 * 1024 * 1024),
            ..Default::default()
        };
        let host = ScriptHost::new(&options).unwrap();
        let sum: i32 = host.with(|ctx| ctx.eval("40 + 2").unwrap());
        assert_eq!(sum, 42);
    }
}
