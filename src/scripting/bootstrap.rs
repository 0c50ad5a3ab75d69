//! Embedded bootstrap source.
//!
//! The glue below ships inside the binary and runs exactly once, after all
//! native capabilities are registered. It may therefore assume every
//! capability binding is already present on the namespace it receives. A
//! failure here is a defect in the bundled source, never a user error, and
//! is reported louder than ordinary script errors.

use rquickjs::{Ctx, Object};

use crate::core::error::ScriptError;
use crate::scripting::diagnostics;
use crate::scripting::executor::{self, SourceUnit};

/// Logical filename label for the bundled blob; diagnostics only.
pub const BOOTSTRAP_RESOURCE: &str = "bootstrap.js";

/// Script-level glue installed over the native bindings.
///
/// The completion value is a function that receives the namespace object;
/// the namespace is handed in explicitly because it is not yet bound in
/// the global object when the bootstrap runs.
pub const BOOTSTRAP_SOURCE: &str = r#"
(function (libxml) {
    'use strict';

    if (libxml === null || typeof libxml !== 'object') {
        throw new TypeError('capability namespace missing');
    }

    libxml.hasCapability = function (name) {
        return Object.prototype.hasOwnProperty.call(libxml, name);
    };

    libxml.capabilities = function () {
        return Object.keys(libxml).sort();
    };
})
"#;

/// The bundled unit run by the default bootstrap step.
pub fn bundled_unit() -> SourceUnit {
    SourceUnit::new(BOOTSTRAP_RESOURCE, BOOTSTRAP_SOURCE)
}

/// Run a bootstrap unit against `namespace`.
///
/// Any captured failure is escalated: the internal-bug notice goes to
/// stdout, the full diagnostic report to stderr, and the caller receives a
/// [`ScriptError::BootstrapDefect`] that aborts the host.
pub fn load<'js>(
    ctx: &Ctx<'js>,
    namespace: &Object<'js>,
    unit: &SourceUnit,
) -> Result<(), ScriptError> {
    match run_glue(ctx, namespace, unit) {
        Ok(()) => {
            tracing::debug!(target: "scripting", resource = unit.name(), "bootstrap source completed");
            Ok(())
        }
        Err(error) => Err(escalate(unit, error)),
    }
}

fn run_glue<'js>(
    ctx: &Ctx<'js>,
    namespace: &Object<'js>,
    unit: &SourceUnit,
) -> Result<(), ScriptError> {
    let value = executor::eval_unit(ctx, unit)?;
    // A function completion value is the installer; anything else means
    // the glue has nothing left to wire up.
    if let Some(installer) = value.as_function() {
        if let Err(error) = installer.call::<_, ()>((namespace.clone(),)) {
            return Err(executor::capture_failure(ctx, unit, error));
        }
    }
    Ok(())
}

fn escalate(unit: &SourceUnit, error: ScriptError) -> ScriptError {
    // The only diagnostic output that goes to stdout.
    println!("There is an error in the bundled bootstrap script");
    println!("This should be reported as a bug!");
    diagnostics::report(error.diagnostic());
    ScriptError::BootstrapDefect {
        resource: unit.name().to_string(),
        diagnostic: error.diagnostic().clone(),
    }
}
