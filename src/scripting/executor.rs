//! Script execution inside the current context.
//!
//! 在当前上下文中编译并执行一段源码。编译失败与运行失败分别捕获，
//! 统一转换为 [`ScriptDiagnostic`] 供诊断输出使用。
//!
//! The engine evaluates a script in a single step, so compile failures are
//! told apart from runtime failures by the class of the thrown exception:
//! the parser only ever throws `SyntaxError` before any user code runs.

use std::collections::HashMap;

use rquickjs::{Ctx, Error, Value};

use crate::core::error::ScriptError;
use crate::scripting::diagnostics::{self, PositionalInfo, ScriptDiagnostic};

/// An immutable (source text, logical filename label) pair submitted for
/// evaluation. The label is metadata only and is used exclusively for
/// diagnostics; it need not correspond to a real file.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    name: String,
    source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Literal text of a 1-based line, empty when out of range.
    fn line_text(&self, line: u32) -> &str {
        if line == 0 {
            return "";
        }
        self.source.lines().nth(line as usize - 1).unwrap_or("")
    }
}

/// Owned completion value of a script run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(HashMap<String, ScriptValue>),
}

impl ScriptValue {
    /// Lossy conversion out of the engine. Exotic values (symbols, module
    /// namespaces) degrade to `Null` rather than failing.
    pub fn from_js(value: &Value<'_>) -> Self {
        if value.is_undefined() || value.is_null() {
            ScriptValue::Null
        } else if let Some(b) = value.as_bool() {
            ScriptValue::Bool(b)
        } else if let Some(i) = value.as_int() {
            ScriptValue::Number(f64::from(i))
        } else if let Some(f) = value.as_float() {
            ScriptValue::Number(f)
        } else if let Some(s) = value.as_string() {
            ScriptValue::String(s.to_string().unwrap_or_default())
        } else if let Some(array) = value.as_array() {
            let items = array
                .iter::<Value>()
                .flatten()
                .map(|item| ScriptValue::from_js(&item))
                .collect();
            ScriptValue::Array(items)
        } else if let Some(object) = value.as_object() {
            let mut map = HashMap::new();
            for prop in object.props::<String, Value>().flatten() {
                let (key, value) = prop;
                map.insert(key, ScriptValue::from_js(&value));
            }
            ScriptValue::Object(map)
        } else {
            ScriptValue::Null
        }
    }
}

/// Evaluate a source unit in `ctx`, returning the raw completion value.
///
/// On failure the pending exception is consumed exactly once (the error
/// capture scope is released on every path, so captured state never leaks
/// into later evaluations) and classified into a compile or runtime error.
pub fn eval_unit<'js>(ctx: &Ctx<'js>, unit: &SourceUnit) -> Result<Value<'js>, ScriptError> {
    match ctx.eval::<Value, _>(unit.source()) {
        Ok(value) => Ok(value),
        Err(error) => Err(capture_failure(ctx, unit, error)),
    }
}

/// Evaluate a source unit and convert its completion value. Success
/// produces no diagnostic output.
pub fn execute(ctx: &Ctx<'_>, unit: &SourceUnit) -> Result<ScriptValue, ScriptError> {
    eval_unit(ctx, unit).map(|value| ScriptValue::from_js(&value))
}

/// Take the pending exception out of the engine and decide the diagnostic
/// shape once.
///
/// - parser failures (`SyntaxError`) become compile errors with a
///   positional diagnostic,
/// - thrown values exposing a string `stack` take the stack-trace path,
/// - everything else falls back to the positional path.
pub(crate) fn capture_failure(ctx: &Ctx<'_>, unit: &SourceUnit, error: Error) -> ScriptError {
    if !matches!(error, Error::Exception) {
        tracing::debug!(
            target: "scripting",
            error = %error,
            resource = unit.name(),
            "engine error without exception value"
        );
        return ScriptError::Runtime {
            resource: unit.name().to_string(),
            diagnostic: ScriptDiagnostic::NoMessage,
        };
    }

    let thrown = ctx.catch();
    let name = string_property(&thrown, "name");
    let message = string_property(&thrown, "message");
    let stack = string_property(&thrown, "stack");

    // Headline in the conventional `Name: message` form; absent for thrown
    // values that are not error-shaped.
    let headline = match (&name, &message) {
        (Some(n), Some(m)) if !m.is_empty() => Some(format!("{n}: {m}")),
        (Some(n), _) => Some(n.clone()),
        (None, Some(m)) => Some(m.clone()),
        (None, None) => None,
    };

    if name.as_deref() == Some("SyntaxError") {
        let headline = headline.unwrap_or_else(|| "SyntaxError".to_string());
        return ScriptError::Compile {
            resource: unit.name().to_string(),
            diagnostic: positional(unit, &headline, stack),
        };
    }

    if let Some(stack) = stack {
        let diagnostic = match &headline {
            Some(headline) => ScriptDiagnostic::StackTrace(with_headline(headline, stack)),
            None => ScriptDiagnostic::StackTrace(stack),
        };
        return ScriptError::Runtime {
            resource: unit.name().to_string(),
            diagnostic,
        };
    }

    let headline = headline.unwrap_or_else(|| stringify(&thrown));
    ScriptError::Runtime {
        resource: unit.name().to_string(),
        diagnostic: positional(unit, &headline, None),
    }
}

fn positional(unit: &SourceUnit, headline: &str, backtrace: Option<String>) -> ScriptDiagnostic {
    let (line, column) = backtrace
        .as_deref()
        .and_then(diagnostics::frame_position)
        .unwrap_or((0, None));
    let source_line = unit.line_text(line).to_string();
    // The quoted token gives the full span; when the message quotes none,
    // fall back to a one-column caret at the frame position.
    let (mut start_column, mut end_column) = diagnostics::token_span(headline, &source_line);
    if start_column == end_column {
        if let Some(column) = column.filter(|c| *c < source_line.chars().count()) {
            start_column = column;
            end_column = column + 1;
        }
    }
    ScriptDiagnostic::Positional(PositionalInfo {
        resource: unit.name().to_string(),
        line,
        start_column,
        end_column,
        source_line,
        message: headline.to_string(),
        backtrace,
    })
}

/// The engine's stack text carries only frames; prepend the conventional
/// `Name: message` header when it is not already there.
fn with_headline(headline: &str, stack: String) -> String {
    if stack.starts_with(headline) {
        stack
    } else {
        format!("{headline}\n{stack}")
    }
}

fn string_property(value: &Value<'_>, key: &str) -> Option<String> {
    let object = value.as_object()?;
    object.get::<_, Option<String>>(key).ok().flatten()
}

/// Best-effort string form of an arbitrary thrown value.
fn stringify(value: &Value<'_>) -> String {
    match ScriptValue::from_js(value) {
        ScriptValue::Null => "null".to_string(),
        ScriptValue::Bool(b) => b.to_string(),
        ScriptValue::Number(n) => n.to_string(),
        ScriptValue::String(s) => s,
        ScriptValue::Array(_) => "[object Array]".to_string(),
        ScriptValue::Object(_) => "[object Object]".to_string(),
    }
}
