//! Script error diagnostics.
//!
//! Converts an in-flight script exception into a precisely located,
//! human-readable report. Two shapes exist: thrown error objects usually
//! carry a preformatted `stack` string, while parse failures only carry
//! positional metadata (resource, line, column span, source line). The
//! shape is decided once at capture time and stored as a
//! [`ScriptDiagnostic`]; the reporter handles both without re-inspecting
//! the exception.

use std::io::{self, Write};

/// Positional metadata for failures without a usable stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalInfo {
    /// Logical filename label of the source unit.
    pub resource: String,
    /// 1-based line number, 0 when the engine reported none.
    pub line: u32,
    /// 0-based start column within the source line.
    pub start_column: usize,
    /// 0-based end column (exclusive). A span of zero renders no carets.
    pub end_column: usize,
    /// Literal text of the offending line, empty when unavailable.
    pub source_line: String,
    /// Exception headline, e.g. `SyntaxError: unexpected token ...`.
    pub message: String,
    /// Engine call stack at the point of failure, when one exists.
    pub backtrace: Option<String>,
}

/// A captured script failure, decided once when the exception is taken out
/// of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptDiagnostic {
    /// The engine produced no exception value at all.
    NoMessage,
    /// The thrown value exposed a preformatted `stack` string; rendered
    /// verbatim.
    StackTrace(String),
    /// Positional report: headline, source line, caret underline.
    Positional(PositionalInfo),
}

/// Write the report to `out`.
///
/// Formatting itself is infallible, including degenerate spans (empty
/// source line, columns past the end of the line, end before start); only
/// the underlying writer can error, and [`report`] swallows that.
pub fn write_report<W: Write>(diagnostic: &ScriptDiagnostic, out: &mut W) -> io::Result<()> {
    match diagnostic {
        ScriptDiagnostic::NoMessage => writeln!(out, "Error: (no message)"),
        ScriptDiagnostic::StackTrace(stack) => {
            writeln!(out, "{}", stack.trim_end_matches('\n'))
        }
        ScriptDiagnostic::Positional(info) => {
            writeln!(out, "{}:{}: {}", info.resource, info.line, info.message)?;
            writeln!(out, "{}", info.source_line)?;
            let pad = " ".repeat(info.start_column);
            let span = info.end_column.saturating_sub(info.start_column);
            writeln!(out, "{}{}", pad, "^".repeat(span))?;
            if let Some(trace) = &info.backtrace {
                writeln!(out, "{}", trace.trim_end_matches('\n'))?;
            }
            Ok(())
        }
    }
}

/// Report to the process error stream and flush. Never raises further.
pub fn report(diagnostic: &ScriptDiagnostic) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    let _ = write_report(diagnostic, &mut out);
    let _ = out.flush();
}

/// Recover the position from the first frame of an engine backtrace.
///
/// Frames come as `at <resource>:<line>:<column>` or `at <resource>:<line>`,
/// optionally with the location parenthesized after a function name, e.g.
/// `    at eval_script:1:8` or `    at f (eval_script:3)`. Returns the
/// 1-based line and, when the frame carries one, the 0-based column.
pub(crate) fn frame_position(backtrace: &str) -> Option<(u32, Option<usize>)> {
    let first = backtrace.lines().next()?;
    let frame = first.trim_end().trim_end_matches(')');
    let mut parts = frame.rsplitn(3, ':');
    let last = parts.next()?.parse::<u32>().ok()?;
    if let Some(line) = parts.next().and_then(|mid| mid.parse::<u32>().ok()) {
        return Some((line, Some(last as usize)));
    }
    Some((last, None))
}

/// Locate the token quoted in a parser message within the source line,
/// returning a `[start, end)` column span. QuickJS quotes the offending
/// token in messages like `unexpected token in expression: ';'`. Returns a
/// zero span when no token can be located.
pub(crate) fn token_span(message: &str, source_line: &str) -> (usize, usize) {
    let Some(open) = message.find('\'') else {
        return (0, 0);
    };
    let rest = &message[open + 1..];
    let Some(close) = rest.rfind('\'') else {
        return (0, 0);
    };
    let token = &rest[..close];
    if token.is_empty() {
        return (0, 0);
    }
    match source_line.find(token) {
        Some(byte_idx) => {
            let start = source_line[..byte_idx].chars().count();
            (start, start + token.chars().count())
        }
        None => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(diagnostic: &ScriptDiagnostic) -> String {
        let mut out = Vec::new();
        write_report(diagnostic, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn no_message_renders_generic_line() {
        assert_eq!(render(&ScriptDiagnostic::NoMessage), "Error: (no message)\n");
    }

    #[test]
    fn stack_trace_renders_verbatim() {
        let stack = "Error: boom\n    at f (test.js:3)\n    at test.js:7";
        let rendered = render(&ScriptDiagnostic::StackTrace(stack.to_string()));
        assert_eq!(rendered, format!("{stack}\n"));
    }

    #[test]
    fn positional_underlines_the_span() {
        let info = PositionalInfo {
            resource: "test.js".to_string(),
            line: 1,
            start_column: 8,
            end_column: 9,
            source_line: "var x = ;".to_string(),
            message: "SyntaxError: unexpected token in expression: ';'".to_string(),
            backtrace: None,
        };
        let rendered = render(&ScriptDiagnostic::Positional(info));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "test.js:1: SyntaxError: unexpected token in expression: ';'"
        );
        assert_eq!(lines[1], "var x = ;");
        assert_eq!(lines[2], "        ^");
    }

    #[test]
    fn positional_appends_backtrace_when_present() {
        let info = PositionalInfo {
            resource: "test.js".to_string(),
            line: 2,
            source_line: "boom()".to_string(),
            message: "ReferenceError: boom is not defined".to_string(),
            backtrace: Some("    at test.js:2\n".to_string()),
            ..Default::default()
        };
        let rendered = render(&ScriptDiagnostic::Positional(info));
        assert!(rendered.ends_with("    at test.js:2\n"));
    }

    #[test]
    fn degenerate_spans_render_without_error() {
        // End before start, columns past the line, empty source line.
        for (start, end, line) in [(9, 3, "short"), (40, 45, "x"), (0, 0, "")] {
            let info = PositionalInfo {
                resource: "t.js".to_string(),
                line: 0,
                start_column: start,
                end_column: end,
                source_line: line.to_string(),
                message: String::new(),
                backtrace: None,
            };
            let rendered = render(&ScriptDiagnostic::Positional(info));
            assert!(rendered.starts_with("t.js:0: "));
        }
    }

    #[test]
    fn frame_position_parses_line_and_column() {
        // The engine emits resource:line:column frames; the line is the
        // middle segment, not the trailing one.
        assert_eq!(
            frame_position("    at eval_script:1:8\n"),
            Some((1, Some(8)))
        );
        assert_eq!(
            frame_position("    at f (eval_script:1:8)\n"),
            Some((1, Some(8)))
        );
    }

    #[test]
    fn frame_position_parses_line_only_frames() {
        assert_eq!(frame_position("    at eval_script:3\n"), Some((3, None)));
        assert_eq!(frame_position("    at f (eval_script:12)\n"), Some((12, None)));
        assert_eq!(frame_position("no frame here"), None);
        assert_eq!(frame_position(""), None);
    }

    #[test]
    fn token_span_finds_quoted_token() {
        let (start, end) = token_span(
            "SyntaxError: unexpected token in expression: ';'",
            "var x = ;",
        );
        assert_eq!((start, end), (8, 9));
    }

    #[test]
    fn token_span_degrades_to_zero() {
        assert_eq!(token_span("no quotes at all", "var x = ;"), (0, 0));
        assert_eq!(token_span("token ';' missing", "var x = 1"), (0, 0));
        assert_eq!(token_span("empty ''", "var x = 1"), (0, 0));
    }

    proptest! {
        #[test]
        fn caret_count_equals_span_width(start in 0usize..40, width in 0usize..40) {
            let info = PositionalInfo {
                resource: "p.js".to_string(),
                line: 1,
                start_column: start,
                end_column: start + width,
                source_line: "x".repeat(80),
                message: "boom".to_string(),
                backtrace: None,
            };
            let rendered = render(&ScriptDiagnostic::Positional(info));
            let caret_line = rendered.lines().nth(2).unwrap_or("");
            prop_assert_eq!(caret_line.chars().filter(|c| *c == '^').count(), width);
            prop_assert!(caret_line.starts_with(&" ".repeat(start)));
        }
    }
}
