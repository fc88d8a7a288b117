use serde::Serialize;

/// Advisory conditions found in AGSL input. None of them stop transpilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// `layout(color)` was stripped; GLSL ES has no equivalent.
    ColorLayout,
    /// `#define` is not part of AGSL.
    DefineDirective,
    /// A `for` condition compares against a non-literal bound.
    DynamicLoopBound,
}

impl WarningKind {
    pub fn message(self) -> &'static str {
        match self {
            WarningKind::ColorLayout => "stripped 'layout(color)'",
            WarningKind::DefineDirective => "'#define' is not supported in AGSL",
            WarningKind::DynamicLoopBound => "dynamic loops may fail in WebGL",
        }
    }
}

/// One advisory warning, located at its first occurrence in the user source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Warning {
    pub fn new(kind: WarningKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warning: {} at {}:{}", self.message, self.line, self.column)
    }
}

const ERROR_MARKER: &str = "ERROR:";

/// Translate a generated-source line into user-source coordinates.
///
/// Lines inside the preamble come out zero or negative.
pub fn remap_line(generated_line: i64, line_offset: usize) -> i64 {
    let offset = i64::try_from(line_offset).unwrap_or(i64::MAX);
    generated_line.saturating_sub(offset)
}

/// Rewrite every `ERROR: <source>:<line>:` location in a GLSL compiler log
/// to `ERROR: Line <user line>:`. Text that does not match passes through.
pub fn remap_diagnostics(message: &str, line_offset: usize) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(idx) = rest.find(ERROR_MARKER) {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + ERROR_MARKER.len()..];
        match match_location(after) {
            Some((line, consumed)) => {
                out.push_str(&format!("ERROR: Line {}:", remap_line(line, line_offset)));
                rest = &after[consumed..];
            }
            None => {
                out.push_str(ERROR_MARKER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Match `<ws+><digits>:<digits>:` at the start of `text`, returning the
/// second number and the matched length. Line numbers that overflow `i64`
/// do not match.
fn match_location(text: &str) -> Option<(i64, usize)> {
    let bytes = text.as_bytes();
    let mut pos = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    if pos == 0 {
        return None;
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let source_digits = digits(pos);
    if source_digits == 0 || bytes.get(pos + source_digits) != Some(&b':') {
        return None;
    }
    pos += source_digits + 1;

    let line_digits = digits(pos);
    if line_digits == 0 || bytes.get(pos + line_digits) != Some(&b':') {
        return None;
    }
    let line = text[pos..pos + line_digits].parse().ok()?;
    Some((line, pos + line_digits + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_single_error() {
        let log = "ERROR: 0:52: 'foo' : undeclared identifier";
        assert_eq!(
            remap_diagnostics(log, 40),
            "ERROR: Line 12: 'foo' : undeclared identifier"
        );
    }

    #[test]
    fn test_remap_multiple_errors() {
        let log = "ERROR: 0:41: 'x' : syntax error\nERROR: 0:45: 'y' : undeclared identifier\n";
        assert_eq!(
            remap_diagnostics(log, 40),
            "ERROR: Line 1: 'x' : syntax error\nERROR: Line 5: 'y' : undeclared identifier\n"
        );
    }

    #[test]
    fn test_preamble_lines_go_non_positive() {
        assert_eq!(remap_diagnostics("ERROR: 0:3: bad", 10), "ERROR: Line -7: bad");
        assert_eq!(remap_line(10, 10), 0);
    }

    #[test]
    fn test_unmatched_text_passes_through() {
        let log = "WARNING: 0:12: precision\nERROR:0:12: tight\nERROR: 2 compilation errors.";
        assert_eq!(remap_diagnostics(log, 5), log);
    }

    #[test]
    fn test_oversized_line_number_passes_through() {
        let log = "ERROR: 0:99999999999999999999: too far";
        assert_eq!(remap_diagnostics(log, 40), log);
        assert_eq!(
            remap_diagnostics("ERROR: 0:9223372036854775807: edge", 7),
            "ERROR: Line 9223372036854775800: edge"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::new(WarningKind::DefineDirective, 3, 1);
        assert_eq!(
            warning.to_string(),
            "warning: '#define' is not supported in AGSL at 3:1"
        );
    }
}
