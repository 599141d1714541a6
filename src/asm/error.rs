//! Diagnostics: plain enums with hand-rolled `Display` impls, colorized the
//! way the teacher colorizes its own parse errors. No panics on user input.

use colored::Colorize;
use std::fmt;

/// One assembly-time diagnostic, carrying enough provenance to print a
/// source line with a caret under the offending column.
#[derive(Debug, Clone)]
pub struct AsmError {
    pub file: String,
    pub row: usize,
    pub column: usize,
    pub line_text: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidLabel(String),
    InvalidOpcode(String),
    InvalidDirective(String),
    UnknownAddressingMode(String),
    OddLengthHexString,
    AlignmentNotPowerOfTwo,
    DuplicateLabel(String),
    OriginAfterFirstSegment,
    TrailingGarbage(String),
    BranchOffsetOutOfBounds(i32),
    ExportOfNonLabel(String),
    CodeExceeds64Kib,
    MismatchedParens,
    ExpressionSyntax(String),
    BadNumber(String),
    UnresolvedExpression,
    FileNotFound(String),
    IoFailure(String),
}

impl AsmError {
    pub fn new(file: &str, row: usize, column: usize, line_text: &str, kind: ErrorKind) -> AsmError {
        AsmError {
            file: file.to_string(),
            row,
            column,
            line_text: line_text.to_string(),
            kind,
        }
    }

    /// A plain, uncolored one-line message, suitable for log sinks or
    /// tests that don't want ANSI codes embedded in assertions.
    pub fn message(&self) -> String {
        format!("{}:{}:{}: {}", self.file, self.row, self.column, self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidLabel(s) => write!(f, "invalid label '{}'", s),
            ErrorKind::InvalidOpcode(s) => write!(f, "invalid opcode '{}'", s),
            ErrorKind::InvalidDirective(s) => write!(f, "invalid directive '{}'", s),
            ErrorKind::UnknownAddressingMode(s) => {
                write!(f, "unknown addressing-mode format '{}'", s)
            }
            ErrorKind::OddLengthHexString => write!(f, "hex string has an odd number of digits"),
            ErrorKind::AlignmentNotPowerOfTwo => write!(f, "alignment must be a power of 2 > 0"),
            ErrorKind::DuplicateLabel(s) => write!(f, "duplicate label '{}'", s),
            ErrorKind::OriginAfterFirstSegment => {
                write!(f, "origin directive after the first segment")
            }
            ErrorKind::TrailingGarbage(s) => write!(f, "trailing garbage after operand: '{}'", s),
            ErrorKind::BranchOffsetOutOfBounds(n) => {
                write!(f, "branch offset {} out of range [-128, 127]", n)
            }
            ErrorKind::ExportOfNonLabel(s) => {
                write!(f, "export '{}' does not resolve to an address label", s)
            }
            ErrorKind::CodeExceeds64Kib => write!(f, "assembled code exceeds 64 KiB"),
            ErrorKind::MismatchedParens => write!(f, "mismatched parentheses"),
            ErrorKind::ExpressionSyntax(s) => write!(f, "expression syntax error: {}", s),
            ErrorKind::BadNumber(s) => write!(f, "bad number literal '{}'", s),
            ErrorKind::UnresolvedExpression => {
                write!(f, "expression did not resolve after two evaluation passes")
            }
            ErrorKind::FileNotFound(s) => write!(f, "file not found: '{}'", s),
            ErrorKind::IoFailure(s) => write!(f, "i/o failure: {}", s),
        }
    }
}

impl fmt::Display for AsmError {
    /// Colorized source line + caret, matching the teacher's
    /// `ParseError::new` formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}:{}:{}",
            "error:".red().bold(),
            self.file,
            self.row,
            self.column
        )?;
        writeln!(f, "  {}", self.line_text)?;
        writeln!(f, "  {}{}", " ".repeat(self.column), "^".yellow().bold())?;
        write!(f, "  {}", self.kind.to_string().red())
    }
}

impl std::error::Error for AsmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_has_no_ansi_codes() {
        let err = AsmError::new(
            "main.asm",
            3,
            5,
            "  LDA #$GG",
            ErrorKind::BadNumber("$GG".to_string()),
        );
        let msg = err.message();
        assert!(!msg.contains('\u{1b}'));
        assert_eq!(msg, "main.asm:3:5: bad number literal '$GG'");
    }

    #[test]
    fn display_includes_caret_line() {
        let err = AsmError::new("main.asm", 1, 2, "ABC", ErrorKind::MismatchedParens);
        let rendered = format!("{}", err);
        assert!(rendered.contains("ABC"));
        assert!(rendered.contains('^'));
    }
}
