//! Segment model: the unit the assignment/emission passes walk over.

use super::expr::ExprNode;
use crate::instr::{AddressingMode, Variant};

/// Guessed addressing mode plus the modifiers that narrow instruction
/// selection (§4.9), derived purely from operand syntax before any
/// expression evaluation happens.
#[derive(Debug, Clone)]
pub struct OperandDescriptor {
    pub mode_guess: AddressingMode,
    pub expr: Option<ExprNode>,
    pub force_immediate: bool,
    pub force_absolute: bool,
}

impl OperandDescriptor {
    pub fn implied() -> OperandDescriptor {
        OperandDescriptor {
            mode_guess: AddressingMode::Imp,
            expr: None,
            force_immediate: false,
            force_absolute: false,
        }
    }

    /// 0 for IMP; 1 for forced immediate; 2 when the resolved value is an
    /// address, force-absolute is set, or the value falls outside what a
    /// zero-page byte can hold; otherwise 1. Callers pass in the
    /// expression's resolved value/is_address once evaluation has
    /// progressed far enough to know them.
    pub fn size(&self, value: i64, is_address: bool) -> u8 {
        if self.expr.is_none() {
            return 0;
        }
        if self.force_immediate {
            return 1;
        }
        if is_address || self.force_absolute || value > 0xFF || value < -128 {
            2
        } else {
            1
        }
    }
}

#[derive(Debug, Clone)]
pub enum DataItem {
    Expr(ExprNode),
    Str(String),
}

#[derive(Debug, Clone)]
pub enum SegmentKind {
    /// A label-only or comment-only line: contributes no bytes, but still
    /// occupies an address (the PC value at the time it's reached) so a
    /// label defined on its own line has somewhere to point.
    Mark,
    Instruction {
        mnemonic: String,
        operand: OperandDescriptor,
        opcode: Option<u8>,
        length: u8,
        /// Which `.arch` was in effect when this line was parsed, so a
        /// later `.arch` switch doesn't reinterpret it under the wrong
        /// table.
        variant: Variant,
    },
    Data {
        unit_size: u8,
        high_bit_terminator: bool,
        items: Vec<DataItem>,
    },
    Raw(Vec<u8>),
    Align {
        boundary: u32,
    },
    Pad {
        value: ExprNode,
        length: ExprNode,
    },
    Export {
        name: String,
        expr: ExprNode,
    },
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub file_index: usize,
    pub row: usize,
    pub line_text: String,
    pub address: u16,
    pub kind: SegmentKind,
}

/// Prepends a non-identifier sigil plus the currently in-scope global label
/// to a local label's own name, producing a private key for the shared
/// labels map. Non-local labels (and non-label identifiers) pass through
/// unchanged and themselves become the new current scope.
pub fn scope_label(current_scope: &str, label: &str) -> (String, bool) {
    if label.starts_with('.') || label.starts_with('@') {
        (format!("\u{1}{}{}", current_scope, label), false)
    } else {
        (label.to_string(), true)
    }
}

/// Resolves a bare identifier reference the same way a label definition's
/// name would be scoped, so `.loop` inside a routine finds the `.loop`
/// label defined earlier in the same routine.
pub fn scope_reference(current_scope: &str, name: &str) -> String {
    if name.starts_with('.') || name.starts_with('@') {
        format!("\u{1}{}{}", current_scope, name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_label_becomes_new_scope() {
        let (name, is_scope) = scope_label("main", "loop_start");
        assert_eq!(name, "loop_start");
        assert!(is_scope);
    }

    #[test]
    fn local_label_folds_into_current_scope() {
        let (name, is_scope) = scope_label("main", ".again");
        assert!(!is_scope);
        assert!(name.ends_with("main.again"));
    }

    #[test]
    fn operand_size_is_zero_for_implied() {
        let op = OperandDescriptor::implied();
        assert_eq!(op.size(0, false), 0);
    }
}
