//! Instruction selection: operand syntax to mode-guess, mode-guess plus a
//! mnemonic's candidate opcodes to one concrete instruction.

use super::error::ErrorKind;
use super::segment::OperandDescriptor;
use crate::instr::{AddressingMode, Instruction};

/// Derives a mode-guess (and the immediate/absolute force flags) from raw
/// operand text, per the table in §4.9. Returns the inner expression text
/// still to be parsed (empty for IMP).
pub fn guess_mode(operand_text: &str) -> (AddressingMode, bool, bool, String) {
    let text = operand_text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("a") {
        return (AddressingMode::Imp, false, false, String::new());
    }
    if let Some(rest) = text.strip_prefix('#') {
        return (AddressingMode::Imm, true, false, rest.trim().to_string());
    }
    for prefix in ["a:", "abs:"] {
        if text.len() > prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return (
                AddressingMode::Abs,
                false,
                true,
                text[prefix.len()..].trim().to_string(),
            );
        }
    }
    if text.starts_with('(') {
        if let Some(inner) = strip_suffix_ci(text, ",x)") {
            return (AddressingMode::Idx, false, false, inner[1..].trim().to_string());
        }
        if let Some(inner) = strip_suffix_ci(text, "),y") {
            return (AddressingMode::Idy, false, false, inner[1..].trim().to_string());
        }
        if text.ends_with(')') {
            return (
                AddressingMode::Ind,
                false,
                false,
                text[1..text.len() - 1].trim().to_string(),
            );
        }
    }
    if let Some(inner) = strip_suffix_ci(text, ",x") {
        return (AddressingMode::Abx, false, false, inner.trim().to_string());
    }
    if let Some(inner) = strip_suffix_ci(text, ",y") {
        return (AddressingMode::Aby, false, false, inner.trim().to_string());
    }
    (AddressingMode::Abs, false, false, text.to_string())
}

fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    if text.len() < suffix.len() {
        return None;
    }
    let tail = &text[text.len() - suffix.len()..];
    if tail.eq_ignore_ascii_case(suffix) {
        Some(&text[..text.len() - suffix.len()])
    } else {
        None
    }
}

fn family_match(instr_mode: AddressingMode, guess: AddressingMode) -> bool {
    matches!(
        (instr_mode, guess),
        (AddressingMode::Zpg, AddressingMode::Abs)
            | (AddressingMode::Zpx, AddressingMode::Abx)
            | (AddressingMode::Zpy, AddressingMode::Aby)
            | (AddressingMode::Abs, AddressingMode::Abs)
            | (AddressingMode::Abx, AddressingMode::Abx)
            | (AddressingMode::Aby, AddressingMode::Aby)
    )
}

/// Matches one candidate instruction against the operand, returning its
/// quality score (lower is better) if it's acceptable at all.
fn match_quality(instr: &Instruction, operand: &OperandDescriptor, size: u8) -> Option<u8> {
    match instr.mode {
        AddressingMode::Imp | AddressingMode::Acc => {
            if operand.mode_guess == AddressingMode::Imp && size == 0 {
                Some(0)
            } else {
                None
            }
        }
        AddressingMode::Imm => {
            if operand.mode_guess == AddressingMode::Imm && size == 1 {
                Some(1)
            } else {
                None
            }
        }
        AddressingMode::Rel => {
            if operand.mode_guess == AddressingMode::Abs {
                Some(1)
            } else {
                None
            }
        }
        AddressingMode::Zpg | AddressingMode::Zpx | AddressingMode::Zpy => {
            if family_match(instr.mode, operand.mode_guess) && size == 1 {
                Some(1)
            } else {
                None
            }
        }
        AddressingMode::Abs | AddressingMode::Abx | AddressingMode::Aby => {
            if family_match(instr.mode, operand.mode_guess) {
                Some(2)
            } else {
                None
            }
        }
        AddressingMode::Ind => {
            if instr.length == 3 {
                if operand.mode_guess == AddressingMode::Ind {
                    Some(2)
                } else {
                    None
                }
            } else if operand.mode_guess == AddressingMode::Ind && size == 1 {
                Some(1)
            } else {
                None
            }
        }
        AddressingMode::Idx => {
            if operand.mode_guess == AddressingMode::Idx && size == 1 {
                Some(1)
            } else {
                None
            }
        }
        AddressingMode::Idy => {
            if operand.mode_guess == AddressingMode::Idy && size == 1 {
                Some(1)
            } else {
                None
            }
        }
    }
}

/// Picks the shortest acceptable candidate, breaking ties by lower quality
/// score.
pub fn select<'a>(
    candidates: &[&'a Instruction],
    operand: &OperandDescriptor,
    size: u8,
) -> Result<&'a Instruction, ErrorKind> {
    candidates
        .iter()
        .filter_map(|instr| match_quality(instr, operand, size).map(|q| (*instr, q)))
        .min_by_key(|(instr, q)| (instr.length, *q))
        .map(|(instr, _)| instr)
        .ok_or_else(|| ErrorKind::UnknownAddressingMode(format!("{:?}", operand.mode_guess)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::{InstructionSet, Variant};

    #[test]
    fn guesses_immediate_from_hash_prefix() {
        let (mode, force_imm, force_abs, inner) = guess_mode("#$10");
        assert_eq!(mode, AddressingMode::Imm);
        assert!(force_imm);
        assert!(!force_abs);
        assert_eq!(inner, "$10");
    }

    #[test]
    fn guesses_indexed_indirect() {
        let (mode, _, _, inner) = guess_mode("($20,X)");
        assert_eq!(mode, AddressingMode::Idx);
        assert_eq!(inner, "$20");
    }

    #[test]
    fn guesses_indirect_indexed() {
        let (mode, _, _, inner) = guess_mode("($20),Y");
        assert_eq!(mode, AddressingMode::Idy);
        assert_eq!(inner, "$20");
    }

    #[test]
    fn guesses_plain_indirect() {
        let (mode, _, _, inner) = guess_mode("($1234)");
        assert_eq!(mode, AddressingMode::Ind);
        assert_eq!(inner, "$1234");
    }

    #[test]
    fn guesses_absolute_indexed_by_x() {
        let (mode, _, _, inner) = guess_mode("$1000,X");
        assert_eq!(mode, AddressingMode::Abx);
        assert_eq!(inner, "$1000");
    }

    #[test]
    fn empty_operand_is_implied() {
        let (mode, _, _, _) = guess_mode("");
        assert_eq!(mode, AddressingMode::Imp);
    }

    #[test]
    fn lda_zero_page_beats_absolute_for_small_values() {
        let set = InstructionSet::new(Variant::Nmos);
        let candidates = set.find_by_mnemonic("LDA");
        let operand = OperandDescriptor {
            mode_guess: AddressingMode::Abs,
            expr: Some(super::super::expr::parse("$10", false).unwrap()),
            force_immediate: false,
            force_absolute: false,
        };
        let chosen = select(&candidates, &operand, 1).unwrap();
        assert_eq!(chosen.mode, AddressingMode::Zpg);
    }

    #[test]
    fn lda_absolute_chosen_for_large_values() {
        let set = InstructionSet::new(Variant::Nmos);
        let candidates = set.find_by_mnemonic("LDA");
        let operand = OperandDescriptor {
            mode_guess: AddressingMode::Abs,
            expr: Some(super::super::expr::parse("$1234", false).unwrap()),
            force_immediate: false,
            force_absolute: false,
        };
        let chosen = select(&candidates, &operand, 2).unwrap();
        assert_eq!(chosen.mode, AddressingMode::Abs);
    }

    #[test]
    fn forced_absolute_skips_zero_page_even_for_small_values() {
        let set = InstructionSet::new(Variant::Nmos);
        let candidates = set.find_by_mnemonic("LDA");
        let operand = OperandDescriptor {
            mode_guess: AddressingMode::Abs,
            expr: Some(super::super::expr::parse("$10", false).unwrap()),
            force_immediate: false,
            force_absolute: true,
        };
        let chosen = select(&candidates, &operand, 2).unwrap();
        assert_eq!(chosen.mode, AddressingMode::Abs);
    }
}
