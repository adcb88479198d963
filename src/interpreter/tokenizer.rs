//! Macro text tokenizer
//!
//! Turns raw multi-line macro text into a [`MacroProgram`] by matching
//! each non-empty trimmed line against a fixed prefix table. The
//! tokenizer is total: it never fails, and a line it cannot read
//! becomes a [`Instruction::WriteLiteral`]. Structural errors are the
//! validator's job, not ours.

use super::ast::{Instruction, MacroProgram};

/// Tokenize macro text into a program.
pub fn tokenize(source: &str) -> MacroProgram {
    let instructions = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(tokenize_line)
        .collect();

    MacroProgram::new(instructions)
}

/// Classify one trimmed, non-empty line.
fn tokenize_line(line: &str) -> Instruction {
    if let Some(payload) = line.strip_prefix("SET:") {
        return Instruction::SetVariable {
            assignment: payload.trim().to_string(),
        };
    }
    if let Some(payload) = line.strip_prefix("LOOP:") {
        return Instruction::LoopStart {
            count: payload.trim().to_string(),
        };
    }
    if line == "ENDLOOP" {
        return Instruction::LoopEnd;
    }
    if let Some(payload) = line.strip_prefix("IF:") {
        return Instruction::IfStart {
            condition: payload.trim().to_string(),
        };
    }
    if line == "ENDIF" {
        return Instruction::IfEnd;
    }
    if let Some(payload) = line.strip_prefix("KEY_COMBO:") {
        return Instruction::KeyCombo {
            keys: payload
                .trim()
                .split('+')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        };
    }
    if let Some(payload) = line.strip_prefix("KEY:") {
        return Instruction::KeyPress {
            key: payload.trim().to_string(),
        };
    }
    if let Some(payload) = line.strip_prefix("KEYUP:") {
        return Instruction::KeyRelease {
            key: payload.trim().to_string(),
        };
    }
    if let Some(payload) = line.strip_prefix("MOUSE_CLICK:") {
        if let Some((x, y)) = parse_coords(payload) {
            return Instruction::MouseClick { x, y };
        }
    }
    if let Some(payload) = line.strip_prefix("MOUSE_MOVE:") {
        if let Some((x, y)) = parse_coords(payload) {
            return Instruction::MouseMove { x, y };
        }
    }
    if let Some(payload) = line.strip_prefix("MOUSE_SCROLL:") {
        if let Some((dx, dy)) = parse_coords(payload) {
            return Instruction::MouseScroll { dx, dy };
        }
    }
    if let Some(payload) = line.strip_prefix("DELAY:") {
        if let Ok(millis) = payload.trim().parse::<f64>() {
            // A non-finite or negative delay is not a delay
            if millis.is_finite() && millis >= 0.0 {
                return Instruction::Delay { millis };
            }
        }
    }
    if let Some(payload) = line.strip_prefix("SCRIPT:") {
        return Instruction::ScriptBlock {
            source: payload.trim().to_string(),
        };
    }
    if let Some(payload) = line.strip_prefix("VAR:") {
        return Instruction::VarWrite {
            name: payload.trim().to_string(),
        };
    }

    Instruction::WriteLiteral {
        text: line.to_string(),
    }
}

/// Parse an `x,y` pair. `None` degrades the line to a literal.
fn parse_coords(payload: &str) -> Option<(i32, i32)> {
    let (x, y) = payload.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
