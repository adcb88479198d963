//! Structural validation
//!
//! A single forward pass over the program, run before any execution is
//! attempted. It checks structural balance only - loop/conditional
//! nesting and `SET:` assignment shape - and never touches runtime
//! state or performs effects. Anything dynamic (loop counts, condition
//! truth) is the interpreter's business.

use thiserror::Error;

use super::ast::{Instruction, MacroProgram};

/// Structural grammar violation. Blocks any run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unmatched end of loop")]
    UnmatchedLoopEnd,

    #[error("unmatched end of conditional")]
    UnmatchedIfEnd,

    #[error("invalid assignment syntax: SET:{assignment}")]
    InvalidAssignment { assignment: String },

    #[error("unclosed loop")]
    UnclosedLoop,

    #[error("unclosed conditional")]
    UnclosedConditional,
}

/// Validate a program's structure.
pub fn validate(program: &MacroProgram) -> Result<(), SyntaxError> {
    let mut loop_depth: usize = 0;
    let mut if_depth: usize = 0;

    for instruction in program.instructions() {
        match instruction {
            Instruction::LoopStart { .. } => loop_depth += 1,
            Instruction::LoopEnd => {
                loop_depth = loop_depth
                    .checked_sub(1)
                    .ok_or(SyntaxError::UnmatchedLoopEnd)?;
            }
            Instruction::IfStart { .. } => if_depth += 1,
            Instruction::IfEnd => {
                if_depth = if_depth.checked_sub(1).ok_or(SyntaxError::UnmatchedIfEnd)?;
            }
            Instruction::SetVariable { assignment } => {
                if !assignment.contains('=') {
                    return Err(SyntaxError::InvalidAssignment {
                        assignment: assignment.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    if loop_depth > 0 {
        return Err(SyntaxError::UnclosedLoop);
    }
    if if_depth > 0 {
        return Err(SyntaxError::UnclosedConditional);
    }

    Ok(())
}
