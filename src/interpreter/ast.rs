//! Macro instruction types
//!
//! An [`Instruction`] is one parsed line of the macro grammar; a
//! [`MacroProgram`] is the immutable ordered sequence produced by the
//! tokenizer, the unit that gets validated and interpreted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/* ===================== Instructions ===================== */

/// One parsed unit of the macro grammar.
///
/// Payloads whose failures must surface at validation or run time
/// (`SET:` assignments, `LOOP:` counts, `IF:` conditions) are carried
/// as raw text and parsed by the evaluators; numeric payloads are
/// parsed by the tokenizer and fall back to [`Instruction::WriteLiteral`]
/// when they don't parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Instruction {
    /// `SET:name=value` - raw assignment text, split at evaluation time
    SetVariable { assignment: String },
    /// `LOOP:n` - raw count text, parsed as u32 at evaluation time
    LoopStart { count: String },
    /// `ENDLOOP`
    LoopEnd,
    /// `IF:var op value` - raw condition text
    IfStart { condition: String },
    /// `ENDIF`
    IfEnd,
    /// `KEY:name`
    KeyPress { key: String },
    /// `KEYUP:name`
    KeyRelease { key: String },
    /// `KEY_COMBO:a+b+c` - pressed in order, released in reverse
    KeyCombo { keys: Vec<String> },
    /// `MOUSE_CLICK:x,y`
    MouseClick { x: i32, y: i32 },
    /// `MOUSE_MOVE:x,y`
    MouseMove { x: i32, y: i32 },
    /// `MOUSE_SCROLL:dx,dy`
    MouseScroll { dx: i32, dy: i32 },
    /// `DELAY:ms` - fractional milliseconds (recorded delays carry decimals)
    Delay { millis: f64 },
    /// `VAR:name` - type the variable's current value
    VarWrite { name: String },
    /// `SCRIPT:...` - opaque text handed to the script sink
    ScriptBlock { source: String },
    /// Any line matching no prefix - typed verbatim
    WriteLiteral { text: String },
}

impl Instruction {
    /// Control instructions manage interpreter state and trigger no
    /// actuator call, so no inter-command delay follows them.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Instruction::SetVariable { .. }
                | Instruction::LoopStart { .. }
                | Instruction::LoopEnd
                | Instruction::IfStart { .. }
                | Instruction::IfEnd
        )
    }

    pub fn is_effectful(&self) -> bool {
        !self.is_control()
    }
}

impl fmt::Display for Instruction {
    /// Serialize back to the line form the tokenizer accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::SetVariable { assignment } => write!(f, "SET:{}", assignment),
            Instruction::LoopStart { count } => write!(f, "LOOP:{}", count),
            Instruction::LoopEnd => write!(f, "ENDLOOP"),
            Instruction::IfStart { condition } => write!(f, "IF:{}", condition),
            Instruction::IfEnd => write!(f, "ENDIF"),
            Instruction::KeyPress { key } => write!(f, "KEY:{}", key),
            Instruction::KeyRelease { key } => write!(f, "KEYUP:{}", key),
            Instruction::KeyCombo { keys } => write!(f, "KEY_COMBO:{}", keys.join("+")),
            Instruction::MouseClick { x, y } => write!(f, "MOUSE_CLICK:{},{}", x, y),
            Instruction::MouseMove { x, y } => write!(f, "MOUSE_MOVE:{},{}", x, y),
            Instruction::MouseScroll { dx, dy } => write!(f, "MOUSE_SCROLL:{},{}", dx, dy),
            Instruction::Delay { millis } => write!(f, "DELAY:{}", millis),
            Instruction::VarWrite { name } => write!(f, "VAR:{}", name),
            Instruction::ScriptBlock { source } => write!(f, "SCRIPT:{}", source),
            Instruction::WriteLiteral { text } => write!(f, "{}", text),
        }
    }
}

/* ===================== Program ===================== */

/// Ordered, immutable sequence of instructions.
///
/// Produced once per run from tokenized text; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroProgram {
    instructions: Vec<Instruction>,
}

impl MacroProgram {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Serialize back to macro text, one instruction per line.
    ///
    /// Empty input lines are not preserved; the result is semantically
    /// equivalent to the source text it was tokenized from.
    pub fn to_text(&self) -> String {
        self.instructions
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/* ===================== Conditions ===================== */

/// Comparison operator in an `IF:` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Gt,
    Lt,
    Eq,
    Ne,
    Ge,
    Le,
}

impl CompareOp {
    fn apply<T: PartialOrd + PartialEq>(&self, lhs: T, rhs: T) -> bool {
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }
}

impl FromStr for CompareOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        };
        write!(f, "{}", s)
    }
}

/// A parsed `IF:` condition: `var op value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub var: String,
    pub op: CompareOp,
    pub value: String,
}

// Two-character operators must be tried before their one-character
// prefixes so `>=` is not read as `>` followed by `=value`.
const COMPACT_OPS: [&str; 6] = ["==", "!=", ">=", "<=", ">", "<"];

impl Condition {
    /// Parse a raw condition, accepting both the spaced form
    /// (`x > 3`) and the compact form (`x>3`).
    ///
    /// Returns `None` for anything that doesn't parse; a condition
    /// that can't be read evaluates to false rather than erroring.
    pub fn parse(raw: &str) -> Option<Condition> {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        if parts.len() == 3 {
            if let Ok(op) = parts[1].parse() {
                return Some(Condition {
                    var: parts[0].to_string(),
                    op,
                    value: parts[2].to_string(),
                });
            }
        }

        for op_text in COMPACT_OPS {
            if let Some(idx) = raw.find(op_text) {
                let var = raw[..idx].trim();
                let value = raw[idx + op_text.len()..].trim();
                if !var.is_empty() && !value.is_empty() {
                    return Some(Condition {
                        var: var.to_string(),
                        op: op_text.parse().expect("operator table entry parses"),
                        value: value.to_string(),
                    });
                }
            }
        }

        None
    }

    /// Evaluate against a resolved variable value.
    ///
    /// When both operands parse as numbers the comparison is numeric;
    /// otherwise both are compared as text.
    pub fn evaluate(&self, var_value: &str) -> bool {
        match (var_value.parse::<f64>(), self.value.parse::<f64>()) {
            (Ok(lhs), Ok(rhs)) => self.op.apply(lhs, rhs),
            _ => self.op.apply(var_value, self.value.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spaced_condition() {
        let cond = Condition::parse("x > 3").unwrap();
        assert_eq!(cond.var, "x");
        assert_eq!(cond.op, CompareOp::Gt);
        assert_eq!(cond.value, "3");
    }

    #[test]
    fn test_parse_compact_condition() {
        let cond = Condition::parse("x>=10").unwrap();
        assert_eq!(cond.var, "x");
        assert_eq!(cond.op, CompareOp::Ge);
        assert_eq!(cond.value, "10");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Condition::parse("just some text with spaces"), None);
        assert_eq!(Condition::parse(""), None);
        assert_eq!(Condition::parse(">5"), None);
    }

    #[test]
    fn test_numeric_comparison() {
        let cond = Condition::parse("x > 3").unwrap();
        assert!(cond.evaluate("5"));
        assert!(!cond.evaluate("2"));
        // "10" > "3" is false numerically even though it's true as text
        let cond = Condition::parse("x > 9").unwrap();
        assert!(cond.evaluate("10"));
    }

    #[test]
    fn test_text_comparison_when_not_numeric() {
        let cond = Condition::parse("name == alice").unwrap();
        assert!(cond.evaluate("alice"));
        assert!(!cond.evaluate("bob"));

        let cond = Condition::parse("name != alice").unwrap();
        assert!(cond.evaluate("bob"));
    }

    #[test]
    fn test_control_vs_effectful_split() {
        assert!(Instruction::LoopStart { count: "3".into() }.is_control());
        assert!(Instruction::IfEnd.is_control());
        assert!(Instruction::KeyPress { key: "A".into() }.is_effectful());
        assert!(Instruction::Delay { millis: 10.0 }.is_effectful());
        assert!(Instruction::ScriptBlock { source: "x".into() }.is_effectful());
    }

    #[test]
    fn test_instruction_display_round_trip_forms() {
        assert_eq!(
            Instruction::KeyCombo {
                keys: vec!["CTRL".into(), "C".into()]
            }
            .to_string(),
            "KEY_COMBO:CTRL+C"
        );
        assert_eq!(
            Instruction::MouseClick { x: 10, y: -4 }.to_string(),
            "MOUSE_CLICK:10,-4"
        );
        assert_eq!(Instruction::Delay { millis: 512.337 }.to_string(), "DELAY:512.337");
    }
}
