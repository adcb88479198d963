//! Unified step interpreter
//!
//! One step machine drives both evaluators: the preview formats the
//! event stream into a trace, the execution engine performs the
//! effects. This keeps the two from re-implementing (and diverging on)
//! the same control-flow rules.
//!
//! The interpreter uses an explicit instruction pointer rather than a
//! forward iterator because `ENDLOOP` must jump the pointer backward.

use thiserror::Error;

use super::ast::{Condition, Instruction, MacroProgram};
use super::state::{LoopFrame, RuntimeState};

/* ===================== Events ===================== */

/// How `ENDLOOP` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Jump back and replay the body until the count is spent.
    /// Execution semantics; the engine always runs this.
    #[default]
    Replay,
    /// Walk the body once and announce the iteration count without
    /// replaying. The historical preview behavior.
    AnnounceOnce,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Event(Event),
    Done,
}

/// One observed unit of progress through the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    VariableSet { name: String, value: String },
    LoopEntered { total: u32 },
    LoopIteration { iteration: u32, total: u32 },
    LoopFinished,
    ConditionEntered { condition: String, result: bool },
    ConditionExited,
    /// Something the driver must perform.
    Effect(SideEffect),
}

/// An effect the interpreter wants performed. The preview renders it
/// as text; the engine dispatches it to the actuator or script sink.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    KeyPress { key: String },
    KeyRelease { key: String },
    KeyCombo { keys: Vec<String> },
    MouseClick { x: i32, y: i32 },
    MouseMove { x: i32, y: i32 },
    MouseScroll { dx: i32, dy: i32 },
    Delay { millis: f64 },
    WriteText { text: String },
    WriteVariable { name: String, value: String },
    Script { source: String },
}

/// A dynamic payload failure that fails the whole run.
///
/// The validator rejects malformed `SET:` before execution, but the
/// interpreter re-checks rather than trusting that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("invalid assignment syntax: SET:{raw}")]
    InvalidAssignment { raw: String },

    #[error("invalid loop count: LOOP:{raw}")]
    InvalidLoopCount { raw: String },
}

/* ===================== Interpreter ===================== */

/// The step machine. Owns its [`RuntimeState`] for the duration of
/// one run; never reused across runs.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: MacroProgram,
    state: RuntimeState,
    loop_mode: LoopMode,
    pc: usize,
    /// Depth of nested conditionals inside a skipped (false) branch.
    /// Tracked privately so skipped `IF:`/`ENDIF` pairs stay balanced
    /// without touching the real condition stack.
    skip_depth: usize,
    executed: usize,
}

impl Interpreter {
    pub fn new(program: MacroProgram, loop_mode: LoopMode) -> Self {
        Self {
            program,
            state: RuntimeState::new(),
            loop_mode,
            pc: 0,
            skip_depth: 0,
            executed: 0,
        }
    }

    /// Instruction pointer (index of the next instruction).
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed so far. Skipped instructions don't count;
    /// replayed loop bodies count every iteration, so this can exceed
    /// [`Interpreter::total`].
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Program length, the denominator for progress reporting.
    pub fn total(&self) -> usize {
        self.program.len()
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    /// Execute one instruction and report what happened.
    ///
    /// Skipped instructions inside a false branch are consumed
    /// silently; the call keeps advancing until it produces an event
    /// or the program ends. All bookkeeping here is synchronous - any
    /// suspension (delays, script calls) happens in the driver.
    pub fn step(&mut self) -> Result<Step, StepError> {
        loop {
            let Some(instruction) = self.program.get(self.pc).cloned() else {
                return Ok(Step::Done);
            };

            if self.state.in_skipped_branch() {
                match instruction {
                    Instruction::IfStart { .. } => {
                        self.skip_depth += 1;
                    }
                    Instruction::IfEnd => {
                        if self.skip_depth > 0 {
                            self.skip_depth -= 1;
                        } else {
                            // This ENDIF closes the false branch itself
                            self.state.condition_stack.pop();
                            self.pc += 1;
                            self.executed += 1;
                            return Ok(Step::Event(Event::ConditionExited));
                        }
                    }
                    _ => {}
                }
                self.pc += 1;
                continue;
            }

            return self.execute(instruction).map(Step::Event);
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Event, StepError> {
        self.executed += 1;

        let event = match instruction {
            Instruction::SetVariable { assignment } => {
                let Some((name, value)) = assignment.split_once('=') else {
                    return Err(StepError::InvalidAssignment { raw: assignment });
                };
                let name = name.trim().to_string();
                let value = value.trim().to_string();
                self.state.variables.insert(name.clone(), value.clone());
                self.pc += 1;
                Event::VariableSet { name, value }
            }

            Instruction::LoopStart { count } => {
                let total: u32 = count
                    .trim()
                    .parse()
                    .map_err(|_| StepError::InvalidLoopCount { raw: count.clone() })?;
                self.state.loop_stack.push(LoopFrame {
                    remaining: total,
                    total,
                    body_start: self.pc + 1,
                });
                self.pc += 1;
                Event::LoopEntered { total }
            }

            Instruction::LoopEnd => self.close_loop(),

            Instruction::IfStart { condition } => {
                let result = match Condition::parse(&condition) {
                    // An undefined variable is false, never an error
                    Some(cond) => match self.state.variables.get(&cond.var) {
                        Some(value) => cond.evaluate(value),
                        None => false,
                    },
                    None => false,
                };
                self.state.condition_stack.push(result);
                self.pc += 1;
                Event::ConditionEntered { condition, result }
            }

            Instruction::IfEnd => {
                self.state.condition_stack.pop();
                self.pc += 1;
                Event::ConditionExited
            }

            Instruction::KeyPress { key } => self.effect(SideEffect::KeyPress { key }),
            Instruction::KeyRelease { key } => self.effect(SideEffect::KeyRelease { key }),
            Instruction::KeyCombo { keys } => self.effect(SideEffect::KeyCombo { keys }),
            Instruction::MouseClick { x, y } => self.effect(SideEffect::MouseClick { x, y }),
            Instruction::MouseMove { x, y } => self.effect(SideEffect::MouseMove { x, y }),
            Instruction::MouseScroll { dx, dy } => self.effect(SideEffect::MouseScroll { dx, dy }),
            Instruction::Delay { millis } => self.effect(SideEffect::Delay { millis }),

            Instruction::VarWrite { name } => {
                let value = self.state.variable(&name).to_string();
                self.effect(SideEffect::WriteVariable { name, value })
            }

            Instruction::ScriptBlock { source } => self.effect(SideEffect::Script { source }),

            Instruction::WriteLiteral { text } => self.effect(SideEffect::WriteText { text }),
        };

        Ok(event)
    }

    fn effect(&mut self, effect: SideEffect) -> Event {
        self.pc += 1;
        Event::Effect(effect)
    }

    fn close_loop(&mut self) -> Event {
        let Some(frame) = self.state.loop_stack.last_mut() else {
            // Stray ENDLOOP at run time; the validator rejects this,
            // but a bare close is tolerated rather than trusted away
            self.pc += 1;
            return Event::LoopFinished;
        };

        match self.loop_mode {
            LoopMode::Replay => {
                frame.remaining = frame.remaining.saturating_sub(1);
                if frame.remaining > 0 {
                    let iteration = frame.total - frame.remaining + 1;
                    let total = frame.total;
                    self.pc = frame.body_start;
                    Event::LoopIteration { iteration, total }
                } else {
                    self.state.loop_stack.pop();
                    self.pc += 1;
                    Event::LoopFinished
                }
            }
            LoopMode::AnnounceOnce => {
                // One announcement instead of a replay; the frame still
                // pops so the stack is empty at end of program
                let frame = self
                    .state
                    .loop_stack
                    .pop()
                    .expect("frame checked above");
                self.pc += 1;
                if frame.total > 1 {
                    Event::LoopIteration {
                        iteration: 2,
                        total: frame.total,
                    }
                } else {
                    Event::LoopFinished
                }
            }
        }
    }
}
