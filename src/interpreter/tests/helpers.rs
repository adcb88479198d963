//! Test helpers for interpreter tests
//!
//! Small drivers that run the step machine to completion and collect
//! what it produced.

use crate::interpreter::{
    tokenize, Event, Interpreter, LoopMode, SideEffect, Step, StepError,
};

/// Tokenize and run, collecting every event.
pub fn run_to_events(source: &str, mode: LoopMode) -> Result<Vec<Event>, StepError> {
    let mut interpreter = Interpreter::new(tokenize(source), mode);
    let mut events = Vec::new();
    loop {
        match interpreter.step()? {
            Step::Done => break,
            Step::Event(event) => events.push(event),
        }
    }
    Ok(events)
}

/// Run with execution semantics and keep only the side effects.
pub fn effects(source: &str) -> Vec<SideEffect> {
    run_to_events(source, LoopMode::Replay)
        .expect("program steps cleanly")
        .into_iter()
        .filter_map(|event| match event {
            Event::Effect(effect) => Some(effect),
            _ => None,
        })
        .collect()
}

/// Count how many times a given key is pressed.
pub fn press_count(effects: &[SideEffect], key: &str) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, SideEffect::KeyPress { key: k } if k == key))
        .count()
}
