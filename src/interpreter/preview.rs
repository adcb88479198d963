//! Preview evaluator
//!
//! Drives the unified interpreter with a formatting handler instead of
//! an actuator: control flow and variable semantics are reproduced
//! faithfully, but every event becomes a human-readable trace line and
//! nothing is performed. False branches produce no lines - they would
//! not execute.

use super::exec::{Event, Interpreter, LoopMode, SideEffect, Step, StepError};
use super::ast::MacroProgram;

/// Walk the program and return one trace line per observed event.
pub fn preview(program: &MacroProgram, mode: LoopMode) -> Result<Vec<String>, StepError> {
    let mut interpreter = Interpreter::new(program.clone(), mode);
    let mut trace = Vec::new();

    loop {
        match interpreter.step()? {
            Step::Done => break,
            Step::Event(event) => trace.push(describe(&event)),
        }
    }

    Ok(trace)
}

/// Render one event the way the tool's preview window words it.
fn describe(event: &Event) -> String {
    match event {
        Event::VariableSet { name, value } => {
            format!("Set variable '{}' to '{}'.", name, value)
        }
        Event::LoopEntered { total } => format!("Start loop 1/{}.", total),
        Event::LoopIteration { iteration, total } => {
            format!("Loop iteration {}/{}.", iteration, total)
        }
        Event::LoopFinished => "End loop.".to_string(),
        Event::ConditionEntered { condition, result } => {
            format!("IF condition '{}' is {}.", condition, result)
        }
        Event::ConditionExited => "ENDIF.".to_string(),
        Event::Effect(effect) => describe_effect(effect),
    }
}

fn describe_effect(effect: &SideEffect) -> String {
    match effect {
        SideEffect::KeyPress { key } => format!("Press key '{}'.", key),
        SideEffect::KeyRelease { key } => format!("Release key '{}'.", key),
        SideEffect::KeyCombo { keys } => {
            format!("Press key combination '{}'.", keys.join("+"))
        }
        SideEffect::MouseClick { x, y } => {
            format!("Click mouse at coordinates ({}, {}).", x, y)
        }
        SideEffect::MouseMove { x, y } => format!("Move mouse to ({}, {}).", x, y),
        SideEffect::MouseScroll { dx, dy } => format!("Scroll mouse by ({}, {}).", dx, dy),
        SideEffect::Delay { millis } => format!("Delay for {} milliseconds.", millis),
        SideEffect::WriteText { text } => format!("Write '{}'.", text),
        SideEffect::WriteVariable { name, value } => {
            format!("Write variable '{}' with value '{}'.", name, value)
        }
        SideEffect::Script { source } => format!("Execute script:\n{}", source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::tokenize;

    fn trace(source: &str, mode: LoopMode) -> Vec<String> {
        preview(&tokenize(source), mode).unwrap()
    }

    #[test]
    fn test_announce_once_does_not_replay_body() {
        let lines = trace("LOOP:3\nKEY:A\nENDLOOP", LoopMode::AnnounceOnce);
        assert_eq!(
            lines,
            vec!["Start loop 1/3.", "Press key 'A'.", "Loop iteration 2/3."]
        );
    }

    #[test]
    fn test_announce_once_single_iteration_ends_loop() {
        let lines = trace("LOOP:1\nKEY:A\nENDLOOP", LoopMode::AnnounceOnce);
        assert_eq!(lines, vec!["Start loop 1/1.", "Press key 'A'.", "End loop."]);
    }

    #[test]
    fn test_replay_mode_repeats_body_per_iteration() {
        let lines = trace("LOOP:3\nKEY:A\nENDLOOP", LoopMode::Replay);
        assert_eq!(
            lines,
            vec![
                "Start loop 1/3.",
                "Press key 'A'.",
                "Loop iteration 2/3.",
                "Press key 'A'.",
                "Loop iteration 3/3.",
                "Press key 'A'.",
                "End loop.",
            ]
        );
    }

    #[test]
    fn test_variables_and_conditions_in_trace() {
        let lines = trace(
            "SET:x=5\nIF:x > 3\nKEY:ENTER\nENDIF\nVAR:x",
            LoopMode::AnnounceOnce,
        );
        assert_eq!(
            lines,
            vec![
                "Set variable 'x' to '5'.",
                "IF condition 'x > 3' is true.",
                "Press key 'ENTER'.",
                "ENDIF.",
                "Write variable 'x' with value '5'.",
            ]
        );
    }

    #[test]
    fn test_false_branch_is_not_traced() {
        let lines = trace(
            "SET:y=10\nIF:y < 5\nKEY:A\nENDIF\nKEY:B",
            LoopMode::AnnounceOnce,
        );
        assert_eq!(
            lines,
            vec![
                "Set variable 'y' to '10'.",
                "IF condition 'y < 5' is false.",
                "ENDIF.",
                "Press key 'B'.",
            ]
        );
    }

    #[test]
    fn test_remaining_effect_phrasing() {
        let lines = trace(
            "MOUSE_CLICK:100,200\nDELAY:250\nSCRIPT:launch()\nplain text",
            LoopMode::AnnounceOnce,
        );
        assert_eq!(
            lines,
            vec![
                "Click mouse at coordinates (100, 200).",
                "Delay for 250 milliseconds.",
                "Execute script:\nlaunch()",
                "Write 'plain text'.",
            ]
        );
    }
}
