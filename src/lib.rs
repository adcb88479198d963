pub mod actuator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod interpreter;
pub mod recorder;
pub mod script;
pub mod store;
pub mod types;

// Re-export main types
pub use types::*;

pub use actuator::{Actuator, ActuatorError, NullActuator};
pub use engine::{Engine, EngineError, RunHandle};
pub use interpreter::{
    preview, tokenize, validate, Instruction, LoopMode, MacroProgram, SyntaxError,
};
pub use recorder::{CapturedKey, RecorderConfig, RecorderSession};
pub use script::{NoopScriptSink, ScriptError, ScriptSink};
pub use store::{MacroStore, MemoryStore, StoreError};
