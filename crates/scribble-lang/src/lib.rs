//! A tiny indentation-based drawing language for animated sketches.
//!
//! Source text compiles into a statement tree ([`compile`]); a [`Runtime`]
//! then runs the top-level once and re-invokes the script's `run()` function
//! every frame, producing a fresh [`DrawCommand`] buffer per tick. Nothing
//! in the pipeline hard-fails: malformed lines become inert nodes and
//! runtime faults land in a diagnostic sink the host drains between frames.
//!
//! ```
//! use scribble_lang::{compile, Runtime};
//!
//! let program = compile("function run():\n    circle(100, 100, 20)");
//! let mut runtime = Runtime::new(&program);
//! let frame = runtime.tick();
//! assert_eq!(frame.len(), 1);
//! ```

pub mod draw;
pub mod error;
pub mod runtime;
pub mod syntax;

pub use draw::{Color, DrawCommand, Shape};
pub use error::Diagnostic;
pub use runtime::value::Value;
pub use syntax::ast::Program;

use runtime::RuntimeState;
use runtime::interpreter::Interpreter;
use runtime::scope::GLOBAL;
use syntax::line::logical_lines;
use syntax::parser::Parser;

/// The function the runtime calls once per frame.
pub const ENTRY_FN: &str = "run";

/// Parse source text into a statement tree. Never fails: lines that match no
/// statement form are carried as inert nodes, and malformed expressions are
/// preserved as text and reported when (if ever) they are evaluated.
pub fn compile(source: &str) -> Program {
    Parser::new(logical_lines(source)).parse()
}

// ─── Runtime ─────────────────────────────────────────────────────────────────

/// A live script: globals, functions, color stack, pressed keys, and the
/// per-frame draw buffer.
pub struct Runtime {
    state: RuntimeState,
}

impl Runtime {
    /// Execute the program's top level once (global assignments, function
    /// definitions, `CanvasSize`) and arm the frame loop. A program without
    /// a `run()` function gets a diagnostic and never starts running.
    pub fn new(program: &Program) -> Self {
        let mut state = RuntimeState::new();
        Interpreter::new(&mut state).exec_all(&program.statements, GLOBAL);

        if state.functions.contains_key(ENTRY_FN) {
            state.running = true;
        } else {
            state.report(Diagnostic::MissingEntryPoint);
        }

        Self { state }
    }

    /// Advance one frame: clear the draw buffer, call `run()`, and return
    /// the commands it emitted. A stopped runtime produces empty frames.
    pub fn tick(&mut self) -> Vec<DrawCommand> {
        if !self.state.running {
            return Vec::new();
        }
        self.state.commands.clear();
        let mark = self.state.scopes.mark();
        Interpreter::new(&mut self.state).call_function(ENTRY_FN, Vec::new(), GLOBAL);
        self.state.scopes.release(mark);
        self.state.commands.clone()
    }

    pub fn stop(&mut self) {
        self.state.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Record a key press; `keyDown("name")` in the script sees it until the
    /// matching [`Runtime::key_up`].
    pub fn key_down(&mut self, key: &str) {
        self.state.pressed.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.state.pressed.remove(key);
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.state.canvas
    }

    pub fn color_stack(&self) -> &[Color] {
        &self.state.colors
    }

    /// Commands emitted by the most recent tick.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.state.commands
    }

    /// Read a global variable, mainly for hosts that show script state.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.state.scopes.get(GLOBAL, name)
    }

    /// Drain accumulated diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.state.diagnostics)
    }

    /// Drain script `print(...)` output.
    pub fn take_printed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.state.printed)
    }
}
