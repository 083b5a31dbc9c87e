//! Mutable world the interpreter walks the tree against: scope arena,
//! function table, draw buffer, color stack, pressed keys, and the two sinks
//! (diagnostics, print output) the host drains between frames.

pub mod interpreter;
pub mod scope;
pub mod value;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::draw::{Color, DrawCommand};
use crate::error::Diagnostic;
use crate::syntax::ast::FnDef;

use scope::{GLOBAL, ScopeArena};
use value::Value;

/// Depth of the color stack; pushing onto a full stack evicts the oldest
/// entry rather than failing.
pub const MAX_COLORS: usize = 5;

pub const DEFAULT_CANVAS: (f64, f64) = (500.0, 500.0);

pub struct RuntimeState {
    pub scopes: ScopeArena,
    pub functions: HashMap<String, Rc<FnDef>>,
    pub commands: Vec<DrawCommand>,
    pub pressed: HashSet<String>,
    pub colors: Vec<Color>,
    pub canvas: (f64, f64),
    pub running: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub printed: Vec<String>,
    pub rng: StdRng,
}

impl RuntimeState {
    pub fn new() -> Self {
        let mut scopes = ScopeArena::new();
        scopes.define(GLOBAL, "width", Value::Num(DEFAULT_CANVAS.0));
        scopes.define(GLOBAL, "height", Value::Num(DEFAULT_CANVAS.1));
        Self {
            scopes,
            functions: HashMap::new(),
            commands: Vec::new(),
            pressed: HashSet::new(),
            colors: vec![Color::BASE],
            canvas: DEFAULT_CANVAS,
            running: false,
            diagnostics: Vec::new(),
            printed: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Top of the color stack. The stack is reseeded whenever it empties, so
    /// this never actually falls back — the default only guards the type.
    pub fn current_color(&self) -> Color {
        self.colors.last().copied().unwrap_or(Color::BASE)
    }

    pub fn push_color(&mut self, color: Color) {
        if self.colors.len() == MAX_COLORS {
            self.colors.remove(0);
        }
        self.colors.push(color);
    }

    pub fn pop_color(&mut self) {
        self.colors.pop();
        if self.colors.is_empty() {
            self.colors.push(Color::BASE);
        }
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new()
    }
}
