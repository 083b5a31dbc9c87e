//! Parent-linked scope chain stored in a single arena. Reads walk toward the
//! root; writes land on the nearest ancestor that already owns the name, or
//! define locally when no ancestor does. Frames created during a tick are
//! discarded wholesale via `mark`/`release` once the tick's calls unwind.

use std::collections::HashMap;

use crate::runtime::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(pub usize);

pub const GLOBAL: ScopeId = ScopeId(0);

#[derive(Debug, Default)]
struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<ScopeId>,
}

#[derive(Debug)]
pub struct ScopeArena {
    frames: Vec<Frame>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.frames.len());
        self.frames.push(Frame { vars: HashMap::new(), parent: Some(parent) });
        id
    }

    /// Define (or overwrite) a name in exactly this frame, never an ancestor.
    pub fn define(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.frames[scope.0].vars.insert(name.to_string(), value);
    }

    /// Read with fallback up the parent chain.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<Value> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = &self.frames[id.0];
            if let Some(value) = frame.vars.get(name) {
                return Some(value.clone());
            }
            cursor = frame.parent;
        }
        None
    }

    /// Assign to the nearest frame (this one or an ancestor) that already
    /// holds the name; otherwise define it in the current frame.
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Value) {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if self.frames[id.0].vars.contains_key(name) {
                self.frames[id.0].vars.insert(name.to_string(), value);
                return;
            }
            cursor = self.frames[id.0].parent;
        }
        self.define(scope, name, value);
    }

    /// Snapshot the arena length so frames created after this point can be
    /// dropped together with `release`.
    pub fn mark(&self) -> usize {
        self.frames.len()
    }

    /// Drop every frame created since `mark`. Callers must not hold ScopeIds
    /// past the mark after releasing.
    pub fn release(&mut self, mark: usize) {
        self.frames.truncate(mark.max(1));
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_falls_back_to_parent() {
        let mut arena = ScopeArena::new();
        arena.define(GLOBAL, "x", Value::Num(1.0));
        let inner = arena.child(GLOBAL);
        assert_eq!(arena.get(inner, "x"), Some(Value::Num(1.0)));
        assert_eq!(arena.get(inner, "y"), None);
    }

    #[test]
    fn set_updates_owning_ancestor() {
        let mut arena = ScopeArena::new();
        arena.define(GLOBAL, "x", Value::Num(1.0));
        let inner = arena.child(GLOBAL);
        arena.set(inner, "x", Value::Num(2.0));
        assert_eq!(arena.get(GLOBAL, "x"), Some(Value::Num(2.0)));
    }

    #[test]
    fn set_defines_locally_when_unowned() {
        let mut arena = ScopeArena::new();
        let inner = arena.child(GLOBAL);
        arena.set(inner, "fresh", Value::Num(5.0));
        assert_eq!(arena.get(inner, "fresh"), Some(Value::Num(5.0)));
        assert_eq!(arena.get(GLOBAL, "fresh"), None);
    }

    #[test]
    fn local_shadow_via_define() {
        let mut arena = ScopeArena::new();
        arena.define(GLOBAL, "x", Value::Num(1.0));
        let inner = arena.child(GLOBAL);
        arena.define(inner, "x", Value::Num(9.0));
        assert_eq!(arena.get(inner, "x"), Some(Value::Num(9.0)));
        assert_eq!(arena.get(GLOBAL, "x"), Some(Value::Num(1.0)));
    }

    #[test]
    fn release_discards_child_frames() {
        let mut arena = ScopeArena::new();
        let mark = arena.mark();
        let inner = arena.child(GLOBAL);
        arena.define(inner, "temp", Value::Num(1.0));
        arena.release(mark);
        assert_eq!(arena.mark(), 1);
        assert_eq!(arena.get(GLOBAL, "temp"), None);
    }

    #[test]
    fn release_never_drops_global() {
        let mut arena = ScopeArena::new();
        arena.release(0);
        arena.define(GLOBAL, "x", Value::Num(1.0));
        assert_eq!(arena.get(GLOBAL, "x"), Some(Value::Num(1.0)));
    }
}
