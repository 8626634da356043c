//! Lexical environment as a generational arena of frames.
//!
//! The source models scopes as a parent-pointer chain of map-valued frames
//! captured directly by closures. Here the chain is flattened into an
//! arena (`IndexVec<FrameId, Frame>`) so a closure or a `Reference` value
//! can carry a plain `Copy` handle — `(FrameId, generation)` — instead of
//! an `Rc<RefCell<Frame>>`. A frame's storage outlives its scope (the
//! arena only grows; it is dropped as a whole at the end of evaluation),
//! but `kill` marks it dead on scope exit, so a `Reference` captured
//! inside that scope and used afterward is rejected rather than silently
//! reading stale data. Ordinary name resolution (closures, nested blocks)
//! never consults the alive bit — only `Reference` dereference does.

use abc_util::{define_idx, Idx, IndexVec, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::value::{FunctionValue, StructDef, Value};
use std::rc::Rc;

define_idx!(FrameId);

struct Frame {
    vars: FxHashMap<Symbol, Value>,
    constants: FxHashSet<Symbol>,
    functions: FxHashMap<Symbol, Rc<FunctionValue>>,
    structs: FxHashMap<Symbol, Rc<StructDef>>,
    parent: Option<FrameId>,
    alive: bool,
    generation: u32,
}

impl Frame {
    fn new(parent: Option<FrameId>) -> Self {
        Self {
            vars: FxHashMap::default(),
            constants: FxHashSet::default(),
            functions: FxHashMap::default(),
            structs: FxHashMap::default(),
            parent,
            alive: true,
            generation: 0,
        }
    }
}

pub struct Env {
    frames: IndexVec<FrameId, Frame>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    pub fn new() -> Self {
        let mut frames = IndexVec::new();
        frames.push(Frame::new(None));
        Self { frames }
    }

    pub fn root(&self) -> FrameId {
        FrameId(0)
    }

    pub fn new_child(&mut self, parent: FrameId) -> FrameId {
        self.frames.push(Frame::new(Some(parent)))
    }

    /// Marks a scope's frame dead. Storage is kept (so closures and
    /// deeper chain lookups keep working); only `Reference` dereference
    /// consults this.
    pub fn kill(&mut self, frame: FrameId) {
        let f = &mut self.frames[frame];
        f.alive = false;
        f.generation = f.generation.wrapping_add(1);
    }

    pub fn generation_of(&self, frame: FrameId) -> u32 {
        self.frames[frame].generation
    }

    pub fn is_live(&self, frame: FrameId, generation: u32) -> bool {
        match self.frames.get(frame) {
            Some(f) => f.alive && f.generation == generation,
            None => false,
        }
    }

    pub fn define(&mut self, frame: FrameId, name: Symbol, value: Value, is_constant: bool) -> Result<(), String> {
        let f = &mut self.frames[frame];
        if f.vars.contains_key(&name) {
            return Err(format!("'{name}' is already defined in this scope"));
        }
        f.vars.insert(name, value);
        if is_constant {
            f.constants.insert(name);
        }
        Ok(())
    }

    /// Defines or overwrites without the duplicate-define check, used only
    /// to populate a method-call frame (field copies and parameters may
    /// legitimately share a name).
    pub fn define_raw(&mut self, frame: FrameId, name: Symbol, value: Value) {
        self.frames[frame].vars.insert(name, value);
    }

    pub fn get(&self, frame: FrameId, name: Symbol) -> Option<Value> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let f = &self.frames[id];
            if let Some(v) = f.vars.get(&name) {
                return Some(v.clone());
            }
            cur = f.parent;
        }
        None
    }

    /// Direct, non-chain-walking lookup in exactly this frame.
    pub fn get_local(&self, frame: FrameId, name: Symbol) -> Option<Value> {
        self.frames[frame].vars.get(&name).cloned()
    }

    /// Walks the chain to find the frame owning `name`, if any.
    pub fn owning_frame(&self, frame: FrameId, name: Symbol) -> Option<FrameId> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            if self.frames[id].vars.contains_key(&name) {
                return Some(id);
            }
            cur = self.frames[id].parent;
        }
        None
    }

    /// `set`: mutate the binding in whichever frame along the chain first
    /// holds the name; if none does, define it in the current frame.
    pub fn set(&mut self, frame: FrameId, name: Symbol, value: Value) -> Result<(), String> {
        match self.owning_frame(frame, name) {
            Some(owner) => {
                if self.frames[owner].constants.contains(&name) {
                    return Err(format!("cannot assign to constant '{name}'"));
                }
                self.frames[owner].vars.insert(name, value);
                Ok(())
            }
            None => {
                self.frames[frame].vars.insert(name, value);
                Ok(())
            }
        }
    }

    /// A stable opaque string identifying the `(frame, name)` pair backing
    /// `location of name`.
    pub fn location_of(&self, frame: FrameId, name: Symbol) -> Option<String> {
        self.owning_frame(frame, name).map(|id| format!("{}:{}", id.index(), name))
    }

    pub fn define_function(&mut self, frame: FrameId, name: Symbol, func: Rc<FunctionValue>) {
        self.frames[frame].functions.insert(name, func);
    }

    pub fn get_function(&self, frame: FrameId, name: Symbol) -> Option<Rc<FunctionValue>> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let f = &self.frames[id];
            if let Some(v) = f.functions.get(&name) {
                return Some(v.clone());
            }
            cur = f.parent;
        }
        None
    }

    pub fn define_struct(&mut self, frame: FrameId, name: Symbol, def: Rc<StructDef>) {
        self.frames[frame].structs.insert(name, def);
    }

    pub fn get_struct(&self, frame: FrameId, name: Symbol) -> Option<Rc<StructDef>> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let f = &self.frames[id];
            if let Some(v) = f.structs.get(&name) {
                return Some(v.clone());
            }
            cur = f.parent;
        }
        None
    }

    /// Every variable, function, and struct name visible from `frame`,
    /// nearest scope first — feeds the "did you mean" suggester.
    pub fn names_visible(&self, frame: FrameId) -> Vec<Symbol> {
        let mut out = Vec::new();
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let f = &self.frames[id];
            out.extend(f.vars.keys().copied());
            out.extend(f.functions.keys().copied());
            out.extend(f.structs.keys().copied());
            cur = f.parent;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn child_sees_parent_binding() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), false).unwrap();
        let child = env.new_child(root);
        assert!(matches!(env.get(child, sym("x")), Some(Value::Number { value, .. }) if value == 1.0));
    }

    #[test]
    fn shadowing_in_child_does_not_mutate_parent() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), false).unwrap();
        let child = env.new_child(root);
        env.define(child, sym("x"), Value::number(2.0), false).unwrap();
        assert!(matches!(env.get(root, sym("x")), Some(Value::Number { value, .. }) if value == 1.0));
        assert!(matches!(env.get(child, sym("x")), Some(Value::Number { value, .. }) if value == 2.0));
    }

    #[test]
    fn set_mutates_owning_frame_not_current() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), false).unwrap();
        let child = env.new_child(root);
        env.set(child, sym("x"), Value::number(9.0)).unwrap();
        assert!(matches!(env.get(root, sym("x")), Some(Value::Number { value, .. }) if value == 9.0));
    }

    #[test]
    fn assigning_to_constant_fails() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), true).unwrap();
        assert!(env.set(root, sym("x"), Value::number(2.0)).is_err());
    }

    #[test]
    fn duplicate_define_in_same_frame_fails() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), false).unwrap();
        assert!(env.define(root, sym("x"), Value::number(2.0), false).is_err());
    }

    #[test]
    fn killed_frame_generation_mismatches_capture() {
        let mut env = Env::new();
        let root = env.root();
        let child = env.new_child(root);
        let gen = env.generation_of(child);
        env.kill(child);
        assert!(!env.is_live(child, gen));
    }

    #[test]
    fn location_of_same_binding_is_stable() {
        let mut env = Env::new();
        let root = env.root();
        env.define(root, sym("x"), Value::number(1.0), false).unwrap();
        let a = env.location_of(root, sym("x"));
        let b = env.location_of(root, sym("x"));
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
