//! Execution context: the explicit frame stack.
//!
//! One frame per active handler, function or `do` invocation. The stack is
//! an explicit `Vec` owned by the context (not host-language recursion) so
//! external debugging tools can walk it. Global variable storage is a
//! single process-wide table shared across contexts and threads.
use std::sync::{Arc, Mutex};

use hashbrown::{HashMap, HashSet};

use crate::value::Value;
use wt_syntax::fold_name;

type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
type FastHashSet<K> = HashSet<K, ahash::RandomState>;

fn fast_map<K: Eq + std::hash::Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(ahash::RandomState::with_seeds(0, 0, 0, 0))
}

fn fast_set<K: Eq + std::hash::Hash>() -> FastHashSet<K> {
    HashSet::with_hasher(ahash::RandomState::with_seeds(0, 0, 0, 0))
}

/// Process-wide storage for variables declared `global`.
///
/// Shared across all execution-pool threads with no transactional
/// isolation: concurrent top-level handlers see last-writer-wins, not
/// linearizable, updates.
#[derive(Clone)]
pub struct SharedGlobals {
    table: Arc<Mutex<FastHashMap<String, Value>>>,
}

impl SharedGlobals {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(fast_map())),
        }
    }

    pub fn get(&self, name: &str) -> Value {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.get(&fold_name(name)).cloned().unwrap_or_default()
    }

    pub fn set(&self, name: &str, value: Value) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.insert(fold_name(name), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.contains_key(&fold_name(name))
    }
}

impl Default for SharedGlobals {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies a pushed frame; `pop_frame` must receive the id of the most
/// recently pushed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameId(usize);

/// Per-invocation scope.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    locals: HashMap<String, Value, ahash::RandomState>,
    global_names: HashSet<String, ahash::RandomState>,
    pass_message: Option<String>,
    return_value: Value,
    params: Vec<Value>,
}

impl Frame {
    fn new() -> Self {
        let mut frame = Self {
            locals: fast_map(),
            global_names: fast_set(),
            pass_message: None,
            return_value: Value::empty(),
            params: Vec::new(),
        };
        // `it` is always present and always globally visible.
        frame.global_names.insert("it".to_string());
        frame
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.global_names.contains(&fold_name(name))
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Whether this context entered the engine from outside (the UI/event
/// thread) or from within an already-running handler. Nested contexts run
/// their sends inline on the current thread; external ones are submitted
/// to the execution pool. Carried explicitly so the dispatch rule never
/// depends on thread identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallOrigin {
    External,
    Nested,
}

/// Execution context threaded through every call in the runtime. Owns the
/// frame stack; shares global storage with every other context.
pub struct ExecutionContext {
    frames: Vec<Frame>,
    globals: SharedGlobals,
    origin: CallOrigin,
    result: Value,
}

impl ExecutionContext {
    pub fn new(globals: SharedGlobals, origin: CallOrigin) -> Self {
        Self {
            frames: Vec::with_capacity(8),
            globals,
            origin,
            result: Value::empty(),
        }
    }

    pub fn origin(&self) -> CallOrigin {
        self.origin
    }

    pub(crate) fn mark_nested(&mut self) {
        self.origin = CallOrigin::Nested;
    }

    pub fn globals(&self) -> &SharedGlobals {
        &self.globals
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames, bottom of the stack first. For tracing tools.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn push_frame(&mut self) -> FrameId {
        self.frames.push(Frame::new());
        FrameId(self.frames.len() - 1)
    }

    /// Pop the most recently pushed frame. A mismatched id is a bug in the
    /// host runtime, not a script error, and is fatal.
    pub fn pop_frame(&mut self, id: FrameId) {
        assert_eq!(
            id.0,
            self.frames.len().wrapping_sub(1),
            "pop_frame out of order: popping {:?} with {} frames live",
            id,
            self.frames.len()
        );
        self.frames.pop();
    }

    fn top(&self) -> &Frame {
        self.frames.last().expect("no active frame")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no active frame")
    }

    /// Route `name` to global storage for the current frame.
    pub fn declare_global(&mut self, name: &str) {
        self.top_mut().global_names.insert(fold_name(name));
    }

    /// Read a variable. Globally-declared names come from shared storage;
    /// an unset local evaluates to its own name, the way an unquoted
    /// literal reads in a script.
    pub fn get_var(&self, name: &str) -> Value {
        let frame = self.top();
        if frame.is_global(name) {
            return self.globals.get(name);
        }
        match frame.locals.get(&fold_name(name)) {
            Some(v) => v.clone(),
            None => Value::new(name),
        }
    }

    pub fn set_var(&mut self, name: &str, value: Value) {
        if self.top().is_global(name) {
            self.globals.set(name, value);
        } else {
            self.top_mut().locals.insert(fold_name(name), value);
        }
    }

    /// True when `name` has been assigned (locally or globally) in the
    /// current frame's view.
    pub fn is_defined(&self, name: &str) -> bool {
        let frame = self.top();
        if frame.is_global(name) {
            return self.globals.contains(name);
        }
        frame.locals.contains_key(&fold_name(name))
    }

    pub fn set_pass(&mut self, message: impl Into<String>) {
        self.top_mut().pass_message = Some(message.into());
    }

    pub fn get_pass(&self) -> Option<&str> {
        self.top().pass_message.as_deref()
    }

    pub fn set_return(&mut self, value: Value) {
        self.top_mut().return_value = value;
    }

    pub fn get_return(&self) -> Value {
        self.top().return_value.clone()
    }

    pub fn set_params(&mut self, params: Vec<Value>) {
        self.top_mut().params = params;
    }

    pub fn params(&self) -> &[Value] {
        &self.top().params
    }

    /// `the result` of the last command.
    pub fn result(&self) -> &Value {
        &self.result
    }

    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    /// Bind `it`, the implicit always-global target of `get`.
    pub fn set_it(&mut self, value: Value) {
        self.globals.set("it", value);
    }
}
