//! The dispatch engine.
//!
//! Coordinates compilation, handler execution, function execution and the
//! trap/pass protocol across the worker pools.
//!
//! The load-bearing rule: a handler or function runs *inline on the
//! current thread* when the caller is already inside a running script
//! (`CallOrigin::Nested`), and is *submitted to the execution pool* when
//! the caller is outside (the UI/event thread). Nested sends therefore
//! behave exactly like function calls — they finish before the sending
//! statement's successors run — and N levels of nesting occupy exactly one
//! pool slot, so the pool cannot deadlock on itself.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, bounded};
use log::{debug, warn};

use crate::config::RuntimeConfig;
use crate::context::{CallOrigin, ExecutionContext, SharedGlobals};
use crate::error::RuntimeError;
use crate::interp::Interp;
use crate::value::Value;
use wt_ast::{Handler, Script};
use wt_syntax::name_eq;

use super::compile::{CompileHandle, CompilePool};
use super::pool::WorkerPool;

/// Opaque identifier of the object a handler runs on behalf of (the `me`
/// binding). Produced by the surrounding application; the runtime only
/// carries it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartSpec {
    name: String,
}

impl PartSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A part together with its compiled script: everything a message needs
/// to be delivered.
#[derive(Clone)]
pub struct ScriptTarget {
    pub part: PartSpec,
    pub script: Arc<Script>,
}

impl ScriptTarget {
    pub fn new(part: PartSpec, script: Arc<Script>) -> Self {
        Self { part, script }
    }

    /// A scriptless target, used for expression evaluation outside any
    /// object.
    pub fn anonymous() -> Self {
        Self {
            part: PartSpec::new("scratch"),
            script: Arc::new(Script::empty()),
        }
    }
}

/// External containment-hierarchy walker. When a message is passed (or no
/// handler exists), the engine offers it here; the application decides
/// which container is next (button, card, background, stack, application).
pub trait TargetResolver: Send + Sync {
    /// Resolve a `send … to <name>` target.
    fn resolve(&self, name: &str) -> Option<ScriptTarget>;

    /// Offer an unconsumed message to the rest of the hierarchy. Return
    /// `true` when some container handled it.
    fn offer(&self, message: &str, args: &[Value]) -> bool;
}

/// Resolver used until the application installs one: nothing else exists.
struct NullResolver;

impl TargetResolver for NullResolver {
    fn resolve(&self, _name: &str) -> Option<ScriptTarget> {
        None
    }

    fn offer(&self, _message: &str, _args: &[Value]) -> bool {
        false
    }
}

/// External error-presentation collaborator.
pub trait FaultSink: Send + Sync {
    fn report(&self, error: &RuntimeError);
}

struct LogSink;

impl FaultSink for LogSink {
    fn report(&self, error: &RuntimeError) {
        warn!("script error: {error}");
    }
}

/// How a handler left the trap/pass protocol.
#[derive(Clone, Debug, PartialEq)]
pub enum HandlerOutcome {
    /// No `pass`: the message is fully consumed.
    Trapped,
    /// The handler explicitly passed the message it was handling.
    Passed(String),
}

/// What became of a nested message send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendDisposition {
    Handled,
    Unhandled,
}

/// Result of a top-level `dispatch_handler`.
#[derive(Clone, Debug)]
pub struct DispatchOutcome {
    /// `true` when the message should stop propagating (handled, or a
    /// fault/malformed pass halted it).
    pub trapped: bool,
    pub error: Option<RuntimeError>,
}

/// Future for a top-level dispatch. The UI thread can block on it, poll it
/// with a timeout, or hand it a completion callback that runs on the
/// listener pool.
pub struct DispatchHandle {
    rx: Receiver<DispatchOutcome>,
    engine: DispatchEngine,
}

impl DispatchHandle {
    pub fn wait(self) -> DispatchOutcome {
        self.rx.recv().unwrap_or(DispatchOutcome {
            trapped: true,
            error: Some(RuntimeError::Fault("dispatch engine shut down".into())),
        })
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<DispatchOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Run `callback` on the completion-listener pool once the handler
    /// finishes. Listener work may enqueue more script execution without
    /// risking the execution pool's slots.
    pub fn on_complete<F: FnOnce(DispatchOutcome) + Send + 'static>(self, callback: F) {
        let rx = self.rx;
        self.engine.shared.listener_pool.submit(move || {
            if let Ok(outcome) = rx.recv() {
                callback(outcome);
            }
        });
    }
}

/// Future for `execute_statements`: resolves to the name of the message
/// the statements passed, if any.
pub struct StatementsHandle {
    rx: Receiver<Result<Option<String>, RuntimeError>>,
}

impl StatementsHandle {
    pub fn wait(self) -> Result<Option<String>, RuntimeError> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(RuntimeError::Fault("dispatch engine shut down".into())))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Option<String>, RuntimeError>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

struct Shared {
    config: RuntimeConfig,
    globals: SharedGlobals,
    exec_pool: WorkerPool,
    listener_pool: WorkerPool,
    compile_pool: CompilePool,
    resolver: Mutex<Arc<dyn TargetResolver>>,
    fault_sink: Mutex<Arc<dyn FaultSink>>,
    /// Text `put` writes when given no destination.
    output: Mutex<String>,
}

/// The dispatch engine. Cheap to clone; clones share pools and globals.
#[derive(Clone)]
pub struct DispatchEngine {
    shared: Arc<Shared>,
}

impl DispatchEngine {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                globals: SharedGlobals::new(),
                exec_pool: WorkerPool::new("wt-exec", config.exec_workers),
                listener_pool: WorkerPool::new("wt-listener", config.listener_workers),
                compile_pool: CompilePool::new(config.compile_workers),
                resolver: Mutex::new(Arc::new(NullResolver)),
                fault_sink: Mutex::new(Arc::new(LogSink)),
                output: Mutex::new(String::new()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    pub fn globals(&self) -> &SharedGlobals {
        &self.shared.globals
    }

    pub fn set_resolver(&self, resolver: Arc<dyn TargetResolver>) {
        *self
            .shared
            .resolver
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = resolver;
    }

    pub fn set_fault_sink(&self, sink: Arc<dyn FaultSink>) {
        *self
            .shared
            .fault_sink
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = sink;
    }

    /// Any script work running or waiting? Consulted by the idle messenger.
    pub fn exec_busy(&self) -> bool {
        !self.shared.exec_pool.is_idle()
    }

    pub(crate) fn resolver(&self) -> Arc<dyn TargetResolver> {
        Arc::clone(
            &self
                .shared
                .resolver
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        )
    }

    /// Append a line to the output buffer (`put` with no destination).
    pub(crate) fn append_output(&self, text: &str) {
        let mut out = self
            .shared
            .output
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        out.push_str(text);
        out.push('\n');
    }

    /// Drain everything `put` has written since the last call.
    pub fn take_output(&self) -> String {
        std::mem::take(
            &mut *self
                .shared
                .output
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        )
    }

    fn report_fault(&self, error: &RuntimeError) {
        let sink = Arc::clone(
            &self
                .shared
                .fault_sink
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        );
        sink.report(error);
    }

    // -- public operations --------------------------------------------------

    /// Compile script text on the calling thread.
    pub fn compile(&self, text: &str) -> Result<Arc<Script>, RuntimeError> {
        CompilePool::compile_now(text)
    }

    /// Compile on the compile pool.
    pub fn compile_in_background(&self, text: String) -> CompileHandle {
        self.shared.compile_pool.submit(text)
    }

    /// Best-effort background compile: a newer submission discards this
    /// one if it has not started yet.
    pub fn compile_preemptive(&self, text: String) -> CompileHandle {
        self.shared.compile_pool.submit_preemptive(text)
    }

    /// Evaluate `text` as an expression. Text that is not a well-formed
    /// expression evaluates to itself, as a literal.
    pub fn evaluate(&self, text: &str) -> Result<Value, RuntimeError> {
        let Some(expr) = wt_parser::parse_expression(text) else {
            return Ok(Value::new(text));
        };
        let target = ScriptTarget::anonymous();
        let mut ctx = ExecutionContext::new(self.shared.globals.clone(), CallOrigin::External);
        let id = ctx.push_frame();
        let result = Interp::new(self, &mut ctx, &target).eval(&expr);
        ctx.pop_frame(id);
        result
    }

    /// Deliver `message` to `target` from outside the engine (the UI or
    /// event thread). The body runs on the execution pool; the returned
    /// handle resolves to the trap/pass outcome.
    pub fn dispatch_handler(
        &self,
        target: &ScriptTarget,
        message: &str,
        args: Vec<Value>,
    ) -> DispatchHandle {
        let (tx, rx) = bounded(1);
        if target.script.handler(message).is_none() {
            // An absent handler implicitly passes: no statements run.
            debug!("no handler for `{message}` on {}", target.part.name());
            let _ = tx.send(DispatchOutcome {
                trapped: false,
                error: None,
            });
            return DispatchHandle {
                rx,
                engine: self.clone(),
            };
        }
        let engine = self.clone();
        let target = target.clone();
        let message = message.to_string();
        self.shared.exec_pool.submit(move || {
            let mut ctx =
                ExecutionContext::new(engine.shared.globals.clone(), CallOrigin::External);
            let outcome = engine.deliver(&mut ctx, &target, &message, &args);
            let _ = tx.send(outcome);
        });
        DispatchHandle {
            rx,
            engine: self.clone(),
        }
    }

    /// Run `function` on `target` and block for its return value.
    pub fn execute_function(
        &self,
        target: &ScriptTarget,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if target.script.function(function).is_none() {
            return Err(RuntimeError::Semantic(format!(
                "no function \"{function}\" in the script of {}",
                target.part.name()
            )));
        }
        let (tx, rx) = bounded(1);
        let engine = self.clone();
        let target = target.clone();
        let function = function.to_string();
        self.shared.exec_pool.submit(move || {
            let mut ctx =
                ExecutionContext::new(engine.shared.globals.clone(), CallOrigin::External);
            ctx.mark_nested();
            let result = engine.call_function(&mut ctx, &target, &function, &args);
            let _ = tx.send(result);
        });
        rx.recv()
            .unwrap_or_else(|_| Err(RuntimeError::Fault("dispatch engine shut down".into())))
    }

    /// Execute loose statement text (message box, scripted `do` from the
    /// application) against `target`. Resolves to the name of the message
    /// the statements passed, if any.
    pub fn execute_statements(&self, target: &ScriptTarget, text: &str) -> StatementsHandle {
        let (tx, rx) = bounded(1);
        let engine = self.clone();
        let target = target.clone();
        let text = text.to_string();
        self.shared.exec_pool.submit(move || {
            let mut ctx =
                ExecutionContext::new(engine.shared.globals.clone(), CallOrigin::External);
            ctx.mark_nested();
            let result = engine.run_statement_text(&mut ctx, &target, &text);
            let _ = tx.send(result);
        });
        StatementsHandle { rx }
    }

    // -- protocol internals -------------------------------------------------

    /// Full trap/pass delivery for a top-level message, fault policy
    /// included. Faults and malformed passes report to the sink and force
    /// `trapped = true` so the message stops propagating.
    fn deliver(
        &self,
        ctx: &mut ExecutionContext,
        target: &ScriptTarget,
        message: &str,
        args: &[Value],
    ) -> DispatchOutcome {
        let Some(handler) = target.script.handler(message) else {
            return DispatchOutcome {
                trapped: false,
                error: None,
            };
        };
        match self.run_handler(ctx, target, handler, message, args) {
            Ok(HandlerOutcome::Trapped) => DispatchOutcome {
                trapped: true,
                error: None,
            },
            Ok(HandlerOutcome::Passed(_)) => DispatchOutcome {
                trapped: false,
                error: None,
            },
            Err(e) => {
                self.report_fault(&e);
                DispatchOutcome {
                    trapped: true,
                    error: Some(e),
                }
            }
        }
    }

    /// Nested send from inside a running handler (`send` statement or bare
    /// command). Runs inline on the current thread; when the target does
    /// not consume the message, it is offered to the external hierarchy.
    pub(crate) fn send_nested(
        &self,
        ctx: &mut ExecutionContext,
        target: &ScriptTarget,
        message: &str,
        args: &[Value],
    ) -> Result<SendDisposition, RuntimeError> {
        let consumed = match target.script.handler(message) {
            Some(handler) => match self.run_handler(ctx, target, handler, message, args)? {
                HandlerOutcome::Trapped => true,
                HandlerOutcome::Passed(_) => false,
            },
            None => false,
        };
        if consumed {
            return Ok(SendDisposition::Handled);
        }
        if self.resolver().offer(message, args) {
            Ok(SendDisposition::Handled)
        } else {
            Ok(SendDisposition::Unhandled)
        }
    }

    /// Push a frame, bind arguments, run the body, fold the frame's pass
    /// indicator into a `HandlerOutcome`.
    fn run_handler(
        &self,
        ctx: &mut ExecutionContext,
        target: &ScriptTarget,
        handler: &Handler,
        message: &str,
        args: &[Value],
    ) -> Result<HandlerOutcome, RuntimeError> {
        if ctx.depth() >= self.shared.config.max_call_depth {
            return Err(RuntimeError::Fault("too much recursion".into()));
        }
        let id = ctx.push_frame();
        ctx.mark_nested();
        self.bind_arguments(ctx, &handler.params, args, &handler.name);
        let flow = Interp::named(self, ctx, target, message).run_block(&handler.body);
        let outcome = flow.and_then(|_| match ctx.get_pass() {
            None => Ok(HandlerOutcome::Trapped),
            Some(passed) if name_eq(passed, message) => {
                Ok(HandlerOutcome::Passed(passed.to_string()))
            }
            Some(passed) => Err(RuntimeError::Semantic(format!(
                "cannot pass \"{passed}\" from the handler for \"{message}\""
            ))),
        });
        let returned = ctx.get_return();
        ctx.pop_frame(id);
        if outcome.is_ok() {
            // A handler's `return` value becomes `the result` in its
            // caller; a handler that returns nothing resets it to empty.
            ctx.set_result(returned);
        }
        outcome
    }

    /// Call a user function and return its value. Functions do not take
    /// part in trap/pass.
    pub(crate) fn call_function(
        &self,
        ctx: &mut ExecutionContext,
        target: &ScriptTarget,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let Some(function) = target.script.function(name) else {
            return Err(RuntimeError::Semantic(format!(
                "no function \"{name}\" in the script of {}",
                target.part.name()
            )));
        };
        if ctx.depth() >= self.shared.config.max_call_depth {
            return Err(RuntimeError::Fault("too much recursion".into()));
        }
        let id = ctx.push_frame();
        self.bind_arguments(ctx, &function.params, args, name);
        let flow = Interp::named(self, ctx, target, name).run_block(&function.body);
        let value = flow.map(|_| ctx.get_return());
        ctx.pop_frame(id);
        value
    }

    /// Run statement text in a fresh frame; used by `execute_statements`
    /// and the `do` command. The frame's pass indicator is the result.
    pub(crate) fn run_statement_text(
        &self,
        ctx: &mut ExecutionContext,
        target: &ScriptTarget,
        text: &str,
    ) -> Result<Option<String>, RuntimeError> {
        let parsed = wt_parser::parse_statements(text);
        if let Some(first) = parsed
            .diagnostics
            .iter()
            .find(|d| d.severity == wt_syntax::Severity::Error)
        {
            return Err(RuntimeError::Syntax(first.message.clone()));
        }
        if ctx.depth() >= self.shared.config.max_call_depth {
            return Err(RuntimeError::Fault("too much recursion".into()));
        }
        let id = ctx.push_frame();
        let flow = Interp::new(self, ctx, target).run_block(&parsed.stmts);
        let passed = flow.map(|_| ctx.get_pass().map(str::to_string));
        ctx.pop_frame(id);
        passed
    }

    /// Positional parameter binding. A count mismatch is reported as an
    /// error but the body still runs with whatever bindings exist — this
    /// mirrors the long-standing behavior scripts depend on.
    fn bind_arguments(
        &self,
        ctx: &mut ExecutionContext,
        params: &[String],
        args: &[Value],
        name: &str,
    ) {
        if params.len() != args.len() {
            self.report_fault(&RuntimeError::Semantic(format!(
                "\"{name}\" takes {} parameters but was given {}",
                params.len(),
                args.len()
            )));
        }
        for (i, param) in params.iter().enumerate() {
            ctx.set_var(param, args.get(i).cloned().unwrap_or_default());
        }
        ctx.set_params(args.to_vec());
    }
}
