//! Statement executor and expression evaluator.
//!
//! An `Interp` borrows the engine, the execution context and the current
//! target for the duration of one statement block. Nested sends and user
//! function calls go back through the engine, which runs them inline on
//! this same thread.
mod builtins;
mod expr;
mod stmt;

use crate::context::ExecutionContext;
use crate::dispatch::{DispatchEngine, ScriptTarget};
use crate::error::RuntimeError;
use wt_ast::Stmt;

/// Control flow out of a statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Normal,
    ExitRepeat,
    NextRepeat,
    /// Leave the current handler/function (`return`, `pass`, `exit name`).
    Exit,
}

pub(crate) struct Interp<'a> {
    pub(crate) engine: &'a DispatchEngine,
    pub(crate) ctx: &'a mut ExecutionContext,
    pub(crate) target: &'a ScriptTarget,
    /// Name of the handler/function being executed, when there is one;
    /// validates `exit <name>`.
    pub(crate) current: Option<&'a str>,
}

impl<'a> Interp<'a> {
    pub(crate) fn new(
        engine: &'a DispatchEngine,
        ctx: &'a mut ExecutionContext,
        target: &'a ScriptTarget,
    ) -> Self {
        Self {
            engine,
            ctx,
            target,
            current: None,
        }
    }

    pub(crate) fn named(
        engine: &'a DispatchEngine,
        ctx: &'a mut ExecutionContext,
        target: &'a ScriptTarget,
        current: &'a str,
    ) -> Self {
        Self {
            engine,
            ctx,
            target,
            current: Some(current),
        }
    }

    /// Run a handler or function body to completion.
    pub(crate) fn run_block(mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        self.exec_block(stmts).map(|_| ())
    }

    pub(crate) fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }
}
