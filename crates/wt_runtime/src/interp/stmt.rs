//! Statement execution.
use crate::dispatch::{ScriptTarget, SendDisposition};
use crate::error::RuntimeError;
use crate::value::{Prep, Value};
use wt_ast::{
    Container, ContainerChunk, Expr, Preposition, RepeatKind, RepeatStmt, SendStmt, Stmt,
};
use wt_syntax::name_eq;

use super::expr::chunk_kind;
use super::{Flow, Interp};

fn prep(p: Preposition) -> Prep {
    match p {
        Preposition::Before => Prep::Before,
        Preposition::Into => Prep::Into,
        Preposition::After => Prep::After,
        Preposition::Replacing => Prep::Replacing,
    }
}

impl Interp<'_> {
    pub(super) fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Put(put) => {
                let value = self.eval(&put.value)?;
                match &put.dest {
                    None => self.engine.append_output(value.as_str()),
                    Some((p, container)) => self.write_container(container, prep(*p), value)?,
                }
                Ok(Flow::Normal)
            }
            Stmt::Get(expr) => {
                let value = self.eval(expr)?;
                self.ctx.set_it(value);
                Ok(Flow::Normal)
            }
            Stmt::Global(names) => {
                for name in names.iter() {
                    self.ctx.declare_global(name);
                }
                Ok(Flow::Normal)
            }
            Stmt::Pass(message) => {
                self.ctx.set_pass(message.as_str());
                Ok(Flow::Exit)
            }
            Stmt::Return(expr) => {
                if let Some(expr) = expr {
                    let value = self.eval(expr)?;
                    self.ctx.set_return(value);
                }
                Ok(Flow::Exit)
            }
            Stmt::Send(send) => self.exec_send(send),
            Stmt::Do(expr) => {
                let text = self.eval(expr)?;
                let passed = self
                    .engine
                    .run_statement_text(self.ctx, self.target, text.as_str())?;
                // A `pass` inside `do` passes from the enclosing handler.
                if let Some(message) = passed {
                    self.ctx.set_pass(message);
                    return Ok(Flow::Exit);
                }
                Ok(Flow::Normal)
            }
            Stmt::If(stmt) => {
                let cond = self.eval(&stmt.cond)?;
                if want_bool(&cond)? {
                    self.exec_block(&stmt.then_branch)
                } else if let Some(else_branch) = &stmt.else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Repeat(stmt) => self.exec_repeat(stmt),
            Stmt::ExitRepeat => Ok(Flow::ExitRepeat),
            Stmt::NextRepeat => Ok(Flow::NextRepeat),
            Stmt::ExitHandler(name) => {
                if let Some(current) = self.current {
                    if !name_eq(name, current) {
                        return Err(RuntimeError::Semantic(format!(
                            "cannot exit \"{name}\" from the handler for \"{current}\""
                        )));
                    }
                }
                Ok(Flow::Exit)
            }
            Stmt::Command(cmd) => {
                let mut args = Vec::with_capacity(cmd.args.len());
                for arg in cmd.args.iter() {
                    args.push(self.eval(arg)?);
                }
                self.deliver_nested(&self.target.clone(), &cmd.name, &args)?;
                Ok(Flow::Normal)
            }
        }
    }

    // -- containers ---------------------------------------------------------

    fn write_container(
        &mut self,
        container: &Container,
        p: Prep,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match container {
            Container::Variable(name) => {
                let new = match p {
                    Prep::Into | Prep::Replacing => value,
                    Prep::Before => value.concat(&self.container_base(name)),
                    Prep::After => self.container_base(name).concat(&value),
                };
                self.ctx.set_var(name, new);
                Ok(())
            }
            Container::Chunk(chunk) => self.write_chunk(chunk, p, value),
        }
    }

    /// Chunk writes resolve outside-in: the inner container is read, the
    /// chunk of it is replaced, and the whole thing is written back.
    fn write_chunk(
        &mut self,
        chunk: &ContainerChunk,
        p: Prep,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let current = self.read_container(&chunk.target)?;
        let start = self.chunk_pos(&chunk.start)?;
        let end = chunk.end.as_ref().map(|e| self.chunk_pos(e)).transpose()?;
        let new = current.set_chunk(p, chunk_kind(chunk.kind), start, end, &value)?;
        self.write_container(&chunk.target, Prep::Into, new)
    }

    fn read_container(&mut self, container: &Container) -> Result<Value, RuntimeError> {
        match container {
            Container::Variable(name) => Ok(self.container_base(name)),
            Container::Chunk(chunk) => {
                let source = self.read_container(&chunk.target)?;
                let start = self.chunk_pos(&chunk.start)?;
                let end = chunk.end.as_ref().map(|e| self.chunk_pos(e)).transpose()?;
                source.get_chunk(chunk_kind(chunk.kind), start, end)
            }
        }
    }

    /// The value a container write builds on. Unlike reads in expressions,
    /// an unset variable used as a container starts from empty, not from
    /// its own name.
    fn container_base(&self, name: &str) -> Value {
        if self.ctx.is_defined(name) {
            self.ctx.get_var(name)
        } else {
            Value::empty()
        }
    }

    // -- message sends ------------------------------------------------------

    fn exec_send(&mut self, send: &SendStmt) -> Result<Flow, RuntimeError> {
        let message = self.eval(&send.message)?;
        let (name, args) = self.split_message(message.as_str())?;
        let target = match &send.target {
            None => self.target.clone(),
            Some(expr) => {
                let target_name = self.eval(expr)?;
                if name_eq(target_name.as_str(), "me") {
                    self.target.clone()
                } else {
                    self.engine
                        .resolver()
                        .resolve(target_name.as_str())
                        .ok_or_else(|| {
                            RuntimeError::Semantic(format!(
                                "no such object \"{}\"",
                                target_name.as_str()
                            ))
                        })?
                }
            }
        };
        self.deliver_nested(&target, &name, &args)?;
        Ok(Flow::Normal)
    }

    /// A sent message may carry arguments: `send "doubled 4" to me`. The
    /// text is parsed as a command line; argument expressions evaluate in
    /// the *sender's* context.
    fn split_message(&mut self, text: &str) -> Result<(String, Vec<Value>), RuntimeError> {
        let parsed = wt_parser::parse_statements(text);
        let clean = !parsed
            .diagnostics
            .iter()
            .any(|d| d.severity == wt_syntax::Severity::Error);
        if clean {
            if let [Stmt::Command(cmd)] = &*parsed.stmts {
                let mut args = Vec::with_capacity(cmd.args.len());
                for arg in cmd.args.iter() {
                    args.push(self.eval(arg)?);
                }
                return Ok((cmd.name.clone(), args));
            }
        }
        Ok((text.to_string(), Vec::new()))
    }

    fn deliver_nested(
        &mut self,
        target: &ScriptTarget,
        message: &str,
        args: &[Value],
    ) -> Result<(), RuntimeError> {
        match self.engine.send_nested(self.ctx, target, message, args)? {
            SendDisposition::Handled => Ok(()),
            SendDisposition::Unhandled => Err(RuntimeError::cant_understand(message)),
        }
    }

    // -- loops --------------------------------------------------------------

    fn exec_repeat(&mut self, stmt: &RepeatStmt) -> Result<Flow, RuntimeError> {
        match &stmt.kind {
            RepeatKind::Forever => loop {
                match self.exec_block(&stmt.body)? {
                    Flow::Normal | Flow::NextRepeat => {}
                    Flow::ExitRepeat => return Ok(Flow::Normal),
                    Flow::Exit => return Ok(Flow::Exit),
                }
            },
            RepeatKind::Times(expr) => {
                let count = self.want_number(expr)?.floor() as i64;
                for _ in 0..count.max(0) {
                    match self.exec_block(&stmt.body)? {
                        Flow::Normal | Flow::NextRepeat => {}
                        Flow::ExitRepeat => break,
                        Flow::Exit => return Ok(Flow::Exit),
                    }
                }
                Ok(Flow::Normal)
            }
            RepeatKind::While(cond) => loop {
                let c = self.eval(cond)?;
                if !want_bool(&c)? {
                    return Ok(Flow::Normal);
                }
                match self.exec_block(&stmt.body)? {
                    Flow::Normal | Flow::NextRepeat => {}
                    Flow::ExitRepeat => return Ok(Flow::Normal),
                    Flow::Exit => return Ok(Flow::Exit),
                }
            },
            RepeatKind::Until(cond) => loop {
                let c = self.eval(cond)?;
                if want_bool(&c)? {
                    return Ok(Flow::Normal);
                }
                match self.exec_block(&stmt.body)? {
                    Flow::Normal | Flow::NextRepeat => {}
                    Flow::ExitRepeat => return Ok(Flow::Normal),
                    Flow::Exit => return Ok(Flow::Exit),
                }
            },
            RepeatKind::With {
                var,
                from,
                to,
                down,
            } => {
                let mut i = self.want_integer(from)?;
                let limit = self.want_integer(to)?;
                loop {
                    if (*down && i < limit) || (!*down && i > limit) {
                        return Ok(Flow::Normal);
                    }
                    self.ctx.set_var(var, Value::from_int(i));
                    match self.exec_block(&stmt.body)? {
                        Flow::Normal | Flow::NextRepeat => {}
                        Flow::ExitRepeat => return Ok(Flow::Normal),
                        Flow::Exit => return Ok(Flow::Exit),
                    }
                    i = if *down {
                        i.checked_sub(1).ok_or(RuntimeError::Overflow { op: "-" })?
                    } else {
                        i.checked_add(1).ok_or(RuntimeError::Overflow { op: "+" })?
                    };
                }
            }
        }
    }

    fn want_number(&mut self, expr: &Expr) -> Result<f64, RuntimeError> {
        let v = self.eval(expr)?;
        v.as_float()
            .ok_or_else(|| RuntimeError::not_a_number(v.as_str()))
    }

    fn want_integer(&mut self, expr: &Expr) -> Result<i64, RuntimeError> {
        let v = self.eval(expr)?;
        v.as_integer()
            .ok_or_else(|| RuntimeError::not_a_number(v.as_str()))
    }
}

fn want_bool(v: &Value) -> Result<bool, RuntimeError> {
    v.as_bool()
        .ok_or_else(|| RuntimeError::not_a_boolean(v.as_str()))
}
