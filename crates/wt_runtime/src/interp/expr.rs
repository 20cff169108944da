//! Expression evaluation.
use crate::error::RuntimeError;
use crate::value::{Chunk, ChunkPos, Value};
use wt_ast::{BinaryOp, CallExpr, ChunkExpr, ChunkIndex, ChunkKind, Expr, UnaryOp};
use wt_syntax::name_eq;

use super::Interp;

pub(super) fn chunk_kind(kind: ChunkKind) -> Chunk {
    match kind {
        ChunkKind::Char => Chunk::Char,
        ChunkKind::Word => Chunk::Word,
        ChunkKind::Item => Chunk::Item,
        ChunkKind::Line => Chunk::Line,
    }
}

impl Interp<'_> {
    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Str(s) => Ok(Value::new(s.as_str())),
            Expr::Int(i) => Ok(Value::from_int(*i)),
            Expr::Float(f) => Ok(Value::from_float(*f)),
            Expr::Bool(b) => Ok(Value::from_bool(*b)),
            Expr::Empty => Ok(Value::empty()),
            Expr::Var(name) => {
                if name_eq(name, "me") {
                    return Ok(Value::new(self.target.part.name()));
                }
                Ok(self.ctx.get_var(name))
            }
            Expr::TheResult => Ok(self.ctx.result().clone()),
            Expr::TheParams => Ok(joined_params(self.ctx.params())),
            Expr::TheParamCount => Ok(Value::from_int(self.ctx.params().len() as i64)),
            Expr::Unary { op, expr } => {
                let v = self.eval(expr)?;
                match op {
                    UnaryOp::Neg => v.negate(),
                    UnaryOp::Not => match v.as_bool() {
                        Some(b) => Ok(Value::from_bool(!b)),
                        None => Err(RuntimeError::not_a_boolean(v.as_str())),
                    },
                }
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Chunk(chunk) => self.eval_chunk(chunk),
            Expr::Call(call) => self.eval_call(call),
            Expr::Group(inner) => self.eval(inner),
        }
    }

    /// Both operands are always evaluated; `and`/`or` do not short-circuit.
    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let a = self.eval(left)?;
        let b = self.eval(right)?;
        match op {
            BinaryOp::Add => a.add(&b),
            BinaryOp::Sub => a.subtract(&b),
            BinaryOp::Mul => a.multiply(&b),
            BinaryOp::Div => a.divide(&b),
            BinaryOp::IntDiv => a.int_divide(&b),
            BinaryOp::Mod => a.modulo(&b),
            BinaryOp::Pow => a.power(&b),
            BinaryOp::Concat => Ok(a.concat(&b)),
            BinaryOp::ConcatSpace => Ok(a.concat_with_space(&b)),
            BinaryOp::Eq => Ok(Value::from_bool(a.equals(&b))),
            BinaryOp::Ne => Ok(Value::from_bool(!a.equals(&b))),
            BinaryOp::Lt => Ok(Value::from_bool(a.compare(&b).is_lt())),
            BinaryOp::Le => Ok(Value::from_bool(a.compare(&b).is_le())),
            BinaryOp::Gt => Ok(Value::from_bool(a.compare(&b).is_gt())),
            BinaryOp::Ge => Ok(Value::from_bool(a.compare(&b).is_ge())),
            BinaryOp::And => {
                let (a, b) = both_bools(&a, &b)?;
                Ok(Value::from_bool(a && b))
            }
            BinaryOp::Or => {
                let (a, b) = both_bools(&a, &b)?;
                Ok(Value::from_bool(a || b))
            }
            BinaryOp::Contains => Ok(Value::from_bool(a.contains(&b))),
        }
    }

    fn eval_chunk(&mut self, chunk: &ChunkExpr) -> Result<Value, RuntimeError> {
        let source = self.eval(&chunk.source)?;
        let start = self.chunk_pos(&chunk.start)?;
        let end = chunk.end.as_ref().map(|e| self.chunk_pos(e)).transpose()?;
        source.get_chunk(chunk_kind(chunk.kind), start, end)
    }

    pub(super) fn chunk_pos(&mut self, index: &ChunkIndex) -> Result<ChunkPos, RuntimeError> {
        match index {
            ChunkIndex::Middle => Ok(ChunkPos::Middle),
            ChunkIndex::Expr(expr) => self.eval(expr)?.as_chunk_pos(),
        }
    }

    /// A function in the target's own script shadows the built-in of the
    /// same name.
    fn eval_call(&mut self, call: &CallExpr) -> Result<Value, RuntimeError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval(arg)?);
        }
        if self.target.script.function(&call.name).is_some() {
            return self
                .engine
                .call_function(self.ctx, self.target, &call.name, &args);
        }
        super::builtins::call(&call.name, &args)
    }
}

fn both_bools(a: &Value, b: &Value) -> Result<(bool, bool), RuntimeError> {
    let Some(a) = a.as_bool() else {
        return Err(RuntimeError::not_a_boolean(a.as_str()));
    };
    let Some(b) = b.as_bool() else {
        return Err(RuntimeError::not_a_boolean(b.as_str()));
    };
    Ok((a, b))
}

fn joined_params(params: &[Value]) -> Value {
    let mut out = String::new();
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(p.as_str());
    }
    Value::new(out)
}
