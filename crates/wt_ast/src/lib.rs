//! WildTalk abstract syntax tree.
mod ast;
mod script;

pub use ast::{
    BinaryOp, CallExpr, ChunkExpr, ChunkIndex, ChunkKind, CommandStmt, Container, ContainerChunk,
    Expr, Handler, IfStmt, Preposition, PutStmt, RepeatKind, RepeatStmt, Script, SendStmt, Stmt,
    UnaryOp,
};
