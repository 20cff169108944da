//! WildTalk runtime.
//!
//! String-backed dynamic values with chunk addressing, explicit execution
//! contexts, and a multi-pool message dispatch engine implementing the
//! trap/pass protocol.
mod config;
mod context;
mod error;
mod interp;
mod value;

pub mod dispatch;

pub use config::RuntimeConfig;
pub use context::{CallOrigin, ExecutionContext, Frame, FrameId, SharedGlobals};
pub use dispatch::{
    CompileHandle, CompileOutcome, DispatchEngine, DispatchHandle, DispatchOutcome, FaultSink,
    IdleMessenger, IdlePolicy, PartSpec, ScriptTarget, SendDisposition, StatementsHandle,
    TargetResolver,
};
pub use error::RuntimeError;
pub use value::{Chunk, ChunkPos, Prep, Value};
