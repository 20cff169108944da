//! Message dispatch: worker pools, the trap/pass protocol, idle timing.
mod compile;
mod engine;
mod idle;
mod pool;

pub use compile::{CompileHandle, CompileOutcome, CompilePool};
pub use engine::{
    DispatchEngine, DispatchHandle, DispatchOutcome, FaultSink, PartSpec, ScriptTarget,
    SendDisposition, StatementsHandle, TargetResolver,
};
pub use idle::{IdleMessenger, IdlePolicy};
pub use pool::WorkerPool;
