//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Actor resolver: rejects requests without an actor identity
//! 2. Access logger: logs after the actor is known

pub mod actor;
pub mod audit;
