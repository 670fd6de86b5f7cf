//! Register Management Module
//!
//! The code generator owns a small fixed set of interchangeable registers,
//! managed as a LIFO stack of free entries. There is no spilling: running out
//! of registers is a hard error.
//!
//! ## Invariants
//!
//! - Allocated-but-unfreed registers never exceed the pool size
//! - Every expression leaves the pool with exactly one more allocation than
//!   frees (the result register), checked with [`RegisterPool::check_balance`]

pub use self::pool::{PoolCheckpoint, PoolSnapshot, RegisterPool, THREE_REGISTERS, TWO_REGISTERS};

mod pool;
