//! LIFO register pool
//!
//! Free registers form a stack; the front is the next register handed out.
//! Expression codegen treats the front as "the register currently being
//! computed into" and pops it only when a value must survive the evaluation
//! of a sibling subtree.

use crate::error::BackendError;
use gpc_codegen::Reg;
use log::trace;
use std::collections::VecDeque;

/// Pool members for the three-register configuration, top first
pub const THREE_REGISTERS: [Reg; 3] = [Reg::Rdi, Reg::Rsi, Reg::Rcx];

/// Pool members for the two-register configuration, top first
pub const TWO_REGISTERS: [Reg; 2] = [Reg::Rdi, Reg::Rsi];

/// Saved free-list order, used to park the pool around a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    free: VecDeque<Reg>,
}

/// Counters and order captured before generating one expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCheckpoint {
    allocations: usize,
    frees: usize,
    free: Vec<Reg>,
}

#[derive(Debug, Clone)]
pub struct RegisterPool {
    /// Every register the pool owns, in initial order
    members: Vec<Reg>,

    /// Free registers (front = top)
    free: VecDeque<Reg>,

    allocations: usize,
    frees: usize,
}

impl RegisterPool {
    /// Create a pool of `count` registers (2 or 3)
    pub fn new(count: usize) -> Result<Self, BackendError> {
        match count {
            3 => Ok(Self::with_registers(&THREE_REGISTERS)),
            2 => Ok(Self::with_registers(&TWO_REGISTERS)),
            n => Err(BackendError::InvalidRegister(format!(
                "register pool must hold 2 or 3 registers, not {}",
                n
            ))),
        }
    }

    pub fn with_registers(registers: &[Reg]) -> Self {
        Self {
            members: registers.to_vec(),
            free: registers.iter().copied().collect(),
            allocations: 0,
            frees: 0,
        }
    }

    /// Total number of registers owned by the pool
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.free.len() == self.members.len()
    }

    pub fn is_member(&self, reg: Reg) -> bool {
        self.members.contains(&reg)
    }

    /// Registers currently handed out, in member order
    pub fn allocated(&self) -> Vec<Reg> {
        self.members
            .iter()
            .copied()
            .filter(|r| !self.free.contains(r))
            .collect()
    }

    /// Free registers, top first
    pub fn free_order(&self) -> Vec<Reg> {
        self.free.iter().copied().collect()
    }

    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn frees(&self) -> usize {
        self.frees
    }

    /// Remove and return the top register
    pub fn allocate_any(&mut self) -> Result<Reg, BackendError> {
        let reg = self
            .free
            .pop_front()
            .ok_or(BackendError::RegisterExhausted { line: None })?;
        self.allocations += 1;
        trace!("pool: allocate {} ({} left)", reg, self.free.len());
        Ok(reg)
    }

    /// Remove a specific register, wherever it sits in the free stack
    pub fn allocate_named(&mut self, reg: Reg) -> Result<Reg, BackendError> {
        if !self.is_member(reg) {
            return Err(BackendError::InvalidRegister(format!(
                "{} is not a pool register",
                reg
            )));
        }
        let index = self
            .free
            .iter()
            .position(|&r| r == reg)
            .ok_or(BackendError::RegisterExhausted { line: None })?;
        self.free.remove(index);
        self.allocations += 1;
        trace!("pool: allocate named {} ({} left)", reg, self.free.len());
        Ok(reg)
    }

    /// Push `reg` back on top of the free stack
    pub fn free(&mut self, reg: Reg) -> Result<(), BackendError> {
        if !self.is_member(reg) {
            return Err(BackendError::InvalidRegister(format!(
                "{} is not a pool register",
                reg
            )));
        }
        if self.free.contains(&reg) {
            return Err(BackendError::InvalidRegister(format!("{} freed twice", reg)));
        }
        self.free.push_front(reg);
        self.frees += 1;
        trace!("pool: free {} ({} left)", reg, self.free.len());
        Ok(())
    }

    /// Exchange the two topmost free registers
    pub fn swap_top_two(&mut self) -> Result<(), BackendError> {
        if self.free.len() < 2 {
            return Err(BackendError::RegisterExhausted { line: None });
        }
        self.free.swap(0, 1);
        trace!("pool: swap -> {:?}", self.free);
        Ok(())
    }

    /// The top register, without removing it
    pub fn peek(&self) -> Result<Reg, BackendError> {
        self.free
            .front()
            .copied()
            .ok_or(BackendError::RegisterExhausted { line: None })
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            free: self.free.clone(),
        }
    }

    /// Put every member back in the free stack in initial order
    ///
    /// Counters are left alone; callers pair this with `restore`.
    pub fn reset(&mut self) {
        self.free = self.members.iter().copied().collect();
    }

    pub fn restore(&mut self, snapshot: PoolSnapshot) {
        self.free = snapshot.free;
    }

    pub fn checkpoint(&self) -> PoolCheckpoint {
        PoolCheckpoint {
            allocations: self.allocations,
            frees: self.frees,
            free: self.free_order(),
        }
    }

    /// Check that exactly `held` more allocations than frees happened since
    /// `checkpoint`. With nothing held, the free order must also match.
    pub fn check_balance(&self, checkpoint: &PoolCheckpoint, held: usize) -> Result<(), BackendError> {
        let allocations = self.allocations - checkpoint.allocations;
        let frees = self.frees - checkpoint.frees;
        let order_ok = held > 0 || self.free_order() == checkpoint.free;
        if allocations != frees + held || !order_ok {
            return Err(BackendError::RegisterImbalance {
                allocations,
                frees,
                line: None,
            });
        }
        Ok(())
    }
}
