//! Transfer fault recovery.
//!
//! When the engine reports a fault the supervisor stops and restarts it
//! from the polling loop. Restarts are counted until the engine completes
//! at least one buffer again; once `max_consecutive_restarts` restarts in a
//! row have not brought it back, the fault is escalated and the supervisor
//! latches a halted state instead of retrying forever.

use log::{debug, error, warn};

use crate::error::PipelineError;
use crate::frame::BufferPool;
use crate::transfer::{FaultKind, TransferEngine, TransferStatus};

/// What a supervisory check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Running,
    Stopped,
    /// A fault was seen and the engine was restarted.
    Restarted { fault: FaultKind, attempt: u8 },
}

pub struct Supervisor {
    max_consecutive_restarts: u8,
    consecutive: u8,
    /// Completion count when the last restart was issued.
    completions_at_restart: u32,
    /// Fault whose restart has not succeeded yet.
    pending: Option<FaultKind>,
    halted: bool,
}

impl Supervisor {
    pub const fn new(max_consecutive_restarts: u8) -> Self {
        Supervisor {
            max_consecutive_restarts,
            consecutive: 0,
            completions_at_restart: 0,
            pending: None,
            halted: false,
        }
    }

    /// Inspect the engine and restart it if it has faulted.
    ///
    /// Returns [`PipelineError::TransferHalted`] once the restart budget is
    /// spent, and on every call after that until [`reset`](Self::reset).
    pub fn check<E: TransferEngine, const FRAMES: usize>(
        &mut self,
        engine: &mut E,
        pool: &BufferPool<FRAMES>,
    ) -> Result<Health, PipelineError<E::Error>> {
        if self.halted {
            return Err(PipelineError::TransferHalted { restarts: self.consecutive });
        }

        let fault = match (engine.status(), self.pending) {
            (TransferStatus::Fault(kind), _) => kind,
            (TransferStatus::Stopped, Some(kind)) => kind,
            (TransferStatus::Stopped, None) => return Ok(Health::Stopped),
            (TransferStatus::Running, _) => {
                if self.consecutive > 0 && pool.completions() != self.completions_at_restart {
                    debug!("transfer recovered after {} restart(s)", self.consecutive);
                    self.consecutive = 0;
                }
                return Ok(Health::Running);
            }
        };

        if self.consecutive >= self.max_consecutive_restarts {
            self.halted = true;
            error!(
                "transfer fault {:?} persists after {} restart(s), halting",
                fault, self.consecutive
            );
            return Err(PipelineError::TransferHalted { restarts: self.consecutive });
        }

        self.consecutive += 1;
        self.pending = Some(fault);
        self.completions_at_restart = pool.completions();
        warn!(
            "transfer fault {:?}, restarting (attempt {}/{})",
            fault, self.consecutive, self.max_consecutive_restarts
        );

        engine.stop().map_err(PipelineError::Transfer)?;
        engine.start(&pool.layout()).map_err(PipelineError::Transfer)?;
        self.pending = None;

        Ok(Health::Restarted { fault, attempt: self.consecutive })
    }

    /// Clear the halted latch and the restart count.
    pub fn reset(&mut self) {
        self.consecutive = 0;
        self.pending = None;
        self.halted = false;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn consecutive_restarts(&self) -> u8 {
        self.consecutive
    }

    pub fn max_consecutive_restarts(&self) -> u8 {
        self.max_consecutive_restarts
    }
}
