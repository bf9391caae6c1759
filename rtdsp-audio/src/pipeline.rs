//! The assembled pipeline: transfer engine, buffer pool, frame processor
//! and fault supervisor, driven from the polling loop.
//!
//! ```text
//! ISR:        engine.service_completion(&POOL)   ── sets flags only
//! main loop:  pipeline.poll(&STOP)?              ── supervise, then process
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! static POOL: BufferPool<1024> = BufferPool::new();
//! static STOP: StopSignal = StopSignal::new();
//!
//! let mut pipeline = AudioPipeline::new(&POOL, engine, Gain::new(0.5, 2.0), PipelineConfig::new());
//! pipeline.start()?;
//! pipeline.run_until_stopped(&STOP, |_| cortex_m::asm::wfi())?;
//! ```

use log::{debug, info, warn};

use crate::config::{PipelineConfig, SampleRate};
use crate::diag::{ActivityIndicator, NoIndicator};
use crate::error::PipelineError;
use crate::frame::{BufferPool, Diagnostics};
use crate::processor::{FrameProcessor, PollOutcome, StopSignal};
use crate::supervisor::{Health, Supervisor};
use crate::transfer::{LoopbackEngine, LoopbackError, SampleSink, SampleSource, TransferEngine};
use crate::transform::FrameTransform;

pub struct AudioPipeline<'p, E, T, I, const FRAMES: usize> {
    engine: E,
    processor: FrameProcessor<'p, T, I, FRAMES>,
    supervisor: Supervisor,
    config: PipelineConfig,
    overrun_logged: bool,
}

impl<'p, E, T, const FRAMES: usize> AudioPipeline<'p, E, T, NoIndicator, FRAMES>
where
    E: TransferEngine,
    T: FrameTransform,
{
    pub fn new(pool: &'p BufferPool<FRAMES>, engine: E, transform: T, config: PipelineConfig) -> Self {
        AudioPipeline {
            engine,
            processor: FrameProcessor::new(pool, transform, config.channel_order),
            supervisor: Supervisor::new(config.max_consecutive_restarts),
            config,
            overrun_logged: false,
        }
    }
}

impl<'p, E, T, I, const FRAMES: usize> AudioPipeline<'p, E, T, I, FRAMES>
where
    E: TransferEngine,
    T: FrameTransform,
    I: ActivityIndicator,
{
    /// Replace the processing activity indicator.
    pub fn with_indicator<J: ActivityIndicator>(self, indicator: J) -> AudioPipeline<'p, E, T, J, FRAMES> {
        AudioPipeline {
            engine: self.engine,
            processor: self.processor.with_indicator(indicator),
            supervisor: self.supervisor,
            config: self.config,
            overrun_logged: self.overrun_logged,
        }
    }

    /// Hand the pool to the engine and begin transfers.
    pub fn start(&mut self) -> Result<(), PipelineError<E::Error>> {
        let pool = self.processor.pool();
        info!(
            "starting audio pipeline: {} Hz, {} frames/buffer, deadline {} us",
            self.config.sample_rate.hz(),
            FRAMES,
            self.config.deadline_us::<FRAMES>()
        );
        self.engine.start(&pool.layout()).map_err(PipelineError::Transfer)
    }

    /// One polling-loop iteration: supervise the engine, then process the
    /// ready buffer if there is one.
    pub fn poll(&mut self, stop: &StopSignal) -> Result<PollOutcome, PipelineError<E::Error>> {
        let pool = self.processor.pool();
        if let Health::Restarted { fault, attempt } = self.supervisor.check(&mut self.engine, pool)? {
            debug!("engine restarted after {:?} (attempt {})", fault, attempt);
        }
        if !self.overrun_logged && pool.has_overrun() {
            warn!("overrun latched; ready index {}", pool.ready_index());
            self.overrun_logged = true;
        }
        Ok(self.processor.poll(stop))
    }

    /// Poll until `stop` is requested, calling `on_idle` whenever nothing
    /// was ready, then halt the engine.
    ///
    /// A buffer being processed when the stop arrives is finished first.
    /// Returns the number of buffers processed.
    pub fn run_until_stopped(
        &mut self,
        stop: &StopSignal,
        mut on_idle: impl FnMut(&mut E),
    ) -> Result<u32, PipelineError<E::Error>> {
        let mut processed = 0u32;
        loop {
            match self.poll(stop)? {
                PollOutcome::Processed { .. } => processed = processed.wrapping_add(1),
                PollOutcome::Idle => on_idle(&mut self.engine),
                PollOutcome::Stopped => break,
            }
        }
        debug!("stop requested after {} buffer(s)", processed);
        self.shutdown()?;
        Ok(processed)
    }

    /// Halt transfers.
    pub fn shutdown(&mut self) -> Result<(), PipelineError<E::Error>> {
        self.engine.stop().map_err(PipelineError::Transfer)?;
        info!(
            "audio pipeline stopped: {} frames processed",
            self.processor.pool().frames_processed()
        );
        Ok(())
    }

    /// Clear an escalated transfer fault so polling can resume. Also
    /// re-arms the one-shot overrun warning; the pool's overrun latch itself
    /// is left alone.
    pub fn reset_fault(&mut self) {
        self.supervisor.reset();
        self.overrun_logged = false;
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.processor.pool().diagnostics()
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.config.sample_rate
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn processor(&self) -> &FrameProcessor<'p, T, I, FRAMES> {
        &self.processor
    }

    pub fn transform_mut(&mut self) -> &mut T {
        self.processor.transform_mut()
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

impl<'p, S, K, T, I, const FRAMES: usize> AudioPipeline<'p, LoopbackEngine<S, K>, T, I, FRAMES>
where
    S: SampleSource,
    K: SampleSink,
    T: FrameTransform,
    I: ActivityIndicator,
{
    /// Run one buffer period of the software engine against this pipeline's
    /// pool. A transfer that would reach the buffer being processed is
    /// refused and reported as [`PipelineError::RotationCollision`].
    pub fn run_transfer_period(&mut self) -> Result<(), PipelineError<LoopbackError>> {
        let pool = self.processor.pool();
        self.engine.tick(pool)?;
        Ok(())
    }
}
