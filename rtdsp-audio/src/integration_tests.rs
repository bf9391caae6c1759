//! End-to-end tests of the pipeline in software.
//!
//! The loopback engine stands in for the DMA controller:
//!
//! ```text
//! SampleSource → fill buffer → completion → FrameProcessor (in place)
//!     → rotation → drain buffer → FrameRecorder
//! ```
//!
//! With three buffers an input block reaches the output two buffer periods
//! after it was captured.

#[cfg(test)]
mod tests {
    use crate::config::{ChannelOrder, PipelineConfig};
    use crate::dsp::{Gain, StereoFir};
    use crate::error::PipelineError;
    use crate::frame::BufferPool;
    use crate::pipeline::AudioPipeline;
    use crate::processor::{PollOutcome, StopSignal};
    use crate::transfer::{
        ConstantSource, FaultKind, FrameRecorder, LoopbackEngine, SampleSource, TransferEngine,
        TransferStatus,
    };
    use crate::transform::Passthrough;

    /// Counts up from `next` on the left and down on the right.
    struct Ramp {
        next: i16,
    }

    impl SampleSource for Ramp {
        fn next_frame(&mut self) -> (i16, i16) {
            let v = self.next;
            self.next = self.next.wrapping_add(1);
            (v, v.wrapping_neg())
        }
    }

    /// One frame at `amplitude` on both channels, then silence.
    struct Impulse {
        amplitude: i16,
        sent: bool,
    }

    impl SampleSource for Impulse {
        fn next_frame(&mut self) -> (i16, i16) {
            if self.sent {
                (0, 0)
            } else {
                self.sent = true;
                (self.amplitude, self.amplitude)
            }
        }
    }

    fn loopback<S: SampleSource, const N: usize>(
        source: S,
        order: ChannelOrder,
    ) -> LoopbackEngine<S, FrameRecorder<N>> {
        LoopbackEngine::new(source, FrameRecorder::new(), order)
    }

    // ---------------------------------------------------------------
    // Gain example: 4 frames, left x0.5, right x2.0
    // ---------------------------------------------------------------
    #[test]
    fn gain_example_scenario() {
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let engine = loopback::<_, 16>(ConstantSource { left: 100, right: 100 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Gain::new(0.5, 2.0), PipelineConfig::new());
        pipeline.start().unwrap();

        pipeline.run_transfer_period().unwrap();
        assert!(pool.is_ready());
        let ready = pool.ready_index();

        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Processed { index: ready }));
        assert!(!pool.is_ready());
        assert!(!pool.has_overrun());

        let buf = unsafe { &*pool.data_ptr(ready) };
        for i in 0..4 {
            assert_eq!(buf.frame(i, ChannelOrder::LeftFirst), (50, 200));
        }
    }

    // ---------------------------------------------------------------
    // Processed data reaches the output after two buffer periods
    // ---------------------------------------------------------------
    #[test]
    fn loopback_latency_is_two_buffers() {
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let engine = loopback::<_, 32>(Ramp { next: 1 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Passthrough, PipelineConfig::new());
        pipeline.start().unwrap();

        for _ in 0..5 {
            pipeline.run_transfer_period().unwrap();
            assert!(matches!(pipeline.poll(&stop), Ok(PollOutcome::Processed { .. })));
        }

        let out = pipeline.engine().sink().frames();
        assert_eq!(out.len(), 20);
        assert!(out[..8].iter().all(|&f| f == (0, 0)), "first two periods are silence");
        for (i, &(l, r)) in out[8..].iter().enumerate() {
            let v = i as i16 + 1;
            assert_eq!((l, r), (v, -v), "frame {i}");
        }
        assert_eq!(pool.frames_processed(), 20);
    }

    // ---------------------------------------------------------------
    // Channel order is honoured end to end
    // ---------------------------------------------------------------
    #[test]
    fn right_first_order_keeps_channels_apart() {
        let pool = BufferPool::<2>::new();
        let stop = StopSignal::new();
        let config = PipelineConfig::new().with_channel_order(ChannelOrder::RightFirst);
        let engine = loopback::<_, 8>(ConstantSource { left: 1000, right: 10 }, ChannelOrder::RightFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Gain::new(0.0, 3.0), config);
        pipeline.start().unwrap();

        for _ in 0..3 {
            pipeline.run_transfer_period().unwrap();
            pipeline.poll(&stop).unwrap();
        }
        let out = pipeline.engine().sink().frames();
        assert_eq!(&out[4..6], &[(0, 30), (0, 30)]);
    }

    // ---------------------------------------------------------------
    // FIR impulse response through the whole path
    // ---------------------------------------------------------------
    #[test]
    fn fir_impulse_response_reaches_output() {
        static TAPS: [f32; 3] = [0.5, 0.25, -0.125];
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let engine = loopback::<_, 16>(Impulse { amplitude: 1000, sent: false }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, StereoFir::new(&TAPS), PipelineConfig::new());
        pipeline.start().unwrap();

        for _ in 0..4 {
            pipeline.run_transfer_period().unwrap();
            pipeline.poll(&stop).unwrap();
        }
        let out = pipeline.engine().sink().frames();
        assert_eq!(&out[8..12], &[(500, 500), (250, 250), (-125, -125), (0, 0)]);
    }

    // ---------------------------------------------------------------
    // A slow consumer latches the overrun and processes the newest buffer
    // ---------------------------------------------------------------
    #[test]
    fn missed_deadline_latches_overrun() {
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let engine = loopback::<_, 16>(Ramp { next: 0 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Passthrough, PipelineConfig::new());
        pipeline.start().unwrap();

        pipeline.run_transfer_period().unwrap();
        pipeline.run_transfer_period().unwrap();
        assert!(pool.has_overrun());

        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Processed { index: 2 }));
        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Idle));

        let diag = pipeline.diagnostics();
        assert!(diag.overrun, "latch survives processing");
        assert_eq!(diag.completions, 2);
        assert_eq!(diag.frames_processed, 4);

        // Processing keeps going with the latch set.
        pipeline.run_transfer_period().unwrap();
        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Processed { index: 0 }));

        pool.clear_overrun();
        assert!(!pipeline.diagnostics().overrun);
    }

    // ---------------------------------------------------------------
    // A transfer reaching a held buffer is refused and reported
    // ---------------------------------------------------------------
    #[test]
    fn collision_with_held_buffer_is_reported() {
        let pool = BufferPool::<4>::new();
        let engine = loopback::<_, 16>(ConstantSource { left: 1, right: 1 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Passthrough, PipelineConfig::new());
        pipeline.start().unwrap();

        pipeline.run_transfer_period().unwrap();
        let held = pool.claim_ready().unwrap();
        assert_eq!(held.index(), 1);

        pipeline.run_transfer_period().unwrap();
        assert_eq!(
            pipeline.run_transfer_period(),
            Err(PipelineError::RotationCollision { index: 1 })
        );
        assert_eq!(pool.completions(), 2, "refused transfer raises no completion");
        assert_eq!(pipeline.engine().sink().len(), 8);

        drop(held);
        assert!(pipeline.run_transfer_period().is_ok());
        assert_eq!(pool.completions(), 3);
    }

    // ---------------------------------------------------------------
    // Transfer faults: restart, then escalate
    // ---------------------------------------------------------------
    #[test]
    fn transfer_fault_recovers_then_escalates() {
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let config = PipelineConfig::new().with_max_consecutive_restarts(2);
        let engine = loopback::<_, 0>(ConstantSource { left: 0, right: 0 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Passthrough, config);
        pipeline.start().unwrap();

        pipeline.engine_mut().inject_fault(FaultKind::ReceiverOverrun);
        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Idle));
        assert_eq!(pipeline.engine().status(), TransferStatus::Running);

        // Recovery confirmed by a completed buffer.
        pipeline.run_transfer_period().unwrap();
        assert!(matches!(pipeline.poll(&stop), Ok(PollOutcome::Processed { .. })));
        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Idle));
        assert_eq!(pipeline.supervisor().consecutive_restarts(), 0);

        // A fault that never clears.
        for _ in 0..2 {
            pipeline.engine_mut().inject_fault(FaultKind::ClockLoss);
            assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Idle));
        }
        pipeline.engine_mut().inject_fault(FaultKind::ClockLoss);
        assert_eq!(pipeline.poll(&stop), Err(PipelineError::TransferHalted { restarts: 2 }));
        assert_eq!(pipeline.poll(&stop), Err(PipelineError::TransferHalted { restarts: 2 }));

        pipeline.reset_fault();
        assert_eq!(pipeline.poll(&stop), Ok(PollOutcome::Idle));
        assert_eq!(pipeline.engine().status(), TransferStatus::Running);
    }

    // ---------------------------------------------------------------
    // Cooperative stop
    // ---------------------------------------------------------------
    #[test]
    fn run_until_stopped_halts_engine() {
        let pool = BufferPool::<4>::new();
        let stop = StopSignal::new();
        let engine = loopback::<_, 64>(Ramp { next: 0 }, ChannelOrder::LeftFirst);
        let mut pipeline = AudioPipeline::new(&pool, engine, Gain::unity(), PipelineConfig::new());
        pipeline.start().unwrap();

        let processed = pipeline
            .run_until_stopped(&stop, |engine| {
                engine.tick(&pool).unwrap();
                if pool.completions() == 5 {
                    stop.request_stop();
                }
            })
            .unwrap();

        assert_eq!(processed, 4);
        assert_eq!(pipeline.engine().status(), TransferStatus::Stopped);
        assert!(pool.is_ready(), "buffer completed after the stop stays unclaimed");
        assert_eq!(pool.frames_processed(), 16);
    }

    #[test]
    fn start_failure_is_reported() {
        let pool = BufferPool::<4>::new();
        let mut engine = loopback::<_, 0>(ConstantSource { left: 0, right: 0 }, ChannelOrder::LeftFirst);
        engine.refuse_starts(1);
        let mut pipeline = AudioPipeline::new(&pool, engine, Passthrough, PipelineConfig::new());
        assert!(matches!(pipeline.start(), Err(PipelineError::Transfer(_))));
        assert!(pipeline.start().is_ok());
        assert_eq!(pipeline.sample_rate().hz(), 48_000.0);
    }
}
