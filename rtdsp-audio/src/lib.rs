//! # rtdsp-audio
//!
//! A `no_std`, zero-allocation, frame-based real-time audio pipeline built
//! around a triple-buffered DMA transfer scheme. A transfer engine fills one
//! buffer from the codec while draining another; on each completion an
//! interrupt publishes the finished buffer, and a polling loop transforms it
//! in place before the rotation hands it back to the transmit side.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`frame`] | Three-buffer pool, ready/overrun flags, interleave format |
//! | Transfer | [`transfer`] | `TransferEngine` / `CompletionHandler` traits, software loopback |
//! | Trait | [`transform`] | `FrameTransform` trait |
//! | DSP | [`dsp`] | Gain, FIR, sum/difference, AM, reverb, tone (feature-gated) |
//! | Processing | [`processor`] | `process_if_ready`, cooperative stop |
//! | Recovery | [`supervisor`] | Bounded transfer restarts |
//! | Assembly | [`pipeline`] | `AudioPipeline` polling loop |
//! | Monitoring | [`diag`] | Timing indicator pin, overrun LED |
//!
//! ## Buffer lifecycle
//!
//! ```text
//! Idle ──► Filling (DMA) ──► Ready (flag set) ──► Processing ──► Idle
//!                                 │
//!                  completion while still Ready ──► overrun latched
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use rtdsp_audio::config::PipelineConfig;
//! use rtdsp_audio::dsp::Gain;
//! use rtdsp_audio::frame::BufferPool;
//! use rtdsp_audio::pipeline::AudioPipeline;
//! use rtdsp_audio::processor::StopSignal;
//! use rtdsp_audio::transfer::TransferEngine;
//!
//! static POOL: BufferPool<1024> = BufferPool::new();
//! static STOP: StopSignal = StopSignal::new();
//!
//! let mut pipeline = AudioPipeline::new(&POOL, edma, Gain::new(0.5, 2.0), PipelineConfig::new());
//! pipeline.start()?;
//!
//! // In the transfer-complete ISR:
//! edma_irq.service_completion(&POOL);
//!
//! // Main loop:
//! pipeline.run_until_stopped(&STOP, |_| cortex_m::asm::wfi())?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `dsp` | yes | Gain, FIR and mixing transforms |
//! | `gpio` | yes | `embedded-hal` pin indicators |
//!
//! ## Audio parameters
//!
//! - **Buffers:** 3 ([`constants::NUM_BUFFERS`])
//! - **Buffer length:** `FRAMES` stereo frames, 1024 by default
//!   ([`constants::DEFAULT_BUFFER_FRAMES`])
//! - **Transfer format:** one `u32` per frame, two `i16` channels
//! - **Processing format:** `f32`, narrowed with round-to-nearest and saturation

#![no_std]

pub mod constants;
pub mod config;
pub mod error;
pub mod frame;
pub mod transfer;
pub mod transform;
pub mod processor;
pub mod supervisor;
pub mod pipeline;
pub mod diag;

#[cfg(feature = "dsp")]
pub mod dsp;

#[cfg(all(test, feature = "dsp"))]
mod integration_tests;
