use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::constants::{CHANNELS, NUM_BUFFERS};
use crate::transfer::{CompletionHandler, TransferLayout};

use super::buffer::SampleBuffer;

/// Sentinel for "no buffer claimed by the processor".
const NO_CLAIM: u8 = u8::MAX;

/// Role a pool slot currently plays in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Receive side is writing into it.
    Filling,
    /// Transmit side is reading out of it.
    Draining,
    /// Completed and waiting for the processor.
    Ready,
    /// Claimed by the processor.
    Processing,
    /// Already processed, waiting to become the next drain target.
    Idle,
}

/// A software transfer tried to borrow a buffer that is already borrowed:
/// held by the processor, or by a transfer still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCollision {
    pub index: usize,
}

/// Point-in-time view of the pool state for an external monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub ready: bool,
    pub overrun: bool,
    pub ready_index: usize,
    pub completions: u32,
    pub frames_processed: u32,
}

/// Fixed pool of three transfer buffers plus the flags that hand them
/// between interrupt context and the polling loop.
///
/// The pool is shared by reference (typically from a `static`). The buffer
/// memory is partitioned by the rotation rather than by a lock: the transfer
/// engine only ever touches the fill and drain slots, and the processor only
/// the ready slot.
///
/// Flag writes from interrupt context use `Release`; the polling side reads
/// with `Acquire`, so buffer contents written before a completion are
/// visible once the ready flag is observed. Ownership of a slot is taken
/// with compare-and-swap, so a claim and a transfer can never both win the
/// same slot even when one preempts the other.
pub struct BufferPool<const FRAMES: usize> {
    storage: [UnsafeCell<SampleBuffer<FRAMES>>; NUM_BUFFERS],
    /// Buffer most recently completed by the receive side.
    ready_index: AtomicU8,
    /// Set by the completion handler, cleared when the processor releases.
    buffer_ready: AtomicBool,
    /// Sticky: a completion arrived while the previous one was unprocessed.
    over_run: AtomicBool,
    /// Index held by the processor, or [`NO_CLAIM`].
    claimed: AtomicU8,
    /// Set while the transfer side borrows the fill and drain slots.
    in_transfer: AtomicBool,
    completions: AtomicU32,
    frames_processed: AtomicU32,
}

// SAFETY: All cross-context state is atomic. The UnsafeCell storage is only
// dereferenced through slot indices owned by exactly one role at a time: the
// processor through a `ReadyBuffer` (at most one outstanding, tracked by
// `claimed`), the transfer side through `with_transfer_buffers` (at most one
// outstanding, tracked by `in_transfer`). Each side publishes its own flag
// before reading the other's, so they cannot both proceed on one slot.
unsafe impl<const FRAMES: usize> Sync for BufferPool<FRAMES> {}

impl<const FRAMES: usize> BufferPool<FRAMES> {
    /// Create a pool of silent buffers.
    ///
    /// Initial rotation: buffer 0 is available (not ready), buffer 1 is being
    /// filled and buffer 2 is being drained.
    pub const fn new() -> Self {
        assert!(FRAMES > 0, "buffers must hold at least one frame");

        BufferPool {
            storage: [
                UnsafeCell::new(SampleBuffer::zeroed()),
                UnsafeCell::new(SampleBuffer::zeroed()),
                UnsafeCell::new(SampleBuffer::zeroed()),
            ],
            ready_index: AtomicU8::new(0),
            buffer_ready: AtomicBool::new(false),
            over_run: AtomicBool::new(false),
            claimed: AtomicU8::new(NO_CLAIM),
            in_transfer: AtomicBool::new(false),
            completions: AtomicU32::new(0),
            frames_processed: AtomicU32::new(0),
        }
    }

    /// Interrupt-context handoff for one completed buffer fill.
    ///
    /// Advances the ready index, latches the overrun flag if the previous
    /// buffer was never released, then marks the new buffer ready. O(1), no
    /// blocking, never calls into the processor.
    pub fn on_transfer_complete(&self) {
        let next = (self.ready_index.load(Ordering::Relaxed) as usize + 1) % NUM_BUFFERS;
        self.ready_index.store(next as u8, Ordering::Release);

        if self.buffer_ready.load(Ordering::Acquire) {
            self.over_run.store(true, Ordering::Release);
        }
        self.buffer_ready.store(true, Ordering::Release);

        // Only this handler writes the counter; it is not reentrant.
        let n = self.completions.load(Ordering::Relaxed);
        self.completions.store(n.wrapping_add(1), Ordering::Release);
    }

    /// Whether a completed buffer is waiting for the processor.
    pub fn is_ready(&self) -> bool {
        self.buffer_ready.load(Ordering::Acquire)
    }

    /// Whether a deadline has been missed since the last
    /// [`clear_overrun`](Self::clear_overrun).
    pub fn has_overrun(&self) -> bool {
        self.over_run.load(Ordering::Acquire)
    }

    /// Reset the overrun latch. The pipeline itself never calls this; it is
    /// left to a supervisory collaborator.
    pub fn clear_overrun(&self) {
        self.over_run.store(false, Ordering::Release);
    }

    /// Index of the buffer most recently completed.
    pub fn ready_index(&self) -> usize {
        self.ready_index.load(Ordering::Acquire) as usize
    }

    /// Index the receive side is currently writing.
    pub fn fill_index(&self) -> usize {
        (self.ready_index() + 1) % NUM_BUFFERS
    }

    /// Index the transmit side is currently reading.
    pub fn drain_index(&self) -> usize {
        (self.ready_index() + 2) % NUM_BUFFERS
    }

    /// Index held by the processor, if any.
    pub fn claimed_index(&self) -> Option<usize> {
        match self.claimed.load(Ordering::Acquire) {
            NO_CLAIM => None,
            i => Some(i as usize),
        }
    }

    /// Role of slot `index` in the current rotation.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_BUFFERS`.
    pub fn role(&self, index: usize) -> BufferRole {
        assert!(index < NUM_BUFFERS, "buffer index out of range");
        if self.claimed_index() == Some(index) {
            BufferRole::Processing
        } else if index == self.fill_index() {
            BufferRole::Filling
        } else if index == self.drain_index() {
            BufferRole::Draining
        } else if self.is_ready() {
            BufferRole::Ready
        } else {
            BufferRole::Idle
        }
    }

    /// Total completion events since construction (wrapping).
    pub fn completions(&self) -> u32 {
        self.completions.load(Ordering::Acquire)
    }

    /// Total stereo frames released by the processor (wrapping).
    pub fn frames_processed(&self) -> u32 {
        self.frames_processed.load(Ordering::Acquire)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            ready: self.is_ready(),
            overrun: self.has_overrun(),
            ready_index: self.ready_index(),
            completions: self.completions(),
            frames_processed: self.frames_processed(),
        }
    }

    /// Take ownership of the ready buffer.
    ///
    /// Returns `None` if nothing is ready, a previous claim has not been
    /// released, or the transfer side is inside
    /// [`with_transfer_buffers`](Self::with_transfer_buffers). The ready flag
    /// stays set until the returned guard drops.
    pub fn claim_ready(&self) -> Option<ReadyBuffer<'_, FRAMES>> {
        if !self.is_ready() {
            return None;
        }
        let index = self.ready_index();
        if self
            .claimed
            .compare_exchange(NO_CLAIM, index as u8, Ordering::SeqCst, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        // Back out if a transfer holds the slots or a completion moved the
        // rotation after `index` was read.
        if self.in_transfer.load(Ordering::SeqCst) || self.ready_index() != index {
            self.claimed.store(NO_CLAIM, Ordering::Release);
            return None;
        }
        Some(ReadyBuffer { pool: self, index })
    }

    /// Give the transfer side access to the current fill (mutable) and drain
    /// (shared) buffers.
    ///
    /// For software transfer engines. Hardware engines program the addresses
    /// from [`layout`](Self::layout) instead.
    ///
    /// Fails without touching memory if either slot is held by the
    /// processor, which can only happen when the processor has fallen at
    /// least one completion behind, or if called from inside `f`. While `f`
    /// runs, [`claim_ready`](Self::claim_ready) refuses.
    pub fn with_transfer_buffers<R>(
        &self,
        f: impl FnOnce(&mut SampleBuffer<FRAMES>, &SampleBuffer<FRAMES>) -> R,
    ) -> Result<R, RotationCollision> {
        if self
            .in_transfer
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Acquire)
            .is_err()
        {
            return Err(RotationCollision { index: self.fill_index() });
        }
        let _guard = TransferGuard(&self.in_transfer);

        let fill = self.fill_index();
        let drain = self.drain_index();

        let held = self.claimed.load(Ordering::SeqCst);
        if held != NO_CLAIM && (held as usize == fill || held as usize == drain) {
            return Err(RotationCollision { index: held as usize });
        }
        // SAFETY: fill != drain, neither is claimed by the processor, and
        // `in_transfer` keeps new claims and nested transfers out until the
        // guard drops.
        let (fill_buf, drain_buf) = unsafe { (&mut *self.data_ptr(fill), &*self.data_ptr(drain)) };
        Ok(f(fill_buf, drain_buf))
    }

    /// Addresses and geometry for programming a hardware transfer engine.
    pub fn layout(&self) -> TransferLayout {
        TransferLayout {
            buffers: [
                self.storage[0].get() as *mut u32,
                self.storage[1].get() as *mut u32,
                self.storage[2].get() as *mut u32,
            ],
            frames: FRAMES,
            channels: CHANNELS,
            first_fill: self.fill_index(),
            first_drain: self.drain_index(),
        }
    }

    /// Silence every buffer. Requires exclusive access, so only possible
    /// before the pool is shared with a transfer engine.
    pub fn zero_all(&mut self) {
        for cell in self.storage.iter_mut() {
            cell.get_mut().clear();
        }
    }

    /// Exclusive access to slot `index` while the pool is not shared.
    pub fn buffer_mut(&mut self, index: usize) -> &mut SampleBuffer<FRAMES> {
        self.storage[index].get_mut()
    }

    /// Raw pointer to slot `index`.
    ///
    /// # Safety
    /// The caller must hold the role that owns `index` for as long as the
    /// pointer is used.
    pub unsafe fn data_ptr(&self, index: usize) -> *mut SampleBuffer<FRAMES> {
        self.storage[index].get()
    }

    fn release(&self, index: usize) {
        debug_assert_eq!(self.claimed_index(), Some(index));
        let n = self.frames_processed.load(Ordering::Relaxed);
        self.frames_processed
            .store(n.wrapping_add(FRAMES as u32), Ordering::Release);
        self.claimed.store(NO_CLAIM, Ordering::Release);
        self.buffer_ready.store(false, Ordering::Release);
    }
}

impl<const FRAMES: usize> Default for BufferPool<FRAMES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FRAMES: usize> CompletionHandler for BufferPool<FRAMES> {
    fn on_transfer_complete(&self) {
        BufferPool::on_transfer_complete(self);
    }
}

/// Clears the in-transfer flag when transfer access ends.
struct TransferGuard<'a>(&'a AtomicBool);

impl Drop for TransferGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Exclusive handle to the buffer the processor is working on.
///
/// Dereferences to the [`SampleBuffer`]. Dropping it (or calling
/// [`release`](Self::release)) hands the buffer back to the rotation, counts
/// its frames as processed and clears the ready flag.
pub struct ReadyBuffer<'p, const FRAMES: usize> {
    pool: &'p BufferPool<FRAMES>,
    index: usize,
}

impl<const FRAMES: usize> ReadyBuffer<'_, FRAMES> {
    /// Pool slot being processed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hand the buffer back.
    pub fn release(self) {
        drop(self);
    }
}

impl<const FRAMES: usize> Deref for ReadyBuffer<'_, FRAMES> {
    type Target = SampleBuffer<FRAMES>;

    fn deref(&self) -> &Self::Target {
        // SAFETY: The slot is claimed by this guard, and there is at most one guard.
        unsafe { &*self.pool.data_ptr(self.index) }
    }
}

impl<const FRAMES: usize> DerefMut for ReadyBuffer<'_, FRAMES> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: The slot is claimed by this guard, and there is at most one guard.
        unsafe { &mut *self.pool.data_ptr(self.index) }
    }
}

impl<const FRAMES: usize> Drop for ReadyBuffer<'_, FRAMES> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}
