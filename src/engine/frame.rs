//! ### English
//! Double-buffered frame hand-off between the producer thread and the render thread.
//!
//! The producer copies each submitted frame into the slot's front buffer under the slot lock; the
//! render thread swaps that buffer with its own back buffer when it takes the frame, so the lock is
//! never held across a driver draw. Buffers only grow.
//!
//! ### 中文
//! 生产者线程与渲染线程之间的双缓冲帧交接。
//!
//! 生产者在 slot 锁下把每个提交的帧复制到 front buffer；渲染线程取帧时把该 buffer 与自己的
//! back buffer 交换，因此驱动绘制期间从不持有该锁。缓冲区只增不减。
mod buffer;
mod frame_slot;
mod slot;

pub(crate) use buffer::{BackBuffer, TextureBuffer};
pub(crate) use frame_slot::FrameSlot;

/// ### English
/// Frame hand-off statistics.
///
/// `hits + misses == frames` always holds.
///
/// ### 中文
/// 帧交接统计。
///
/// 始终满足 `hits + misses == frames`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// ### English
    /// Accepted submissions (the frame counter).
    ///
    /// ### 中文
    /// 已接受的提交数（即帧计数）。
    pub frames: u64,
    /// ### English
    /// Submissions that found the previous frame consumed.
    ///
    /// ### 中文
    /// 提交时上一帧已被消费的次数。
    pub hits: u64,
    /// ### English
    /// Submissions that overwrote an unconsumed frame.
    ///
    /// ### 中文
    /// 覆盖了未被消费帧的提交次数。
    pub misses: u64,
    /// ### English
    /// Frames handed to the driver.
    ///
    /// ### 中文
    /// 已交给驱动绘制的帧数。
    pub rendered: u64,
    /// ### English
    /// Frame counter of the most recently rendered frame (`0` = none yet).
    ///
    /// ### 中文
    /// 最近一次绘制的帧的帧计数（`0` = 尚未绘制）。
    pub last_rendered: u64,
}
