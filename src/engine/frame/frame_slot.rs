use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::engine::flags::{SharedFlags, ThreadFlags};
use crate::engine::wake::RenderWaker;

use super::FrameStats;
use super::slot::FrameState;

/// ### English
/// Most recent frame the producer wants rendered, plus its message and the menu texture.
///
/// Guarded by its own lock, never nested with the mailbox or alpha locks.
///
/// ### 中文
/// 生产者希望绘制的最新一帧，及其附带消息与菜单纹理。
///
/// 由独立的锁保护，从不与 mailbox 锁或 alpha 锁嵌套。
pub(crate) struct FrameSlot {
    state: Mutex<FrameState>,
    /// ### English
    /// Signaled when the render thread takes a frame or the slot is abandoned.
    ///
    /// ### 中文
    /// 渲染线程取走帧或 slot 被放弃时发出信号。
    consumed: Condvar,
    flags: Arc<SharedFlags>,
    waker: RenderWaker,
}

impl FrameSlot {
    pub(crate) fn new(flags: Arc<SharedFlags>, waker: RenderWaker) -> Self {
        Self {
            state: Mutex::new(FrameState::default()),
            consumed: Condvar::new(),
            flags,
            waker,
        }
    }

    /// ### English
    /// Returns a snapshot of the hand-off statistics.
    ///
    /// ### 中文
    /// 返回帧交接统计的快照。
    pub(crate) fn stats(&self) -> FrameStats {
        self.state.lock().stats
    }

    /// ### English
    /// Records that the frame with counter `count` was handed to the driver.
    ///
    /// ### 中文
    /// 记录帧计数为 `count` 的帧已交给驱动。
    pub(crate) fn mark_rendered(&self, count: u64) {
        let mut state = self.state.lock();
        state.stats.rendered += 1;
        state.stats.last_rendered = count;
    }

    /// ### English
    /// Wakes every producer blocked on frame consumption. Called once `ALIVE` is cleared so that
    /// blocking submissions return instead of waiting for a render thread that is gone.
    ///
    /// ### 中文
    /// 唤醒所有等待帧被消费的生产者。在清除 `ALIVE` 后调用，使阻塞提交返回，
    /// 而不是等待已经退出的渲染线程。
    pub(crate) fn abandon(&self) {
        let _state = self.state.lock();
        self.flags.remove(ThreadFlags::FRAME_UPDATED);
        self.consumed.notify_all();
    }
}

mod submit;
mod take;
mod texture;
