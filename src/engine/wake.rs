//! ### English
//! Coalesced wakeups for the render thread.
//!
//! A capacity-1 channel: any number of wakes between two render-thread parks collapse into one.
//!
//! ### 中文
//! 渲染线程的合并唤醒。
//!
//! 容量为 1 的 channel：渲染线程两次 park 之间的任意多次唤醒会合并为一次。

use crossbeam_channel as channel;

#[derive(Clone)]
pub(crate) struct RenderWaker {
    tx: channel::Sender<()>,
}

impl RenderWaker {
    /// ### English
    /// Wakes the render thread if it is parked (or makes its next park return immediately).
    ///
    /// ### 中文
    /// 若渲染线程处于 park 状态则唤醒它（否则使其下一次 park 立即返回）。
    #[inline]
    pub(crate) fn wake(&self) {
        let _ = self.tx.try_send(());
    }
}

pub(crate) fn wake_channel() -> (RenderWaker, channel::Receiver<()>) {
    let (tx, rx) = channel::bounded(1);
    (RenderWaker { tx }, rx)
}
