//! ### English
//! State shared by the proxy (producer side) and the render thread.
//!
//! ### 中文
//! 代理（生产者侧）与渲染线程共享的状态。

use std::sync::Arc;

use crate::engine::alpha::AlphaMods;
use crate::engine::flags::{SharedFlags, ThreadFlags};
use crate::engine::frame::FrameSlot;
use crate::engine::viewport::ViewportSnapshot;
use crate::engine::wake::RenderWaker;

pub(crate) struct Shared {
    pub(crate) flags: Arc<SharedFlags>,
    pub(crate) frame: FrameSlot,
    pub(crate) alpha: AlphaMods,
    pub(crate) viewport: ViewportSnapshot,
    pub(crate) waker: RenderWaker,
}

impl Shared {
    pub(crate) fn new(waker: RenderWaker) -> Self {
        let flags = Arc::new(SharedFlags::new(ThreadFlags::empty()));
        Self {
            frame: FrameSlot::new(flags.clone(), waker.clone()),
            alpha: AlphaMods::new(flags.clone()),
            viewport: ViewportSnapshot::default(),
            flags,
            waker,
        }
    }

    /// ### English
    /// Marks the render thread dead and releases producers blocked on frame consumption.
    ///
    /// ### 中文
    /// 将渲染线程标记为已退出，并释放阻塞在帧消费上的生产者。
    pub(crate) fn mark_dead(&self) {
        self.flags.remove(ThreadFlags::ALIVE);
        self.frame.abandon();
    }
}
