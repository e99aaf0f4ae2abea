//! ### English
//! Viewport snapshot reported by the render thread.
//!
//! `vp` is refreshed by the render thread after every command and draw. `read_vp` is the value last
//! reported to the caller through `viewport_info`; the render thread refuses a viewport read-back if
//! the live viewport no longer matches it.
//!
//! ### 中文
//! 渲染线程报告的视口快照。
//!
//! `vp` 由渲染线程在每个命令与每次绘制之后刷新。`read_vp` 是最近一次通过 `viewport_info` 报告给调用方的值；
//! 若实时视口已与其不一致，渲染线程会拒绝视口回读。

use parking_lot::Mutex;

use crate::engine::driver::Viewport;

#[derive(Default)]
struct ViewportState {
    vp: Viewport,
    read_vp: Viewport,
}

#[derive(Default)]
pub(crate) struct ViewportSnapshot {
    state: Mutex<ViewportState>,
}

impl ViewportSnapshot {
    pub(crate) fn store(&self, vp: Viewport) {
        self.state.lock().vp = vp;
    }

    /// ### English
    /// Returns the current snapshot and records it as the one the caller has seen.
    ///
    /// ### 中文
    /// 返回当前快照，并将其记录为调用方已看到的值。
    pub(crate) fn report(&self) -> Viewport {
        let mut state = self.state.lock();
        state.read_vp = state.vp;
        state.read_vp
    }

    pub(crate) fn last_read(&self) -> Viewport {
        self.state.lock().read_vp
    }
}
