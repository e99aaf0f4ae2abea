//! ### English
//! Overlay alpha-modulation table.
//!
//! Written by the producer without going through the mailbox (alpha is changed every frame while
//! overlays fade) and picked up by the render thread before each draw.
//!
//! ### 中文
//! overlay 的 alpha 调制表。
//!
//! 生产者直接写入而不经过 mailbox（overlay 渐变时每帧都会修改 alpha），
//! 渲染线程在每次绘制前读取。

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::flags::{SharedFlags, ThreadFlags};

pub(crate) struct AlphaMods {
    mods: Mutex<Vec<f32>>,
    flags: Arc<SharedFlags>,
}

impl AlphaMods {
    pub(crate) fn new(flags: Arc<SharedFlags>) -> Self {
        Self {
            mods: Mutex::new(Vec::new()),
            flags,
        }
    }

    /// ### English
    /// Resizes the table to `count` overlays, all fully opaque. Used when an overlay set is loaded.
    ///
    /// ### 中文
    /// 将表大小调整为 `count` 个 overlay，全部完全不透明。加载 overlay 集合时使用。
    pub(crate) fn reset(&self, count: usize) {
        let mut mods = self.mods.lock();
        mods.clear();
        mods.resize(count, 1.0);
    }

    /// ### English
    /// Sets the alpha of overlay `index`. Out-of-range indices are ignored and return `false`.
    ///
    /// ### 中文
    /// 设置第 `index` 个 overlay 的 alpha。越界索引会被忽略并返回 `false`。
    pub(crate) fn set(&self, index: usize, alpha: f32) -> bool {
        let mut mods = self.mods.lock();
        let Some(slot) = mods.get_mut(index) else {
            return false;
        };
        *slot = alpha;
        self.flags.insert(ThreadFlags::ALPHA_UPDATE);
        true
    }

    /// ### English
    /// Copies the table into `out` if it changed since the last call (render-thread side).
    ///
    /// ### 中文
    /// 若自上次调用后有变化，则把表复制到 `out`（渲染线程侧）。
    pub(crate) fn take_if_dirty(&self, out: &mut Vec<f32>) -> bool {
        let mods = self.mods.lock();
        if !self.flags.take(ThreadFlags::ALPHA_UPDATE) {
            return false;
        }
        out.clear();
        out.extend_from_slice(&mods);
        true
    }
}
