//! ### English
//! Shared flag set read by both the producer thread and the render thread.
//!
//! Every bit is written while holding the lock that guards the resource it describes
//! (frame/texture bits under the frame-slot lock, alpha bit under the alpha lock, control bits
//! under the mailbox lock). Reads are lock-free.
//!
//! ### 中文
//! 生产者线程与渲染线程共同读取的共享标志集合。
//!
//! 每个位都在持有其所描述资源的锁时写入（帧/纹理位在 frame slot 锁下，alpha 位在 alpha 锁下，
//! 控制位在 mailbox 锁下）。读取无锁。

use std::sync::atomic::{AtomicU16, Ordering};

bitflags::bitflags! {
    /// ### English
    /// Individual flags stored in [`SharedFlags`].
    ///
    /// ### 中文
    /// [`SharedFlags`] 中存储的各个标志位。
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ThreadFlags: u16 {
        /// ### English
        /// A poke `apply_state_changes` is pending for the next draw.
        ///
        /// ### 中文
        /// 有待在下一次绘制前执行的 poke `apply_state_changes`。
        const APPLY_STATE_CHANGES = 1 << 0;
        /// ### English
        /// Render thread is running and the driver is still valid.
        ///
        /// ### 中文
        /// 渲染线程仍在运行且驱动仍有效。
        const ALIVE = 1 << 1;
        const FOCUS = 1 << 2;
        const SUPPRESS_SCREENSAVER = 1 << 3;
        const HAS_WINDOWED = 1 << 4;
        /// ### English
        /// Frame submission never waits for the render thread.
        ///
        /// ### 中文
        /// 帧提交永不等待渲染线程。
        const NONBLOCK = 1 << 5;
        /// ### English
        /// Render thread drains commands but skips draws (pause).
        ///
        /// ### 中文
        /// 渲染线程继续处理命令但跳过绘制（暂停）。
        const IS_IDLE = 1 << 6;
        const ALPHA_UPDATE = 1 << 7;
        const FRAME_UPDATED = 1 << 8;
        const TEXTURE_FRAME_UPDATED = 1 << 9;
        /// ### English
        /// Texture frame is packed 32-bit RGB (otherwise RGBA4444-style 16-bit).
        ///
        /// ### 中文
        /// 纹理帧为 32 位 RGB（否则为 16 位格式）。
        const TEXTURE_RGB32 = 1 << 10;
        const TEXTURE_ENABLE = 1 << 11;
        const TEXTURE_FULLSCREEN = 1 << 12;
    }
}

/// ### English
/// Atomic container for [`ThreadFlags`].
///
/// ### 中文
/// [`ThreadFlags`] 的原子容器。
#[derive(Debug, Default)]
pub(crate) struct SharedFlags {
    bits: AtomicU16,
}

impl SharedFlags {
    pub(crate) fn new(initial: ThreadFlags) -> Self {
        Self {
            bits: AtomicU16::new(initial.bits()),
        }
    }

    /// ### English
    /// Returns a snapshot of all flags.
    ///
    /// ### 中文
    /// 返回所有标志的快照。
    #[inline]
    pub(crate) fn load(&self) -> ThreadFlags {
        ThreadFlags::from_bits_retain(self.bits.load(Ordering::Acquire))
    }

    /// ### English
    /// Returns whether every bit in `flags` is set.
    ///
    /// ### 中文
    /// 返回 `flags` 中的所有位是否都已设置。
    #[inline]
    pub(crate) fn contains(&self, flags: ThreadFlags) -> bool {
        self.load().contains(flags)
    }

    #[inline]
    pub(crate) fn insert(&self, flags: ThreadFlags) {
        self.bits.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn remove(&self, flags: ThreadFlags) {
        self.bits.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// ### English
    /// Sets or clears `flags` depending on `value`.
    ///
    /// ### 中文
    /// 根据 `value` 设置或清除 `flags`。
    #[inline]
    pub(crate) fn set(&self, flags: ThreadFlags, value: bool) {
        if value {
            self.insert(flags);
        } else {
            self.remove(flags);
        }
    }

    /// ### English
    /// Clears `flags` and returns whether any of them was set before.
    ///
    /// ### 中文
    /// 清除 `flags`，并返回清除前其中是否有任一位被设置。
    #[inline]
    pub(crate) fn take(&self, flags: ThreadFlags) -> bool {
        let prev = self.bits.fetch_and(!flags.bits(), Ordering::AcqRel);
        prev & flags.bits() != 0
    }
}
