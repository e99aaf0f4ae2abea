//! ### English
//! Menu texture frame and the "apply state changes" request, both guarded by the frame-slot lock.
//!
//! ### 中文
//! 菜单纹理帧与 “apply state changes” 请求，两者都受 frame slot 锁保护。

use crate::engine::flags::ThreadFlags;

use super::super::TextureBuffer;
use super::FrameSlot;

impl FrameSlot {
    /// ### English
    /// Replaces the menu texture (producer side).
    ///
    /// ### 中文
    /// 替换菜单纹理（生产者侧）。
    pub(crate) fn set_texture_frame(
        &self,
        pixels: &[u8],
        rgb32: bool,
        width: u32,
        height: u32,
        alpha: f32,
    ) {
        let mut state = self.state.lock();
        state.texture.pixels.clear();
        state.texture.pixels.extend_from_slice(pixels);
        state.texture.width = width;
        state.texture.height = height;
        state.texture.alpha = alpha;
        self.flags.set(ThreadFlags::TEXTURE_RGB32, rgb32);
        self.flags.insert(ThreadFlags::TEXTURE_FRAME_UPDATED);
    }

    pub(crate) fn set_texture_enable(&self, enable: bool, full_screen: bool) {
        let _state = self.state.lock();
        self.flags.set(ThreadFlags::TEXTURE_ENABLE, enable);
        self.flags.set(ThreadFlags::TEXTURE_FULLSCREEN, full_screen);
    }

    /// ### English
    /// Returns `(enable, full_screen)` for the menu texture.
    ///
    /// ### 中文
    /// 返回菜单纹理的 `(enable, full_screen)`。
    pub(crate) fn texture_enable(&self) -> (bool, bool) {
        let flags = self.flags.load();
        (
            flags.contains(ThreadFlags::TEXTURE_ENABLE),
            flags.contains(ThreadFlags::TEXTURE_FULLSCREEN),
        )
    }

    /// ### English
    /// Moves an updated menu texture into `back` (render-thread side).
    /// Returns `false` if nothing changed since the last call.
    ///
    /// ### 中文
    /// 把已更新的菜单纹理移动到 `back`（渲染线程侧）。
    /// 若自上次调用以来没有变化则返回 `false`。
    pub(crate) fn take_texture(&self, back: &mut TextureBuffer) -> bool {
        let mut state = self.state.lock();
        if !self.flags.take(ThreadFlags::TEXTURE_FRAME_UPDATED) {
            return false;
        }

        std::mem::swap(&mut state.texture.pixels, &mut back.pixels);
        back.width = state.texture.width;
        back.height = state.texture.height;
        back.alpha = state.texture.alpha;
        back.rgb32 = self.flags.contains(ThreadFlags::TEXTURE_RGB32);
        true
    }

    pub(crate) fn request_state_changes(&self) {
        let _state = self.state.lock();
        self.flags.insert(ThreadFlags::APPLY_STATE_CHANGES);
    }

    pub(crate) fn take_state_changes(&self) -> bool {
        let _state = self.state.lock();
        self.flags.take(ThreadFlags::APPLY_STATE_CHANGES)
    }
}
