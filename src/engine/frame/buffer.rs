use crate::engine::driver::FrameRef;

/// ### English
/// Render-thread-owned side of the double buffer.
///
/// ### 中文
/// 双缓冲中由渲染线程持有的一侧。
#[derive(Default)]
pub(crate) struct BackBuffer {
    pub(super) pixels: Vec<u8>,
    /// ### English
    /// Whether `pixels` holds a frame at all (false until the first non-dupe take).
    ///
    /// ### 中文
    /// `pixels` 是否已持有帧（首次非 dupe 取帧之前为 false）。
    pub(super) has_pixels: bool,
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) pitch: usize,
    pub(super) count: u64,
    pub(super) msg: String,
}

impl BackBuffer {
    /// ### English
    /// Borrows the last taken frame for drawing.
    ///
    /// ### 中文
    /// 借出最近一次取到的帧用于绘制。
    pub(crate) fn view(&self) -> FrameRef<'_> {
        FrameRef {
            pixels: self.has_pixels.then_some(self.pixels.as_slice()),
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            frame_count: self.count,
            msg: (!self.msg.is_empty()).then_some(self.msg.as_str()),
        }
    }

    /// ### English
    /// Re-present request for the last taken frame: no pixels, no message.
    ///
    /// ### 中文
    /// 针对最近一次取到的帧的重新呈现请求：无像素、无消息。
    pub(crate) fn represent(&self) -> FrameRef<'_> {
        FrameRef {
            pixels: None,
            msg: None,
            ..self.view()
        }
    }

    pub(crate) fn frame_count(&self) -> u64 {
        self.count
    }
}

/// ### English
/// Render-thread-owned copy of the menu texture frame.
///
/// ### 中文
/// 渲染线程持有的菜单纹理帧副本。
#[derive(Default)]
pub(crate) struct TextureBuffer {
    pub(crate) pixels: Vec<u8>,
    pub(crate) rgb32: bool,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) alpha: f32,
}
