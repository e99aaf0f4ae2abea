use super::FrameStats;

/// ### English
/// Frame data guarded by the frame-slot lock.
///
/// ### 中文
/// 受 frame slot 锁保护的帧数据。
#[derive(Default)]
pub(super) struct FrameState {
    /// ### English
    /// Front buffer written by the producer.
    ///
    /// ### 中文
    /// 由生产者写入的 front buffer。
    pub(super) buffer: Vec<u8>,
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) pitch: usize,
    /// ### English
    /// The pending submission carried no pixels; the render thread keeps its back buffer.
    ///
    /// ### 中文
    /// 待处理提交不含像素；渲染线程保留自己的 back buffer。
    pub(super) dupe: bool,
    pub(super) msg: String,
    pub(super) stats: FrameStats,
    pub(super) texture: TextureState,
}

/// ### English
/// Menu texture frame (same lock as the game frame).
///
/// ### 中文
/// 菜单纹理帧（与游戏帧共用同一把锁）。
#[derive(Default)]
pub(super) struct TextureState {
    pub(super) pixels: Vec<u8>,
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) alpha: f32,
}
