//! ### English
//! Construction inputs: the video-mode descriptor handed to the driver and the proxy's own tuning.
//!
//! Both are owned by value; the render thread keeps its own copy of [`VideoInfo`].
//!
//! ### 中文
//! 构建输入：交给驱动的视频模式描述，以及代理自身的调优参数。
//!
//! 两者均按值持有；渲染线程保存自己的 [`VideoInfo`] 副本。

use std::time::Duration;

use dpi::PhysicalSize;

/// ### English
/// Video-mode descriptor passed to the driver factory on the render thread.
///
/// ### 中文
/// 在渲染线程上传给驱动工厂的视频模式描述。
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// ### English
    /// Requested output size in physical pixels (`0` lets the driver pick).
    ///
    /// ### 中文
    /// 请求的输出尺寸（物理像素，`0` 表示由驱动决定）。
    pub size: PhysicalSize<u32>,
    pub fullscreen: bool,
    pub vsync: bool,
    /// ### English
    /// Swap interval intent (`1` = every vblank).
    ///
    /// ### 中文
    /// 交换间隔意图（`1` = 每个垂直消隐）。
    pub swap_interval: u32,
    pub adaptive_vsync: bool,
    pub force_aspect: bool,
    /// ### English
    /// Bilinear filtering of the frame texture.
    ///
    /// ### 中文
    /// 帧纹理的双线性过滤。
    pub smooth: bool,
    /// ### English
    /// Frames are 32-bit XRGB8888 (otherwise 16-bit RGB565).
    ///
    /// ### 中文
    /// 帧为 32 位 XRGB8888（否则为 16 位 RGB565）。
    pub rgb32: bool,
    pub input_scale: u32,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            size: PhysicalSize::new(640, 480),
            fullscreen: false,
            vsync: true,
            swap_interval: 1,
            adaptive_vsync: false,
            force_aspect: true,
            smooth: true,
            rgb32: true,
            input_scale: 2,
        }
    }
}

/// ### English
/// Tuning for the proxy itself (not seen by the driver).
///
/// ### 中文
/// 代理自身的调优参数（驱动不可见）。
#[derive(Clone, Debug)]
pub struct ThreadConfig {
    /// ### English
    /// Name of the spawned render thread.
    ///
    /// ### 中文
    /// 渲染线程名称。
    pub thread_name: String,
    /// ### English
    /// Upper bound on how long construction waits for the driver to initialize.
    ///
    /// ### 中文
    /// 构建时等待驱动初始化的上限。
    pub init_timeout: Duration,
    /// ### English
    /// Upper bound on how long a blocking frame submission waits for the previous frame to be
    /// consumed. On timeout the frame is overwritten and counted as a miss.
    ///
    /// ### 中文
    /// 阻塞式帧提交等待上一帧被消费的上限。超时后覆盖该帧并计为 miss。
    pub frame_wait_timeout: Duration,
    /// ### English
    /// When set, a render thread with nothing to do re-presents the last frame at this cadence.
    ///
    /// ### 中文
    /// 设置后，空闲等待中的渲染线程按此间隔重新呈现上一帧。
    pub present_interval: Option<Duration>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            thread_name: "video".to_string(),
            init_timeout: Duration::from_secs(30),
            frame_wait_timeout: Duration::from_millis(500),
            present_interval: None,
        }
    }
}
