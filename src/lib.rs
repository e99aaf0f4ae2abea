/// ### English
/// `threaded_video` crate root.
/// Runs a synchronous video driver on a dedicated render thread behind a proxy that implements the
/// same driver traits; the implementation lives under `engine`.
///
/// ### 中文
/// `threaded_video` 的 crate 根。
/// 在独立渲染线程上运行同步视频驱动，并以实现相同驱动 trait 的代理对外提供；实现位于 `engine` 模块。
mod engine;

pub use engine::config::{ThreadConfig, VideoInfo};
pub use engine::driver::{
    FontRenderApi, FontRequest, FrameRef, OverlayRect, ShaderType, TextureImage, VideoDriver,
    VideoOverlay, VideoPoke, Viewport,
};
pub use engine::error::VideoError;
pub use engine::frame::FrameStats;
pub use engine::runtime::ThreadedVideo;
