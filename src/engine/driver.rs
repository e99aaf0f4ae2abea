//! ### English
//! Driver capability set wrapped by the threaded proxy.
//!
//! A driver is a synchronous rendering backend: it draws one frame per call and owns its
//! window/surface. Overlay and poke capabilities are optional and exposed as trait objects.
//! Dropping the driver is `free`.
//!
//! ### 中文
//! 线程代理所包装的驱动能力集合。
//!
//! 驱动是同步渲染后端：每次调用绘制一帧，并持有自己的窗口/表面。overlay 与 poke 能力是可选的，
//! 以 trait object 的形式暴露。drop 驱动即 `free`。

use std::path::{Path, PathBuf};

use dpi::PhysicalSize;

/// ### English
/// Output viewport as reported by the driver.
///
/// ### 中文
/// 驱动报告的输出视口。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// ### English
    /// Full window/surface size the viewport lives in.
    ///
    /// ### 中文
    /// 视口所在的完整窗口/表面尺寸。
    pub full_width: u32,
    pub full_height: u32,
}

impl Viewport {
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShaderType {
    #[default]
    None,
    Cg,
    Glsl,
    Slang,
}

/// ### English
/// Normalized overlay rectangle (texture or vertex coordinates).
///
/// ### 中文
/// 归一化的 overlay 矩形（纹理或顶点坐标）。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// ### English
/// One overlay image in ARGB8888.
///
/// ### 中文
/// 一张 ARGB8888 格式的 overlay 图像。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureImage {
    pub pixels: Vec<u32>,
    pub size: PhysicalSize<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontRenderApi {
    #[default]
    Gl,
    Vulkan,
    D3d,
    Metal,
    Software,
}

/// ### English
/// Font request forwarded to a `font_init` delegate on the render thread.
///
/// ### 中文
/// 在渲染线程上转交给 `font_init` 委托的字体请求。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontRequest {
    pub path: Option<PathBuf>,
    pub size: f32,
    pub api: FontRenderApi,
    /// ### English
    /// Always `true` when the request went through the threaded proxy.
    ///
    /// ### 中文
    /// 经由线程代理发出的请求始终为 `true`。
    pub is_threaded: bool,
}

/// ### English
/// One frame handed to [`VideoDriver::frame`].
///
/// `pixels == None` asks the driver to re-present what it already has.
///
/// ### 中文
/// 交给 [`VideoDriver::frame`] 的一帧。
///
/// `pixels == None` 表示请求驱动重新呈现已有内容。
#[derive(Clone, Copy, Debug)]
pub struct FrameRef<'a> {
    pub pixels: Option<&'a [u8]>,
    pub width: u32,
    pub height: u32,
    /// ### English
    /// Bytes per row in `pixels`.
    ///
    /// ### 中文
    /// `pixels` 中每行的字节数。
    pub pitch: usize,
    /// ### English
    /// Monotonic frame counter assigned by the submitter.
    ///
    /// ### 中文
    /// 由提交方分配的单调递增帧计数。
    pub frame_count: u64,
    /// ### English
    /// On-screen message to draw with this frame.
    ///
    /// ### 中文
    /// 随本帧绘制的屏显消息。
    pub msg: Option<&'a str>,
}

/// ### English
/// Core driver capability set.
///
/// Only `frame`, `alive` and `viewport_info` are mandatory; everything else has a neutral default.
///
/// ### 中文
/// 驱动核心能力集合。
///
/// 只有 `frame`、`alive` 与 `viewport_info` 是必须实现的；其余方法都有中性默认实现。
pub trait VideoDriver {
    /// ### English
    /// Short identifier used in logs.
    ///
    /// ### 中文
    /// 日志中使用的简短标识。
    fn ident(&self) -> &str {
        "video"
    }

    fn frame(&mut self, frame: FrameRef<'_>) -> bool;

    fn set_nonblock_state(&mut self, _nonblock: bool, _adaptive_vsync: bool, _swap_interval: u32) {}

    fn alive(&mut self) -> bool;

    fn focus(&mut self) -> bool {
        true
    }

    fn suppress_screensaver(&mut self, _enable: bool) -> bool {
        false
    }

    fn has_windowed(&mut self) -> bool {
        true
    }

    fn set_shader(&mut self, _kind: ShaderType, _path: Option<&Path>) -> bool {
        false
    }

    fn set_viewport(&mut self, _width: u32, _height: u32, _force_full: bool, _allow_rotate: bool) {}

    fn set_rotation(&mut self, _rotation: u32) {}

    fn viewport_info(&mut self) -> Viewport;

    /// ### English
    /// Reads back the current viewport as packed BGR24 into `buffer`.
    ///
    /// ### 中文
    /// 将当前视口以 BGR24 格式读回到 `buffer`。
    fn read_viewport(&mut self, _buffer: &mut [u8], _is_idle: bool) -> bool {
        false
    }

    fn overlay(&mut self) -> Option<&mut dyn VideoOverlay> {
        None
    }

    fn poke(&mut self) -> Option<&mut dyn VideoPoke> {
        None
    }
}

/// ### English
/// Optional overlay capability.
///
/// ### 中文
/// 可选的 overlay 能力。
pub trait VideoOverlay {
    fn enable(&mut self, state: bool);

    fn load(&mut self, images: &[TextureImage]) -> bool;

    fn tex_geom(&mut self, index: usize, rect: OverlayRect);

    fn vertex_geom(&mut self, index: usize, rect: OverlayRect);

    fn full_screen(&mut self, enable: bool);

    fn set_alpha(&mut self, index: usize, alpha: f32);
}

/// ### English
/// Optional "poke" extension calls. Every method defaults to a no-op or a neutral value.
///
/// ### 中文
/// 可选的 “poke” 扩展调用。每个方法默认均为空操作或中性值。
pub trait VideoPoke {
    fn set_video_mode(&mut self, _size: PhysicalSize<u32>, _fullscreen: bool) {}

    fn set_filtering(&mut self, _index: u32, _smooth: bool, _ctx_scaling: bool) {}

    fn set_fbo_state(&mut self, _state: bool) {}

    fn get_fbo_state(&mut self) -> bool {
        false
    }

    fn set_aspect_ratio(&mut self, _index: u32) {}

    fn apply_state_changes(&mut self) {}

    /// ### English
    /// Replaces the menu texture drawn on top of (or instead of) the game frame.
    ///
    /// ### 中文
    /// 替换绘制在游戏帧之上（或替代游戏帧）的菜单纹理。
    fn set_texture_frame(
        &mut self,
        _pixels: &[u8],
        _rgb32: bool,
        _width: u32,
        _height: u32,
        _alpha: f32,
    ) {
    }

    fn set_texture_enable(&mut self, _enable: bool, _full_screen: bool) {}

    fn show_mouse(&mut self, _state: bool) {}

    fn grab_mouse_toggle(&mut self) {}

    fn set_hdr_max_nits(&mut self, _max_nits: f32) {}

    fn set_hdr_paper_white_nits(&mut self, _paper_white_nits: f32) {}

    fn set_hdr_contrast(&mut self, _contrast: f32) {}

    fn set_hdr_expand_gamut(&mut self, _expand_gamut: bool) {}
}
