//! ### English
//! Driver capability traits implemented by the proxy, so a `ThreadedVideo` can stand in for the
//! driver it wraps.
//!
//! ### 中文
//! 代理实现的驱动能力 trait，使 `ThreadedVideo` 可以替代其所包装的驱动。

use std::path::Path;

use dpi::PhysicalSize;

use crate::engine::driver::{
    FrameRef, OverlayRect, ShaderType, TextureImage, VideoDriver, VideoOverlay, VideoPoke,
    Viewport,
};

use super::ThreadedVideo;

impl VideoDriver for ThreadedVideo {
    fn ident(&self) -> &str {
        "thread"
    }

    fn frame(&mut self, frame: FrameRef<'_>) -> bool {
        self.draw_frame(
            frame.pixels,
            frame.width,
            frame.height,
            frame.pitch,
            frame.msg,
        )
    }

    /// ### English
    /// Only `nonblock` is forwarded; the render thread uses the vsync settings from `VideoInfo`.
    ///
    /// ### 中文
    /// 仅转交 `nonblock`；渲染线程使用 `VideoInfo` 中的垂直同步设置。
    fn set_nonblock_state(&mut self, nonblock: bool, _adaptive_vsync: bool, _swap_interval: u32) {
        ThreadedVideo::set_nonblock_state(self, nonblock);
    }

    fn alive(&mut self) -> bool {
        ThreadedVideo::alive(self)
    }

    fn focus(&mut self) -> bool {
        ThreadedVideo::focus(self)
    }

    fn suppress_screensaver(&mut self, enable: bool) -> bool {
        ThreadedVideo::suppress_screensaver(self, enable)
    }

    fn has_windowed(&mut self) -> bool {
        ThreadedVideo::has_windowed(self)
    }

    fn set_shader(&mut self, kind: ShaderType, path: Option<&Path>) -> bool {
        ThreadedVideo::set_shader(self, kind, path)
    }

    fn set_viewport(&mut self, width: u32, height: u32, force_full: bool, allow_rotate: bool) {
        ThreadedVideo::set_viewport(self, width, height, force_full, allow_rotate);
    }

    fn set_rotation(&mut self, rotation: u32) {
        ThreadedVideo::set_rotation(self, rotation);
    }

    fn viewport_info(&mut self) -> Viewport {
        ThreadedVideo::viewport_info(self)
    }

    fn read_viewport(&mut self, buffer: &mut [u8], _is_idle: bool) -> bool {
        ThreadedVideo::read_viewport(self, buffer)
    }

    fn overlay(&mut self) -> Option<&mut dyn VideoOverlay> {
        if self.has_overlay() {
            Some(self)
        } else {
            None
        }
    }

    fn poke(&mut self) -> Option<&mut dyn VideoPoke> {
        if self.has_poke() {
            Some(self)
        } else {
            None
        }
    }
}

impl VideoOverlay for ThreadedVideo {
    fn enable(&mut self, state: bool) {
        self.overlay_enable(state);
    }

    fn load(&mut self, images: &[TextureImage]) -> bool {
        self.overlay_load(images)
    }

    fn tex_geom(&mut self, index: usize, rect: OverlayRect) {
        self.overlay_tex_geom(index, rect);
    }

    fn vertex_geom(&mut self, index: usize, rect: OverlayRect) {
        self.overlay_vertex_geom(index, rect);
    }

    fn full_screen(&mut self, enable: bool) {
        self.overlay_full_screen(enable);
    }

    fn set_alpha(&mut self, index: usize, alpha: f32) {
        self.overlay_set_alpha(index, alpha);
    }
}

impl VideoPoke for ThreadedVideo {
    fn set_video_mode(&mut self, size: PhysicalSize<u32>, fullscreen: bool) {
        ThreadedVideo::set_video_mode(self, size, fullscreen);
    }

    fn set_filtering(&mut self, index: u32, smooth: bool, ctx_scaling: bool) {
        ThreadedVideo::set_filtering(self, index, smooth, ctx_scaling);
    }

    fn set_fbo_state(&mut self, state: bool) {
        ThreadedVideo::set_fbo_state(self, state);
    }

    fn get_fbo_state(&mut self) -> bool {
        ThreadedVideo::get_fbo_state(self)
    }

    fn set_aspect_ratio(&mut self, index: u32) {
        ThreadedVideo::set_aspect_ratio(self, index);
    }

    fn apply_state_changes(&mut self) {
        ThreadedVideo::apply_state_changes(self);
    }

    fn set_texture_frame(&mut self, pixels: &[u8], rgb32: bool, width: u32, height: u32, alpha: f32) {
        ThreadedVideo::set_texture_frame(self, pixels, rgb32, width, height, alpha);
    }

    fn set_texture_enable(&mut self, enable: bool, full_screen: bool) {
        ThreadedVideo::set_texture_enable(self, enable, full_screen);
    }

    fn show_mouse(&mut self, state: bool) {
        ThreadedVideo::show_mouse(self, state);
    }

    fn grab_mouse_toggle(&mut self) {
        ThreadedVideo::grab_mouse_toggle(self);
    }

    fn set_hdr_max_nits(&mut self, max_nits: f32) {
        ThreadedVideo::set_hdr_max_nits(self, max_nits);
    }

    fn set_hdr_paper_white_nits(&mut self, paper_white_nits: f32) {
        ThreadedVideo::set_hdr_paper_white_nits(self, paper_white_nits);
    }

    fn set_hdr_contrast(&mut self, contrast: f32) {
        ThreadedVideo::set_hdr_contrast(self, contrast);
    }

    fn set_hdr_expand_gamut(&mut self, expand_gamut: bool) {
        ThreadedVideo::set_hdr_expand_gamut(self, expand_gamut);
    }
}
