#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use threaded_video::{
    FrameRef, OverlayRect, ShaderType, TextureImage, ThreadConfig, ThreadedVideo, VideoDriver,
    VideoInfo, VideoOverlay, VideoPoke, Viewport,
};

#[derive(Clone, Debug, PartialEq)]
pub struct DrawnFrame {
    pub width: u32,
    pub height: u32,
    pub first_byte: Option<u8>,
    pub frame_count: u64,
    pub msg: Option<String>,
}

/// Everything the mock driver was asked to do, in call order per field.
#[derive(Debug, Default)]
pub struct DriverLog {
    pub frames: Vec<DrawnFrame>,
    pub shaders: Vec<Option<PathBuf>>,
    pub nonblock: Vec<(bool, bool, u32)>,
    pub screensaver: Vec<bool>,
    pub alpha: Vec<(usize, f32)>,
    pub textures: Vec<(Vec<u8>, u32, u32)>,
    pub texture_enable: Option<(bool, bool)>,
    pub state_changes: usize,
    pub overlays_loaded: usize,
    pub aspect_ratios: Vec<u32>,
    pub hdr_contrast: Vec<f32>,
    pub dropped_on: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MockOptions {
    pub draw_delay: Duration,
    pub shader_delay: Duration,
    pub extensions: bool,
    pub fail_init: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            draw_delay: Duration::ZERO,
            shader_delay: Duration::ZERO,
            extensions: true,
            fail_init: false,
        }
    }
}

pub struct MockDriver {
    log: Arc<Mutex<DriverLog>>,
    options: MockOptions,
    viewport: Viewport,
    fbo: bool,
}

impl MockDriver {
    pub fn new(info: &VideoInfo, options: MockOptions, log: Arc<Mutex<DriverLog>>) -> Self {
        Self {
            log,
            options,
            viewport: Viewport {
                width: info.size.width,
                height: info.size.height,
                full_width: info.size.width,
                full_height: info.size.height,
                ..Viewport::default()
            },
            fbo: false,
        }
    }
}

impl Drop for MockDriver {
    fn drop(&mut self) {
        self.log.lock().dropped_on = thread::current().name().map(str::to_owned);
    }
}

impl VideoDriver for MockDriver {
    fn ident(&self) -> &str {
        "mock"
    }

    fn frame(&mut self, frame: FrameRef<'_>) -> bool {
        thread::sleep(self.options.draw_delay);
        self.log.lock().frames.push(DrawnFrame {
            width: frame.width,
            height: frame.height,
            first_byte: frame.pixels.and_then(|pixels| pixels.first().copied()),
            frame_count: frame.frame_count,
            msg: frame.msg.map(str::to_owned),
        });
        true
    }

    fn set_nonblock_state(&mut self, nonblock: bool, adaptive_vsync: bool, swap_interval: u32) {
        self.log
            .lock()
            .nonblock
            .push((nonblock, adaptive_vsync, swap_interval));
    }

    fn alive(&mut self) -> bool {
        true
    }

    fn suppress_screensaver(&mut self, enable: bool) -> bool {
        self.log.lock().screensaver.push(enable);
        true
    }

    fn set_shader(&mut self, _kind: ShaderType, path: Option<&Path>) -> bool {
        thread::sleep(self.options.shader_delay);
        self.log.lock().shaders.push(path.map(Path::to_path_buf));
        path.is_some()
    }

    fn set_viewport(&mut self, width: u32, height: u32, force_full: bool, _allow_rotate: bool) {
        self.viewport.width = width;
        self.viewport.height = height;
        if force_full {
            self.viewport.full_width = width;
            self.viewport.full_height = height;
        }
    }

    fn viewport_info(&mut self) -> Viewport {
        self.viewport
    }

    fn read_viewport(&mut self, buffer: &mut [u8], _is_idle: bool) -> bool {
        let needed = (self.viewport.width * self.viewport.height * 3) as usize;
        if buffer.len() < needed {
            return false;
        }
        buffer[..needed].fill(0xAB);
        true
    }

    fn overlay(&mut self) -> Option<&mut dyn VideoOverlay> {
        if self.options.extensions {
            Some(self)
        } else {
            None
        }
    }

    fn poke(&mut self) -> Option<&mut dyn VideoPoke> {
        if self.options.extensions {
            Some(self)
        } else {
            None
        }
    }
}

impl VideoOverlay for MockDriver {
    fn enable(&mut self, _state: bool) {}

    fn load(&mut self, images: &[TextureImage]) -> bool {
        self.log.lock().overlays_loaded = images.len();
        !images.is_empty()
    }

    fn tex_geom(&mut self, _index: usize, _rect: OverlayRect) {}

    fn vertex_geom(&mut self, _index: usize, _rect: OverlayRect) {}

    fn full_screen(&mut self, _enable: bool) {}

    fn set_alpha(&mut self, index: usize, alpha: f32) {
        self.log.lock().alpha.push((index, alpha));
    }
}

impl VideoPoke for MockDriver {
    fn set_fbo_state(&mut self, state: bool) {
        self.fbo = state;
    }

    fn get_fbo_state(&mut self) -> bool {
        self.fbo
    }

    fn set_aspect_ratio(&mut self, index: u32) {
        self.log.lock().aspect_ratios.push(index);
    }

    fn apply_state_changes(&mut self) {
        self.log.lock().state_changes += 1;
    }

    fn set_texture_frame(&mut self, pixels: &[u8], _rgb32: bool, width: u32, height: u32, _alpha: f32) {
        self.log.lock().textures.push((pixels.to_vec(), width, height));
    }

    fn set_texture_enable(&mut self, enable: bool, full_screen: bool) {
        self.log.lock().texture_enable = Some((enable, full_screen));
    }

    fn set_hdr_contrast(&mut self, contrast: f32) {
        self.log.lock().hdr_contrast.push(contrast);
    }
}

pub fn spawn_mock(info: VideoInfo, options: MockOptions) -> (ThreadedVideo, Arc<Mutex<DriverLog>>) {
    spawn_mock_with(info, ThreadConfig::default(), options)
}

pub fn spawn_mock_with(
    info: VideoInfo,
    config: ThreadConfig,
    options: MockOptions,
) -> (ThreadedVideo, Arc<Mutex<DriverLog>>) {
    let log = Arc::new(Mutex::new(DriverLog::default()));
    let driver_log = log.clone();
    let video = ThreadedVideo::new(info, config, move |info: &VideoInfo| {
        if options.fail_init {
            return Err("no display available");
        }
        Ok(MockDriver::new(info, options, driver_log))
    })
    .expect("mock driver init");
    (video, log)
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
