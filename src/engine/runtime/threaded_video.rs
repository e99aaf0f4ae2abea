//! ### English
//! Threaded driver proxy that spawns and owns the dedicated render thread.
//!
//! ### 中文
//! 创建并持有独立渲染线程的线程驱动代理。

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{self as channel, RecvTimeoutError};
use dpi::PhysicalSize;
use parking_lot::Mutex;

use crate::engine::config::{ThreadConfig, VideoInfo};
use crate::engine::driver::{
    FontRenderApi, FontRequest, OverlayRect, ShaderType, TextureImage, VideoDriver, Viewport,
};
use crate::engine::error::VideoError;
use crate::engine::flags::ThreadFlags;
use crate::engine::frame::FrameStats;
use crate::engine::wake::wake_channel;

use super::command::{Capabilities, Command, RenderTask, ReplyPayload};
use super::mailbox::{Mailbox, mailbox};
use super::render_thread::{self, DriverFactory, InputBinder, RenderThreadInit};
use super::shared::Shared;

/// ### English
/// Driver proxy that runs a synchronous video driver on its own thread.
///
/// Frame submission goes through a double-buffered frame slot (the hot path); every other call is a
/// command answered by the render thread through a single-slot mailbox. The proxy is `Sync`:
/// several producer threads may share it, and their control calls are serialized.
///
/// ### 中文
/// 在独立线程上运行同步视频驱动的驱动代理。
///
/// 帧提交走双缓冲 frame slot（热路径）；其余调用都是由渲染线程通过单槽 mailbox 应答的命令。
/// 代理是 `Sync` 的：多个生产者线程可以共享它，其控制调用会被串行化。
pub struct ThreadedVideo {
    mailbox: Mailbox,
    shared: Arc<Shared>,
    /// ### English
    /// Capabilities reported by the wrapped driver at init.
    ///
    /// ### 中文
    /// 被包装驱动在初始化时报告的能力。
    capabilities: Capabilities,
    frame_wait_timeout: Duration,
    /// ### English
    /// Join handle for the render thread (`None` once freed).
    ///
    /// ### 中文
    /// 渲染线程的 join handle（free 之后为 `None`）。
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ThreadedVideo {
    /// ### English
    /// Spawns the render thread, constructs the driver on it and binds input.
    ///
    /// Blocks until the driver reports its init result (or `config.init_timeout` elapses). On
    /// failure no render thread is left running.
    ///
    /// #### Parameters
    /// - `info`: Video mode handed to `factory`.
    /// - `config`: Proxy tuning.
    /// - `factory`: Builds the driver on the render thread.
    /// - `bind_input`: Runs once on the render thread right after the driver exists; its result is
    ///   returned to the caller.
    ///
    /// ### 中文
    /// 创建渲染线程，在其上构建驱动并绑定输入。
    ///
    /// 阻塞直到驱动报告初始化结果（或超过 `config.init_timeout`）。失败时不会遗留渲染线程。
    ///
    /// #### 参数
    /// - `info`：交给 `factory` 的视频模式。
    /// - `config`：代理调优参数。
    /// - `factory`：在渲染线程上构建驱动。
    /// - `bind_input`：驱动创建后在渲染线程上运行一次；其结果返回给调用方。
    pub fn spawn<D, E, F, B, I>(
        info: VideoInfo,
        config: ThreadConfig,
        factory: F,
        bind_input: B,
    ) -> Result<(Self, I), VideoError>
    where
        D: VideoDriver + 'static,
        E: fmt::Display,
        F: FnOnce(&VideoInfo) -> Result<D, E> + Send + 'static,
        B: FnOnce(&mut D) -> I + Send + 'static,
        I: Send + 'static,
    {
        let (waker, wake_rx) = wake_channel();
        let shared = Arc::new(Shared::new(waker));
        let (mailbox, server) = mailbox();

        let (input_tx, input_rx) = channel::bounded(1);
        let factory: DriverFactory<D> =
            Box::new(move |info: &VideoInfo| factory(info).map_err(|err| err.to_string()));
        let bind_input: InputBinder<D> = Box::new(move |driver: &mut D| {
            let _ = input_tx.send(bind_input(driver));
        });

        let init = RenderThreadInit {
            info,
            present_interval: config.present_interval,
            factory,
            bind_input,
            shared: shared.clone(),
            server,
            wake_rx,
        };

        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || render_thread::run_render_thread(init))?;

        match mailbox.wait_init(config.init_timeout) {
            Ok(reply) => match reply.payload {
                ReplyPayload::Init(capabilities) => {
                    let input = input_rx.recv().map_err(|_| VideoError::RenderThreadGone)?;
                    log::debug!(
                        "threaded video ready (driver {}, overlay {}, poke {})",
                        capabilities.ident,
                        capabilities.overlay,
                        capabilities.poke
                    );
                    let video = Self {
                        mailbox,
                        shared,
                        capabilities,
                        frame_wait_timeout: config.frame_wait_timeout,
                        thread: Mutex::new(Some(thread)),
                    };
                    Ok((video, input))
                }
                ReplyPayload::InitFailed(err) => {
                    let _ = thread.join();
                    Err(VideoError::InitFailed(err))
                }
                _ => {
                    let _ = thread.join();
                    Err(VideoError::RenderThreadGone)
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                /*
                ### English
                The thread is left detached; it exits on its own once the driver returns and it
                sees the mailbox is gone.

                ### 中文
                线程被分离；驱动返回后它发现 mailbox 已不存在，会自行退出。
                */
                mailbox.post_detached(Command::Free);
                log::warn!(
                    "video driver did not initialize within {:?}; abandoning render thread",
                    config.init_timeout
                );
                Err(VideoError::InitTimeout(config.init_timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                Err(VideoError::RenderThreadGone)
            }
        }
    }

    /// ### English
    /// [`Self::spawn`] without an input binder.
    ///
    /// ### 中文
    /// 不带输入绑定的 [`Self::spawn`]。
    pub fn new<D, E, F>(info: VideoInfo, config: ThreadConfig, factory: F) -> Result<Self, VideoError>
    where
        D: VideoDriver + 'static,
        E: fmt::Display,
        F: FnOnce(&VideoInfo) -> Result<D, E> + Send + 'static,
    {
        Self::spawn(info, config, factory, |_| ()).map(|(video, ())| video)
    }

    /// ### English
    /// Submits a frame (hot path). `pixels == None` re-presents the last frame with `msg`.
    ///
    /// Returns `false` if the render thread is gone.
    ///
    /// ### 中文
    /// 提交一帧（热路径）。`pixels == None` 表示用 `msg` 重新呈现上一帧。
    ///
    /// 渲染线程已退出时返回 `false`。
    pub fn draw_frame(
        &self,
        pixels: Option<&[u8]>,
        width: u32,
        height: u32,
        pitch: usize,
        msg: Option<&str>,
    ) -> bool {
        self.shared
            .frame
            .submit(pixels, width, height, pitch, msg, self.frame_wait_timeout)
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.shared.frame.stats()
    }

    /// ### English
    /// Switches frame submission between blocking (wait for the render thread) and non-blocking
    /// (overwrite and count a miss). The render thread forwards the change to the driver.
    ///
    /// ### 中文
    /// 在阻塞（等待渲染线程）与非阻塞（覆盖并计为 miss）帧提交之间切换。
    /// 渲染线程会把变化转交给驱动。
    pub fn set_nonblock_state(&self, nonblock: bool) {
        self.set_control_flag(ThreadFlags::NONBLOCK, nonblock);
    }

    /// ### English
    /// Enters or leaves idle: commands are still answered but frames are not drawn.
    ///
    /// ### 中文
    /// 进入或离开 idle：仍应答命令，但不绘制帧。
    pub fn set_idle(&self, idle: bool) {
        self.set_control_flag(ThreadFlags::IS_IDLE, idle);
    }

    pub fn is_idle(&self) -> bool {
        self.shared.flags.contains(ThreadFlags::IS_IDLE)
    }

    fn set_control_flag(&self, flag: ThreadFlags, value: bool) {
        {
            let _control = self.mailbox.control();
            self.shared.flags.set(flag, value);
        }
        self.shared.waker.wake();
    }

    /// ### English
    /// Whether the driver is still valid. While idle this is a blocking query answered by the
    /// render thread; otherwise it reads the flag refreshed after each draw.
    ///
    /// ### 中文
    /// 驱动是否仍有效。idle 时这是由渲染线程应答的阻塞查询；否则读取每次绘制后刷新的标志。
    pub fn alive(&self) -> bool {
        if self.shared.flags.contains(ThreadFlags::IS_IDLE) {
            return self.mailbox.post_and_wait(Command::Alive).is_ok();
        }
        self.shared.flags.contains(ThreadFlags::ALIVE)
    }

    pub fn focus(&self) -> bool {
        self.shared.flags.contains(ThreadFlags::FOCUS)
    }

    pub fn has_windowed(&self) -> bool {
        self.shared.flags.contains(ThreadFlags::HAS_WINDOWED)
    }

    pub fn suppress_screensaver(&self, enable: bool) -> bool {
        self.set_control_flag(ThreadFlags::SUPPRESS_SCREENSAVER, enable);
        self.shared.flags.contains(ThreadFlags::ALIVE)
    }

    pub fn set_shader(&self, kind: ShaderType, path: Option<&Path>) -> bool {
        self.mailbox
            .post_and_wait(Command::SetShader {
                kind,
                path: path.map(Path::to_path_buf),
            })
            .is_ok()
    }

    /// ### English
    /// Applies a new viewport on the render thread. The viewport snapshot is refreshed before this
    /// returns.
    ///
    /// ### 中文
    /// 在渲染线程上应用新的视口。返回前视口快照已刷新。
    pub fn set_viewport(&self, width: u32, height: u32, force_full: bool, allow_rotate: bool) {
        self.mailbox.post_and_wait(Command::SetViewport {
            width,
            height,
            force_full,
            allow_rotate,
        });
    }

    pub fn set_rotation(&self, rotation: u32) {
        self.mailbox.post_and_wait(Command::SetRotation(rotation));
    }

    /// ### English
    /// Viewport last reported by the render thread. The returned value is what a following
    /// [`Self::read_viewport`] is checked against.
    ///
    /// ### 中文
    /// 渲染线程最近报告的视口。返回值即随后 [`Self::read_viewport`] 所校验的视口。
    pub fn viewport_info(&self) -> Viewport {
        self.shared.viewport.report()
    }

    /// ### English
    /// Viewport last returned by [`Self::viewport_info`].
    ///
    /// ### 中文
    /// 最近一次由 [`Self::viewport_info`] 返回的视口。
    pub fn last_read_viewport(&self) -> Viewport {
        self.shared.viewport.last_read()
    }

    /// ### English
    /// Reads the current viewport back into `buffer` on the render thread.
    ///
    /// Fails if the viewport changed since the caller last saw it through [`Self::viewport_info`];
    /// the snapshot is refreshed either way, so the caller can query it again and retry.
    ///
    /// ### 中文
    /// 在渲染线程上把当前视口读回到 `buffer`。
    ///
    /// 若视口自调用方最近一次通过 [`Self::viewport_info`] 看到之后发生变化则失败；
    /// 无论成败快照都会刷新，调用方可重新查询后重试。
    pub fn read_viewport(&self, buffer: &mut [u8]) -> bool {
        let expected = self.shared.viewport.last_read();
        let reply = self.mailbox.post_and_wait(Command::ReadViewport {
            expected,
            buffer: vec![0; buffer.len()],
        });

        let ReplyPayload::ReadViewport {
            ok,
            viewport,
            buffer: read,
        } = reply.payload
        else {
            return false;
        };

        self.shared.viewport.store(viewport);
        if !ok {
            return false;
        }
        let len = read.len().min(buffer.len());
        buffer[..len].copy_from_slice(&read[..len]);
        true
    }

    pub fn has_overlay(&self) -> bool {
        self.capabilities.overlay
    }

    pub fn overlay_enable(&self, state: bool) -> bool {
        self.mailbox
            .post_and_wait(Command::OverlayEnable(state))
            .is_ok()
    }

    /// ### English
    /// Loads an overlay image set. Resets the alpha table to one fully opaque entry per image.
    ///
    /// ### 中文
    /// 加载 overlay 图像集合。把 alpha 表重置为每张图像一个完全不透明的条目。
    pub fn overlay_load(&self, images: &[TextureImage]) -> bool {
        self.shared.alpha.reset(images.len());
        self.mailbox
            .post_and_wait(Command::OverlayLoad(images.to_vec()))
            .is_ok()
    }

    pub fn overlay_tex_geom(&self, index: usize, rect: OverlayRect) -> bool {
        self.mailbox
            .post_and_wait(Command::OverlayTexGeom { index, rect })
            .is_ok()
    }

    pub fn overlay_vertex_geom(&self, index: usize, rect: OverlayRect) -> bool {
        self.mailbox
            .post_and_wait(Command::OverlayVertexGeom { index, rect })
            .is_ok()
    }

    pub fn overlay_full_screen(&self, enable: bool) -> bool {
        self.mailbox
            .post_and_wait(Command::OverlayFullScreen(enable))
            .is_ok()
    }

    /// ### English
    /// Sets an overlay's alpha without a mailbox round-trip. Picked up before the next draw.
    ///
    /// ### 中文
    /// 不经 mailbox 往返地设置 overlay 的 alpha。在下一次绘制前生效。
    pub fn overlay_set_alpha(&self, index: usize, alpha: f32) -> bool {
        self.shared.alpha.set(index, alpha)
    }

    pub fn has_poke(&self) -> bool {
        self.capabilities.poke
    }

    pub fn set_video_mode(&self, size: PhysicalSize<u32>, fullscreen: bool) {
        self.mailbox
            .post_and_wait(Command::PokeSetVideoMode { size, fullscreen });
    }

    pub fn set_filtering(&self, index: u32, smooth: bool, ctx_scaling: bool) {
        self.mailbox.post_and_wait(Command::PokeSetFiltering {
            index,
            smooth,
            ctx_scaling,
        });
    }

    pub fn set_fbo_state(&self, state: bool) {
        self.mailbox.post_and_wait(Command::PokeSetFboState(state));
    }

    pub fn get_fbo_state(&self) -> bool {
        self.mailbox.post_and_wait(Command::PokeGetFboState).is_ok()
    }

    pub fn set_aspect_ratio(&self, index: u32) {
        self.mailbox.post_and_wait(Command::PokeSetAspectRatio(index));
    }

    /// ### English
    /// Requests `apply_state_changes` on the driver before the next draw.
    ///
    /// ### 中文
    /// 请求在下一次绘制前对驱动执行 `apply_state_changes`。
    pub fn apply_state_changes(&self) {
        self.shared.frame.request_state_changes();
        self.shared.waker.wake();
    }

    /// ### English
    /// Replaces the menu texture. The pixels are copied; the driver sees them before the next draw.
    ///
    /// ### 中文
    /// 替换菜单纹理。像素会被复制；驱动在下一次绘制前看到它们。
    pub fn set_texture_frame(&self, pixels: &[u8], rgb32: bool, width: u32, height: u32, alpha: f32) {
        self.shared
            .frame
            .set_texture_frame(pixels, rgb32, width, height, alpha);
    }

    pub fn set_texture_enable(&self, enable: bool, full_screen: bool) {
        self.shared.frame.set_texture_enable(enable, full_screen);
    }

    pub fn show_mouse(&self, state: bool) {
        self.mailbox.post_and_wait(Command::PokeShowMouse(state));
    }

    pub fn grab_mouse_toggle(&self) {
        self.mailbox.post_and_wait(Command::PokeGrabMouseToggle);
    }

    pub fn set_hdr_max_nits(&self, max_nits: f32) {
        self.mailbox
            .post_and_wait(Command::PokeSetHdrMaxNits(max_nits));
    }

    pub fn set_hdr_paper_white_nits(&self, paper_white_nits: f32) {
        self.mailbox
            .post_and_wait(Command::PokeSetHdrPaperWhiteNits(paper_white_nits));
    }

    pub fn set_hdr_contrast(&self, contrast: f32) {
        self.mailbox
            .post_and_wait(Command::PokeSetHdrContrast(contrast));
    }

    pub fn set_hdr_expand_gamut(&self, expand_gamut: bool) {
        self.mailbox
            .post_and_wait(Command::PokeSetHdrExpandGamut(expand_gamut));
    }

    /// ### English
    /// Runs a font initializer with the live driver on the render thread and returns the font it
    /// produced. `None` if the initializer failed or the render thread is gone.
    ///
    /// #### Parameters
    /// - `path`: Font file, or `None` for the driver's default font.
    /// - `size`: Point size.
    /// - `api`: Render API the font must target.
    /// - `init`: Initializer; receives the request with `is_threaded` set.
    ///
    /// ### 中文
    /// 在渲染线程上以实时驱动运行字体初始化器，并返回其生成的字体。
    /// 若初始化器失败或渲染线程已退出则返回 `None`。
    ///
    /// #### 参数
    /// - `path`：字体文件；`None` 表示驱动默认字体。
    /// - `size`：字号。
    /// - `api`：字体所针对的渲染 API。
    /// - `init`：初始化器；收到的请求已设置 `is_threaded`。
    pub fn font_init<T, F>(
        &self,
        path: Option<&Path>,
        size: f32,
        api: FontRenderApi,
        init: F,
    ) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn VideoDriver, &FontRequest) -> Option<T> + Send + 'static,
    {
        let request = FontRequest {
            path: path.map(Path::to_path_buf),
            size,
            api,
            is_threaded: true,
        };
        let (tx, rx) = channel::bounded(1);
        let task: RenderTask = Box::new(move |driver: &mut dyn VideoDriver| {
            let _ = tx.send(init(driver, &request));
        });

        if !self.mailbox.post_and_wait(Command::FontInit(task)).is_ok() {
            return None;
        }
        rx.try_recv().ok().flatten()
    }

    /// ### English
    /// Runs `command` with the live driver on the render thread and returns its result verbatim.
    /// `None` only if the render thread is gone.
    ///
    /// ### 中文
    /// 在渲染线程上以实时驱动运行 `command`，并原样返回其结果。
    /// 仅当渲染线程已退出时返回 `None`。
    pub fn custom_command<R, F>(&self, command: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn VideoDriver) -> R + Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let task: RenderTask = Box::new(move |driver: &mut dyn VideoDriver| {
            let _ = tx.send(command(driver));
        });

        if !self.mailbox.post_and_wait(Command::CustomCommand(task)).is_ok() {
            return None;
        }
        rx.try_recv().ok()
    }

    /// ### English
    /// Identifier of the wrapped driver.
    ///
    /// ### 中文
    /// 被包装驱动的标识。
    pub fn driver_ident(&self) -> &str {
        &self.capabilities.ident
    }

    /// ### English
    /// Tears down the driver and joins the render thread. Idempotent; every later call resolves to
    /// a neutral failure without blocking.
    ///
    /// ### 中文
    /// 销毁驱动并 join 渲染线程。可重复调用；之后的每个调用都会立即得到中性失败而不会阻塞。
    pub fn free(&self) {
        /*
        ### English
        The handle lock is held until the join completes, so a concurrent `free` returns only after
        teardown.

        ### 中文
        handle 锁一直持有到 join 完成，因此并发的 `free` 只会在销毁完成后返回。
        */
        let mut handle = self.thread.lock();
        let Some(thread) = handle.take() else {
            return;
        };

        if !self.mailbox.post_and_wait(Command::Free).is_ok() {
            log::debug!("render thread had already stopped before free");
        }
        if thread.join().is_err() {
            log::warn!("render thread panicked");
        }
    }
}

impl Drop for ThreadedVideo {
    /// ### English
    /// Ensures the render thread is stopped when the proxy is dropped.
    ///
    /// ### 中文
    /// 确保在代理 drop 时停止渲染线程。
    fn drop(&mut self) {
        self.free();
    }
}
