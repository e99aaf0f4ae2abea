//! ### English
//! Dedicated render thread: constructs and exclusively owns the driver, answers mailbox commands
//! and draws frames taken from the frame slot.
//!
//! Each iteration applies at most one command, then attempts one frame, so neither control calls
//! nor frames can starve the other. With nothing to do the thread parks on command/wake readiness.
//!
//! ### 中文
//! 独立渲染线程：构建并独占持有驱动，应答 mailbox 命令，并绘制从 frame slot 取出的帧。
//!
//! 每次迭代最多处理一个命令，然后尝试绘制一帧，因此控制调用与帧提交互不饿死。
//! 无事可做时线程会在命令/唤醒就绪上 park。

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{self as channel, Select, TryRecvError};

use crate::engine::config::VideoInfo;
use crate::engine::driver::{VideoDriver, VideoOverlay, VideoPoke};
use crate::engine::flags::ThreadFlags;
use crate::engine::frame::{BackBuffer, TextureBuffer};

use super::command::{Capabilities, Command, CommandKind, Reply, ReplyPayload};
use super::mailbox::MailboxServer;
use super::shared::Shared;

pub(super) type DriverFactory<D> = Box<dyn FnOnce(&VideoInfo) -> Result<D, String> + Send>;
pub(super) type InputBinder<D> = Box<dyn FnOnce(&mut D) + Send>;

/// ### English
/// Everything the render thread needs, moved into it at spawn.
///
/// ### 中文
/// 渲染线程所需的全部数据，在 spawn 时移入线程。
pub(super) struct RenderThreadInit<D> {
    pub(super) info: VideoInfo,
    pub(super) present_interval: Option<Duration>,
    pub(super) factory: DriverFactory<D>,
    pub(super) bind_input: InputBinder<D>,
    pub(super) shared: Arc<Shared>,
    pub(super) server: MailboxServer,
    pub(super) wake_rx: channel::Receiver<()>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RenderState {
    Starting,
    Running,
    /// ### English
    /// Commands are still answered; draws are skipped.
    ///
    /// ### 中文
    /// 仍应答命令，但跳过绘制。
    Idle,
    Stopping,
    Stopped,
}

/// ### English
/// Clears `ALIVE` however the thread exits (including a panicking driver), so producers never
/// wait on a thread that is gone.
///
/// ### 中文
/// 无论线程以何种方式退出（包括驱动 panic）都会清除 `ALIVE`，使生产者不会等待已退出的线程。
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.mark_dead();
    }
}

/// ### English
/// Render thread entry function. Returns after `Free`, after the proxy is dropped, or on
/// initialization failure.
///
/// ### 中文
/// 渲染线程入口函数。在收到 `Free`、代理被 drop 或初始化失败后返回。
pub(super) fn run_render_thread<D: VideoDriver>(init: RenderThreadInit<D>) {
    let RenderThreadInit {
        info,
        present_interval,
        factory,
        bind_input,
        shared,
        server,
        wake_rx,
    } = init;
    let _exit = ExitGuard(shared.clone());
    log::debug!("render thread: {:?}", RenderState::Starting);

    let mut driver = match factory(&info) {
        Ok(driver) => driver,
        Err(err) => {
            log::warn!("video driver failed to initialize: {err}");
            server.reply(Reply::new(
                CommandKind::Init,
                ReplyPayload::InitFailed(err),
            ));
            return;
        }
    };

    /*
    ### English
    Input binding happens on this thread, right after the driver exists.

    ### 中文
    输入绑定在本线程上、驱动创建完成后立即进行。
    */
    bind_input(&mut driver);

    let capabilities = Capabilities {
        ident: driver.ident().to_string(),
        overlay: driver.overlay().is_some(),
        poke: driver.poke().is_some(),
    };

    shared.flags.insert(ThreadFlags::ALIVE);
    let mut thread = RenderThread {
        driver,
        info,
        present_interval,
        shared,
        server,
        wake_rx,
        state: RenderState::Starting,
        back: BackBuffer::default(),
        texture: TextureBuffer::default(),
        alpha: Vec::new(),
        nonblock: false,
        suppress_screensaver: false,
    };
    thread.refresh_driver_state();

    let ident = capabilities.ident.clone();
    if !thread.server.reply(Reply::new(
        CommandKind::Init,
        ReplyPayload::Init(capabilities),
    )) {
        log::warn!("proxy went away during video driver init; tearing down");
        return;
    }

    log::info!("render thread started ({ident} driver)");
    thread.run();
}

struct RenderThread<D> {
    driver: D,
    info: VideoInfo,
    present_interval: Option<Duration>,
    shared: Arc<Shared>,
    server: MailboxServer,
    wake_rx: channel::Receiver<()>,
    state: RenderState,
    back: BackBuffer,
    texture: TextureBuffer,
    /// ### English
    /// Scratch copy of the alpha table.
    ///
    /// ### 中文
    /// alpha 表的临时副本。
    alpha: Vec<f32>,
    /// ### English
    /// Non-blocking / screensaver state last forwarded to the driver.
    ///
    /// ### 中文
    /// 最近一次转交给驱动的非阻塞 / 屏保状态。
    nonblock: bool,
    suppress_screensaver: bool,
}

impl<D: VideoDriver> RenderThread<D> {
    fn run(mut self) {
        self.transition(RenderState::Running);

        let free_requested = loop {
            let handled = match self.server.try_take() {
                Ok(command) => {
                    if self.apply(command).is_break() {
                        break true;
                    }
                    true
                }
                Err(TryRecvError::Empty) => false,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("render thread: proxy dropped without free");
                    break false;
                }
            };

            self.sync_control_state();
            let rendered = self.state == RenderState::Running && self.render_pending_frame();
            if !handled && !rendered {
                self.park();
            }
        };

        self.stop(free_requested);
    }

    fn transition(&mut self, next: RenderState) {
        if self.state != next {
            log::debug!("render thread: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// ### English
    /// Applies one command and replies to it. `Free` is answered by [`Self::stop`] after teardown.
    ///
    /// ### 中文
    /// 执行一个命令并回复。`Free` 在销毁完成后由 [`Self::stop`] 回复。
    fn apply(&mut self, command: Command) -> ControlFlow<()> {
        let kind = command.kind();
        log::trace!("render thread: applying {kind:?}");

        let payload = match command {
            Command::Free => return ControlFlow::Break(()),
            Command::SetShader { kind: shader, path } => {
                ReplyPayload::Bool(self.driver.set_shader(shader, path.as_deref()))
            }
            Command::Alive => {
                self.refresh_driver_state();
                ReplyPayload::Bool(self.shared.flags.contains(ThreadFlags::ALIVE))
            }
            Command::SetViewport {
                width,
                height,
                force_full,
                allow_rotate,
            } => {
                self.driver
                    .set_viewport(width, height, force_full, allow_rotate);
                self.shared.viewport.store(self.driver.viewport_info());
                ReplyPayload::Done
            }
            Command::SetRotation(rotation) => {
                self.driver.set_rotation(rotation);
                self.shared.viewport.store(self.driver.viewport_info());
                ReplyPayload::Done
            }
            Command::ReadViewport {
                expected,
                mut buffer,
            } => {
                let viewport = self.driver.viewport_info();
                let ok = if viewport == expected {
                    self.driver
                        .read_viewport(&mut buffer, self.state == RenderState::Idle)
                } else {
                    log::warn!(
                        "viewport changed from {expected:?} to {viewport:?} before read-back; refusing"
                    );
                    false
                };
                ReplyPayload::ReadViewport {
                    ok,
                    viewport,
                    buffer,
                }
            }
            Command::OverlayEnable(state) => self.with_overlay(|overlay| overlay.enable(state)),
            Command::OverlayLoad(images) => match self.driver.overlay() {
                Some(overlay) => ReplyPayload::Bool(overlay.load(&images)),
                None => ReplyPayload::Failed,
            },
            Command::OverlayTexGeom { index, rect } => {
                self.with_overlay(|overlay| overlay.tex_geom(index, rect))
            }
            Command::OverlayVertexGeom { index, rect } => {
                self.with_overlay(|overlay| overlay.vertex_geom(index, rect))
            }
            Command::OverlayFullScreen(enable) => {
                self.with_overlay(|overlay| overlay.full_screen(enable))
            }
            Command::PokeSetVideoMode { size, fullscreen } => {
                self.with_poke(|poke| poke.set_video_mode(size, fullscreen))
            }
            Command::PokeSetFiltering {
                index,
                smooth,
                ctx_scaling,
            } => self.with_poke(|poke| poke.set_filtering(index, smooth, ctx_scaling)),
            Command::PokeSetFboState(state) => self.with_poke(|poke| poke.set_fbo_state(state)),
            Command::PokeGetFboState => match self.driver.poke() {
                Some(poke) => ReplyPayload::Bool(poke.get_fbo_state()),
                None => ReplyPayload::Failed,
            },
            Command::PokeSetAspectRatio(index) => {
                self.with_poke(|poke| poke.set_aspect_ratio(index))
            }
            Command::FontInit(task) | Command::CustomCommand(task) => {
                let driver: &mut dyn VideoDriver = &mut self.driver;
                task(driver);
                ReplyPayload::Done
            }
            Command::PokeShowMouse(state) => self.with_poke(|poke| poke.show_mouse(state)),
            Command::PokeGrabMouseToggle => self.with_poke(|poke| poke.grab_mouse_toggle()),
            Command::PokeSetHdrMaxNits(nits) => self.with_poke(|poke| poke.set_hdr_max_nits(nits)),
            Command::PokeSetHdrPaperWhiteNits(nits) => {
                self.with_poke(|poke| poke.set_hdr_paper_white_nits(nits))
            }
            Command::PokeSetHdrContrast(contrast) => {
                self.with_poke(|poke| poke.set_hdr_contrast(contrast))
            }
            Command::PokeSetHdrExpandGamut(expand) => {
                self.with_poke(|poke| poke.set_hdr_expand_gamut(expand))
            }
        };

        self.server.reply(Reply::new(kind, payload));
        ControlFlow::Continue(())
    }

    fn with_overlay(&mut self, f: impl FnOnce(&mut dyn VideoOverlay)) -> ReplyPayload {
        match self.driver.overlay() {
            Some(overlay) => {
                f(overlay);
                ReplyPayload::Done
            }
            None => ReplyPayload::Failed,
        }
    }

    fn with_poke(&mut self, f: impl FnOnce(&mut dyn VideoPoke)) -> ReplyPayload {
        match self.driver.poke() {
            Some(poke) => {
                f(poke);
                ReplyPayload::Done
            }
            None => ReplyPayload::Failed,
        }
    }

    /// ### English
    /// Follows producer-side control flags: idle state, non-blocking state, screensaver.
    ///
    /// ### 中文
    /// 跟随生产者侧的控制标志：idle 状态、非阻塞状态、屏保。
    fn sync_control_state(&mut self) {
        let flags = self.shared.flags.load();

        match (self.state, flags.contains(ThreadFlags::IS_IDLE)) {
            (RenderState::Running, true) => self.transition(RenderState::Idle),
            (RenderState::Idle, false) => self.transition(RenderState::Running),
            _ => {}
        }

        let nonblock = flags.contains(ThreadFlags::NONBLOCK);
        if nonblock != self.nonblock {
            self.nonblock = nonblock;
            self.driver
                .set_nonblock_state(nonblock, self.info.adaptive_vsync, self.info.swap_interval);
        }

        let suppress = flags.contains(ThreadFlags::SUPPRESS_SCREENSAVER);
        if suppress != self.suppress_screensaver {
            self.suppress_screensaver = suppress;
            self.driver.suppress_screensaver(suppress);
        }
    }

    /// ### English
    /// Draws the pending frame, if any. Returns whether a frame was drawn.
    ///
    /// ### 中文
    /// 绘制待处理帧（若有）。返回是否绘制了帧。
    fn render_pending_frame(&mut self) -> bool {
        let Some(frame) = self.shared.frame.try_take_frame(&mut self.back) else {
            return false;
        };

        apply_side_channels(
            &mut self.driver,
            &self.shared,
            &mut self.texture,
            &mut self.alpha,
        );

        let count = frame.frame_count;
        if !self.driver.frame(frame) {
            log::debug!("{} driver failed to draw frame {count}", self.driver.ident());
        }
        self.shared.frame.mark_rendered(count);
        self.refresh_driver_state();
        true
    }

    fn present_last_frame(&mut self) {
        if self.back.frame_count() == 0 {
            return;
        }
        apply_side_channels(
            &mut self.driver,
            &self.shared,
            &mut self.texture,
            &mut self.alpha,
        );
        self.driver.frame(self.back.represent());
        self.refresh_driver_state();
    }

    /// ### English
    /// Pulls alive/focus/windowed state and the viewport snapshot from the driver.
    ///
    /// ### 中文
    /// 从驱动拉取 alive/focus/windowed 状态以及视口快照。
    fn refresh_driver_state(&mut self) {
        if self.driver.alive() {
            self.shared.flags.insert(ThreadFlags::ALIVE);
        } else if self.shared.flags.contains(ThreadFlags::ALIVE) {
            log::info!("{} driver is no longer alive", self.driver.ident());
            self.shared.mark_dead();
        }
        let focus = self.driver.focus();
        self.shared.flags.set(ThreadFlags::FOCUS, focus);
        let windowed = self.driver.has_windowed();
        self.shared.flags.set(ThreadFlags::HAS_WINDOWED, windowed);
        self.shared.viewport.store(self.driver.viewport_info());
    }

    /// ### English
    /// Blocks until a command or a wake arrives. With a present interval configured, re-presents
    /// the last frame each time the interval elapses without activity.
    ///
    /// ### 中文
    /// 阻塞直到有命令或唤醒到达。若配置了呈现间隔，则在间隔内无活动时重新呈现上一帧。
    fn park(&mut self) {
        let ready = {
            let mut select = Select::new();
            select.recv(self.server.commands());
            select.recv(&self.wake_rx);
            match self.present_interval {
                Some(interval) if self.state == RenderState::Running => {
                    select.ready_timeout(interval).is_ok()
                }
                _ => {
                    select.ready();
                    true
                }
            }
        };

        while self.wake_rx.try_recv().is_ok() {}

        if !ready {
            self.present_last_frame();
        }
    }

    /// ### English
    /// Stopping: clear `ALIVE`, drop the driver, answer `Free`, fail anything still queued.
    ///
    /// ### 中文
    /// 停止：清除 `ALIVE`，drop 驱动，应答 `Free`，并对仍在队列中的命令回复失败。
    fn stop(mut self, free_requested: bool) {
        self.transition(RenderState::Stopping);
        let RenderThread {
            driver,
            shared,
            server,
            ..
        } = self;

        shared.mark_dead();
        let ident = driver.ident().to_string();
        drop(driver);

        let stats = shared.frame.stats();
        log::info!(
            "threaded video stats ({ident}): frames pushed {}, frames dropped {}",
            stats.hits,
            stats.misses
        );

        if free_requested {
            server.reply(Reply::new(CommandKind::Free, ReplyPayload::Done));
        }
        server.close();
        log::debug!("render thread: {:?}", RenderState::Stopped);
    }
}

/// ### English
/// Pushes alpha, menu texture and pending state changes to the driver before a draw.
///
/// ### 中文
/// 在绘制前把 alpha、菜单纹理以及待处理的状态变更推送给驱动。
fn apply_side_channels<D: VideoDriver>(
    driver: &mut D,
    shared: &Shared,
    texture: &mut TextureBuffer,
    alpha: &mut Vec<f32>,
) {
    if shared.alpha.take_if_dirty(alpha) {
        if let Some(overlay) = driver.overlay() {
            for (index, &value) in alpha.iter().enumerate() {
                overlay.set_alpha(index, value);
            }
        }
    }

    if let Some(poke) = driver.poke() {
        if shared.frame.take_texture(texture) {
            poke.set_texture_frame(
                &texture.pixels,
                texture.rgb32,
                texture.width,
                texture.height,
                texture.alpha,
            );
        }
        let (enable, full_screen) = shared.frame.texture_enable();
        poke.set_texture_enable(enable, full_screen);
        if shared.frame.take_state_changes() {
            poke.apply_state_changes();
        }
    }
}
