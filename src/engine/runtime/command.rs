//! ### English
//! Command protocol between the producer thread and the render thread.
//!
//! One variant per operation, each carrying only what that operation needs. Replies carry the
//! discriminant of the command they answer so the producer can check the rendezvous.
//!
//! ### 中文
//! 生产者线程与渲染线程之间的命令协议。
//!
//! 每个操作一个变体，只携带该操作所需的数据。回复携带其所应答命令的判别值，
//! 以便生产者校验会合是否匹配。

use std::path::PathBuf;

use dpi::PhysicalSize;

use crate::engine::driver::{OverlayRect, ShaderType, TextureImage, VideoDriver, Viewport};

/// ### English
/// Delegate executed on the render thread with the live driver (font init / custom commands).
/// Results travel back through a channel captured by the closure.
///
/// ### 中文
/// 在渲染线程上以实时驱动执行的委托（字体初始化 / 自定义命令）。
/// 结果通过闭包捕获的 channel 传回。
pub(crate) type RenderTask = Box<dyn FnOnce(&mut dyn VideoDriver) + Send>;

/// ### English
/// Command discriminant.
///
/// ### 中文
/// 命令判别值。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommandKind {
    Init,
    SetShader,
    Free,
    Alive,
    SetViewport,
    SetRotation,
    ReadViewport,
    OverlayEnable,
    OverlayLoad,
    OverlayTexGeom,
    OverlayVertexGeom,
    OverlayFullScreen,
    PokeSetVideoMode,
    PokeSetFiltering,
    PokeSetFboState,
    PokeGetFboState,
    PokeSetAspectRatio,
    FontInit,
    CustomCommand,
    PokeShowMouse,
    PokeGrabMouseToggle,
    PokeSetHdrMaxNits,
    PokeSetHdrPaperWhiteNits,
    PokeSetHdrContrast,
    PokeSetHdrExpandGamut,
}

/// ### English
/// Commands sent from the producer thread to the render thread.
/// `Init` has no variant: the render thread reports it unprompted right after startup.
///
/// ### 中文
/// 从生产者线程发送到渲染线程的命令。
/// `Init` 没有对应变体：渲染线程启动后会主动回报初始化结果。
pub(crate) enum Command {
    SetShader {
        kind: ShaderType,
        path: Option<PathBuf>,
    },
    /// ### English
    /// Tears down the driver and stops the render thread.
    ///
    /// ### 中文
    /// 销毁驱动并停止渲染线程。
    Free,
    /// ### English
    /// Blocking alive check (used while idle).
    ///
    /// ### 中文
    /// 阻塞式存活检查（idle 时使用）。
    Alive,
    SetViewport {
        width: u32,
        height: u32,
        force_full: bool,
        allow_rotate: bool,
    },
    SetRotation(u32),
    /// ### English
    /// Viewport read-back into `buffer`, allowed only while the live viewport still equals
    /// `expected`.
    ///
    /// ### 中文
    /// 将视口回读到 `buffer`，仅当实时视口仍等于 `expected` 时允许。
    ReadViewport {
        expected: Viewport,
        buffer: Vec<u8>,
    },
    OverlayEnable(bool),
    OverlayLoad(Vec<TextureImage>),
    OverlayTexGeom {
        index: usize,
        rect: OverlayRect,
    },
    OverlayVertexGeom {
        index: usize,
        rect: OverlayRect,
    },
    OverlayFullScreen(bool),
    PokeSetVideoMode {
        size: PhysicalSize<u32>,
        fullscreen: bool,
    },
    PokeSetFiltering {
        index: u32,
        smooth: bool,
        ctx_scaling: bool,
    },
    PokeSetFboState(bool),
    PokeGetFboState,
    PokeSetAspectRatio(u32),
    FontInit(RenderTask),
    CustomCommand(RenderTask),
    PokeShowMouse(bool),
    PokeGrabMouseToggle,
    PokeSetHdrMaxNits(f32),
    PokeSetHdrPaperWhiteNits(f32),
    PokeSetHdrContrast(f32),
    PokeSetHdrExpandGamut(bool),
}

impl Command {
    pub(crate) fn kind(&self) -> CommandKind {
        match self {
            Command::SetShader { .. } => CommandKind::SetShader,
            Command::Free => CommandKind::Free,
            Command::Alive => CommandKind::Alive,
            Command::SetViewport { .. } => CommandKind::SetViewport,
            Command::SetRotation(_) => CommandKind::SetRotation,
            Command::ReadViewport { .. } => CommandKind::ReadViewport,
            Command::OverlayEnable(_) => CommandKind::OverlayEnable,
            Command::OverlayLoad(_) => CommandKind::OverlayLoad,
            Command::OverlayTexGeom { .. } => CommandKind::OverlayTexGeom,
            Command::OverlayVertexGeom { .. } => CommandKind::OverlayVertexGeom,
            Command::OverlayFullScreen(_) => CommandKind::OverlayFullScreen,
            Command::PokeSetVideoMode { .. } => CommandKind::PokeSetVideoMode,
            Command::PokeSetFiltering { .. } => CommandKind::PokeSetFiltering,
            Command::PokeSetFboState(_) => CommandKind::PokeSetFboState,
            Command::PokeGetFboState => CommandKind::PokeGetFboState,
            Command::PokeSetAspectRatio(_) => CommandKind::PokeSetAspectRatio,
            Command::FontInit(_) => CommandKind::FontInit,
            Command::CustomCommand(_) => CommandKind::CustomCommand,
            Command::PokeShowMouse(_) => CommandKind::PokeShowMouse,
            Command::PokeGrabMouseToggle => CommandKind::PokeGrabMouseToggle,
            Command::PokeSetHdrMaxNits(_) => CommandKind::PokeSetHdrMaxNits,
            Command::PokeSetHdrPaperWhiteNits(_) => CommandKind::PokeSetHdrPaperWhiteNits,
            Command::PokeSetHdrContrast(_) => CommandKind::PokeSetHdrContrast,
            Command::PokeSetHdrExpandGamut(_) => CommandKind::PokeSetHdrExpandGamut,
        }
    }
}

/// ### English
/// Optional capabilities of the wrapped driver, reported once at init.
///
/// ### 中文
/// 被包装驱动的可选能力，在初始化时报告一次。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Capabilities {
    pub(crate) ident: String,
    pub(crate) overlay: bool,
    pub(crate) poke: bool,
}

pub(crate) enum ReplyPayload {
    /// ### English
    /// Command executed; nothing to return.
    ///
    /// ### 中文
    /// 命令已执行，无返回值。
    Done,
    /// ### English
    /// Neutral failure: driver gone, capability missing, or render thread stopping.
    ///
    /// ### 中文
    /// 中性失败：驱动已销毁、能力缺失或渲染线程正在停止。
    Failed,
    Bool(bool),
    Init(Capabilities),
    InitFailed(String),
    ReadViewport {
        ok: bool,
        viewport: Viewport,
        buffer: Vec<u8>,
    },
}

/// ### English
/// Reply to one command.
///
/// ### 中文
/// 对单个命令的回复。
pub(crate) struct Reply {
    pub(crate) kind: CommandKind,
    pub(crate) payload: ReplyPayload,
}

impl Reply {
    #[inline]
    pub(crate) fn new(kind: CommandKind, payload: ReplyPayload) -> Self {
        Self { kind, payload }
    }

    #[inline]
    pub(crate) fn failed(kind: CommandKind) -> Self {
        Self::new(kind, ReplyPayload::Failed)
    }

    /// ### English
    /// Boolean view of the reply: `Done`/`Init` are `true`, `Failed` is `false`.
    ///
    /// ### 中文
    /// 回复的布尔视图：`Done`/`Init` 为 `true`，`Failed` 为 `false`。
    pub(crate) fn is_ok(&self) -> bool {
        match &self.payload {
            ReplyPayload::Done | ReplyPayload::Init(_) => true,
            ReplyPayload::Failed | ReplyPayload::InitFailed(_) => false,
            ReplyPayload::Bool(value) => *value,
            ReplyPayload::ReadViewport { ok, .. } => *ok,
        }
    }
}
