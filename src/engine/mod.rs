/// ### English
/// Engine internal modules (render thread, mailbox, frame hand-off and shared state).
///
/// ### 中文
/// 引擎内部模块（渲染线程、mailbox、帧交接、共享状态等）。
pub(crate) mod alpha;
pub mod config;
pub mod driver;
pub mod error;
pub(crate) mod flags;
pub mod frame;
pub mod runtime;
pub(crate) mod viewport;
pub(crate) mod wake;
