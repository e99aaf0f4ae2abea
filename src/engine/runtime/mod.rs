//! ### English
//! Render-thread runtime orchestration (public API).
//!
//! ### 中文
//! 渲染线程运行时编排（对外公开 API）。

mod command;
mod driver_impl;
mod mailbox;
mod render_thread;
mod shared;

mod threaded_video;

pub use threaded_video::ThreadedVideo;
