//! ### English
//! Errors reported while constructing the threaded proxy.
//!
//! Control-path calls never return these; they resolve to neutral values instead.
//!
//! ### 中文
//! 构建线程代理时报告的错误。
//!
//! 控制路径调用不会返回这些错误，而是返回中性值。

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to spawn render thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
    #[error("Video driver failed to initialize: {0}")]
    InitFailed(String),
    #[error("Timed out after {0:?} waiting for the render thread to initialize")]
    InitTimeout(Duration),
    #[error("Render thread exited before reporting initialization")]
    RenderThreadGone,
}
