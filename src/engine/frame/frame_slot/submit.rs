use std::time::{Duration, Instant};

use crate::engine::flags::ThreadFlags;

use super::FrameSlot;

impl FrameSlot {
    /// ### English
    /// Submits a frame (producer side).
    ///
    /// If the previous frame has not been consumed yet, blocking mode waits for the render thread
    /// (at most `wait`) and counts a hit; non-blocking mode, idle mode and a timed-out wait overwrite
    /// the pending frame and count a miss. `pixels == None` is a dupe: the render thread re-draws
    /// the last frame it took with the new message. The message always travels with this frame.
    ///
    /// Returns `false` (frame not accepted) once the render thread is no longer alive.
    ///
    /// #### Parameters
    /// - `pixels`: Frame bytes, or `None` for a dupe.
    /// - `width`/`height`/`pitch`: Declared geometry of `pixels`.
    /// - `msg`: On-screen message for this frame; `None` clears the previous one.
    /// - `wait`: Upper bound for the blocking-mode wait (`Duration::MAX` waits without bound).
    ///
    /// ### 中文
    /// 提交一帧（生产者侧）。
    ///
    /// 若上一帧尚未被消费：阻塞模式会等待渲染线程（最多 `wait`）并计为 hit；非阻塞模式、idle 模式
    /// 以及等待超时都会覆盖待处理帧并计为 miss。`pixels == None` 表示 dupe：渲染线程用新消息
    /// 重新绘制它最近取到的帧。消息总是与本帧一同传递。
    ///
    /// 渲染线程不再存活后返回 `false`（帧未被接受）。
    ///
    /// #### 参数
    /// - `pixels`：帧数据；`None` 表示 dupe。
    /// - `width`/`height`/`pitch`：`pixels` 的声明几何信息。
    /// - `msg`：本帧的屏显消息；`None` 会清除之前的消息。
    /// - `wait`：阻塞模式等待的上限（`Duration::MAX` 表示无上限等待）。
    pub(crate) fn submit(
        &self,
        pixels: Option<&[u8]>,
        width: u32,
        height: u32,
        pitch: usize,
        msg: Option<&str>,
        wait: Duration,
    ) -> bool {
        let mut state = self.state.lock();
        if !self.flags.contains(ThreadFlags::ALIVE) {
            return false;
        }

        let flags = self.flags.load();
        if flags.contains(ThreadFlags::FRAME_UPDATED)
            && !flags.intersects(ThreadFlags::NONBLOCK | ThreadFlags::IS_IDLE)
        {
            let deadline = Instant::now().checked_add(wait);
            while self.flags.contains(ThreadFlags::FRAME_UPDATED | ThreadFlags::ALIVE) {
                match deadline {
                    Some(deadline) => {
                        if self.consumed.wait_until(&mut state, deadline).timed_out() {
                            break;
                        }
                    }
                    None => self.consumed.wait(&mut state),
                }
            }
            if !self.flags.contains(ThreadFlags::ALIVE) {
                return false;
            }
        }

        let overwriting = self.flags.contains(ThreadFlags::FRAME_UPDATED);
        if overwriting {
            state.stats.misses += 1;
        } else {
            state.stats.hits += 1;
        }

        match pixels {
            Some(pixels) => {
                state.buffer.clear();
                state.buffer.extend_from_slice(pixels);
                state.dupe = false;
            }
            /*
            ### English
            A dupe over an unconsumed real frame keeps that frame's pixels.

            ### 中文
            覆盖未消费真实帧的 dupe 保留该帧像素。
            */
            None if !overwriting => state.dupe = true,
            None => {}
        }

        state.width = width;
        state.height = height;
        state.pitch = pitch;
        state.msg.clear();
        if let Some(msg) = msg {
            state.msg.push_str(msg);
        }
        state.stats.frames += 1;
        self.flags.insert(ThreadFlags::FRAME_UPDATED);
        drop(state);

        self.waker.wake();
        true
    }
}
