use crate::engine::driver::FrameRef;
use crate::engine::flags::ThreadFlags;

use super::super::BackBuffer;
use super::FrameSlot;

impl FrameSlot {
    /// ### English
    /// Takes the pending frame into `back` (render-thread side, non-blocking).
    ///
    /// Returns `None` when the frame counter has not advanced since the last take. Otherwise swaps
    /// the front buffer into `back` (dupes keep `back`'s pixels), wakes a producer waiting on
    /// consumption and returns a view of `back`.
    ///
    /// ### 中文
    /// 把待处理帧取到 `back` 中（渲染线程侧，非阻塞）。
    ///
    /// 若自上次取帧后帧计数未前进则返回 `None`。否则把 front buffer 交换到 `back`
    /// （dupe 保留 `back` 的像素），唤醒等待消费的生产者，并返回 `back` 的视图。
    pub(crate) fn try_take_frame<'a>(&self, back: &'a mut BackBuffer) -> Option<FrameRef<'a>> {
        let mut state = self.state.lock();
        if state.stats.frames == back.count {
            return None;
        }

        if !state.dupe {
            std::mem::swap(&mut state.buffer, &mut back.pixels);
            back.has_pixels = true;
        }
        state.dupe = false;

        back.width = state.width;
        back.height = state.height;
        back.pitch = state.pitch;
        back.count = state.stats.frames;
        back.msg.clear();
        back.msg.push_str(&state.msg);

        self.flags.remove(ThreadFlags::FRAME_UPDATED);
        drop(state);
        self.consumed.notify_all();

        Some(back.view())
    }
}
