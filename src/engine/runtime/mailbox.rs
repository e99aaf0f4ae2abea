//! ### English
//! Single-slot request/reply exchange between the producer thread and the render thread.
//!
//! Built on a capacity-1 command channel and a capacity-1 reply channel. The producer side is
//! serialized by one lock held across send-and-wait, so at most one command is ever outstanding.
//! When the render thread is gone both channels disconnect and every call resolves to a neutral
//! failure instead of blocking.
//!
//! ### 中文
//! 生产者线程与渲染线程之间的单槽请求/回复交换。
//!
//! 基于容量为 1 的命令 channel 与容量为 1 的回复 channel。生产者侧由一把在发送并等待期间
//! 持有的锁串行化，因此任何时刻最多只有一个未完成命令。渲染线程退出后两个 channel 都会断开，
//! 每次调用都会得到中性失败而不是阻塞。

use std::time::Duration;

use crossbeam_channel::{self as channel, RecvTimeoutError, TryRecvError};
use parking_lot::{Mutex, MutexGuard};

use super::command::{Command, CommandKind, Reply};

/// ### English
/// Creates a connected producer/render-thread mailbox pair.
///
/// ### 中文
/// 创建一对相连的生产者/渲染线程 mailbox。
pub(crate) fn mailbox() -> (Mailbox, MailboxServer) {
    let (command_tx, command_rx) = channel::bounded(1);
    let (reply_tx, reply_rx) = channel::bounded(1);
    (
        Mailbox {
            port: Mutex::new(Port {
                commands: command_tx,
                replies: reply_rx,
            }),
        },
        MailboxServer {
            commands: command_rx,
            replies: reply_tx,
        },
    )
}

struct Port {
    commands: channel::Sender<Command>,
    replies: channel::Receiver<Reply>,
}

/// ### English
/// Producer side of the mailbox.
///
/// ### 中文
/// mailbox 的生产者侧。
pub(crate) struct Mailbox {
    port: Mutex<Port>,
}

/// ### English
/// Held while mutating control flags so they change in issuance order with commands.
///
/// ### 中文
/// 修改控制标志时持有，使其与命令按发出顺序变化。
pub(crate) struct ControlGuard<'a> {
    _port: MutexGuard<'a, Port>,
}

impl Mailbox {
    /// ### English
    /// Posts `command` and blocks until the render thread answers it.
    ///
    /// Returns a failure reply of the same kind if the render thread is gone (or goes away while
    /// the command is in flight). A reply whose kind does not match the request is treated as a
    /// failure.
    ///
    /// ### 中文
    /// 发送 `command` 并阻塞直到渲染线程应答。
    ///
    /// 若渲染线程已退出（或在命令执行期间退出），返回同类型的失败回复。
    /// 类型与请求不匹配的回复视为失败。
    pub(crate) fn post_and_wait(&self, command: Command) -> Reply {
        let kind = command.kind();
        let port = self.port.lock();

        if port.commands.send(command).is_err() {
            log::trace!("mailbox: {kind:?} posted after render thread exit");
            return Reply::failed(kind);
        }

        match port.replies.recv() {
            Ok(reply) if reply.kind == kind => reply,
            Ok(reply) => {
                log::error!(
                    "mailbox: reply {:?} does not match request {:?}",
                    reply.kind,
                    kind
                );
                Reply::failed(kind)
            }
            Err(_) => {
                log::trace!("mailbox: render thread exited while handling {kind:?}");
                Reply::failed(kind)
            }
        }
    }

    /// ### English
    /// Waits for the render thread's unprompted `Init` reply.
    ///
    /// ### 中文
    /// 等待渲染线程主动发送的 `Init` 回复。
    pub(crate) fn wait_init(&self, timeout: Duration) -> Result<Reply, RecvTimeoutError> {
        let port = self.port.lock();
        loop {
            let reply = port.replies.recv_timeout(timeout)?;
            if reply.kind == CommandKind::Init {
                return Ok(reply);
            }
            log::error!("mailbox: unexpected {:?} reply before init", reply.kind);
        }
    }

    /// ### English
    /// Best-effort post that does not wait for a reply (used when abandoning a stuck init).
    ///
    /// ### 中文
    /// 不等待回复的尽力发送（用于放弃卡住的初始化时）。
    pub(crate) fn post_detached(&self, command: Command) {
        let _ = self.port.lock().commands.try_send(command);
    }

    pub(crate) fn control(&self) -> ControlGuard<'_> {
        ControlGuard {
            _port: self.port.lock(),
        }
    }
}

/// ### English
/// Render-thread side of the mailbox.
///
/// ### 中文
/// mailbox 的渲染线程侧。
pub(crate) struct MailboxServer {
    commands: channel::Receiver<Command>,
    replies: channel::Sender<Reply>,
}

impl MailboxServer {
    /// ### English
    /// Takes the pending command, if any (non-blocking).
    ///
    /// ### 中文
    /// 取出待处理命令（若有，非阻塞）。
    #[inline]
    pub(crate) fn try_take(&self) -> Result<Command, TryRecvError> {
        self.commands.try_recv()
    }

    /// ### English
    /// Signals completion of the command taken last. Returns `false` if the producer side is gone.
    ///
    /// ### 中文
    /// 通知最近取出的命令已完成。若生产者侧已不存在则返回 `false`。
    pub(crate) fn reply(&self, reply: Reply) -> bool {
        self.replies.send(reply).is_ok()
    }

    /// ### English
    /// Command receiver, for readiness selection only.
    ///
    /// ### 中文
    /// 命令接收端，仅用于就绪选择。
    pub(crate) fn commands(&self) -> &channel::Receiver<Command> {
        &self.commands
    }

    /// ### English
    /// Closes the render-thread side, failing every command still queued so no producer is left
    /// waiting. Commands posted after this see a disconnected channel.
    ///
    /// ### 中文
    /// 关闭渲染线程侧，对所有仍在队列中的命令回复失败，确保没有生产者被遗留在等待中。
    /// 此后发送的命令会看到已断开的 channel。
    pub(crate) fn close(self) {
        while let Ok(command) = self.commands.try_recv() {
            let kind = command.kind();
            log::warn!("render thread stopped; failing pending {kind:?}");
            let _ = self.replies.try_send(Reply::failed(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::super::command::ReplyPayload;
    use super::*;
    use crate::engine::driver::{ShaderType, Viewport};

    fn serve(server: MailboxServer, delay: Duration) -> thread::JoinHandle<Vec<CommandKind>> {
        thread::spawn(move || {
            let mut seen = Vec::new();
            while let Ok(command) = server.commands.recv() {
                let kind = command.kind();
                seen.push(kind);
                thread::sleep(delay);
                let payload = match command {
                    Command::ReadViewport { expected, buffer } => ReplyPayload::ReadViewport {
                        ok: true,
                        viewport: expected,
                        buffer,
                    },
                    Command::SetShader { path, .. } => ReplyPayload::Bool(path.is_some()),
                    _ => ReplyPayload::Done,
                };
                server.reply(Reply::new(kind, payload));
                if kind == CommandKind::Free {
                    break;
                }
            }
            server.close();
            seen
        })
    }

    #[test_log::test]
    fn reply_kind_matches_request() {
        let (mailbox, server) = mailbox();
        let worker = serve(server, Duration::ZERO);

        let requests = [
            Command::Alive,
            Command::SetRotation(1),
            Command::PokeGetFboState,
            Command::OverlayEnable(true),
            Command::PokeSetHdrContrast(5.0),
        ];
        for command in requests {
            let kind = command.kind();
            let reply = mailbox.post_and_wait(command);
            assert_eq!(reply.kind, kind);
            assert!(reply.is_ok());
        }

        assert!(mailbox.post_and_wait(Command::Free).is_ok());
        worker.join().unwrap();
    }

    #[test_log::test]
    fn concurrent_producers_never_see_each_others_payloads() {
        let (mailbox, server) = mailbox();
        let mailbox = Arc::new(mailbox);
        let worker = serve(server, Duration::from_millis(1));

        let producers: Vec<_> = (0u8..4)
            .map(|id| {
                let mailbox = mailbox.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        let reply = mailbox.post_and_wait(Command::ReadViewport {
                            expected: Viewport::default(),
                            buffer: vec![id; 16],
                        });
                        assert_eq!(reply.kind, CommandKind::ReadViewport);
                        let ReplyPayload::ReadViewport { buffer, .. } = reply.payload else {
                            panic!("unexpected payload");
                        };
                        assert_eq!(buffer, vec![id; 16]);
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        assert!(mailbox.post_and_wait(Command::Free).is_ok());
        assert_eq!(worker.join().unwrap().len(), 41);
    }

    #[test_log::test]
    fn commands_from_one_producer_run_in_issue_order() {
        let (mailbox, server) = mailbox();
        let worker = serve(server, Duration::from_millis(5));

        for name in ["a.shader", "b.shader"] {
            let reply = mailbox.post_and_wait(Command::SetShader {
                kind: ShaderType::Glsl,
                path: Some(name.into()),
            });
            assert!(reply.is_ok());
        }
        mailbox.post_and_wait(Command::Free);

        assert_eq!(
            worker.join().unwrap(),
            vec![CommandKind::SetShader, CommandKind::SetShader, CommandKind::Free]
        );
    }

    #[test_log::test]
    fn calls_after_server_exit_fail_without_blocking() {
        let (mailbox, server) = mailbox();
        let worker = serve(server, Duration::ZERO);
        assert!(mailbox.post_and_wait(Command::Free).is_ok());
        worker.join().unwrap();

        for _ in 0..100 {
            let reply = mailbox.post_and_wait(Command::Alive);
            assert_eq!(reply.kind, CommandKind::Alive);
            assert!(!reply.is_ok());
        }
    }

    #[test_log::test]
    fn close_fails_queued_command() {
        let (mailbox, server) = mailbox();
        let waiter = thread::spawn(move || mailbox.post_and_wait(Command::SetRotation(3)));

        while server.commands.is_empty() {
            thread::yield_now();
        }
        server.close();

        let reply = waiter.join().unwrap();
        assert_eq!(reply.kind, CommandKind::SetRotation);
        assert!(!reply.is_ok());
    }
}
