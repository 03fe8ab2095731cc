//! PTY process management.

use crate::launch::ShellLaunch;
use crate::types::TermSize;
use anyhow::{Context, Result};
use portable_pty::{native_pty_system, Child, CommandBuilder, ExitStatus, PtyPair, PtySize};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Shell process attached to a pseudo-terminal.
///
/// Output is read on a dedicated thread and delivered over a channel; take it
/// with [`PtyHandler::take_output`] and hand it to a
/// [`TerminalProcessor`](crate::TerminalProcessor). Dropping the handler kills
/// the child and reaps it without blocking.
pub struct PtyHandler {
    pair: PtyPair,
    writer: Box<dyn Write + Send>,
    output_rx: Option<Receiver<Vec<u8>>>,
    exited: Arc<AtomicBool>,
    child: Box<dyn Child + Send + Sync>,
    pid: Option<u32>,
    _reader_thread: thread::JoinHandle<()>,
}

impl PtyHandler {
    /// Open a PTY of `size` and start the shell described by `launch` in it.
    pub fn spawn(launch: &ShellLaunch, size: TermSize) -> Result<Self> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(&launch.program);
        cmd.args(&launch.args);
        for (key, value) in &launch.env {
            cmd.env(key, value);
        }
        if let Some(dir) = launch.working_dir.as_ref().filter(|dir| dir.is_dir()) {
            cmd.cwd(dir);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn shell '{}'", launch.program))?;
        let pid = child.process_id();

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let (output_tx, output_rx): (Sender<Vec<u8>>, Receiver<Vec<u8>>) = mpsc::channel();

        let exited = Arc::new(AtomicBool::new(false));
        let exited_clone = exited.clone();

        let reader_thread = thread::Builder::new()
            .name("kiri-pty-reader".into())
            .spawn(move || {
                let mut buf = [0u8; 4096];
                loop {
                    match reader.read(&mut buf) {
                        // EOF and read errors both mean the child side is gone
                        Ok(0) | Err(_) => {
                            exited_clone.store(true, Ordering::Release);
                            break;
                        }
                        Ok(n) => {
                            if output_tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
            .context("Failed to start PTY reader thread")?;

        tracing::debug!(shell = %launch.program, ?pid, "Spawned shell");

        Ok(Self {
            pair,
            writer,
            output_rx: Some(output_rx),
            exited,
            child,
            pid,
            _reader_thread: reader_thread,
        })
    }

    /// Process id of the shell, when the platform reports one.
    pub fn process_id(&self) -> Option<u32> {
        self.pid
    }

    /// Take the output channel. Returns `None` after the first call.
    pub fn take_output(&mut self) -> Option<Receiver<Vec<u8>>> {
        self.output_rx.take()
    }

    /// Flag set by the reader thread when the child side closes.
    pub fn exited_flag(&self) -> Arc<AtomicBool> {
        self.exited.clone()
    }

    /// Write input bytes to the PTY.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Resize the PTY.
    pub fn resize(&self, size: TermSize) -> Result<()> {
        self.pair
            .master
            .resize(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to resize PTY")?;
        Ok(())
    }

    /// Kill the child and reap it if it is already gone. Never blocks.
    ///
    /// Returns the exit status when the child could be reaped immediately.
    pub fn terminate(&mut self) -> Option<ExitStatus> {
        if let Ok(Some(status)) = self.child.try_wait() {
            return Some(status);
        }

        if let Err(e) = self.child.kill() {
            tracing::debug!(pid = ?self.pid, "Kill failed (already exited?): {}", e);
        }

        match self.child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(pid = ?self.pid, "Failed to reap shell: {}", e);
                None
            }
        }
    }
}

impl Drop for PtyHandler {
    fn drop(&mut self) {
        self.terminate();
    }
}
