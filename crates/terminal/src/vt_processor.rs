//! Dedicated VT processing thread.
//!
//! Escape sequence parsing runs on its own OS thread so heavy output never
//! stalls GPUI's event loop. The UI learns about new output and about child
//! exit through atomic flags that it polls on a timer.

use alacritty_terminal::event::EventListener;
use alacritty_terminal::term::Term;
use alacritty_terminal::vte::ansi::Processor;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Minimum interval between render signals.
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(4);

/// Timeout for blocking recv when no PTY output is available.
/// Bounds how long the thread takes to notice shutdown.
const IDLE_RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Initial capacity for the batch buffer.
const BATCH_BUFFER_CAPACITY: usize = 65536;

/// Handle to the VT processing thread of one session.
///
/// On drop, signals the thread to shut down. The thread is not joined: it may
/// be waiting on the `Term` lock held by whoever is dropping us.
pub struct TerminalProcessor {
    shutdown: Arc<AtomicBool>,
    render_needed: Arc<AtomicBool>,
    exited_flag: Arc<AtomicBool>,
}

impl TerminalProcessor {
    /// Start the VT processing thread.
    ///
    /// Generic over the listener so this crate doesn't depend on the
    /// pane's concrete listener type.
    pub fn start<L>(
        output_rx: Receiver<Vec<u8>>,
        term: Arc<Mutex<Term<L>>>,
        exited: Arc<AtomicBool>,
    ) -> Result<Self>
    where
        L: EventListener + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let render_needed = Arc::new(AtomicBool::new(false));

        let shutdown_clone = shutdown.clone();
        let render_needed_clone = render_needed.clone();
        let exited_clone = exited.clone();

        thread::Builder::new()
            .name("kiri-vt-processor".into())
            .spawn(move || {
                vt_thread_loop(
                    output_rx,
                    term,
                    exited_clone,
                    render_needed_clone,
                    shutdown_clone,
                );
            })
            .context("Failed to spawn VT processing thread")?;

        Ok(Self {
            shutdown,
            render_needed,
            exited_flag: exited,
        })
    }

    /// Check and clear the render-needed flag.
    pub fn take_render_needed(&self) -> bool {
        self.render_needed.swap(false, Ordering::AcqRel)
    }

    /// True once the child side of the PTY has closed.
    pub fn has_exited(&self) -> bool {
        self.exited_flag.load(Ordering::Acquire)
    }
}

impl Drop for TerminalProcessor {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

/// Blocks on the PTY output channel, batches all pending data, parses it under
/// a brief term lock, then raises the render flag (throttled).
fn vt_thread_loop<L: EventListener>(
    output_rx: Receiver<Vec<u8>>,
    term: Arc<Mutex<Term<L>>>,
    exited: Arc<AtomicBool>,
    render_needed: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) {
    let mut processor: Processor = Processor::new();
    // Start in the past so the first batch always signals
    let mut last_signal = Instant::now() - MIN_FRAME_INTERVAL;
    let mut batch_buffer = Vec::with_capacity(BATCH_BUFFER_CAPACITY);

    loop {
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        match output_rx.recv_timeout(IDLE_RECV_TIMEOUT) {
            Ok(data) => {
                batch_buffer.clear();
                batch_buffer.extend_from_slice(&data);
                while let Ok(more) = output_rx.try_recv() {
                    batch_buffer.extend_from_slice(&more);
                }

                processor.advance(&mut *term.lock(), &batch_buffer);

                let now = Instant::now();
                if now.duration_since(last_signal) >= MIN_FRAME_INTERVAL {
                    render_needed.store(true, Ordering::Release);
                    last_signal = now;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                // A throttled batch may still be unsignalled
                if last_signal.elapsed() >= MIN_FRAME_INTERVAL && !batch_buffer.is_empty() {
                    render_needed.store(true, Ordering::Release);
                    batch_buffer.clear();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Reader thread dropped the sender: the child is gone
                exited.store(true, Ordering::Release);
                render_needed.store(true, Ordering::Release);
                break;
            }
        }

        if exited.load(Ordering::Acquire) {
            render_needed.store(true, Ordering::Release);
            break;
        }
    }

    tracing::debug!("VT processing thread stopped");
}
