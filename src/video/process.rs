//! Bookkeeping for the ffmpeg child processes behind the decoder and encoder.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::process::Child;
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Bytes of stderr kept for error messages
const TAIL_BYTES: usize = 8 * 1024;

/// Characters of stderr quoted in an error
const QUOTED_CHARS: usize = 500;

/// Drains a child's stderr on a helper thread, keeping only the last few kilobytes.
///
/// ffmpeg blocks once its stderr pipe is full, so the pipe has to be read while
/// frames are flowing, not only after the process exits.
pub struct StderrTail {
    worker: Option<JoinHandle<Vec<u8>>>,
}

impl StderrTail {
    pub fn spawn<R: Read + Send + 'static>(mut pipe: R, name: &str) -> std::io::Result<Self> {
        let worker = thread::Builder::new()
            .name(format!("{}-stderr", name))
            .spawn(move || {
                let mut tail: VecDeque<u8> = VecDeque::with_capacity(TAIL_BYTES);
                let mut buf = [0u8; 4096];
                loop {
                    match pipe.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            tail.extend(&buf[..n]);
                            let excess = tail.len().saturating_sub(TAIL_BYTES);
                            tail.drain(..excess);
                        }
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
                Vec::from(tail)
            })?;

        Ok(Self { worker: Some(worker) })
    }

    /// Wait for the pipe to close and return the end of what was written.
    ///
    /// Only call this once the child has exited or been killed.
    pub fn finish(mut self) -> String {
        let bytes = match self.worker.take().map(JoinHandle::join) {
            Some(Ok(bytes)) => bytes,
            Some(Err(_)) => return "stderr reader panicked".to_string(),
            None => Vec::new(),
        };
        last_n_chars(&String::from_utf8_lossy(&bytes), QUOTED_CHARS)
    }
}

/// Kill `child` if it is still running and collect its exit status
pub fn reap(child: &mut Child, role: &str) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    let _ = child.kill();
    match child.wait() {
        Ok(status) => debug!("Stopped {} ({})", role, status),
        Err(e) => debug!("Could not reap {}: {}", role, e),
    }
}

pub fn last_n_chars(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max_chars)).collect::<String>().trim().to_string()
}
