//! Camera capture through an FFmpeg subprocess.
//!
//! `open` spawns FFmpeg reading the platform camera and writing an MJPEG
//! stream to stdout, drained by a reader thread; `grab_frame` collects chunks
//! until one complete JPEG has arrived; `close` kills the process.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use super::{CaptureError, FrameSource};

/// How long FFmpeg may take to deliver the first frame
const FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// Give up on a stream that never closes a JPEG
const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Chunks buffered between grabs before the reader thread blocks
const CHUNK_BACKLOG: usize = 64;

type Chunk = std::io::Result<Vec<u8>>;

#[cfg(target_os = "linux")]
const INPUT_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
const INPUT_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const INPUT_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const INPUT_FORMAT: &str = "v4l2";

pub struct FfmpegCamera {
    device: String,
    child: Option<Child>,
    chunks: Option<Receiver<Chunk>>,
}

impl FfmpegCamera {
    /// `device` is `/dev/video0` on Linux, an index like `0` on macOS,
    /// a camera name on Windows
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            child: None,
            chunks: None,
        }
    }

    fn input_arg(&self) -> String {
        if cfg!(target_os = "windows") {
            format!("video={}", self.device)
        } else {
            self.device.clone()
        }
    }

    #[cfg(target_os = "linux")]
    fn check_device(&self) -> Result<(), CaptureError> {
        match std::fs::OpenOptions::new().read(true).open(&self.device) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Err(
                CaptureError::AccessDenied(format!("{} (is your user in the 'video' group?)", self.device)),
            ),
            Err(e) => Err(CaptureError::Device(format!("{}: {e}", self.device))),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn check_device(&self) -> Result<(), CaptureError> {
        Ok(())
    }
}

impl FrameSource for FfmpegCamera {
    fn describe(&self) -> String {
        format!("{} ({INPUT_FORMAT})", self.device)
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        self.check_device()?;
        let input = self.input_arg();

        let mut child = Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                INPUT_FORMAT,
                "-i",
                input.as_str(),
                "-f",
                "mjpeg",
                "-q:v",
                "3",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CaptureError::Device(format!(
                    "Failed to start ffmpeg ({e}). Make sure ffmpeg is installed."
                ))
            })?;

        crate::verbose!("ffmpeg camera stream started (pid {})", child.id());
        self.chunks = child.stdout.take().map(spawn_reader);
        self.child = Some(child);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        let chunks = self.chunks.as_ref().ok_or(CaptureError::NotStreaming)?;
        // drop what piled up since the last grab so the still is current
        while let Ok(Ok(_)) = chunks.try_recv() {}
        read_frame(chunks, FRAME_TIMEOUT)
    }

    fn close(&mut self) {
        self.chunks = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            crate::verbose!("ffmpeg camera stream stopped");
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// Forward everything `reader` yields to a channel from a helper thread.
///
/// The thread ends on EOF, on a read error, or once the receiver is gone.
fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> Receiver<Chunk> {
    let (tx, rx) = mpsc::sync_channel(CHUNK_BACKLOG);
    std::thread::spawn(move || {
        let mut chunk = [0u8; 16 * 1024];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Ok(chunk[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    });
    rx
}

/// Collect chunks until one complete JPEG is buffered or `timeout` runs out
fn read_frame(chunks: &Receiver<Chunk>, timeout: Duration) -> Result<Vec<u8>, CaptureError> {
    let deadline = Instant::now() + timeout;
    let mut buffer = Vec::with_capacity(256 * 1024);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let chunk = match chunks.recv_timeout(remaining) {
            Ok(Ok(chunk)) => chunk,
            Ok(Err(e)) => {
                return Err(CaptureError::Device(format!("Camera stream read failed: {e}")));
            }
            Err(RecvTimeoutError::Timeout) => {
                crate::verbose!("No camera frame within {}s", timeout.as_secs_f32());
                return Err(CaptureError::NoFrame);
            }
            Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::NoFrame),
        };
        buffer.extend_from_slice(&chunk);

        if let Some((start, end)) = find_jpeg(&buffer) {
            return Ok(buffer[start..end].to_vec());
        }
        if buffer.len() > MAX_FRAME_BYTES {
            return Err(CaptureError::NoFrame);
        }
    }
}

/// Byte range of the first complete JPEG (SOI .. EOI inclusive) in `buf`
fn find_jpeg(buf: &[u8]) -> Option<(usize, usize)> {
    let start = buf.windows(2).position(|w| w == [0xFF, 0xD8])?;
    let end = buf[start + 2..]
        .windows(2)
        .position(|w| w == [0xFF, 0xD9])
        .map(|pos| start + 2 + pos + 2)?;
    Some((start, end))
}
