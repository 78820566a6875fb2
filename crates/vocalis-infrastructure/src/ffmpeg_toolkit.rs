//! `AudioToolkit` backed by the `ffprobe` and `ffmpeg` executables.
//!
//! Probing and recoding stream through stdin/stdout. The duration check reads
//! a temporary file: the Ogg demuxer only computes a stream's length when it
//! can seek, which a pipe does not allow.

use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};
use vocalis_core::audio::{AudioMetadata, AudioToolkit};
use vocalis_core::config::AudioToolSettings;
use vocalis_core::error::{Result, VocalisError};

const PROBE_STREAM_ARGS: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "a:0",
    "-show_entries",
    "stream=codec_name,channels,sample_rate",
    "-of",
    "default=noprint_wrappers=1",
    "pipe:0",
];

/// Followed by the input path.
const PROBE_DURATION_ARGS: &[&str] = &[
    "-v",
    "error",
    "-show_entries",
    "format=duration",
    "-of",
    "default=noprint_wrappers=1:nokey=1",
];

/// Mono 48 kHz Opus in Ogg at 64 kbps, voice-tuned.
const RECODE_ARGS: &[&str] = &[
    "-loglevel",
    "error",
    "-i",
    "pipe:0",
    "-c:a",
    "libopus",
    "-application",
    "voip",
    "-b:a",
    "64k",
    "-ac",
    "1",
    "-ar",
    "48000",
    "-f",
    "ogg",
    "pipe:1",
];

/// Shells out to ffprobe/ffmpeg. Binary names come from configuration so
/// deployments can point at a specific build.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegToolkit {
    pub fn new(settings: &AudioToolSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg_bin.clone(),
            ffprobe: settings.ffprobe_bin.clone(),
        }
    }

    /// Runs `program` with `input` on stdin and collects its output.
    ///
    /// stdin is fed from a separate task so a tool that fills its stdout
    /// pipe before draining stdin cannot deadlock us. The child is killed if
    /// this future is dropped.
    async fn run_piped(program: &str, args: &[&str], input: &[u8]) -> io::Result<Output> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin not captured"))?;
        let input = input.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child.wait_with_output().await?;

        // Probes may stop reading once they have seen enough; a broken pipe
        // then is expected.
        match writer.await {
            Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                debug!(program, error = %e, "Failed to feed stdin");
            }
            Err(e) => warn!(program, error = %e, "stdin writer task failed"),
            _ => {}
        }

        Ok(output)
    }

    /// Writes `audio` to a temporary `.ogg` file that lives as long as the
    /// returned handle.
    async fn spill(audio: &[u8]) -> io::Result<NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix("vocalis-")
            .suffix(".ogg")
            .tempfile()?;
        tokio::fs::write(file.path(), audio).await?;
        Ok(file)
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Parses the single `format=duration` value.
fn parse_duration(stdout: &str) -> Result<f64> {
    let value = stdout.trim();
    let seconds: f64 = value.parse().map_err(|_| {
        VocalisError::DurationProbeFailed(format!("unparsable duration {:?}", value))
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(VocalisError::DurationProbeFailed(format!(
            "invalid duration {}",
            seconds
        )));
    }
    Ok(seconds)
}

#[async_trait]
impl AudioToolkit for FfmpegToolkit {
    async fn inspect(&self, audio: &[u8]) -> Option<AudioMetadata> {
        let output = match Self::run_piped(&self.ffprobe, PROBE_STREAM_ARGS, audio).await {
            Ok(output) => output,
            Err(e) => {
                warn!(bin = %self.ffprobe, error = %e, "Failed to run ffprobe");
                return None;
            }
        };
        if !output.status.success() {
            debug!(status = %output.status, stderr = %stderr_text(&output), "ffprobe rejected input");
            return None;
        }
        AudioMetadata::parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn recode(&self, audio: &[u8]) -> Result<Vec<u8>> {
        let output = Self::run_piped(&self.ffmpeg, RECODE_ARGS, audio)
            .await
            .map_err(|e| {
                VocalisError::RecodeFailed(format!("failed to run {}: {}", self.ffmpeg, e))
            })?;

        if !output.status.success() {
            return Err(VocalisError::RecodeFailed(format!(
                "{} exited with {}: {}",
                self.ffmpeg,
                output.status,
                stderr_text(&output)
            )));
        }
        if output.stdout.is_empty() {
            return Err(VocalisError::RecodeFailed(
                "encoder produced no output".to_string(),
            ));
        }

        debug!(
            input_bytes = audio.len(),
            output_bytes = output.stdout.len(),
            "Recoded audio"
        );
        Ok(output.stdout)
    }

    async fn duration(&self, audio: &[u8]) -> Result<f64> {
        let file = Self::spill(audio).await.map_err(|e| {
            VocalisError::DurationProbeFailed(format!("failed to stage audio: {}", e))
        })?;
        let output = Command::new(&self.ffprobe)
            .args(PROBE_DURATION_ARGS)
            .arg(file.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                VocalisError::DurationProbeFailed(format!("failed to run {}: {}", self.ffprobe, e))
            })?;

        if !output.status.success() {
            return Err(VocalisError::DurationProbeFailed(format!(
                "{} exited with {}: {}",
                self.ffprobe,
                output.status,
                stderr_text(&output)
            )));
        }
        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}
