//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use framefuse_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};
use crate::graph::FilterGraph;

/// Number of trailing diagnostic lines kept from the renderer's stderr.
const STDERR_TAIL_LINES: usize = 40;

/// How an input file is fed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Plain video stream, played once.
    Video,
    /// Single image repeated for the whole output duration.
    StaticImage,
    /// Video looped indefinitely; the duration cap bounds the output.
    LoopingVideo,
}

impl InputKind {
    /// Arguments placed before this input's `-i`.
    fn input_args(&self) -> &'static [&'static str] {
        match self {
            InputKind::Video => &[],
            InputKind::StaticImage => &["-loop", "1"],
            InputKind::LoopingVideo => &["-stream_loop", "-1"],
        }
    }
}

/// One source file in renderer input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub path: PathBuf,
    pub kind: InputKind,
}

impl RenderInput {
    pub fn video(path: impl AsRef<Path>) -> Self {
        Self::new(path, InputKind::Video)
    }

    pub fn new(path: impl AsRef<Path>, kind: InputKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
        }
    }
}

/// Builder for a composition render command.
///
/// Input order must match the stream labels the graph was assembled with.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<RenderInput>,
    filter_complex: String,
    map_label: String,
    encoding: EncodingConfig,
    output: PathBuf,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command from an assembled graph.
    pub fn new(graph: &FilterGraph, encoding: EncodingConfig, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            filter_complex: graph.to_filter_complex(),
            map_label: graph.terminal().as_str().to_string(),
            encoding,
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append an input stream.
    pub fn input(mut self, input: RenderInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Append multiple input streams.
    pub fn inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = RenderInput>,
    {
        self.inputs.extend(inputs);
        self
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// The in-progress file the renderer writes before the final rename.
    pub fn partial_path(&self) -> PathBuf {
        let file_name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.output.with_file_name(format!("{file_name}.part"))
    }

    /// Build the argument list, targeting `target` as the output file.
    fn build_args_to(&self, target: &Path) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            for arg in input.kind.input_args() {
                args.push((*arg).to_string());
            }
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.push("-filter_complex".to_string());
        args.push(self.filter_complex.clone());

        args.push("-map".to_string());
        args.push(format!("[{}]", self.map_label));
        // Carry the background's audio track when it has one.
        args.push("-map".to_string());
        args.push("0:a?".to_string());

        args.push("-c:v".to_string());
        args.push(self.encoding.codec.clone());
        args.push("-preset".to_string());
        args.push(self.encoding.preset.clone());
        args.push("-crf".to_string());
        args.push(self.encoding.crf.to_string());
        args.push("-c:a".to_string());
        args.push(self.encoding.audio_codec.clone());
        args.push("-t".to_string());
        args.push(format!("{:.3}", self.encoding.duration_cap_secs));

        // mp4 container needs this to write a valid file through a rename
        args.push("-movflags".to_string());
        args.push("+faststart".to_string());

        args.push(target.to_string_lossy().to_string());

        args
    }

    /// Build the argument list for the final output path.
    pub fn build_args(&self) -> Vec<String> {
        self.build_args_to(&self.output)
    }
}

/// Runner with a hard timeout and atomic output publication.
///
/// The renderer writes to a sibling `.part` file; only a successful exit
/// moves it to the requested path, so readers never observe a truncated
/// output.
pub struct FfmpegRunner {
    binary: String,
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            timeout_secs: None,
        }
    }

    /// Override the renderer binary name or path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run a render command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which(&self.binary).map_err(|_| MediaError::FfmpegNotFound)?;

        let partial = cmd.partial_path();
        let args = cmd.build_args_to(&partial);
        debug!("Running FFmpeg: {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take();
        let stderr_handle = tokio::spawn(async move {
            let mut tail: Vec<String> = Vec::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    tail.push(line);
                    if tail.len() > STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                }
            }
            tail.join("\n")
        });

        let wait_future = child.wait();
        let status = if let Some(timeout_secs) = self.timeout_secs {
            let timeout = tokio::time::timeout(
                std::time::Duration::from_secs(timeout_secs),
                wait_future,
            );
            match timeout.await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        timeout_secs,
                        "FFmpeg timed out, killing process"
                    );
                    let _ = child.kill().await;
                    let _ = stderr_handle.await;
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(MediaError::Timeout(timeout_secs));
                }
            }
        } else {
            wait_future.await?
        };

        let stderr_tail = stderr_handle.await.unwrap_or_default();

        if !status.success() {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(MediaError::render_failed(
                "FFmpeg exited with non-zero status",
                (!stderr_tail.is_empty()).then_some(stderr_tail),
                status.code(),
            ));
        }

        if !partial.exists() {
            return Err(MediaError::OutputMissing(partial));
        }
        tokio::fs::rename(&partial, cmd.output_path()).await?;

        Ok(())
    }
}

/// Check that FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framefuse_models::{CanvasFormat, CompositionRequest, FadeOptions};

    use crate::graph::{assemble, SourceSet};

    fn sample_graph() -> FilterGraph {
        let request = CompositionRequest {
            format: CanvasFormat::Reels,
            fade: Some(FadeOptions::default()),
            ..Default::default()
        };
        assemble(&request, &SourceSet::primary()).unwrap()
    }

    #[test]
    fn test_command_args_shape() {
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), "out.mp4")
            .input(RenderInput::video("bg.mp4"))
            .input(RenderInput::video("fg.mp4"));

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-filter_complex".to_string()));
        assert!(args.contains(&"-map".to_string()));
        assert!(args.contains(&"[vout]".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"fast".to_string()));
        assert!(args.contains(&"23".to_string()));
        assert!(args.contains(&"copy".to_string()));
        assert!(args.contains(&"60.000".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");

        // Two plain inputs, in order.
        let i_positions: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(i_positions.len(), 2);
        assert_eq!(args[i_positions[0] + 1], "bg.mp4");
        assert_eq!(args[i_positions[1] + 1], "fg.mp4");
    }

    #[test]
    fn test_static_image_input_loops_single_frame() {
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), "out.mp4")
            .input(RenderInput::video("bg.mp4"))
            .input(RenderInput::video("fg.mp4"))
            .input(RenderInput::new("frame.png", InputKind::StaticImage));

        let args = cmd.build_args();
        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        assert_eq!(args[loop_pos + 1], "1");
        assert_eq!(args[loop_pos + 2], "-i");
        assert_eq!(args[loop_pos + 3], "frame.png");
    }

    #[test]
    fn test_looping_video_input_repeats() {
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), "out.mp4")
            .input(RenderInput::video("bg.mp4"))
            .input(RenderInput::video("fg.mp4"))
            .input(RenderInput::new("anim.mp4", InputKind::LoopingVideo));

        let args = cmd.build_args();
        let pos = args.iter().position(|a| a == "-stream_loop").unwrap();
        assert_eq!(args[pos + 1], "-1");
        assert_eq!(args[pos + 2], "-i");
        assert_eq!(args[pos + 3], "anim.mp4");
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let cmd = FfmpegCommand::new(
            &sample_graph(),
            EncodingConfig::default(),
            "/tmp/renders/final.mp4",
        );
        assert_eq!(
            cmd.partial_path(),
            PathBuf::from("/tmp/renders/final.mp4.part")
        );
    }

    #[test]
    fn test_duration_cap_reaches_args() {
        let encoding = EncodingConfig::default().with_duration_cap(12.5);
        let cmd = FfmpegCommand::new(&sample_graph(), encoding, "out.mp4");
        let args = cmd.build_args();
        let pos = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[pos + 1], "12.500");
    }

    // The runner's publication contract is exercised with stand-in
    // binaries: `false` for a failing render, `true` for a clean exit.

    #[tokio::test]
    async fn test_failing_renderer_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), &output);
        std::fs::write(cmd.partial_path(), b"junk").unwrap();

        let err = FfmpegRunner::new()
            .with_binary("false")
            .run(&cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::RenderFailed { .. }));
        assert!(!cmd.partial_path().exists());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_successful_exit_renames_partial_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), &output);
        std::fs::write(cmd.partial_path(), b"rendered").unwrap();

        FfmpegRunner::new()
            .with_binary("true")
            .run(&cmd)
            .await
            .unwrap();
        assert!(!cmd.partial_path().exists());
        assert_eq!(std::fs::read(&output).unwrap(), b"rendered");
    }

    #[tokio::test]
    async fn test_missing_output_after_clean_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), &output);

        let err = FfmpegRunner::new()
            .with_binary("true")
            .run(&cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::OutputMissing(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unknown_binary_maps_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let cmd = FfmpegCommand::new(&sample_graph(), EncodingConfig::default(), &output);

        let err = FfmpegRunner::new()
            .with_binary("framefuse-no-such-renderer")
            .run(&cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound));
    }
}
