//! Composition orchestration.
//!
//! One request flows validate -> materialize sources -> assemble graph ->
//! render (bounded by the semaphore) -> cleanup. Scratch inputs are removed
//! on both success and failure; the rendered output stays in the uploads
//! directory for static serving.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::info;

use framefuse_media::{
    assemble, download_to_file, FfmpegCommand, FfmpegRunner, InputKind, RenderInput, ScratchDir,
    SourceSet,
};
use framefuse_models::{CompositionRequest, EncodingConfig, ThirdLayerKind};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// One source stream, fetched by URL or already spooled to local disk.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Url(String),
    File(PathBuf),
}

/// A validated composition with its source material.
#[derive(Debug, Clone)]
pub struct ComposeJob {
    pub request: CompositionRequest,
    pub background: SourceInput,
    pub foreground: SourceInput,
    pub third_layer: Option<SourceInput>,
}

/// What a finished composition produced.
#[derive(Debug)]
pub struct ComposeOutcome {
    /// File name under the uploads directory.
    pub file_name: String,
    pub elapsed: Duration,
}

/// Run one composition end to end.
pub async fn compose(state: &AppState, job: ComposeJob) -> ApiResult<ComposeOutcome> {
    job.request.validate()?;

    let started = Instant::now();
    let mut scratch = ScratchDir::create(&state.config.uploads_dir).await?;

    let result = run_pipeline(state, &job, &mut scratch, started).await;
    scratch.cleanup().await;
    result
}

async fn run_pipeline(
    state: &AppState,
    job: &ComposeJob,
    scratch: &mut ScratchDir,
    started: Instant,
) -> ApiResult<ComposeOutcome> {
    let background = materialize(state, scratch, &job.background, "bg", "mp4").await?;
    let foreground = materialize(state, scratch, &job.foreground, "fg", "mp4").await?;

    let mut inputs = vec![
        RenderInput::video(&background),
        RenderInput::video(&foreground),
    ];

    let sources = if let Some(third_source) = &job.third_layer {
        let kind = job
            .request
            .third_layer
            .map(|t| t.kind)
            .unwrap_or(ThirdLayerKind::StaticImage);
        let (ext, input_kind) = match kind {
            ThirdLayerKind::StaticImage => ("png", InputKind::StaticImage),
            ThirdLayerKind::LoopingVideo => ("mp4", InputKind::LoopingVideo),
        };
        let third = materialize(state, scratch, third_source, "third", ext).await?;
        inputs.push(RenderInput::new(&third, input_kind));
        SourceSet::with_third_layer()
    } else {
        SourceSet::primary()
    };

    let graph = assemble(&job.request, &sources)?;

    let file_name = format!("composite-{}.mp4", scratch.token());
    let output_path = state.config.uploads_dir.join(&file_name);
    let encoding = EncodingConfig::default().with_duration_cap(job.request.duration_cap_secs);

    let command = FfmpegCommand::new(&graph, encoding, &output_path).inputs(inputs);
    let runner = FfmpegRunner::new().with_timeout(state.config.render_timeout_secs);

    let layout = job.request.layout.as_str();
    let permit = state
        .render_permits
        .acquire()
        .await
        .map_err(|_| ApiError::internal("render queue closed"))?;
    let render_result = runner.run(&command).await;
    drop(permit);

    if let Err(e) = render_result {
        metrics::record_render_failed(layout);
        return Err(e.into());
    }

    let elapsed = started.elapsed();
    metrics::record_render(layout, elapsed.as_secs_f64());
    info!(
        file = %file_name,
        layout,
        elapsed_ms = elapsed.as_millis() as u64,
        "Composition rendered"
    );

    Ok(ComposeOutcome { file_name, elapsed })
}

/// Resolve one source to a local file, downloading it if needed.
async fn materialize(
    state: &AppState,
    scratch: &mut ScratchDir,
    source: &SourceInput,
    prefix: &str,
    extension: &str,
) -> ApiResult<PathBuf> {
    match source {
        SourceInput::Url(url) => {
            let path = scratch.file(prefix, extension);
            let started = Instant::now();
            download_to_file(&state.http, url, &path).await?;
            metrics::record_download_duration(started.elapsed().as_secs_f64());
            Ok(path)
        }
        // Spooled uploads are already on disk; the caller owns cleanup.
        SourceInput::File(path) => Ok(path.clone()),
    }
}
