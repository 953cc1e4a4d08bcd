//! Composition endpoint handlers.
//!
//! Request bodies keep the camelCase field names the original HTTP surface
//! used, so existing automations keep working. Everything is mapped into a
//! typed [`CompositionRequest`] before any file is touched.

use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use framefuse_media::{MediaError, ScratchDir};
use framefuse_models::{
    Anchor, AvatarOptions, BlendMode, BorderOptions, CanvasFormat, CompositionRequest,
    FadeOptions, Layout, Rgb, TextOptions, ThirdLayerKind, ThirdLayerOptions,
};

use crate::error::{ApiError, ApiResult};
use crate::services::{self, ComposeJob, ComposeOutcome, SourceInput};
use crate::state::AppState;

/// Default output duration cap in seconds.
const DEFAULT_DURATION_CAP_SECS: f64 = 60.0;

/// Full-parameter overlay composition body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoOverlayBody {
    #[serde(alias = "videoUrl")]
    pub background_url: Option<String>,
    pub overlay_url: Option<String>,
    pub frame_url: Option<String>,
    pub animation_url: Option<String>,
    pub format: Option<String>,
    pub output_width: Option<u32>,
    pub output_height: Option<u32>,
    pub layout: Option<String>,
    pub fade_height: Option<u32>,
    pub fade_duration: Option<f64>,
    pub overlay_text: Option<String>,
    pub text_color: Option<String>,
    pub text_size: Option<u32>,
    pub text_position: Option<String>,
    pub border_enabled: Option<bool>,
    pub border_color: Option<String>,
    pub border_width: Option<u32>,
    pub neon_border: Option<bool>,
    pub border_speed: Option<f64>,
    pub avatar_on_top: Option<bool>,
    pub avatar_position: Option<String>,
    pub avatar_size: Option<u32>,
    pub avatar_opacity: Option<f32>,
    pub strict: Option<bool>,
}

/// Simplified legacy body kept for automation compatibility.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayUrlsBody {
    #[serde(alias = "videoUrl")]
    pub background_url: Option<String>,
    pub overlay_url: Option<String>,
    pub fade_height: Option<u32>,
    pub fade_duration: Option<f64>,
}

/// URL variant of the reels composition.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReelsUrlsBody {
    pub top_video_url: Option<String>,
    pub bottom_video_url: Option<String>,
    pub fade_zone: Option<u32>,
    pub fade_duration: Option<f64>,
}

/// Successful composition response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub success: bool,
    pub message: String,
    pub output_url: String,
    pub format: String,
    pub layout: String,
    pub fade_height: u32,
    pub fade_duration: f64,
    pub process_time: String,
}

/// `POST /video-overlay`
pub async fn video_overlay(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VideoOverlayBody>,
) -> ApiResult<Json<ComposeResponse>> {
    let background = require_url(&body.background_url, "backgroundUrl")?;
    let foreground = require_url(&body.overlay_url, "overlayUrl")?;
    let request = build_request(&body, state.config.strict_layouts)?;

    let third_layer = body
        .frame_url
        .clone()
        .or_else(|| body.animation_url.clone())
        .map(SourceInput::Url);

    let outcome = services::compose(
        &state,
        ComposeJob {
            request: request.clone(),
            background,
            foreground,
            third_layer,
        },
    )
    .await?;

    Ok(Json(respond(&state, &headers, &request, outcome)))
}

/// `POST /overlay-urls`
pub async fn overlay_urls(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<OverlayUrlsBody>,
) -> ApiResult<Json<ComposeResponse>> {
    let background = require_url(&body.background_url, "backgroundUrl")?;
    let foreground = require_url(&body.overlay_url, "overlayUrl")?;

    let request = CompositionRequest {
        format: CanvasFormat::Landscape,
        layout: Layout::Overlay,
        fade: Some(FadeOptions {
            zone_px: body.fade_height.unwrap_or(100),
            duration_secs: body.fade_duration.unwrap_or(0.5),
        }),
        duration_cap_secs: DEFAULT_DURATION_CAP_SECS,
        ..Default::default()
    };

    let outcome = services::compose(
        &state,
        ComposeJob {
            request: request.clone(),
            background,
            foreground,
            third_layer: None,
        },
    )
    .await?;

    Ok(Json(respond(&state, &headers, &request, outcome)))
}

/// `POST /reels-overlay` (multipart file upload)
///
/// Uploaded videos are streamed straight to spool files so a request never
/// holds a whole video in memory.
pub async fn reels_overlay(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<ComposeResponse>> {
    let mut spool = ScratchDir::create(&state.config.uploads_dir).await?;
    let result = reels_overlay_spooled(&state, &headers, multipart, &mut spool).await;
    spool.cleanup().await;
    result
}

async fn reels_overlay_spooled(
    state: &AppState,
    headers: &HeaderMap,
    mut multipart: Multipart,
    spool: &mut ScratchDir,
) -> ApiResult<Json<ComposeResponse>> {
    let mut top = None;
    let mut bottom = None;
    let mut fade_zone = None;
    let mut fade_duration = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "topVideo" => {
                let path = spool.file("top", "mp4");
                spool_field(field, "topVideo", &path).await?;
                top = Some(path);
            }
            "bottomVideo" => {
                let path = spool.file("bottom", "mp4");
                spool_field(field, "bottomVideo", &path).await?;
                bottom = Some(path);
            }
            "fadeZone" => {
                fade_zone = field.text().await.ok().and_then(|s| s.parse().ok());
            }
            "fadeDuration" => {
                fade_duration = field.text().await.ok().and_then(|s| s.parse().ok());
            }
            _ => {}
        }
    }

    let top = top.ok_or_else(|| ApiError::bad_request("topVideo file is required"))?;
    let bottom = bottom.ok_or_else(|| ApiError::bad_request("bottomVideo file is required"))?;

    let request = reels_request(fade_zone, fade_duration);
    let outcome = services::compose(
        state,
        ComposeJob {
            request: request.clone(),
            background: SourceInput::File(top),
            foreground: SourceInput::File(bottom),
            third_layer: None,
        },
    )
    .await?;

    Ok(Json(respond(state, headers, &request, outcome)))
}

/// Stream one uploaded field to a spool file chunk by chunk.
async fn spool_field(mut field: Field<'_>, name: &str, path: &Path) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(path).await.map_err(MediaError::from)?;
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read {name}: {e}")))?
    {
        file.write_all(&chunk).await.map_err(MediaError::from)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(MediaError::from)?;

    if written == 0 {
        return Err(ApiError::bad_request(format!("{name} file is empty")));
    }
    Ok(written)
}

/// `POST /reels-overlay-urls`
pub async fn reels_overlay_urls(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ReelsUrlsBody>,
) -> ApiResult<Json<ComposeResponse>> {
    let background = require_url(&body.top_video_url, "topVideoUrl")?;
    let foreground = require_url(&body.bottom_video_url, "bottomVideoUrl")?;

    let request = reels_request(body.fade_zone, body.fade_duration);
    let outcome = services::compose(
        &state,
        ComposeJob {
            request: request.clone(),
            background,
            foreground,
            third_layer: None,
        },
    )
    .await?;

    Ok(Json(respond(&state, &headers, &request, outcome)))
}

fn require_url(url: &Option<String>, field: &str) -> ApiResult<SourceInput> {
    match url {
        Some(url) if !url.trim().is_empty() => Ok(SourceInput::Url(url.clone())),
        _ => Err(ApiError::bad_request(format!("{field} is required"))),
    }
}

fn reels_request(fade_zone: Option<u32>, fade_duration: Option<f64>) -> CompositionRequest {
    CompositionRequest {
        format: CanvasFormat::Reels,
        layout: Layout::SplitVertical,
        // The reels endpoints ship wider seam defaults than /video-overlay.
        fade: Some(FadeOptions {
            zone_px: fade_zone.unwrap_or(150),
            duration_secs: fade_duration.unwrap_or(1.0),
        }),
        duration_cap_secs: DEFAULT_DURATION_CAP_SECS,
        ..Default::default()
    }
}

/// Map the permissive HTTP body into a typed composition request.
fn build_request(body: &VideoOverlayBody, strict_default: bool) -> ApiResult<CompositionRequest> {
    let strict = body.strict.unwrap_or(strict_default);

    let format = match (&body.format, body.output_width, body.output_height) {
        (None, None, None) => CanvasFormat::Landscape,
        (name, w, h) => CanvasFormat::from_request(name.as_deref(), w, h)?,
    };

    let layout = if body.avatar_on_top == Some(true) {
        Layout::AvatarOnTop
    } else {
        match &body.layout {
            Some(name) => Layout::from_request(name, strict)?,
            None => Layout::Overlay,
        }
    };

    let fade = Some(FadeOptions {
        zone_px: body.fade_height.unwrap_or(100),
        duration_secs: body.fade_duration.unwrap_or(0.5),
    });

    let avatar = (layout == Layout::AvatarOnTop).then(|| AvatarOptions {
        size_px: body.avatar_size.unwrap_or(200),
        anchor: body
            .avatar_position
            .as_deref()
            .map(Anchor::from_request)
            .unwrap_or(Anchor::BottomRight),
        opacity: body.avatar_opacity.unwrap_or(1.0),
    });

    let animated = body.neon_border.unwrap_or(false);
    let border = (body.border_enabled.unwrap_or(false) || animated).then(|| BorderOptions {
        enabled: true,
        color: body
            .border_color
            .as_deref()
            .map(|c| Rgb::from_request(c, Rgb::NEON_BLUE))
            .unwrap_or(Rgb::NEON_BLUE),
        width_px: body.border_width.unwrap_or(10),
        animated,
        animation_speed: body.border_speed.unwrap_or(1.0),
    });

    let text = body.overlay_text.as_ref().map(|content| TextOptions {
        content: content.clone(),
        size_px: body.text_size.unwrap_or(30),
        color: body
            .text_color
            .as_deref()
            .map(|c| Rgb::from_request(c, Rgb::WHITE))
            .unwrap_or(Rgb::WHITE),
        anchor: body
            .text_position
            .as_deref()
            .map(Anchor::from_request)
            .unwrap_or(Anchor::Center),
    });

    let third_layer = match (&body.frame_url, &body.animation_url) {
        (Some(_), Some(_)) => {
            return Err(ApiError::bad_request(
                "frameUrl and animationUrl are mutually exclusive",
            ));
        }
        (Some(_), None) => Some(ThirdLayerOptions {
            kind: ThirdLayerKind::StaticImage,
            size_px: None,
            anchor: Anchor::TopRight,
            blend: BlendMode::Over,
        }),
        // Opaque animation footage blends additively over the video.
        (None, Some(_)) => Some(ThirdLayerOptions {
            kind: ThirdLayerKind::LoopingVideo,
            size_px: None,
            anchor: Anchor::TopRight,
            blend: BlendMode::Screen,
        }),
        (None, None) => None,
    };

    Ok(CompositionRequest {
        format,
        layout,
        fade,
        avatar,
        border,
        text,
        third_layer,
        duration_cap_secs: DEFAULT_DURATION_CAP_SECS,
    })
}

fn respond(
    state: &AppState,
    headers: &HeaderMap,
    request: &CompositionRequest,
    outcome: ComposeOutcome,
) -> ComposeResponse {
    let fade = request.fade.unwrap_or(FadeOptions {
        zone_px: 0,
        duration_secs: 0.0,
    });
    ComposeResponse {
        success: true,
        message: "Videos composited successfully".to_string(),
        output_url: output_url(state, headers, &outcome.file_name),
        format: request.format.as_str().to_string(),
        layout: request.layout.as_str().to_string(),
        fade_height: fade.zone_px,
        fade_duration: fade.duration_secs,
        process_time: format!("{:.1}s", outcome.elapsed.as_secs_f64()),
    }
}

/// Absolute link to a produced file, preferring the configured base URL.
fn output_url(state: &AppState, headers: &HeaderMap, file_name: &str) -> String {
    if let Some(base) = &state.config.public_base_url {
        return format!("{base}/uploads/{file_name}");
    }
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/uploads/{file_name}")
}
