//! Source fetching over HTTP.
//!
//! Sources are streamed straight to disk so large videos never sit in
//! memory. Every failure mode maps to [`MediaError::DownloadFailed`] with a
//! message naming the URL, since these errors surface to API clients.

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Download `url` to `output_path`, returning the number of bytes written.
///
/// An empty body counts as a failure; the renderer cannot do anything with
/// a zero-length input file.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    output_path: impl AsRef<Path>,
) -> MediaResult<u64> {
    let output_path = output_path.as_ref();
    debug!(url, output = %output_path.display(), "Downloading source");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("request to {url} failed: {e}")))?
        .error_for_status()
        .map_err(|e| MediaError::download_failed(format!("{url} returned an error: {e}")))?;

    let mut file = tokio::fs::File::create(output_path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| MediaError::download_failed(format!("stream from {url} failed: {e}")))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    if written == 0 {
        let _ = tokio::fs::remove_file(output_path).await;
        return Err(MediaError::download_failed(format!(
            "{url} returned an empty body"
        )));
    }

    info!(
        url,
        output = %output_path.display(),
        size_bytes = written,
        "Downloaded source"
    );
    Ok(written)
}
