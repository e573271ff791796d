use std::fs;
use std::io::Write;
use std::path::Path;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{InstallError, Result};

/// Stream a URL to a local file with a progress bar. Fails on any non-2xx
/// status before a byte is written.
pub async fn download_file(http: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let filename = dest
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    tracing::info!("Downloading {}...", filename);

    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(InstallError::Download(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-")
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(dest)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    pb.finish_with_message("Download complete");
    Ok(())
}
