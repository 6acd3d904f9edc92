use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn file_name_from_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let file_name = trimmed
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .context("Could not derive filename from URL")?;
    Ok(file_name.to_string())
}

fn apply_download_progress_style(progress: &ProgressBar) {
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{bar:32.cyan/blue}] \
{bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
}

pub async fn download_file(client: &Client, url: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating {}", parent.display()))?;
    }

    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Download request failed for {url}"))?
        .error_for_status()
        .with_context(|| format!("Download failed for {url}"))?;

    let progress = ProgressBar::new(response.content_length().unwrap_or(0));
    progress.set_prefix("FETCH");
    apply_download_progress_style(&progress);

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed creating {}", output_path.display()))?;

    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed reading download stream")?
    {
        file.write_all(&chunk)
            .with_context(|| format!("Failed writing {}", output_path.display()))?;
        progress.inc(chunk.len() as u64);
    }

    progress.finish_with_message("download complete");
    println!("Download complete: {}", output_path.display());
    Ok(())
}

pub fn truncate_for_log(text: &str) -> String {
    let trimmed = text.trim();
    let max_len = 300usize;
    if trimmed.chars().count() <= max_len {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(max_len).collect();
        format!("{head}...")
    }
}

pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
