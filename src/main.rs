mod args;
mod chapters;
mod common;
mod constants;
mod export;
mod parse;
mod record;
mod sink;
mod upload;
mod verify;

use anyhow::{Context, Result, bail};
use clap::Parser;
use reqwest::Client;
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use args::{Args, Dataset, SourceFormat};
use common::{download_file, file_name_from_url, format_count, project_root};
use constants::{GITHUB_CODES_CSV_URL, WHO_CODES_FILE, WHO_DOWNLOAD_INFO, cdc_codes_txt_url, cdc_tabular_url};
use parse::parse_records;
use sink::Sink;
use upload::upload_in_batches;
use verify::verify_table;

fn choose_format(args: &Args) -> Result<SourceFormat> {
    let format = args.format.unwrap_or_else(|| args.dataset.native_format());
    let supported = match args.dataset {
        Dataset::Cdc => matches!(format, SourceFormat::Xml | SourceFormat::Txt),
        Dataset::Who => matches!(format, SourceFormat::Txt),
        Dataset::Github => matches!(format, SourceFormat::Csv),
    };
    if !supported {
        bail!(
            "Format {format:?} is not available for dataset {:?}. \
             cdc supports xml and txt, who supports txt, github supports csv.",
            args.dataset
        );
    }
    Ok(format)
}

/// Resolve where the source file lives locally and, for fetchable datasets,
/// the URL it is downloaded from. The WHO dataset has no URL: it must be
/// placed locally by hand after accepting the WHO license.
fn resolve_source(
    args: &Args,
    format: SourceFormat,
    data_dir: &std::path::Path,
) -> Result<(Option<String>, PathBuf)> {
    let (url, default_path) = match (args.dataset, format) {
        (Dataset::Cdc, SourceFormat::Xml) => {
            let url = cdc_tabular_url(args.year);
            let path = data_dir.join(file_name_from_url(&url)?);
            (Some(url), path)
        }
        (Dataset::Cdc, _) => {
            let url = cdc_codes_txt_url(args.year);
            let path = data_dir.join(file_name_from_url(&url)?);
            (Some(url), path)
        }
        (Dataset::Who, _) => (None, data_dir.join("who_icd10").join(WHO_CODES_FILE)),
        (Dataset::Github, _) => {
            let url = GITHUB_CODES_CSV_URL.to_string();
            let path = data_dir.join(file_name_from_url(&url)?);
            (Some(url), path)
        }
    };
    let path = args.input_path.clone().unwrap_or(default_path);
    Ok((url, path))
}

fn confirm_proceed() -> Result<bool> {
    print!("Proceed? (yes/no): ");
    io::stdout().flush().context("Failed flushing stdout")?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed reading confirmation answer")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = Client::builder()
        .user_agent("icd10-import/0.1")
        .build()
        .context("Failed creating HTTP client")?;
    let service_key = args.service_key.clone().unwrap_or_default();
    let sink = Sink::new(client.clone(), &args.supabase_url, &service_key);

    if args.verify_only {
        return verify_table(&sink, &args.table).await;
    }

    // Uploads need the service-role key before any network work starts.
    // Verification above is the one path allowed to proceed without it.
    if service_key.is_empty() {
        bail!(
            "SUPABASE_SERVICE_KEY is not set. Export a service-role key (or pass --service-key) before uploading."
        );
    }

    let format = choose_format(&args)?;
    let data_dir = project_root().join("data");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed creating data directory {}", data_dir.display()))?;

    let (source_url, input_path) = resolve_source(&args, format, &data_dir)?;
    if input_path.exists() {
        println!("Using source file {}", input_path.display());
    } else if let Some(url) = &source_url {
        println!(
            "Source file missing at {}. Downloading from {url}",
            input_path.display()
        );
        download_file(&client, url, &input_path).await?;
    } else {
        println!("{WHO_DOWNLOAD_INFO}");
        bail!("WHO dataset not found at {}", input_path.display());
    }

    println!("Parsing {}...", input_path.display());
    let raw = fs::read_to_string(&input_path)
        .with_context(|| format!("Failed reading {}", input_path.display()))?;
    let records = parse_records(format, &raw)?;
    if records.is_empty() {
        bail!("No records parsed from {}", input_path.display());
    }
    println!("Parsed {} ICD-10 codes.", format_count(records.len()));

    if args.export_json {
        let export_path = data_dir.join("icd10_export.json");
        export::export_json(&records, &export_path)?;
        println!(
            "Exported {} codes to {}",
            format_count(records.len()),
            export_path.display()
        );
    }

    let estimated_mib = (records.len() as f64 * 0.5) / 1024.0;
    println!(
        "About to upload {} codes to table {} (~{estimated_mib:.1} MiB).",
        format_count(records.len()),
        args.table
    );
    if !args.yes && !confirm_proceed()? {
        println!(
            "Upload cancelled. {} codes parsed but not uploaded.",
            format_count(records.len())
        );
        return Ok(());
    }

    let summary = upload_in_batches(&sink, &args.table, &records, args.batch_size).await;
    println!(
        "Upload complete: uploaded={} failed={} success_rate={:.1}%",
        format_count(summary.uploaded),
        format_count(summary.failed),
        summary.success_rate()
    );

    // The upload already finished; a verification hiccup should not flip the
    // exit code of an otherwise successful run.
    match verify_table(&sink, &args.table).await {
        Ok(()) => {}
        Err(err) => println!("Warning: verification failed: {err}"),
    }
    Ok(())
}
