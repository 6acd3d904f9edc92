use clap::{Parser, ValueEnum};

use crate::constants::DEFAULT_TABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// CDC ICD-10-CM release (tabular XML or codes TXT), fetched from the CDC FTP mirror.
    Cdc,
    /// WHO ICD-10 linearization output, manually downloaded (license acceptance required).
    Who,
    /// Curated open-source codes CSV hosted on GitHub.
    Github,
}

impl Dataset {
    pub fn native_format(self) -> SourceFormat {
        match self {
            Dataset::Cdc => SourceFormat::Xml,
            Dataset::Who => SourceFormat::Txt,
            Dataset::Github => SourceFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// Hierarchical tabular XML (chapters carry their own titles and ordering).
    Xml,
    /// One code + description per line, whitespace separated.
    Txt,
    /// code,description columns with a header row.
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "icd10_import")]
#[command(about = "Fetch an ICD-10-CM code dataset and bulk-load it into a Supabase table")]
pub struct Args {
    /// Dataset source.
    #[arg(long, value_enum, default_value_t = Dataset::Cdc)]
    pub dataset: Dataset,

    /// CDC release year used to template the download URLs.
    #[arg(long, default_value_t = 2024)]
    pub year: u16,

    /// Source file format. If omitted, it defaults to the dataset's native format.
    #[arg(long, value_enum)]
    pub format: Option<SourceFormat>,

    /// Local source file override. If omitted, it defaults to data/<url-file>.
    #[arg(long)]
    pub input_path: Option<std::path::PathBuf>,

    /// Only report what is already in the remote table, skip download and upload.
    #[arg(long, default_value_t = false)]
    pub verify_only: bool,

    /// Write the parsed records to data/icd10_export.json before uploading.
    #[arg(long, default_value_t = false)]
    pub export_json: bool,

    /// Skip the interactive confirmation prompt and proceed with the upload.
    #[arg(long, default_value_t = false)]
    pub yes: bool,

    /// Rows per bulk insert request.
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,

    /// Target table name in the remote store.
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Supabase project base URL, e.g. https://<project>.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase service-role key. Required for uploads; --verify-only can run
    /// without it when the table allows anonymous reads.
    #[arg(long, env = "SUPABASE_SERVICE_KEY", hide_env_values = true)]
    pub service_key: Option<String>,
}
