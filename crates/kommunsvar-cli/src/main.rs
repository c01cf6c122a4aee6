// Kommunsvar CLI - ingestion and embedding operations

use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use kommunsvar_rag::{ingest_page, IngestOutcome, OpenAiClient, PageIndexer};
use kommunsvar_store::{NewPage, SupabaseClient};

mod extract;

use extract::extract_page;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Parser)]
#[command(name = "kommunsvar")]
#[command(version = "0.1.0")]
#[command(about = "Ingestion and embedding tools for the kommunsvar widget", long_about = None)]
struct Cli {
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase service role key
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// Tenant to operate on
    #[arg(long, env = "TENANT_ID")]
    tenant_id: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Connection settings, required for everything except check-env.
    fn store(&self) -> Result<(SupabaseClient, Uuid), Box<dyn std::error::Error>> {
        let url = self.supabase_url.as_deref().ok_or("SUPABASE_URL is not set")?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or("SUPABASE_SERVICE_ROLE_KEY is not set")?;
        let tenant_id = self.tenant_id.ok_or("TENANT_ID is not set")?;
        Ok((SupabaseClient::new(url, key)?, tenant_id))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch pages and upsert the changed ones
    Ingest {
        /// Page URLs to fetch
        urls: Vec<String>,

        /// File with one URL per line (# starts a comment)
        #[arg(long)]
        urls_file: Option<String>,
    },

    /// Chunk, classify and embed every stored page
    Embed {
        /// Actually write; without this flag nothing is embedded or stored
        #[arg(long)]
        run: bool,
    },

    /// Check which environment variables are set
    CheckEnv,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Ingest { urls, urls_file } => ingest(&cli, urls.clone(), urls_file.clone()).await,
        Commands::Embed { run } => embed(&cli, *run).await,
        Commands::CheckEnv => {
            check_env();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn ingest(
    cli: &Cli,
    mut urls: Vec<String>,
    urls_file: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (store, tenant_id) = cli.store()?;

    if let Some(path) = urls_file {
        let listing = std::fs::read_to_string(&path)?;
        urls.extend(
            listing
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        );
    }
    if urls.is_empty() {
        return Err("no URLs given; pass them as arguments or with --urls-file".into());
    }

    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

    let mut stored = 0usize;
    let mut unchanged = 0usize;
    let mut failed = 0usize;

    for url in &urls {
        print!("{} {} ... ", "fetching".cyan(), url);
        io::stdout().flush().ok();
        match fetch_and_store(&client, &store, tenant_id, url).await {
            Ok(IngestOutcome::Stored) => {
                stored += 1;
                println!("{}", "stored".green());
            }
            Ok(IngestOutcome::Unchanged) => {
                unchanged += 1;
                println!("{}", "unchanged".yellow());
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", "failed:".red(), e);
            }
        }
    }

    println!(
        "\n{} stored, {} unchanged, {} failed",
        stored.to_string().green(),
        unchanged.to_string().yellow(),
        failed.to_string().red()
    );
    Ok(())
}

async fn fetch_and_store(
    client: &reqwest::Client,
    store: &SupabaseClient,
    tenant_id: Uuid,
    url: &str,
) -> Result<IngestOutcome, Box<dyn std::error::Error>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;

    let extracted = extract_page(&html, url);
    if extracted.content.is_empty() {
        return Err("no readable text on the page".into());
    }

    let page = NewPage {
        tenant_id,
        url: url.to_string(),
        title: extracted.title,
        hash: content_hash(&extracted.content),
        content: extracted.content,
    };

    Ok(ingest_page(store, &page).await?)
}

fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

async fn embed(cli: &Cli, run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (store, tenant_id) = cli.store()?;
    let embedder = Arc::new(OpenAiClient::from_env()?);
    let indexer = PageIndexer::new(embedder, Arc::new(store));

    if !run {
        println!("{}", "dry run, pass --run to write".yellow().bold());
    }
    let stats = indexer.reindex_tenant(tenant_id, !run).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "Pages"]);
    for (label, count) in &stats.per_category {
        table.add_row(vec![label.to_string(), count.to_string()]);
    }
    println!("{table}");

    println!(
        "{} of {} pages processed, {} failed",
        stats.processed.to_string().green(),
        stats.total,
        stats.failed.to_string().red()
    );
    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn check_env() {
    println!("{}", "Environment".bold());
    for name in [
        "SUPABASE_URL",
        "SUPABASE_SERVICE_ROLE_KEY",
        "OPENAI_API_KEY",
        "TENANT_ID",
    ] {
        print_presence(name, true);
    }
    for name in [
        "IP_SALT",
        "AZURE_TRANSLATOR_KEY",
        "AZURE_TRANSLATOR_REGION",
        "AZURE_SPEECH_KEY",
        "AZURE_SPEECH_REGION",
        "KOMMUNSVAR_ADDR",
    ] {
        print_presence(name, false);
    }
}

fn print_presence(name: &str, required: bool) {
    let set = std::env::var(name).is_ok_and(|v| !v.is_empty());
    let status = match (set, required) {
        (true, _) => "set".green(),
        (false, true) => "MISSING".red().bold(),
        (false, false) => "not set".yellow(),
    };
    println!("  {name:<28} {status}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash("Bygglov krävs.");
        let b = content_hash("Bygglov krävs.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash("Annat innehåll."));
    }
}
