//! Command-line interface for the document chat pipeline

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;

use docchat_rag::{OpenAiClient, PdfExtractor, RagConfig, RagService};

#[derive(Parser)]
#[command(name = "docchat", about = "Chat with a single PDF document", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF and build its index, replacing any previous document
    Index {
        /// Path to the PDF file
        file: PathBuf,
    },
    /// Ask a question grounded in the indexed document
    Ask {
        /// The question to answer
        question: String,
        /// Number of chunks to retrieve
        #[arg(long)]
        top_k: Option<usize>,
        /// Stream the answer as it is generated
        #[arg(long)]
        stream: bool,
        /// Print the full response (answer plus retrieved chunks) as JSON
        #[arg(long, conflicts_with = "stream")]
        json: bool,
    },
    /// Chat with the model directly, without document retrieval
    Chat {
        /// The message to send
        message: String,
        /// Developer/system message
        #[arg(long, default_value = "You are a helpful assistant.")]
        system: String,
        /// Model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Show the active document's status
    Status,
    /// Delete the document, its raw file, and its index
    Delete {
        /// Filename as originally uploaded
        filename: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info,docchat_rag=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref())?;
    let openai = Arc::new(OpenAiClient::new(&config.openai)?);
    let service = RagService::new(config, Arc::new(PdfExtractor), openai.clone(), openai)?;

    match cli.command {
        Command::Index { file } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("file path has no usable filename")?
                .to_string();
            let bytes = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            service.upload(&filename, &bytes)?;
            let record = service.process(&filename).await?;
            println!(
                "indexed {} ({} chunks)",
                record.filename,
                record.chunk_count.unwrap_or(0)
            );
        }
        Command::Ask {
            question,
            top_k,
            stream,
            json,
        } => {
            if stream {
                let mut tokens = service.query_stream(&question, top_k).await?;
                let mut stdout = std::io::stdout();
                while let Some(fragment) = tokens.next().await {
                    stdout.write_all(fragment.as_bytes())?;
                    stdout.flush()?;
                }
                println!();
            } else {
                let response = service.query(&question, top_k).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    println!("{}", response.answer);
                }
            }
        }
        Command::Chat {
            message,
            system,
            model,
        } => {
            let mut tokens = service.chat_stream(&system, &message, model).await?;
            let mut stdout = std::io::stdout();
            while let Some(fragment) = tokens.next().await {
                stdout.write_all(fragment.as_bytes())?;
                stdout.flush()?;
            }
            println!();
        }
        Command::Status => match service.status() {
            Some(record) => {
                println!("document: {}", record.filename);
                println!("status:   {}", record.status);
                if let Some(count) = record.chunk_count {
                    println!("chunks:   {}", count);
                }
                if let Some(detail) = &record.error_detail {
                    println!("error:    {}", detail);
                }
                println!("updated:  {}", record.updated_at.to_rfc3339());
            }
            None => println!("no document uploaded"),
        },
        Command::Delete { filename } => {
            let record = service.delete(&filename)?;
            println!("deleted {}", record.filename);
        }
    }

    Ok(())
}
