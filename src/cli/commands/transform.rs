use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::OpenAiClient;
use crate::config::Config;
use crate::core::Transformer;
use crate::uploader::{self, BatchUploader};

#[derive(Args)]
pub struct TransformArgs {
    /// Boat photos to transform
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target location or waterway (e.g. "Miami Marina", "Lake Tahoe")
    #[arg(short, long)]
    pub location: String,

    /// Dealership name to feature in the prompt
    #[arg(short, long)]
    pub dealership: Option<String>,

    /// Output directory for transformed images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't download images automatically
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: TransformArgs, config: &Config) -> Result<()> {
    // Resolve files up front so a typo fails before any API call
    let mut files = Vec::with_capacity(args.files.len());
    for file in &args.files {
        files.push(file.canonicalize().with_context(|| {
            format!("Image file not found: {}", file.display())
        })?);
    }

    let client = OpenAiClient::from_config(config)?;
    let transformer = Transformer::new(Arc::new(client));
    let batch = BatchUploader::new(&transformer, &args.location, args.dealership.clone());

    let pb = if args.format == "text" {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        Some(pb)
    } else {
        None
    };

    let processed = batch
        .process(&files, |progress| {
            if let Some(pb) = &pb {
                pb.set_position(progress.index as u64);
                pb.set_message(format!("Transforming {}...", progress.file_name));
            }
        })
        .await;

    let failed = files.len() - processed.len();
    if let Some(pb) = &pb {
        if failed == 0 {
            pb.finish_with_message(format!("{} All images transformed", "✓".green()));
        } else {
            pb.finish_with_message(format!(
                "{} {} transformed, {} failed",
                "!".yellow(),
                processed.len(),
                failed
            ));
        }
    }

    if processed.is_empty() {
        anyhow::bail!("No images were transformed");
    }

    // Download results
    let output_dir = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let paths = if !args.no_download && config.output.auto_download {
        uploader::download_all(&processed, &output_dir).await?
    } else {
        Vec::new()
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&processed)?);
        }
        "quiet" => {
            for (i, image) in processed.iter().enumerate() {
                match paths.get(i).and_then(|p| p.as_ref()) {
                    Some(path) => println!("{}", path.display()),
                    None => println!("{}", image.processed_url),
                }
            }
        }
        _ => {
            println!();
            println!("{}: {}", "Location".cyan().bold(), args.location);
            println!("{}: {}", "Transformed".cyan().bold(), processed.len());
            if failed > 0 {
                println!("{}: {}", "Failed".cyan().bold(), failed.to_string().red());
            }
            println!();
            for (i, image) in processed.iter().enumerate() {
                println!("  {} {}", image.original_name.bold(), image.id.dimmed());
                match paths.get(i).and_then(|p| p.as_ref()) {
                    Some(path) => println!("    {}", path.display()),
                    None => println!("    {}", image.processed_url),
                }
            }
        }
    }

    Ok(())
}
