//! Terminal storefront: browse the catalog and run a try-on against a relay.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tryon::{
    client::{HttpTransport, TryOnSession},
    config::ClientConfig,
    logger,
    models::{mime_for_path, GenerationResult, ImageUpload},
    Result, TryOnError,
};

#[derive(Debug, Parser)]
#[command(name = "tryon-cli", about = "Virtual T-shirt try-on from the terminal", version)]
struct Cli {
    /// Origin the relay and its assets are served from.
    #[arg(long, env = "TRYON_ORIGIN", default_value = tryon::config::DEFAULT_ORIGIN)]
    origin: String,
    /// Path of the try-on endpoint, relative to the origin.
    #[arg(long, env = "TRYON_ENDPOINT", default_value = tryon::config::DEFAULT_ENDPOINT)]
    endpoint: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available T-shirts.
    Catalog,
    /// See how a T-shirt looks on you.
    TryOn {
        /// Product id from `catalog`.
        #[arg(long)]
        product: u32,
        /// Your photo.
        #[arg(long, value_name = "path")]
        photo: PathBuf,
        /// Where to write the generated image.
        #[arg(long, value_name = "path")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    if let Err(e) = logger::init() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let config = ClientConfig::new()
        .with_origin(cli.origin)
        .with_endpoint(cli.endpoint);

    let outcome = match cli.command {
        Command::Catalog => list_catalog(&config).await,
        Command::TryOn {
            product,
            photo,
            out,
        } => try_on(&config, product, &photo, &out).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn list_catalog(config: &ClientConfig) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    let catalog = transport.fetch_catalog().await?;

    for product in catalog.products() {
        println!("{:>3}  {:<20} {}", product.id, product.name, product.display_price());
    }
    Ok(())
}

async fn try_on(config: &ClientConfig, product_id: u32, photo: &Path, out: &Path) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    let catalog = transport.fetch_catalog().await?;

    let data = tokio::fs::read(photo)
        .await
        .map_err(|e| TryOnError::Io(format!("could not read {}: {}", photo.display(), e)))?;
    let file_name = photo
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    let content_type = mime_for_path(photo).map(str::to_string);

    let mut session = TryOnSession::new(transport, catalog, config)?.with_loading_observer(|loading| {
        if loading {
            eprint!("Generating your try-on...");
        } else {
            eprintln!(" done");
        }
        std::io::stderr().flush().ok();
    });

    let product = session.select_product(product_id)?;
    println!("Trying on {} ({})", product.name, product.display_price());
    session.upload_photo(ImageUpload::new(file_name, content_type, data));

    match session.generate().await {
        GenerationResult::Image(image) => {
            let bytes = image.decode()?;
            tokio::fs::write(out, &bytes).await.map_err(|e| {
                TryOnError::Io(format!("could not write {}: {}", out.display(), e))
            })?;
            println!("Saved {} ({}, {} bytes)", out.display(), image.mime_type, bytes.len());
            Ok(())
        }
        GenerationResult::Error(message) => Err(TryOnError::Transport(message.clone())),
    }
}
