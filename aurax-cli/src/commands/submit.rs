//! Submission command handlers
//!
//! Starts virtual try-on, image generation and product description work,
//! optionally following the started task to completion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aurax_client::{AuraxClient, PollConfig};
use aurax_core::domain::product::ProductType;
use aurax_core::dto::image_generation::ImageGenerationRequest;
use aurax_core::dto::product_description::ProductDescriptionRequest;
use aurax_core::dto::task::TaskResponse;
use aurax_core::dto::vto::{GarmentStrength, VtoRequest};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Args;
use colored::*;

use super::FollowArgs;
use super::task::{print_snapshot, stream_until_terminal};

/// Arguments for `aurax vto`
#[derive(Args)]
pub struct VtoArgs {
    /// Image of the person
    #[arg(long)]
    pub person: PathBuf,

    /// Image of the garment
    #[arg(long)]
    pub garment: PathBuf,

    /// Product type (e.g. garment, dress, footwear)
    #[arg(long, default_value = "garment")]
    pub product_type: ProductType,

    /// Garment strength from 1 (low) to 3 (high)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub strength: u8,

    /// Optional mask image
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Optional prompt guiding the try-on
    #[arg(long)]
    pub prompt: Option<String>,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Arguments for `aurax generate`
#[derive(Args)]
pub struct GenerateArgs {
    /// Text prompt describing the image
    pub prompt: String,

    /// Product type (e.g. garment, dress, footwear)
    #[arg(long, default_value = "garment")]
    pub product_type: ProductType,

    /// Output width in pixels (service default when omitted)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels (service default when omitted)
    #[arg(long)]
    pub height: Option<u32>,

    /// Optional mask image
    #[arg(long)]
    pub mask: Option<PathBuf>,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Arguments for `aurax describe`
#[derive(Args)]
pub struct DescribeArgs {
    /// Product image
    pub image: PathBuf,

    /// Product type (e.g. garment, dress, footwear)
    #[arg(long, default_value = "garment")]
    pub product_type: ProductType,

    /// MIME type of the image, guessed from the extension when omitted
    #[arg(long)]
    pub mime_type: Option<String>,
}

/// Submit a virtual try-on task
pub async fn submit_vto(client: &AuraxClient, args: VtoArgs) -> Result<()> {
    let strength = GarmentStrength::try_from(args.strength)?;
    let mut request = VtoRequest::new(
        read_base64(&args.person).await?,
        read_base64(&args.garment).await?,
        args.product_type,
        strength,
    );
    if let Some(mask) = &args.mask {
        request = request.with_mask(read_base64(mask).await?);
    }
    if let Some(prompt) = args.prompt {
        request = request.with_prompt(prompt);
    }

    let task = client.vto(request).await?;
    follow_task(client, task, args.follow).await
}

/// Submit an image generation task
pub async fn submit_generation(client: &AuraxClient, args: GenerateArgs) -> Result<()> {
    let mut request = ImageGenerationRequest::new(args.prompt, args.product_type);
    if let Some(width) = args.width {
        request = request.with_width(width);
    }
    if let Some(height) = args.height {
        request = request.with_height(height);
    }
    if let Some(mask) = &args.mask {
        request = request.with_mask(read_base64(mask).await?);
    }

    let task = client.image_generation(request).await?;
    follow_task(client, task, args.follow).await
}

/// Describe a product image and print the description
pub async fn describe_product(client: &AuraxClient, args: DescribeArgs) -> Result<()> {
    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let file_name = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let mut request = ProductDescriptionRequest::new(image, file_name, args.product_type);
    if let Some(mime) = args.mime_type.or_else(|| guess_mime_type(&args.image).map(str::to_string))
    {
        request = request.with_mime_type(mime);
    }

    let description = client.product_description(request).await?;

    println!("{}", "Description:".bold());
    println!("{}", description);

    Ok(())
}

/// Print the started task and follow it if requested
async fn follow_task(client: &AuraxClient, task: TaskResponse, follow: FollowArgs) -> Result<()> {
    println!(
        "{} Task started: {}",
        "✓".green(),
        task.task_id.as_str().cyan()
    );

    if follow.wait {
        println!("{}", "Waiting for the task to finish...".dimmed());
        let snapshot = client.poll_task(&task.task_id, &PollConfig::default()).await?;
        print_snapshot(&snapshot);
    } else if follow.stream {
        stream_until_terminal(client, &task.task_id).await?;
    } else {
        println!(
            "{}",
            format!("Follow it with: aurax task stream {}", task.task_id).dimmed()
        );
    }

    Ok(())
}

async fn read_base64(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Guess an image MIME type from the file extension
fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
