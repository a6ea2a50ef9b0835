//! Image command handler

use std::path::Path;

use anyhow::{Context, Result};
use aurax_client::AuraxClient;
use colored::*;

/// Download an image and write it to `output`
pub async fn download_image(client: &AuraxClient, id: &str, output: &Path) -> Result<()> {
    let bytes = client.get_image(id).await?;

    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} Saved {} bytes to {}",
        "✓".green(),
        bytes.len(),
        output.display().to_string().cyan()
    );

    Ok(())
}
