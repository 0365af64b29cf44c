use anyhow::Context;
use image::RgbImage;

/// Resolve an image locator to decoded RGB pixels.
///
/// `http`/`https` locators are fetched over the network; anything else is
/// treated as a local file path. Fetch and decode failures both surface as
/// errors, never as an empty image.
pub async fn fetch_image(locator: &str) -> anyhow::Result<RgbImage> {
    let bytes = if locator.starts_with("http://") || locator.starts_with("https://") {
        fetch_remote(locator).await?
    } else {
        tokio::fs::read(locator)
            .await
            .with_context(|| format!("failed to read image file {locator}"))?
    };

    tracing::debug!(locator, bytes = bytes.len(), "Image bytes resolved");

    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode image from {locator}"))?;

    Ok(image.to_rgb8())
}

async fn fetch_remote(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch image from {url}"))?
        .error_for_status()
        .with_context(|| format!("image fetch returned an error status for {url}"))?;

    let bytes = response
        .bytes()
        .await
        .context("failed to read image response body")?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = fetch_image("/nonexistent/path/image.jpg").await;

        assert!(result.is_err());
        assert!(
            result.unwrap_err().to_string().contains("read image file"),
            "error should point at the unreadable file"
        );
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_an_error() {
        let path = std::env::temp_dir().join("scoring_fetch_garbage.bin");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = fetch_image(path.to_str().unwrap()).await;

        assert!(result.is_err(), "garbage bytes must not decode");
        assert!(
            result.unwrap_err().to_string().contains("decode image"),
            "error should report the decode failure"
        );

        let _ = std::fs::remove_file(&path);
    }
}
