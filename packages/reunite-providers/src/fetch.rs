use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;

/// Downloads one photo. The size cap guards the embedding provider from
/// oversized uploads; a capped or failed photo is dropped by the caller, not
/// fatal to the submission.
pub async fn fetch_photo(cfg: &reunite_config::PhotoFetchConfig, url: &str) -> Result<Vec<u8>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client.get(url).send().await?.error_for_status()?;

	if let Some(length) = res.content_length()
		&& length > cfg.max_photo_bytes
	{
		return Err(eyre::eyre!(
			"Photo at {url} is {length} bytes, above the {} byte limit.",
			cfg.max_photo_bytes
		));
	}

	let bytes = res.bytes().await?;

	if bytes.len() as u64 > cfg.max_photo_bytes {
		return Err(eyre::eyre!(
			"Photo at {url} is {} bytes, above the {} byte limit.",
			bytes.len(),
			cfg.max_photo_bytes
		));
	}
	if bytes.is_empty() {
		return Err(eyre::eyre!("Photo at {url} is empty."));
	}

	Ok(bytes.to_vec())
}
