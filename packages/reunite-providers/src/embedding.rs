use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	multipart::{Form, Part},
};
use serde_json::Value;

/// Sends one photo to the face-embedding provider. Returns `Some(vector)`
/// when a face was detected, `None` when the provider explicitly reports no
/// detectable face.
pub async fn embed_face(
	cfg: &reunite_config::EmbeddingProviderConfig,
	photo: Vec<u8>,
) -> Result<Option<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let form = Form::new()
		.text("model", cfg.model.clone())
		.part("file", Part::bytes(photo).file_name("photo.jpg"));
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.multipart(form)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embed_response(json)
}

fn parse_embed_response(json: Value) -> Result<Option<Vec<f32>>> {
	match json.get("embedding") {
		None | Some(Value::Null) => {
			let detected = json.get("face_detected").and_then(|v| v.as_bool()).unwrap_or(false);

			if detected {
				return Err(eyre::eyre!(
					"Provider reported a detected face but returned no embedding."
				));
			}

			Ok(None)
		},
		Some(Value::Array(values)) => {
			let mut vector = Vec::with_capacity(values.len());

			for value in values {
				let number = value
					.as_f64()
					.ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;

				vector.push(number as f32);
			}

			Ok(Some(vector))
		},
		Some(_) => Err(eyre::eyre!("Embedding must be an array of numbers.")),
	}
}
