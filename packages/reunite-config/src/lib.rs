mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Matching, PhotoFetchConfig, Providers, Qdrant, Security,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.photos.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.photos.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.photos.max_photo_bytes == 0 {
		return Err(Error::Validation {
			message: "providers.photos.max_photo_bytes must be greater than zero.".to_string(),
		});
	}
	if !cfg.matching.default_threshold.is_finite() {
		return Err(Error::Validation {
			message: "matching.default_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.5..=1.0).contains(&cfg.matching.default_threshold) {
		return Err(Error::Validation {
			message: "matching.default_threshold must be in the range 0.5-1.0.".to_string(),
		});
	}
	if cfg.matching.top_k == 0 {
		return Err(Error::Validation {
			message: "matching.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.max_matches == 0 {
		return Err(Error::Validation {
			message: "matching.max_matches must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.max_matches > cfg.matching.top_k {
		return Err(Error::Validation {
			message: "matching.max_matches must not exceed matching.top_k.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
