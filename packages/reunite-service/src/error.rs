use reunite_domain::AggregateError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No face was detected in any submitted photo.")]
	NoFaceDetected,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Store { message: String },
}
impl From<reunite_storage::Error> for Error {
	fn from(err: reunite_storage::Error) -> Self {
		Self::Store { message: err.to_string() }
	}
}

impl From<AggregateError> for Error {
	fn from(err: AggregateError) -> Self {
		match err {
			AggregateError::NoFaceDetected => Self::NoFaceDetected,
			// The provider is contractually fixed-dimension; a mismatch means
			// it broke that contract, not that the caller can retry.
			AggregateError::DimensionMismatch { .. } =>
				Self::Provider { message: err.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
