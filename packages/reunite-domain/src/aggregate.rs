/// Outcome of running the embedding model over a single photo.
#[derive(Clone, Debug, PartialEq)]
pub enum PhotoEmbedding {
	Face(Vec<f32>),
	NoFace,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
	#[error("No face was detected in any submitted photo.")]
	NoFaceDetected,
	#[error("Embedding dimensions are inconsistent: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
}

/// Combines per-photo embeddings of one identity into a single representative
/// vector: the component-wise arithmetic mean over exactly the photos where a
/// face was detected. Photos without a detectable face are excluded, not
/// zero-filled.
pub fn aggregate(outcomes: &[PhotoEmbedding]) -> Result<Vec<f32>, AggregateError> {
	let detected: Vec<&Vec<f32>> = outcomes
		.iter()
		.filter_map(|outcome| match outcome {
			PhotoEmbedding::Face(vector) => Some(vector),
			PhotoEmbedding::NoFace => None,
		})
		.collect();
	let Some(first) = detected.first() else {
		return Err(AggregateError::NoFaceDetected);
	};
	let dim = first.len();

	for vector in &detected {
		if vector.len() != dim {
			return Err(AggregateError::DimensionMismatch {
				expected: dim,
				actual: vector.len(),
			});
		}
	}

	let mut mean = vec![0.0_f32; dim];

	for vector in &detected {
		for (slot, component) in mean.iter_mut().zip(vector.iter()) {
			*slot += component;
		}
	}

	let count = detected.len() as f32;

	for slot in &mut mean {
		*slot /= count;
	}

	Ok(mean)
}
