/// Hard policy floor for the similarity threshold. Caller-supplied values
/// below this are clamped up, regardless of the configured default.
pub const MIN_MATCH_THRESHOLD: f32 = 0.5;
/// Cosine similarity cannot exceed 1.0; anything higher would match nothing.
pub const MAX_MATCH_THRESHOLD: f32 = 1.0;

/// Clamps a requested similarity threshold into the allowed policy range.
/// Non-finite input falls back to the floor.
pub fn clamp_threshold(requested: f32) -> f32 {
	if !requested.is_finite() {
		return MIN_MATCH_THRESHOLD;
	}

	requested.clamp(MIN_MATCH_THRESHOLD, MAX_MATCH_THRESHOLD)
}
