use reunite_domain::{Namespace, PhotoEmbedding, aggregate, clamp_threshold};

#[test]
fn representative_vector_is_the_mean_of_detected_faces() {
	let outcomes = [
		PhotoEmbedding::Face(vec![0.9, 0.1, 0.0]),
		PhotoEmbedding::Face(vec![0.7, 0.3, 0.2]),
		PhotoEmbedding::NoFace,
		PhotoEmbedding::Face(vec![0.8, 0.2, 0.1]),
	];
	let mean = aggregate(&outcomes).expect("aggregation failed");

	assert_eq!(mean.len(), 3);
	assert!((mean[0] - 0.8).abs() < 1e-6);
	assert!((mean[1] - 0.2).abs() < 1e-6);
	assert!((mean[2] - 0.1).abs() < 1e-6);
}

#[test]
fn namespace_round_trips_through_its_tag() {
	for namespace in Namespace::ALL {
		assert_eq!(namespace.as_str().parse::<Namespace>().unwrap(), namespace);
	}
}

#[test]
fn threshold_policy_matches_the_documented_range() {
	assert_eq!(clamp_threshold(0.1), 0.5);
	assert_eq!(clamp_threshold(0.7), 0.7);
	assert_eq!(clamp_threshold(2.0), 1.0);
}
