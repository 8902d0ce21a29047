use std::sync::Arc;

use serde_json::Map;

use reunite_config::{
	Config, EmbeddingProviderConfig, Matching, PhotoFetchConfig, Providers, Qdrant, Security,
	Service, Storage,
};
use reunite_domain::Namespace;
use reunite_service::{Error, MatchService, RegisterRequest, SearchRequest};
use reunite_testkit::{FailingStore, MemoryStore, fixture_providers};

fn test_config(vector_dim: u32) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "reunite_test".to_string(),
				vector_dim,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				api_base: "http://127.0.0.1:9090".to_string(),
				api_key: "key".to_string(),
				path: "/v1/face/embed".to_string(),
				model: "facenet-512".to_string(),
				dimensions: vector_dim,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			photos: PhotoFetchConfig { timeout_ms: 1_000, max_photo_bytes: 1_048_576 },
		},
		matching: Matching {
			default_threshold: 0.7,
			top_k: 10,
			max_matches: 3,
			store_unmatched_queries: false,
		},
		security: Security { bind_localhost_only: true },
	}
}

fn service(cfg: Config, store: Arc<MemoryStore>) -> MatchService {
	MatchService::with_parts(cfg, store, fixture_providers())
}

fn register_request(
	identity_key: &str,
	namespace: Namespace,
	photo_urls: &[&str],
	reporter_id: Option<&str>,
) -> RegisterRequest {
	RegisterRequest {
		identity_key: identity_key.to_string(),
		namespace,
		photo_urls: photo_urls.iter().map(|url| url.to_string()).collect(),
		reporter_id: reporter_id.map(|id| id.to_string()),
	}
}

fn search_request(
	namespace: Namespace,
	photo_urls: &[&str],
	reporter_id: Option<&str>,
	threshold: Option<f32>,
) -> SearchRequest {
	SearchRequest {
		identity_key: "probe".to_string(),
		namespace,
		photo_urls: photo_urls.iter().map(|url| url.to_string()).collect(),
		reporter_id: reporter_id.map(|id| id.to_string()),
		threshold,
	}
}

#[tokio::test]
async fn register_stores_the_mean_of_detected_faces() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let response = engine
		.register(register_request(
			"case-1",
			Namespace::Report,
			&["[1.0, 0.0]", "no-face", "[0.0, 1.0]"],
			None,
		))
		.await
		.expect("register failed");

	assert!(response.success);
	assert_eq!(response.vector_dimension, 2);
	assert_eq!(store.stored_vector(Namespace::Report, "case-1"), Some(vec![0.5, 0.5]));
}

#[tokio::test]
async fn register_without_any_face_writes_nothing() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result = engine
		.register(register_request("case-1", Namespace::Report, &["no-face", "no-face"], None))
		.await;

	assert!(matches!(result, Err(Error::NoFaceDetected)));
	assert_eq!(store.record_count(Namespace::Report), 0);
}

#[tokio::test]
async fn empty_submission_fails_like_no_face() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result = engine.register(register_request("case-1", Namespace::Report, &[], None)).await;

	assert!(matches!(result, Err(Error::NoFaceDetected)));
}

#[tokio::test]
async fn reregistering_overwrites_without_merging() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("case-1", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("first register failed");
	engine
		.register(register_request("case-1", Namespace::Report, &["[0.0, 1.0]"], None))
		.await
		.expect("second register failed");

	assert_eq!(store.record_count(Namespace::Report), 1);
	assert_eq!(store.stored_vector(Namespace::Report, "case-1"), Some(vec![0.0, 1.0]));
}

#[tokio::test]
async fn the_same_key_lives_independently_in_both_namespaces() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("case-1", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("report register failed");
	engine
		.register(register_request("case-1", Namespace::Find, &["[0.0, 1.0]"], None))
		.await
		.expect("find register failed");

	assert_eq!(store.stored_vector(Namespace::Report, "case-1"), Some(vec![1.0, 0.0]));
	assert_eq!(store.stored_vector(Namespace::Find, "case-1"), Some(vec![0.0, 1.0]));
}

#[tokio::test]
async fn failed_photo_fetches_are_dropped_from_aggregation() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request(
			"case-1",
			Namespace::Report,
			&["fail:http://photos/one.jpg", "[0.0, 1.0]"],
			None,
		))
		.await
		.expect("register failed");

	assert_eq!(store.stored_vector(Namespace::Report, "case-1"), Some(vec![0.0, 1.0]));
}

#[tokio::test]
async fn all_fetches_failing_counts_as_no_face() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result = engine
		.register(register_request("case-1", Namespace::Report, &["fail:a", "fail:b"], None))
		.await;

	assert!(matches!(result, Err(Error::NoFaceDetected)));
}

#[tokio::test]
async fn provider_transport_failure_is_a_provider_error() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result =
		engine.register(register_request("case-1", Namespace::Report, &["error"], None)).await;

	assert!(matches!(result, Err(Error::Provider { .. })));
}

#[tokio::test]
async fn mismatched_provider_dimension_is_a_provider_error() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result = engine
		.register(register_request("case-1", Namespace::Report, &["[1.0, 2.0, 3.0]"], None))
		.await;

	assert!(matches!(result, Err(Error::Provider { .. })));
}

#[tokio::test]
async fn registering_into_unconfirmed_is_rejected() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let result = engine
		.register(register_request("case-1", Namespace::Unconfirmed, &["[1.0, 0.0]"], None))
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
}

#[tokio::test]
async fn search_finds_a_registered_identity_cross_check() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("A", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("register failed");

	// Query at cosine similarity 0.92 to the stored vector.
	let response = engine
		.search(search_request(Namespace::Report, &["[0.92, 0.3919183588]"], None, None))
		.await
		.expect("search failed");

	assert!(response.success);
	assert_eq!(response.matches.len(), 1);
	assert_eq!(response.matches[0].identity_key, "A");
	assert!((response.matches[0].score - 0.92).abs() < 1e-3);
}

#[tokio::test]
async fn searching_the_empty_population_returns_no_match() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("A", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("register failed");

	let response = engine
		.search(search_request(Namespace::Find, &["[0.92, 0.3919183588]"], None, None))
		.await
		.expect("search failed");

	assert!(!response.success);
	assert!(response.matches.is_empty());
	assert_eq!(response.message.as_deref(), Some("No matches found"));
}

#[tokio::test]
async fn matches_from_the_same_reporter_are_excluded() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("mine", Namespace::Report, &["[1.0, 0.0]"], Some("r1")))
		.await
		.expect("register failed");
	engine
		.register(register_request("theirs", Namespace::Report, &["[0.9, 0.1]"], Some("r2")))
		.await
		.expect("register failed");

	let response = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], Some("r1"), None))
		.await
		.expect("search failed");

	assert!(response.success);
	assert!(response.matches.iter().all(|item| item.identity_key != "mine"));
	assert_eq!(response.matches[0].identity_key, "theirs");
}

#[tokio::test]
async fn no_reporter_id_means_no_exclusion() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("mine", Namespace::Report, &["[1.0, 0.0]"], Some("r1")))
		.await
		.expect("register failed");

	let response = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, None))
		.await
		.expect("search failed");

	assert!(response.success);
	assert_eq!(response.matches[0].identity_key, "mine");
}

#[tokio::test]
async fn thresholds_below_the_floor_are_clamped_up() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	// Cosine similarity 0.6 to the probe below.
	engine
		.register(register_request("far", Namespace::Report, &["[0.6, 0.8]"], None))
		.await
		.expect("register failed");

	let permissive = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, Some(0.1)))
		.await
		.expect("search failed");

	// 0.1 behaves as 0.5, so the 0.6 candidate is kept.
	assert!(permissive.success);

	let strict = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, Some(0.95)))
		.await
		.expect("search failed");

	assert!(!strict.success);
}

#[tokio::test]
async fn the_threshold_lower_bound_is_inclusive() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("exact", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("register failed");

	// An identical probe scores exactly 1.0; a threshold of 1.0 must keep it.
	let response = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, Some(1.0)))
		.await
		.expect("search failed");

	assert!(response.success);
	assert_eq!(response.matches[0].identity_key, "exact");
}

#[tokio::test]
async fn at_most_three_matches_in_descending_order() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let candidates = [
		("a", "[1.0, 0.0]"),
		("b", "[0.9, 0.1]"),
		("c", "[0.8, 0.2]"),
		("d", "[0.7, 0.3]"),
		("e", "[0.6, 0.4]"),
	];

	for (key, photo) in candidates {
		engine
			.register(register_request(key, Namespace::Report, &[photo], None))
			.await
			.expect("register failed");
	}

	let response = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, Some(0.7)))
		.await
		.expect("search failed");

	assert_eq!(response.matches.len(), 3);
	assert!(response.matches.windows(2).all(|pair| pair[0].score >= pair[1].score));
	assert!(response.matches.iter().all(|item| item.score >= 0.7));
	assert_eq!(response.matches[0].identity_key, "a");
}

#[tokio::test]
async fn unmatched_queries_are_stored_only_when_enabled() {
	let store = Arc::new(MemoryStore::new());
	let mut cfg = test_config(2);

	cfg.matching.store_unmatched_queries = true;

	let engine = service(cfg, store.clone());
	let mut request = search_request(Namespace::Report, &["[1.0, 0.0]"], None, None);

	request.identity_key = "sighting-7".to_string();

	let response = engine.search(request).await.expect("search failed");

	assert!(!response.success);
	assert_eq!(store.record_count(Namespace::Unconfirmed), 1);
	assert_eq!(
		store.stored_vector(Namespace::Unconfirmed, "sighting-7"),
		Some(vec![1.0, 0.0])
	);
}

#[tokio::test]
async fn unmatched_queries_are_not_stored_by_default() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());
	let response = engine
		.search(search_request(Namespace::Report, &["[1.0, 0.0]"], None, None))
		.await
		.expect("search failed");

	assert!(!response.success);
	assert_eq!(store.record_count(Namespace::Unconfirmed), 0);
}

#[tokio::test]
async fn store_failures_surface_as_storage_errors() {
	let engine = MatchService::with_parts(
		test_config(2),
		Arc::new(FailingStore),
		fixture_providers(),
	);
	let result = engine
		.register(register_request("case-1", Namespace::Report, &["[1.0, 0.0]"], None))
		.await;

	assert!(matches!(result, Err(Error::Store { .. })));
}

#[tokio::test]
async fn stats_reports_per_namespace_counts() {
	let store = Arc::new(MemoryStore::new());
	let engine = service(test_config(2), store.clone());

	engine
		.register(register_request("a", Namespace::Report, &["[1.0, 0.0]"], None))
		.await
		.expect("register failed");
	engine
		.register(register_request("b", Namespace::Report, &["[0.0, 1.0]"], None))
		.await
		.expect("register failed");
	engine
		.register(register_request("c", Namespace::Find, &["[1.0, 1.0]"], None))
		.await
		.expect("register failed");

	let stats = engine.stats().await.expect("stats failed");

	assert_eq!(stats.total_vectors, 3);
	assert_eq!(stats.vectors_by_namespace.report, 2);
	assert_eq!(stats.vectors_by_namespace.find, 1);
	assert_eq!(stats.vectors_by_namespace.unconfirmed, 0);
}
