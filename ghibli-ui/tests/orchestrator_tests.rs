//! Image-search state machine tests against mock gateways
//!
//! No network: the mocks settle instantly (or after a configured delay for
//! the single-flight test) so every step sequence is observable and
//! deterministic.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ghibli_common::types::GhibliImage;
use ghibli_ui::{
    GatewayError, ImageSearchGateways, ImageSearchOrchestrator, ImageSearchState, ImageSearchStep,
    StartError, UploadedImage,
};

fn sample_image(filename: &str) -> GhibliImage {
    GhibliImage {
        filename: filename.to_string(),
        year: 2001,
        movie_name: "Spirited Away".to_string(),
        description: "Train Ride".to_string(),
        movie_slug: "chihiro".to_string(),
        image_url: "/images/x.png".to_string(),
        thumbnail_url: "/thumbnails/x.webp".to_string(),
        score: 0.9,
    }
}

fn jpeg_upload(name: &str) -> UploadedImage {
    UploadedImage {
        name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0u8; 2048],
    }
}

#[derive(Default)]
struct MockGateways {
    /// Analyze fails for the first N calls, then succeeds
    analyze_failures: AtomicUsize,
    rewrite_fails: bool,
    search_fails: bool,
    analyze_delay: Option<Duration>,
    analyze_calls: AtomicUsize,
    search_queries: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageSearchGateways for MockGateways {
    async fn analyze(&self, image: &UploadedImage) -> Result<String, GatewayError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.analyze_delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .analyze_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(GatewayError("Couldn't analyze this image".to_string()));
        }
        Ok(format!("a caption for {}", image.name))
    }

    async fn rewrite(&self, description: &str) -> Result<String, GatewayError> {
        if self.rewrite_fails {
            return Err(GatewayError("Failed to rewrite query".to_string()));
        }
        Ok(format!("short query from {}", description.len()))
    }

    async fn search(&self, query: &str) -> Result<Vec<GhibliImage>, GatewayError> {
        self.search_queries.lock().unwrap().push(query.to_string());
        if self.search_fails {
            return Err(GatewayError("Failed to perform search".to_string()));
        }
        Ok(vec![sample_image("(2001) Spirited Away/Train Ride.png")])
    }
}

/// Collect emitted snapshots until the attempt settles.
async fn collect_until_settled(
    rx: &mut tokio::sync::broadcast::Receiver<ImageSearchState>,
) -> Vec<ImageSearchState> {
    let mut snapshots = Vec::new();
    loop {
        let state = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("attempt did not settle in time")
            .expect("event channel closed");
        let step = state.step;
        snapshots.push(state);
        if matches!(step, ImageSearchStep::Done | ImageSearchStep::Error) {
            return snapshots;
        }
    }
}

fn steps(snapshots: &[ImageSearchState]) -> Vec<ImageSearchStep> {
    snapshots.iter().map(|s| s.step).collect()
}

#[tokio::test]
async fn happy_path_walks_all_four_steps() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways::default());
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    let snapshots = collect_until_settled(&mut rx).await;

    assert_eq!(
        steps(&snapshots),
        vec![
            ImageSearchStep::Analyzing,
            ImageSearchStep::Rewriting,
            ImageSearchStep::Searching,
            ImageSearchStep::Done,
        ]
    );

    // Filename is set throughout, fields populate monotonically
    assert!(snapshots.iter().all(|s| s.filename.as_deref() == Some("scene.jpg")));
    assert!(snapshots[1].description.is_some());
    assert!(snapshots[2].search_query.is_some());

    let final_state = orchestrator.state().await;
    assert!(final_state.search_query.as_deref().unwrap().len() > 0);
    assert!(final_state.error.is_none());
    assert_eq!(orchestrator.latest_results().await.len(), 1);
}

#[tokio::test]
async fn rewrite_failure_falls_back_to_the_caption() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways {
        rewrite_fails: true,
        ..Default::default()
    });
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    let snapshots = collect_until_settled(&mut rx).await;

    // Never an error; the attempt completes with the caption as the query
    assert_eq!(snapshots.last().unwrap().step, ImageSearchStep::Done);
    assert!(steps(&snapshots).iter().all(|s| *s != ImageSearchStep::Error));

    let state = orchestrator.state().await;
    assert_eq!(state.search_query, state.description);
}

#[tokio::test]
async fn analysis_failure_is_terminal_with_retry() {
    let mock = MockGateways::default();
    mock.analyze_failures.store(1, Ordering::SeqCst);
    let orchestrator = ImageSearchOrchestrator::new(mock);
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    let snapshots = collect_until_settled(&mut rx).await;

    assert_eq!(
        steps(&snapshots),
        vec![ImageSearchStep::Analyzing, ImageSearchStep::Error]
    );
    let state = orchestrator.state().await;
    assert_eq!(state.error.as_deref(), Some("Couldn't analyze this image"));
    assert!(orchestrator.latest_results().await.is_empty());

    // The upload is retained, so a user-initiated retry can run the same
    // attempt again and succeed
    orchestrator.retry().await.unwrap();
    let snapshots = collect_until_settled(&mut rx).await;
    assert_eq!(snapshots.last().unwrap().step, ImageSearchStep::Done);
}

#[tokio::test]
async fn search_failure_is_terminal() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways {
        search_fails: true,
        ..Default::default()
    });
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    let snapshots = collect_until_settled(&mut rx).await;

    assert_eq!(snapshots.last().unwrap().step, ImageSearchStep::Error);
    assert!(orchestrator.latest_results().await.is_empty());
}

#[tokio::test]
async fn second_start_is_rejected_while_in_flight() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways {
        analyze_delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("first.jpg")).await.unwrap();
    let rejected = orchestrator.start(jpeg_upload("second.jpg")).await;
    assert_eq!(rejected, Err(StartError::AttemptInFlight));

    // The first attempt runs to completion, untouched by the second
    let snapshots = collect_until_settled(&mut rx).await;
    assert_eq!(snapshots.last().unwrap().step, ImageSearchStep::Done);
    assert_eq!(
        orchestrator.state().await.filename.as_deref(),
        Some("first.jpg")
    );
    assert_eq!(
        orchestrator.gateways_analyze_calls(),
        1,
    );
}

#[tokio::test]
async fn new_search_is_rejected_while_in_flight() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways {
        analyze_delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    let rejected = orchestrator.new_search("totoro", false).await;
    assert_eq!(rejected, Err(StartError::AttemptInFlight));

    collect_until_settled(&mut rx).await;
}

#[tokio::test]
async fn validation_rejects_without_touching_state() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways::default());

    let bad_type = UploadedImage {
        name: "clip.gif".to_string(),
        mime_type: "image/gif".to_string(),
        bytes: vec![0u8; 16],
    };
    assert_eq!(
        orchestrator.start(bad_type).await,
        Err(StartError::UnsupportedType)
    );

    let too_big = UploadedImage {
        name: "huge.png".to_string(),
        mime_type: "image/png".to_string(),
        bytes: vec![0u8; 10 * 1024 * 1024 + 1],
    };
    assert_eq!(orchestrator.start(too_big).await, Err(StartError::TooLarge));

    assert_eq!(orchestrator.state().await, ImageSearchState::default());
}

#[tokio::test]
async fn clear_resets_everything() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways::default());
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    collect_until_settled(&mut rx).await;

    orchestrator.clear().await;
    assert_eq!(orchestrator.state().await, ImageSearchState::default());
    assert!(orchestrator.latest_results().await.is_empty());

    // Nothing retained after a reset
    assert_eq!(orchestrator.retry().await, Err(StartError::NothingToRetry));
}

#[tokio::test]
async fn done_query_can_be_reused_without_reanalysis() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways::default());
    let mut rx = orchestrator.subscribe();

    orchestrator.start(jpeg_upload("scene.jpg")).await.unwrap();
    collect_until_settled(&mut rx).await;
    let first_query = orchestrator.state().await.search_query.unwrap();

    let results = orchestrator.repeat_image_query().await.unwrap();
    assert_eq!(results.len(), 1);

    // Analysis ran once; the reuse went straight to search with the same query
    assert_eq!(orchestrator.gateways_analyze_calls(), 1);
    assert_eq!(
        orchestrator.gateways_search_queries(),
        vec![first_query.clone(), first_query]
    );
}

#[tokio::test]
async fn reuse_outside_done_is_rejected() {
    let orchestrator = ImageSearchOrchestrator::new(MockGateways::default());
    assert_eq!(
        orchestrator.repeat_image_query().await,
        Err(StartError::NothingToReuse)
    );
}

// Test-only peeks at the mock through the orchestrator
trait MockPeek {
    fn gateways_analyze_calls(&self) -> usize;
    fn gateways_search_queries(&self) -> Vec<String>;
}

impl MockPeek for ImageSearchOrchestrator<MockGateways> {
    fn gateways_analyze_calls(&self) -> usize {
        self.gateways().analyze_calls.load(Ordering::SeqCst)
    }

    fn gateways_search_queries(&self) -> Vec<String> {
        self.gateways().search_queries.lock().unwrap().clone()
    }
}
