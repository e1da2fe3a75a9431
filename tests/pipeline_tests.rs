use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use podium::analysis::{
    mock_result, AnalysisError, AnalysisOutcome, AnalysisPipeline, AnalysisProvider,
    AnalysisRequest, AnalysisResult, BackendClient, GeminiClient,
};
use podium::config::Settings;
use podium::storage::{AnalysisMode, AnalysisStatus, Recording, RecordingStore};

/// A schema-conforming analysis body with every score set to 8 and no
/// top-level overall_score, so the client has to backfill it.
fn analysis_json() -> serde_json::Value {
    json!({
        "video_id": "placeholder",
        "voice_and_sound": {
            "volume": 8, "pace": 8, "pitch_variation": 8, "clarity": 8,
            "pause_usage": 8, "overall_score": 8
        },
        "word_choice": {
            "vocabulary_range": 8, "precision": 8, "vividness": 8,
            "appropriateness": 8, "overall_score": 8
        },
        "sentence_structure": {
            "completeness": 8, "conciseness": 8, "variety": 8,
            "grammatical_accuracy": 8, "overall_score": 8
        },
        "conversational_style": {
            "engagement": 8, "naturalness": 8, "confidence": 8,
            "empathy": 8, "overall_score": 8
        },
        "nonverbal_communication": {
            "eye_contact": 8, "facial_expression": 8, "posture": 8,
            "gestures": 8, "overall_score": 8
        },
        "overall_impression": {
            "persuasiveness": 8, "memorability": 8, "authenticity": 8,
            "delivery": 8, "overall_score": 8
        },
        "disfluencies": {
            "filler_words": [{"word": "um", "count": 3}],
            "repeated_phrases": []
        },
        "summary": "Strong, even delivery throughout."
    })
}

fn generation_envelope(body: &serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": body.to_string()}]}}
        ]
    })
}

fn test_settings(endpoint: &str) -> Settings {
    let mut settings = Settings::default();
    settings.gemini.api_key = "test-key".to_string();
    settings.gemini.endpoint = endpoint.to_string();
    settings.gemini.poll_initial_ms = 10;
    settings.gemini.poll_max_ms = 40;
    settings.gemini.poll_max_wait_ms = 1_000;
    settings
}

fn write_video(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("practice.mp4");
    std::fs::write(&path, b"not really a video").expect("write test video");
    path
}

#[tokio::test]
async fn upload_poll_analyze_round_trip() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/abc", "state": "PROCESSING"}
        })))
        .mount(&server)
        .await;

    // First state check still processing, then ready (flat shape).
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/abc", "state": "PROCESSING"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/abc", "state": "ACTIVE", "uri": "https://x/abc"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generation_envelope(&analysis_json())),
        )
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    let video = write_video(&tmp);

    let client = GeminiClient::from_settings(&test_settings(&server.uri()))?;
    let result = client.analyze_file(&video, "rec-123").await?;

    assert_eq!(result.video_id, "rec-123");
    assert_eq!(result.overall_score, Some(8.0));
    assert_eq!(result.disfluencies.filler_words[0].word, "um");
    Ok(())
}

#[tokio::test]
async fn upload_rejection_carries_raw_response_text() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(400).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    let video = write_video(&tmp);

    let client = GeminiClient::from_settings(&test_settings(&server.uri()))?;
    let err = client.upload(&video).await.unwrap_err();

    match err {
        AnalysisError::Upload { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("expected Upload error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn poller_times_out_when_file_never_becomes_ready() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/slow", "state": "PROCESSING"}
        })))
        .mount(&server)
        .await;

    let mut settings = test_settings(&server.uri());
    settings.gemini.poll_initial_ms = 30;
    settings.gemini.poll_max_ms = 40;
    settings.gemini.poll_max_wait_ms = 100;

    let client = GeminiClient::from_settings(&settings)?;
    let started = Instant::now();
    let err = client.poll_until_ready("files/slow").await.unwrap_err();

    assert!(matches!(err, AnalysisError::Timeout { .. }));
    assert!(started.elapsed() >= Duration::from_millis(100));
    Ok(())
}

#[tokio::test]
async fn poll_delays_follow_the_doubling_schedule() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/two", "state": "PROCESSING"}
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/two", "state": "ACTIVE", "uri": "https://x/two"}
        })))
        .mount(&server)
        .await;

    let mut settings = test_settings(&server.uri());
    settings.gemini.poll_initial_ms = 50;
    settings.gemini.poll_max_ms = 200;
    settings.gemini.poll_max_wait_ms = 10_000;

    let client = GeminiClient::from_settings(&settings)?;
    let started = Instant::now();
    let uri = client.poll_until_ready("files/two").await?;
    let elapsed = started.elapsed();

    assert_eq!(uri, "https://x/two");
    // Two non-terminal checks wait 50ms then 100ms (doubled, under the cap),
    // so the total is at least 150ms and nowhere near a third delay.
    assert!(elapsed >= Duration::from_millis(150), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1_000), "elapsed {:?}", elapsed);
    Ok(())
}

#[tokio::test]
async fn unknown_states_keep_polling_until_terminal() -> Result<()> {
    let server = MockServer::start().await;

    // A state string we have never seen must not abort the poll.
    Mock::given(method("GET"))
        .and(path("/v1beta/files/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/odd", "state": "QUEUED_V2"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/odd", "state": "ACTIVE", "uri": "https://x/odd"}
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::from_settings(&test_settings(&server.uri()))?;
    let uri = client.poll_until_ready("files/odd").await?;
    assert_eq!(uri, "https://x/odd");
    Ok(())
}

#[tokio::test]
async fn remote_processing_failure_is_terminal() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/bad", "state": "FAILED"}
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::from_settings(&test_settings(&server.uri()))?;
    let err = client.poll_until_ready("files/bad").await.unwrap_err();
    assert!(matches!(err, AnalysisError::RemoteProcessing(_)));
    Ok(())
}

#[tokio::test]
async fn malformed_generation_payload_is_a_parse_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_envelope(&json!({
            "not": "the schema"
        }))))
        .mount(&server)
        .await;

    let client = GeminiClient::from_settings(&test_settings(&server.uri()))?;
    let err = client.analyze("https://x/abc", "rec-123").await.unwrap_err();

    match err {
        AnalysisError::Parse { raw, .. } => assert!(raw.contains("not")),
        other => panic!("expected Parse error, got {:?}", other),
    }
    Ok(())
}

fn backend_settings(endpoint: &str) -> Settings {
    let mut settings = Settings::default();
    settings.backend.url = endpoint.to_string();
    settings
}

#[tokio::test]
async fn backend_round_trip_stamps_recording_id() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": "interview",
            "analysis": analysis_json(),
            "processing_time": 2.4
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    let video = write_video(&tmp);

    let client = BackendClient::from_settings(&backend_settings(&server.uri()))?;
    let result = client
        .analyze_video(&video, AnalysisMode::Interview, "rec-456")
        .await?;

    assert_eq!(result.video_id, "rec-456");
    assert_eq!(result.overall_score, Some(8.0));
    Ok(())
}

#[tokio::test]
async fn backend_distinguishes_rate_limit_from_server_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    let video = write_video(&tmp);
    let client = BackendClient::from_settings(&backend_settings(&server.uri()))?;

    let err = client
        .analyze_video(&video, AnalysisMode::General, "rec-1")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::RateLimited));

    let err = client
        .analyze_video(&video, AnalysisMode::General, "rec-1")
        .await
        .unwrap_err();
    match err {
        AnalysisError::Server { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Server error, got {:?}", other),
    }
    Ok(())
}

/// Provider that records the call order and either fails or succeeds.
struct ScriptedProvider {
    label: &'static str,
    fail: bool,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl AnalysisProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn analyze_video(
        &self,
        request: AnalysisRequest<'_>,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        self.calls.lock().unwrap().push(self.label);
        if self.fail {
            Err(AnalysisError::Server {
                status: 500,
                body: "boom".to_string(),
            })
        } else {
            Ok(mock_result(request.recording_id, request.mode))
        }
    }
}

async fn seeded_store(tmp: &TempDir) -> Result<(Arc<RecordingStore>, String)> {
    let video = write_video(tmp);
    let store = Arc::new(RecordingStore::open(tmp.path().join("library.json")));
    let recording = Recording::new(
        video.to_string_lossy().to_string(),
        "Pitch your project".to_string(),
    );
    let id = recording.id.clone();
    store.insert(recording).await?;
    Ok((store, id))
}

#[tokio::test]
async fn fallback_chain_tries_backend_before_local_result() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let (store, id) = seeded_store(&tmp).await?;
    let calls = Arc::new(Mutex::new(Vec::new()));

    let pipeline = AnalysisPipeline::with_providers(
        vec![
            Box::new(ScriptedProvider {
                label: "gemini",
                fail: true,
                calls: calls.clone(),
            }),
            Box::new(ScriptedProvider {
                label: "backend",
                fail: true,
                calls: calls.clone(),
            }),
            Box::new(ScriptedProvider {
                label: "mock",
                fail: false,
                calls: calls.clone(),
            }),
        ],
        store.clone(),
    );

    let outcome = pipeline.run(&id, Some(AnalysisMode::Pitch)).await?;
    assert!(matches!(outcome, AnalysisOutcome::Completed(_)));
    assert_eq!(*calls.lock().unwrap(), vec!["gemini", "backend", "mock"]);

    // Both remote paths failing must still end in completed, never pending.
    let recording = store.get(&id).await?.unwrap();
    assert_eq!(recording.analysis_status, AnalysisStatus::Completed);
    assert!(recording.analysis_result.is_some());
    Ok(())
}

#[tokio::test]
async fn successful_primary_skips_the_fallbacks() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let (store, id) = seeded_store(&tmp).await?;
    let calls = Arc::new(Mutex::new(Vec::new()));

    let pipeline = AnalysisPipeline::with_providers(
        vec![
            Box::new(ScriptedProvider {
                label: "gemini",
                fail: false,
                calls: calls.clone(),
            }),
            Box::new(ScriptedProvider {
                label: "backend",
                fail: true,
                calls: calls.clone(),
            }),
        ],
        store.clone(),
    );

    let outcome = pipeline.run(&id, None).await?;
    assert!(matches!(outcome, AnalysisOutcome::Completed(_)));
    assert_eq!(*calls.lock().unwrap(), vec!["gemini"]);
    Ok(())
}

#[tokio::test]
async fn exhausted_chain_marks_the_recording_failed() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let (store, id) = seeded_store(&tmp).await?;
    let calls = Arc::new(Mutex::new(Vec::new()));

    let pipeline = AnalysisPipeline::with_providers(
        vec![Box::new(ScriptedProvider {
            label: "gemini",
            fail: true,
            calls,
        })],
        store.clone(),
    );

    let outcome = pipeline.run(&id, None).await?;
    match outcome {
        AnalysisOutcome::Failed { message } => assert!(message.contains("retry")),
        other => panic!("expected Failed outcome, got {:?}", other),
    }

    let recording = store.get(&id).await?.unwrap();
    assert_eq!(recording.analysis_status, AnalysisStatus::Failed);
    assert!(recording.analysis_result.is_none());
    Ok(())
}

#[tokio::test]
async fn missing_video_file_fails_before_any_provider_runs() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = Arc::new(RecordingStore::open(tmp.path().join("library.json")));
    let recording = Recording::new(
        tmp.path().join("gone.mp4").to_string_lossy().to_string(),
        "Vanished take".to_string(),
    );
    let id = recording.id.clone();
    store.insert(recording).await?;

    let calls = Arc::new(Mutex::new(Vec::new()));
    let pipeline = AnalysisPipeline::with_providers(
        vec![Box::new(ScriptedProvider {
            label: "gemini",
            fail: false,
            calls: calls.clone(),
        })],
        store.clone(),
    );

    let outcome = pipeline.run(&id, None).await?;
    assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
    assert!(calls.lock().unwrap().is_empty());

    let recording = store.get(&id).await?.unwrap();
    assert_eq!(recording.analysis_status, AnalysisStatus::Failed);
    Ok(())
}
