//! Annotated MJPEG streaming
//!
//! Each viewer request runs its own frame-processing loop on a blocking
//! thread: acquire frame, analyze, dispatch edges, annotate, encode, push a
//! multipart chunk. The loop is infinite; it ends only when the viewer
//! disconnects (the channel backing the response body closes) or the process
//! exits. Transient camera and encode failures are logged and skipped.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use alerting::{AlarmCoordinator, EventLogger};
use detection::{FatigueEvent, FrameAnalysis};

use crate::{render, AppState};

/// Fixed multipart boundary, matching the reference viewer
const BOUNDARY: &str = "frame";

/// Outstanding chunks before the producer blocks on a slow viewer
const CHANNEL_DEPTH: usize = 4;

/// `GET /api/v1/subjects/:id/stream`
pub async fn stream_frames(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<i64>,
) -> Response {
    if !state.repository.subject_exists(subject_id) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let subject = state.subject_state(subject_id);
    let source = Arc::clone(&state.source);
    let detector = Arc::clone(&state.detector);
    let alarm = Arc::clone(&state.alarm);
    let logger = Arc::clone(&state.logger);

    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Bytes, Infallible>>(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        run_pipeline(subject_id, source, detector, subject, alarm, logger, tx)
    });

    (
        [(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={}", BOUNDARY),
        )],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

/// Per-viewer frame-processing loop, run on a blocking thread.
///
/// Ends only when the viewer disconnects. Disconnects are normally observed
/// on a failed send, so the camera-retry path checks the channel explicitly:
/// a persistently failing device must not keep a viewerless loop alive.
fn run_pipeline(
    subject_id: i64,
    source: Arc<camera_capture::FrameSource>,
    detector: Arc<detection::Detector>,
    subject: Arc<std::sync::Mutex<detection::SubjectState>>,
    alarm: Arc<AlarmCoordinator>,
    logger: Arc<EventLogger>,
    tx: tokio::sync::mpsc::Sender<Result<Bytes, Infallible>>,
) {
    info!(subject_id, "stream started");
    loop {
        // Any read failure already reinitialized the device; just retry.
        let frame = match source.acquire() {
            Ok(frame) => frame,
            Err(_) => {
                if tx.is_closed() {
                    info!(subject_id, "viewer disconnected, stream ended");
                    break;
                }
                continue;
            }
        };

        let analysis = {
            let mut guard = subject.lock().unwrap_or_else(|e| e.into_inner());
            detector.process(&frame, &mut guard)
        };

        dispatch_events(&analysis, subject_id, &alarm, &logger);

        let Some(image) = render::annotate(&frame, &analysis) else {
            warn!(subject_id, "frame buffer mismatch, skipping frame");
            continue;
        };
        let jpeg = match render::encode_jpeg(&image) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(subject_id, error = %e, "frame encode failed, skipping frame");
                continue;
            }
        };

        if tx.blocking_send(Ok(multipart_chunk(&jpeg))).is_err() {
            info!(subject_id, "viewer disconnected, stream ended");
            break;
        }
    }
}

/// Route this frame's rising edges: drowsiness sounds the alarm (never gated
/// by the log cooldown), both event types go through the cooldown-gated log.
pub fn dispatch_events(
    analysis: &FrameAnalysis,
    subject_id: i64,
    alarm: &AlarmCoordinator,
    logger: &EventLogger,
) {
    for event in &analysis.events {
        if *event == FatigueEvent::Drowsiness {
            alarm.trigger();
        }
        logger.log(subject_id, *event);
    }
}

/// Frame one JPEG as a multipart chunk
fn multipart_chunk(jpeg: &[u8]) -> Bytes {
    let mut chunk =
        Vec::with_capacity(jpeg.len() + BOUNDARY.len() + 64);
    chunk.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    chunk.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    chunk.extend_from_slice(jpeg);
    chunk.extend_from_slice(b"\r\n");
    Bytes::from(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use alerting::AlarmSink;
    use detection::AlertFlags;
    use storage::Repository;

    struct CountingSink(AtomicUsize);

    impl AlarmSink for CountingSink {
        fn play(&self, _duration: Duration) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn analysis_with(events: Vec<FatigueEvent>) -> FrameAnalysis {
        FrameAnalysis {
            face_detected: true,
            region: None,
            metrics: None,
            flags: AlertFlags::default(),
            events,
        }
    }

    #[test]
    fn multipart_chunk_framing() {
        let chunk = multipart_chunk(&[0xFF, 0xD8, 0xFF]);
        let text = chunk.as_ref();
        assert!(text.starts_with(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n"));
        assert!(text.ends_with(b"\xFF\xD8\xFF\r\n"));
    }

    #[test]
    fn drowsiness_edge_triggers_alarm_and_log() {
        let repository = Arc::new(Repository::new());
        let subject_id = repository.register_subject("driver-1").unwrap();
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let alarm = AlarmCoordinator::new(
            Arc::clone(&sink) as Arc<dyn AlarmSink>,
            Duration::from_millis(1),
        );
        let logger = EventLogger::new(Arc::clone(&repository), Duration::ZERO);

        dispatch_events(
            &analysis_with(vec![FatigueEvent::Drowsiness]),
            subject_id,
            &alarm,
            &logger,
        );

        // Wait for the detached playback thread
        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while sink.0.load(Ordering::SeqCst) == 0 {
            assert!(std::time::Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(repository.event_count(), 1);
    }

    #[test]
    fn dead_camera_loop_ends_once_viewer_is_gone() {
        use camera_capture::{CameraConfig, CaptureDevice, CameraError, FrameSource, VideoFrame};
        use detection::{DetectionConfig, Detector, NullExtractor, SubjectState};

        struct DeadDevice;

        impl CaptureDevice for DeadDevice {
            fn read(&mut self) -> Result<VideoFrame, CameraError> {
                Err(CameraError::Read("device gone".into()))
            }

            fn reopen(&mut self) -> Result<(), CameraError> {
                Ok(())
            }
        }

        let camera = CameraConfig {
            reopen_backoff_ms: 0,
            ..Default::default()
        };
        let repository = Arc::new(Repository::new());
        let subject_id = repository.register_subject("driver-1").unwrap();
        let source = Arc::new(FrameSource::new(Box::new(DeadDevice), &camera));
        let detector = Arc::new(Detector::new(
            Box::new(NullExtractor::new()),
            DetectionConfig::default(),
        ));
        let subject = Arc::new(std::sync::Mutex::new(SubjectState::default()));
        let alarm = Arc::new(AlarmCoordinator::new(
            Arc::new(CountingSink(AtomicUsize::new(0))),
            Duration::from_millis(1),
        ));
        let logger = Arc::new(EventLogger::new(Arc::clone(&repository), Duration::ZERO));

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            run_pipeline(subject_id, source, detector, subject, alarm, logger, tx);
            done_tx.send(()).ok();
        });

        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("pipeline loop kept running with no viewer");
    }

    #[test]
    fn yawning_edge_logs_without_alarm() {
        let repository = Arc::new(Repository::new());
        let subject_id = repository.register_subject("driver-1").unwrap();
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let alarm = AlarmCoordinator::new(
            Arc::clone(&sink) as Arc<dyn AlarmSink>,
            Duration::from_millis(1),
        );
        let logger = EventLogger::new(Arc::clone(&repository), Duration::ZERO);

        dispatch_events(
            &analysis_with(vec![FatigueEvent::Yawning]),
            subject_id,
            &alarm,
            &logger,
        );
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(sink.0.load(Ordering::SeqCst), 0);
        assert_eq!(repository.event_count(), 1);
    }
}
