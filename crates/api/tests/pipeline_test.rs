//! End-to-end pipeline behavior with a scripted landmark extractor

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use alerting::{AlarmCoordinator, AlarmSink, EventLogger};
use api::{render, stream};
use camera_capture::{CameraConfig, FrameSource, SyntheticDevice};
use detection::landmarks::test_support::{synthetic_landmarks, StubExtractor};
use detection::{DetectionConfig, Detector, SubjectState};
use storage::Repository;

struct CountingSink(AtomicUsize);

impl AlarmSink for CountingSink {
    fn play(&self, _duration: Duration) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Pipeline {
    source: FrameSource,
    detector: Detector,
    subject: Mutex<SubjectState>,
    alarm: AlarmCoordinator,
    logger: EventLogger,
    repository: Arc<Repository>,
    sink: Arc<CountingSink>,
    subject_id: i64,
}

fn pipeline(ear: f32, mar: f32, cooldown: Duration) -> Pipeline {
    let camera = CameraConfig {
        width: 64,
        height: 48,
        reopen_backoff_ms: 0,
        ..Default::default()
    };
    let repository = Arc::new(Repository::new());
    let subject_id = repository.register_subject("driver-1").unwrap();
    let sink = Arc::new(CountingSink(AtomicUsize::new(0)));

    Pipeline {
        source: FrameSource::new(Box::new(SyntheticDevice::new(&camera)), &camera),
        detector: Detector::new(
            Box::new(StubExtractor::with_landmarks(synthetic_landmarks(ear, mar))),
            DetectionConfig::default(),
        ),
        subject: Mutex::new(SubjectState::default()),
        alarm: AlarmCoordinator::new(
            Arc::clone(&sink) as Arc<dyn AlarmSink>,
            Duration::from_millis(1),
        ),
        logger: EventLogger::new(Arc::clone(&repository), cooldown),
        repository,
        sink,
        subject_id,
    }
}

impl Pipeline {
    /// One frame-processing iteration, mirroring the streaming loop
    fn step(&self) -> Vec<u8> {
        let frame = self.source.acquire().unwrap();
        let analysis = {
            let mut state = self.subject.lock().unwrap();
            self.detector.process(&frame, &mut state)
        };
        stream::dispatch_events(&analysis, self.subject_id, &self.alarm, &self.logger);
        let image = render::annotate(&frame, &analysis).unwrap();
        render::encode_jpeg(&image).unwrap()
    }

    fn wait_for_plays(&self, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.sink.0.load(Ordering::SeqCst) < expected {
            assert!(Instant::now() < deadline, "alarm playback never ran");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

#[test]
fn open_eyes_produce_no_events() {
    let pipeline = pipeline(0.25, 0.3, Duration::from_secs(10));
    for _ in 0..25 {
        pipeline.step();
    }
    assert_eq!(pipeline.repository.event_count(), 0);
    assert_eq!(pipeline.sink.0.load(Ordering::SeqCst), 0);
}

#[test]
fn twenty_closed_frames_alarm_and_log_once() {
    let pipeline = pipeline(0.15, 0.3, Duration::from_secs(10));
    for _ in 0..40 {
        pipeline.step();
    }

    pipeline.wait_for_plays(1);
    assert_eq!(pipeline.sink.0.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.repository.event_count(), 1);

    let events = pipeline
        .repository
        .recent_events(pipeline.subject_id, 10)
        .unwrap();
    assert_eq!(events[0].event_type, "Drowsiness Detected");
}

#[test]
fn every_frame_yields_a_valid_jpeg() {
    let pipeline = pipeline(0.15, 0.7, Duration::from_secs(10));
    for _ in 0..21 {
        let jpeg = pipeline.step();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
