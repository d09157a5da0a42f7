use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shots_core::imu::{DeviceOrientation, RawMotion, EXPORT_HEADER};
use shots_core::session::{QuantityStatistics, SessionType, TelemetryKind};
use shots_core::testing::{HostLog, ManualMotionSource, RecorderLog, ScriptedClock};
use shots_core::WorkoutConfig;
use shots_engine::{WorkoutEvent, WorkoutManager, WorkoutState};

fn manager(
    source: &ManualMotionSource,
    clock: &ScriptedClock,
    orientation: DeviceOrientation,
) -> WorkoutManager<ScriptedClock> {
    let source = source.clone();
    WorkoutManager::with_clock(
        WorkoutConfig::default(),
        move || source.clone(),
        RecorderLog::new(),
        HostLog::with_orientation(orientation),
        clock.clone(),
    )
    .expect("valid config")
}

#[test]
fn goal_session_from_start_to_export() {
    let source = ManualMotionSource::new();
    let clock = ScriptedClock::starting_at(Duration::from_secs(1_000));
    let manager = manager(&source, &clock, DeviceOrientation::new(true, false));
    let events = manager.subscribe();

    manager.start("goal-72", SessionType::Goal).unwrap();
    let motion = manager.subscribe_motion().expect("goal sessions capture motion");

    for k in 0..30 {
        let phase = k as f64 * 0.1;
        source.deliver(RawMotion::new(
            [0.02 * phase.sin(), 0.01, -0.03],
            [0.1, 0.0, 0.2 * phase.cos()],
            [0.05, -0.98, -0.1],
        ));
        clock.advance(Duration::from_millis(33));
    }
    manager.add_arrow().unwrap();
    manager.pause().unwrap();
    clock.advance(Duration::from_secs(60));
    manager.resume().unwrap();
    source.deliver(RawMotion::new([0.0; 3], [0.0; 3], [0.0, -1.0, 0.0]));
    clock.advance(Duration::from_millis(10));
    manager.add_arrow().unwrap();
    let details = manager.stop().unwrap();

    assert_eq!(details.arrow_counter, 2);
    assert_eq!(details.elapsed_seconds, 1);
    assert_eq!(motion.try_iter().count(), 31);

    let export = manager.motion_export().unwrap();
    assert!(export.starts_with(EXPORT_HEADER));
    let lines: Vec<_> = export.lines().collect();
    assert_eq!(lines.len(), 32);
    assert!(lines[31].starts_with("1.00,"));
    // Crown on the left mirrors X/Y but never Z.
    assert!(lines[1].ends_with(",-0.05000000,0.98000000,-0.10000000"));

    let kinds: Vec<_> = events
        .try_iter()
        .map(|event| match event {
            WorkoutEvent::Started(_) => "started",
            WorkoutEvent::Paused(_) => "paused",
            WorkoutEvent::Resumed(_) => "resumed",
            WorkoutEvent::Stopped(_) => "stopped",
            WorkoutEvent::Updated(_) => "updated",
            WorkoutEvent::Locked(_) => "locked",
            WorkoutEvent::RecordingFailed(_) => "failed",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["started", "updated", "paused", "resumed", "updated", "stopped"]
    );
}

#[test]
fn samples_and_telemetry_from_other_threads() {
    let source = ManualMotionSource::new();
    let clock = ScriptedClock::default();
    let manager = Arc::new(manager(&source, &clock, DeviceOrientation::default()));
    manager.start("threads", SessionType::Free).unwrap();

    let sensor = {
        let source = source.clone();
        thread::spawn(move || {
            let mut delivered = 0;
            for _ in 0..200 {
                if source.deliver(RawMotion::new([0.0, 0.0, 0.1], [0.0; 3], [0.0, 0.0, -1.0])) {
                    delivered += 1;
                }
            }
            delivered
        })
    };

    let telemetry = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for bpm in 80..120 {
                let bpm = bpm as f64;
                manager
                    .on_telemetry_update(
                        TelemetryKind::HeartRate,
                        &QuantityStatistics::discrete(bpm, 80.0, bpm, 95.0),
                    )
                    .unwrap();
            }
        })
    };

    for _ in 0..10 {
        manager.add_arrow().unwrap();
    }

    let delivered = sensor.join().unwrap();
    telemetry.join().unwrap();
    let details = manager.stop().unwrap();

    assert_eq!(manager.state(), WorkoutState::Ended);
    assert_eq!(manager.motion_samples().len(), delivered);
    assert_eq!(details.arrow_counter, 10);
    assert_eq!(details.max_heart_rate, Some(119));
    assert_eq!(details.min_heart_rate, Some(80));

    let timestamps: Vec<f64> = manager.motion_samples().iter().map(|s| s.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn manual_session_has_no_motion() {
    let source = ManualMotionSource::new();
    let clock = ScriptedClock::default();
    let manager = manager(&source, &clock, DeviceOrientation::default());

    manager.start("manual", SessionType::Manual).unwrap();
    assert!(manager.subscribe_motion().is_none());
    assert!(manager.pause().is_err());
    clock.advance(Duration::from_secs(95));
    let details = manager.stop().unwrap();

    assert_eq!(details.elapsed_seconds, 95);
    assert!(manager.motion_export().is_none());
    assert_eq!(source.start_count(), 0);
}

#[test]
fn concurrent_updates_reach_subscribers_in_order() {
    let source = ManualMotionSource::new();
    let clock = ScriptedClock::default();
    let manager = Arc::new(manager(&source, &clock, DeviceOrientation::default()));
    let events = manager.subscribe();
    manager.start("busy-line", SessionType::Manual).unwrap();

    let archers: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    manager.add_arrow().unwrap();
                }
            })
        })
        .collect();
    let vitals = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for meters in 0..500 {
                manager
                    .on_telemetry_update(
                        TelemetryKind::Distance,
                        &QuantityStatistics::cumulative(meters as f64),
                    )
                    .unwrap();
            }
        })
    };
    for archer in archers {
        archer.join().unwrap();
    }
    vitals.join().unwrap();
    let final_details = manager.stop().unwrap();

    let received: Vec<_> = events.try_iter().collect();
    let snapshots: Vec<_> = received.iter().filter_map(|e| e.details()).collect();
    assert!(snapshots
        .windows(2)
        .all(|w| w[0].arrow_counter <= w[1].arrow_counter
            && w[0].cumulative_distance <= w[1].cumulative_distance));
    assert_eq!(final_details.arrow_counter, 8_000);
    assert_eq!(final_details.cumulative_distance, 499);
    assert_eq!(received.last(), Some(&WorkoutEvent::Stopped(final_details)));
}
