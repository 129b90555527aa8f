use super::*;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn with_speed(total: usize, speed: f64) -> PlaybackController {
    PlaybackController::new(
        total,
        PlaybackTuning {
            auto_speed: speed,
            ..PlaybackTuning::default()
        },
    )
}

#[test]
fn starts_auto_at_constant_speed() {
    let c = PlaybackController::new(10, PlaybackTuning::default());
    assert_eq!(c.mode(), PlaybackMode::Auto);
    assert_eq!(c.speed(), 0.833);
    assert_eq!(c.frame_index(), Some(0));
}

#[test]
fn dead_zone_is_exactly_zero() {
    let t = PlaybackTuning::default();
    for x in [0.5, 0.45, 0.55, 0.4251, 0.5749] {
        assert_eq!(speed_for_pointer(x, &t), 0.0, "x = {x}");
    }
}

#[test]
fn speed_is_odd_around_center() {
    let t = PlaybackTuning::default();
    for i in 0..=100 {
        let x = f64::from(i) / 100.0;
        let a = speed_for_pointer(x, &t);
        let b = speed_for_pointer(1.0 - x, &t);
        assert!((a + b).abs() < 1e-9, "x = {x}: {a} vs {b}");
    }
}

#[test]
fn speed_reaches_max_at_edges_and_is_monotone() {
    let t = PlaybackTuning::default();
    assert!((speed_for_pointer(1.0, &t) - 5.0).abs() < 1e-12);
    assert!((speed_for_pointer(0.0, &t) + 5.0).abs() < 1e-12);
    // n = 0.575 -> (0.575 - 0.15) / 0.85 * 5 = 2.5
    assert!((speed_for_pointer(0.7875, &t) - 2.5).abs() < 1e-9);

    let mut prev = f64::NEG_INFINITY;
    for i in 0..=200 {
        let s = speed_for_pointer(f64::from(i) / 200.0, &t);
        assert!(s >= prev);
        prev = s;
    }
    // Out-of-range pointer positions are clamped.
    assert_eq!(speed_for_pointer(3.0, &t), speed_for_pointer(1.0, &t));
    assert_eq!(speed_for_pointer(-1.0, &t), speed_for_pointer(0.0, &t));
}

#[test]
fn forward_wrap_lands_on_zero() {
    let total = 12;
    let mut c = with_speed(total, 1.0);
    c.seek(total as f64 - 0.5);
    assert_eq!(c.frame_index(), Some(total - 1));
    assert_eq!(c.tick().unwrap().index, 0);
}

#[test]
fn backward_wrap_lands_on_last() {
    let total = 12;
    let mut c = with_speed(total, -1.0);
    assert_eq!(c.tick().unwrap().index, total - 1);
}

#[test]
fn index_stays_in_range_under_fast_speeds() {
    for speed in [5.0, -5.0, 0.833, -0.3] {
        let mut c = with_speed(7, speed);
        for _ in 0..500 {
            let req = c.tick().unwrap();
            assert!(req.index < 7);
            assert!(c.position() >= 0.0 && c.position() < 7.0);
        }
    }
}

#[test]
fn manual_reverts_to_auto_after_timeout() {
    let mut c = PlaybackController::new(100, PlaybackTuning::default());
    let t0 = secs(10.0);
    c.pointer_moved(0.9, t0);
    assert_eq!(c.mode(), PlaybackMode::Manual);
    assert!(c.speed() > 0.0);

    let mut poll = t0;
    while poll < t0 + DEFAULT_IDLE_TIMEOUT {
        assert_eq!(c.poll(poll), PlaybackMode::Manual, "poll at {poll:?}");
        poll += DEFAULT_POLL_INTERVAL;
    }
    assert_eq!(c.poll(t0 + DEFAULT_IDLE_TIMEOUT), PlaybackMode::Auto);
    assert_eq!(c.speed(), DEFAULT_AUTO_SPEED);
    assert_eq!(c.poll(t0 + secs(60.0)), PlaybackMode::Auto);
}

#[test]
fn new_input_extends_manual_mode() {
    let mut c = PlaybackController::new(100, PlaybackTuning::default());
    c.pointer_moved(0.1, secs(0.0));
    c.pointer_moved(0.2, secs(2.0));
    assert_eq!(c.poll(secs(4.0)), PlaybackMode::Manual);
    assert_eq!(c.poll(secs(5.0)), PlaybackMode::Auto);
}

#[test]
fn centered_pointer_pauses_playback() {
    let mut c = PlaybackController::new(10, PlaybackTuning::default());
    c.seek(4.2);
    c.pointer_moved(0.5, secs(1.0));
    assert_eq!(c.speed(), 0.0);
    assert_eq!(c.tick().unwrap().index, 4);
    assert_eq!(c.tick().unwrap().index, 4);
}

#[test]
fn ticks_carry_increasing_sequence_numbers() {
    let mut c = PlaybackController::new(3, PlaybackTuning::default());
    let seqs: Vec<_> = (0..5).map(|_| c.tick().unwrap().seq).collect();
    assert_eq!(seqs, [0, 1, 2, 3, 4]);
}

#[test]
fn empty_collection_issues_no_requests() {
    let mut c = PlaybackController::new(0, PlaybackTuning::default());
    assert_eq!(c.tick(), None);
    assert_eq!(c.status_text(), "AUTO | no frames");

    c.set_total_frames(4);
    assert_eq!(c.tick().unwrap().index, 0);
}

#[test]
fn shrinking_collection_rewraps_position() {
    let mut c = PlaybackController::new(50, PlaybackTuning::default());
    c.seek(40.0);
    c.set_total_frames(10);
    assert_eq!(c.frame_index(), Some(0));
}

#[test]
fn status_text_reports_mode_frame_and_speed() {
    let mut c = PlaybackController::new(240, PlaybackTuning::default());
    c.seek(11.5);
    assert_eq!(c.status_text(), "AUTO | frame 12/240 | speed +0.83");

    c.pointer_moved(0.0, secs(0.0));
    assert_eq!(c.status_text(), "MANUAL | frame 12/240 | speed -5.00");
}

#[test]
fn gate_drops_stale_arrivals() {
    let mut gate = LatestFrameGate::new();
    assert!(gate.accept(0));
    assert!(gate.accept(2));
    // Response for request 1 arrives after 2 was shown.
    assert!(!gate.accept(1));
    assert!(!gate.accept(2));
    assert!(gate.accept(3));
    assert_eq!(gate.last_shown(), Some(3));
}

#[test]
fn gate_accepts_in_order_arrivals() {
    let mut gate = LatestFrameGate::new();
    assert!((0..10).all(|seq| gate.accept(seq)));
}
