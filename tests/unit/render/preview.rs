use super::*;
use crate::{
    animation::params::CurveType, assets::depth_image::DiffuseImage,
    depth::normalize::NormalizedDepthField,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn image() -> DepthImage {
    let diffuse = DiffuseImage::solid(4, 4, [120, 60, 30, 255]).unwrap();
    let depth = NormalizedDepthField::horizontal_ramp(4, 4).unwrap();
    DepthImage::from_normalized(diffuse, depth).unwrap()
}

fn recording_loop() -> (
    PreviewLoop<impl FrameConsumer>,
    mpsc::Receiver<RenderedFrame>,
) {
    let (tx, rx) = mpsc::channel();
    let preview = PreviewLoop::new(move |frame: RenderedFrame| {
        let _ = tx.send(frame);
    });
    (preview, rx)
}

#[test]
fn starts_idle_and_refuses_to_tick() {
    let (mut preview, rx) = recording_loop();
    assert_eq!(preview.state(), LoopState::Idle);
    assert_eq!(preview.tick(Instant::now()), TickOutcome::NotRunning);
    assert!(rx.try_recv().is_err());
    assert!(preview.snapshot().is_none());
}

#[test]
fn full_lifecycle() {
    let t = Instant::now();
    let (mut preview, rx) = recording_loop();
    preview.start(image(), AnimationParameters::default(), t);
    assert_eq!(preview.state(), LoopState::Running);

    assert_eq!(preview.tick(t + ms(16)), TickOutcome::Delivered);
    assert_eq!(rx.try_recv().unwrap().time_secs, 0.016);

    preview.pause(t + ms(20)).unwrap();
    assert_eq!(preview.state(), LoopState::Paused);
    assert_eq!(preview.tick(t + ms(40)), TickOutcome::NotRunning);

    preview.resume(t + ms(50)).unwrap();
    assert_eq!(preview.state(), LoopState::Running);

    preview.stop().unwrap();
    assert_eq!(preview.state(), LoopState::Stopped);
    assert_eq!(preview.tick(t + ms(60)), TickOutcome::NotRunning);
    assert_eq!(preview.stats().delivered, 1);
}

#[test]
fn pause_gap_is_not_counted() {
    let t = Instant::now();
    let (mut preview, rx) = recording_loop();
    preview.start(image(), AnimationParameters::default(), t);
    preview.tick(t + ms(100));
    preview.pause(t + ms(100)).unwrap();
    assert_eq!(preview.elapsed(), ms(100));

    // An hour of wall clock passes while paused.
    let back = t + Duration::from_secs(3600);
    preview.resume(back).unwrap();
    preview.tick(back + ms(16));

    let frames: Vec<f64> = rx.try_iter().map(|f| f.time_secs).collect();
    assert_eq!(frames, vec![0.1, 0.116]);
}

#[test]
fn invalid_transitions_are_rejected_without_changing_state() {
    let t = Instant::now();
    let (mut preview, _rx) = recording_loop();
    assert!(matches!(preview.pause(t), Err(DepthloopError::Validation(_))));
    assert!(preview.resume(t).is_err());
    assert!(preview.stop().is_err());
    assert!(preview.set_params(AnimationParameters::default()).is_err());
    assert_eq!(preview.state(), LoopState::Idle);

    preview.start(image(), AnimationParameters::default(), t);
    assert!(preview.resume(t).is_err());
    assert_eq!(preview.state(), LoopState::Running);

    preview.stop().unwrap();
    assert!(preview.pause(t).is_err());
    assert!(preview.resume(t).is_err());
    assert!(preview.stop().is_err());
    assert_eq!(preview.state(), LoopState::Stopped);
}

#[test]
fn new_image_after_stop_starts_fresh_session() {
    let t = Instant::now();
    let (mut preview, rx) = recording_loop();
    preview.start(image(), AnimationParameters::default(), t);
    preview.tick(t + ms(500));
    preview.stop().unwrap();

    let t2 = t + ms(900);
    preview.start(image(), AnimationParameters::default(), t2);
    assert_eq!(preview.elapsed(), Duration::ZERO);
    preview.tick(t2 + ms(10));
    let last = rx.try_iter().last().unwrap();
    assert_eq!(last.time_secs, 0.01);
}

#[test]
fn parameter_swap_keeps_elapsed_time() {
    let t = Instant::now();
    let (mut preview, _rx) = recording_loop();
    preview.start(image(), AnimationParameters::default(), t);
    preview.tick(t + ms(300));

    let swapped = AnimationParameters {
        intensity: 0.5,
        curve: CurveType::VerticalSweep,
        ..AnimationParameters::default()
    };
    preview.set_params(swapped).unwrap();
    assert_eq!(preview.elapsed(), ms(300));
    // Stored clamped.
    assert_eq!(preview.params().unwrap().intensity, 0.1);
    assert_eq!(preview.params().unwrap().curve, CurveType::VerticalSweep);

    preview.tick(t + ms(316));
    assert_eq!(preview.elapsed(), ms(316));
}

#[test]
fn snapshot_is_independent_of_the_live_clock() {
    let t = Instant::now();
    let (mut preview, _rx) = recording_loop();
    preview.start(image(), AnimationParameters::default(), t);
    preview.tick(t + ms(200));
    let snap = preview.snapshot().unwrap();
    preview.tick(t + ms(400));
    assert_eq!(snap.elapsed, ms(200));
    assert_eq!(preview.elapsed(), ms(400));
    assert_eq!(snap.renderer.image().width(), 4);
}

#[test]
fn failed_frame_is_dropped_and_loop_keeps_running() {
    let (mut preview, rx) = recording_loop();
    let t = Instant::now();
    preview.start(image(), AnimationParameters::default(), t);
    assert_eq!(preview.tick(t + ms(16)), TickOutcome::Delivered);

    preview.session.as_mut().unwrap().fail_next_render = true;
    assert_eq!(preview.tick(t + ms(32)), TickOutcome::Dropped);
    assert_eq!(preview.state(), LoopState::Running);
    assert_eq!(
        preview.stats(),
        PreviewStats {
            delivered: 1,
            dropped: 1
        }
    );

    // Time kept moving through the dropped frame.
    assert_eq!(preview.tick(t + ms(48)), TickOutcome::Delivered);
    assert_eq!(preview.stats().delivered, 2);
    let times: Vec<f64> = rx.try_iter().map(|f| f.time_secs).collect();
    assert_eq!(times, vec![0.016, 0.048]);
}

#[test]
fn preview_thread_delivers_frames_and_shuts_down() {
    let (tx, rx) = mpsc::channel();
    let thread = PreviewThread::spawn(
        move |frame: RenderedFrame| {
            let _ = tx.send(frame.time_secs);
        },
        PreviewOpts {
            frame_interval: ms(2),
            ..PreviewOpts::default()
        },
    )
    .unwrap();
    thread
        .start(image(), AnimationParameters::default())
        .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(second > first);

    thread.pause().unwrap();
    let stats = thread.shutdown().unwrap();
    assert!(stats.delivered >= 2);
    assert_eq!(stats.dropped, 0);
}

#[test]
fn preview_thread_rejects_zero_interval() {
    let result = PreviewThread::spawn(
        |_frame: RenderedFrame| {},
        PreviewOpts {
            frame_interval: Duration::ZERO,
            ..PreviewOpts::default()
        },
    );
    assert!(result.is_err());
}
