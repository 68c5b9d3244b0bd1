use super::*;

#[test]
fn frame_range_rejects_reversed_bounds() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert_eq!(FrameRange::new(FrameIndex(4), FrameIndex(4)).unwrap().len_frames(), 0);
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn frame_range_chunks_cover_range_in_order() {
    let r = FrameRange::new(FrameIndex(0), FrameIndex(20)).unwrap();
    let chunks: Vec<_> = r.chunks(8).collect();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].start, FrameIndex(0));
    assert_eq!(chunks[2].end, FrameIndex(20));
    assert_eq!(chunks.iter().map(|c| c.len_frames()).sum::<u64>(), 20);
}

#[test]
fn fps_rejects_zero_and_maps_frames_to_secs() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());

    let fps = Fps::integer(10).unwrap();
    assert_eq!(fps.secs_to_frames_round(2.0), 20);
    assert_eq!(fps.frames_to_secs(5), 0.5);
}

#[test]
fn fps_rational_roundtrip() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_round(secs), 123);
}
