use super::*;

#[test]
fn same_size_is_a_copy() {
    let src = DepthMap::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let out = resample_depth(&src, 2, 2).unwrap();
    assert_eq!(out.samples(), src.samples());
}

#[test]
fn upsample_constant_stays_constant() {
    let src = DepthMap::new(2, 2, vec![0.25; 4]).unwrap();
    let out = resample_depth(&src, 8, 8).unwrap();
    assert_eq!((out.width(), out.height()), (8, 8));
    assert!(out.samples().iter().all(|&v| (v - 0.25).abs() < 1e-6));
}

#[test]
fn upsample_interpolates_between_columns() {
    let src = DepthMap::new(2, 1, vec![0.0, 1.0]).unwrap();
    let out = resample_depth(&src, 4, 1).unwrap();
    let s = out.samples();
    assert_eq!(s[0], 0.0);
    assert_eq!(s[3], 1.0);
    assert!(s[1] > 0.0 && s[1] < s[2] && s[2] < 1.0);
}

#[test]
fn missing_samples_are_not_smeared() {
    let src = DepthMap::new(2, 1, vec![f32::NAN, 1.0]).unwrap();
    let out = resample_depth(&src, 4, 1).unwrap();
    let s = out.samples();
    assert!(s[0].is_nan());
    assert_eq!(s[3], 1.0);
    assert!(s.iter().all(|v| v.is_nan() || *v == 1.0));
}

#[test]
fn empty_inputs_are_rejected() {
    let empty = DepthMap::new(0, 0, Vec::new()).unwrap();
    assert!(matches!(
        resample_depth(&empty, 4, 4),
        Err(DepthloopError::InvalidDepthData(_))
    ));
    let src = DepthMap::new(1, 1, vec![1.0]).unwrap();
    assert!(resample_depth(&src, 0, 4).is_err());
}
