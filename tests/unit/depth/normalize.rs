use super::*;

fn depth_opts() -> NormalizeOpts {
    NormalizeOpts {
        encoding: DepthEncoding::Depth,
        missing: MissingDepth::Far,
    }
}

#[test]
fn output_lies_in_unit_range_and_spans_it() {
    let raw = DepthMap::new(3, 2, vec![2.5, -4.0, 10.0, 0.0, 7.25, 3.0]).unwrap();
    let field = normalize(&raw, &depth_opts()).unwrap();
    assert!(field.values().iter().all(|v| (0.0..=1.0).contains(v)));
    assert_eq!(field.get(1, 0), 0.0);
    assert_eq!(field.get(2, 0), 1.0);
    assert_eq!((field.width(), field.height()), (3, 2));
}

#[test]
fn disparity_is_inverted_so_near_is_zero() {
    let raw = DepthMap::new(2, 1, vec![0.2, 0.9]).unwrap();
    let field = normalize(&raw, &NormalizeOpts::default()).unwrap();
    // Larger disparity is nearer.
    assert_eq!(field.get(0, 0), 1.0);
    assert_eq!(field.get(1, 0), 0.0);
}

#[test]
fn normalize_is_idempotent_on_normalized_fields() {
    let raw = DepthMap::new(4, 1, vec![3.0, 1.0, 2.0, 5.0]).unwrap();
    let once = normalize(&raw, &depth_opts()).unwrap();
    let twice = normalize(&once.to_depth_map(), &depth_opts()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn flat_depth_maps_to_far() {
    let raw = DepthMap::new(2, 2, vec![4.0; 4]).unwrap();
    let field = normalize(&raw, &NormalizeOpts::default()).unwrap();
    assert!(field.values().iter().all(|&v| v == 1.0));
    let again = normalize(&field.to_depth_map(), &depth_opts()).unwrap();
    assert_eq!(field, again);
}

#[test]
fn missing_samples_default_to_far() {
    let raw = DepthMap::new(3, 1, vec![0.0, f32::NAN, 1.0]).unwrap();
    let field = normalize(&raw, &depth_opts()).unwrap();
    assert_eq!(field.values(), &[0.0, 1.0, 1.0]);
}

#[test]
fn missing_samples_fixed_value_is_clamped() {
    let raw = DepthMap::new(3, 1, vec![0.0, f32::INFINITY, 1.0]).unwrap();
    let opts = NormalizeOpts {
        encoding: DepthEncoding::Depth,
        missing: MissingDepth::Value(-3.0),
    };
    let field = normalize(&raw, &opts).unwrap();
    assert_eq!(field.values(), &[0.0, 0.0, 1.0]);
}

#[test]
fn missing_samples_nearest_copies_neighbor() {
    // Each hole takes the value of the closest valid edge sample.
    let raw = DepthMap::new(4, 1, vec![0.0, f32::NAN, f32::NAN, 8.0]).unwrap();
    let opts = NormalizeOpts {
        encoding: DepthEncoding::Depth,
        missing: MissingDepth::Nearest,
    };
    let field = normalize(&raw, &opts).unwrap();
    assert_eq!(field.values(), &[0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn zero_dimensions_fail() {
    let raw = DepthMap::new(0, 4, Vec::new()).unwrap();
    let err = normalize(&raw, &depth_opts()).unwrap_err();
    assert!(matches!(err, DepthloopError::InvalidDepthData(_)));
}

#[test]
fn all_non_finite_fails() {
    let raw = DepthMap::new(2, 1, vec![f32::NAN, f32::NEG_INFINITY]).unwrap();
    let err = normalize(&raw, &depth_opts()).unwrap_err();
    assert!(matches!(err, DepthloopError::InvalidDepthData(_)));
}

#[test]
fn field_constructor_rejects_out_of_range() {
    assert!(NormalizedDepthField::new(2, 1, vec![0.0, 1.5]).is_err());
    assert!(NormalizedDepthField::new(2, 1, vec![0.0]).is_err());
    assert!(NormalizedDepthField::new(2, 1, vec![0.0, f32::NAN]).is_err());

    let ramp = NormalizedDepthField::horizontal_ramp(4, 2).unwrap();
    assert_eq!(ramp.row(1), &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
}
