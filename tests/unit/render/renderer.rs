use super::*;
use crate::{
    animation::params::CurveType,
    assets::depth_image::DiffuseImage,
    depth::normalize::NormalizedDepthField,
};

fn gradient_image(width: u32, height: u32) -> DepthImage {
    let data = (0..height)
        .flat_map(|y| (0..width).flat_map(move |x| [(x * 20) as u8, (y * 30) as u8, 90, 255]))
        .collect();
    let diffuse = DiffuseImage::new(width, height, data).unwrap();
    let depth = NormalizedDepthField::horizontal_ramp(width, height).unwrap();
    DepthImage::from_normalized(diffuse, depth).unwrap()
}

#[test]
fn still_parameters_reproduce_the_photo() {
    let renderer = FrameRenderer::new(gradient_image(8, 6));
    let params = AnimationParameters {
        intensity: 0.0,
        bokeh_intensity: 0.0,
        ..AnimationParameters::default()
    };
    let frame = renderer.render_at(1.3, &params).unwrap();
    assert_eq!(frame.data(), renderer.image().diffuse().data());
    assert_eq!(frame.time_secs, 1.3);
}

#[test]
fn tiny_bokeh_intensity_renders() {
    let renderer = FrameRenderer::new(gradient_image(8, 6));
    let params = AnimationParameters {
        intensity: 0.0,
        bokeh_intensity: 1e-45,
        ..AnimationParameters::default()
    };
    let frame = renderer.render_at(0.3, &params).unwrap();
    assert_eq!(frame.data(), renderer.image().diffuse().data());
}

#[test]
fn render_is_deterministic() {
    let renderer = FrameRenderer::new(gradient_image(10, 8));
    let params = AnimationParameters {
        intensity: 0.1,
        bokeh_intensity: 12.0,
        focal_point: 0.3,
        curve: CurveType::Infinity,
        ..AnimationParameters::default()
    };
    let a = renderer.render_at(0.77, &params).unwrap();
    let b = renderer.render_at(0.77, &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn loop_seam_matches_start() {
    let renderer = FrameRenderer::new(gradient_image(10, 8));
    let params = AnimationParameters {
        interval_secs: 2.0,
        intensity: 0.08,
        bokeh_intensity: 0.0,
        curve: CurveType::Circle,
        ..AnimationParameters::default()
    };
    let start = renderer.render_at(0.0, &params).unwrap();
    let seam = renderer.render_at(2.0, &params).unwrap();
    assert_eq!(start.buffer, seam.buffer);
}

#[test]
fn out_of_range_parameters_are_clamped_not_rejected() {
    let renderer = FrameRenderer::new(gradient_image(6, 4));
    let params = AnimationParameters {
        interval_secs: f64::NAN,
        intensity: 5.0,
        bokeh_intensity: -1.0,
        focal_point: 9.0,
        curve: CurveType::VerticalSweep,
    };
    let frame = renderer.render_at(0.4, &params).unwrap();
    assert_eq!((frame.width(), frame.height()), (6, 4));
}

#[test]
fn nearest_sampling_is_honored() {
    let image = gradient_image(8, 4);
    let opts = RenderOpts {
        sampling: Sampling::Nearest,
        ..RenderOpts::default()
    };
    let renderer = FrameRenderer::with_opts(image, opts);
    let params = AnimationParameters {
        bokeh_intensity: 0.0,
        curve: CurveType::HorizontalSweep,
        ..AnimationParameters::default()
    };
    let frame = renderer.render_at(0.5, &params).unwrap();
    // Nearest sampling only ever copies source pixels.
    let src = renderer.image().diffuse().data();
    for px in frame.data().chunks_exact(4) {
        assert!(src.chunks_exact(4).any(|s| s == px));
    }
}
