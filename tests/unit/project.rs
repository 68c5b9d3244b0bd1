use std::io::Cursor;

use super::*;
use crate::{animation::params::CurveType, effects::parallax::Sampling};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "depthloop_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn parse(json: &str) -> DepthloopResult<Project> {
    Project::from_reader(json.as_bytes(), Path::new("/data/shots"))
}

#[test]
fn minimal_project_uses_defaults_and_resolves_paths() {
    let p = parse(r#"{ "diffuse": "photo.jpg", "depth": { "image": "depth.png" } }"#).unwrap();
    assert_eq!(p.diffuse, PathBuf::from("/data/shots/photo.jpg"));
    assert_eq!(
        p.depth,
        DepthSource::Image {
            image: PathBuf::from("/data/shots/depth.png")
        }
    );
    assert_eq!(p.depth_encoding, DepthEncoding::Disparity);
    assert_eq!(p.missing_depth, MissingDepth::Far);
    assert_eq!(p.params, AnimationParameters::default());
    assert!(p.export.is_none());
}

#[test]
fn full_project_round_trips_every_field() {
    let p = parse(
        r#"{
            "diffuse": "/abs/photo.png",
            "depth": { "f32le": "d.bin", "width": 32, "height": 24 },
            "depth_encoding": "depth",
            "missing_depth": { "value": 0.25 },
            "params": { "interval_secs": 4.0, "intensity": 0.02, "bokeh_intensity": 10.0,
                        "focal_point": 0.5, "curve": "horizontal_sweep" },
            "render": { "sampling": "nearest", "bokeh": { "buckets": 4 } },
            "export": { "duration_secs": 8.0, "fps": 24 }
        }"#,
    )
    .unwrap();
    assert_eq!(p.diffuse, PathBuf::from("/abs/photo.png"));
    assert_eq!(
        p.depth,
        DepthSource::F32le {
            f32le: PathBuf::from("/data/shots/d.bin"),
            width: 32,
            height: 24
        }
    );
    assert_eq!(p.missing_depth, MissingDepth::Value(0.25));
    assert_eq!(p.params.curve, CurveType::HorizontalSweep);
    assert_eq!(p.render.sampling, Sampling::Nearest);
    assert_eq!(p.render.bokeh.buckets, 4);

    let opts = p.export_opts(None, None).unwrap();
    assert_eq!(opts.duration_secs, 8.0);
    assert_eq!(opts.fps, Fps::integer(24).unwrap());
    let overridden = p.export_opts(Some(1.0), Some(10)).unwrap();
    assert_eq!(overridden.duration_secs, 1.0);
    assert_eq!(overridden.fps.num, 10);
}

#[test]
fn out_of_range_params_are_clamped_on_load() {
    let p = parse(
        r#"{ "diffuse": "a.png", "depth": { "image": "b.png" },
             "params": { "interval_secs": 0.1, "intensity": 3.0, "bokeh_intensity": 99.0,
                         "focal_point": -1.0 } }"#,
    )
    .unwrap();
    assert_eq!(p.params.interval_secs, 0.5);
    assert_eq!(p.params.intensity, 0.1);
    assert_eq!(p.params.bokeh_intensity, 50.0);
    assert_eq!(p.params.focal_point, 0.0);
}

#[test]
fn unknown_fields_and_bad_json_are_validation_errors() {
    assert!(matches!(
        parse(r#"{ "diffuse": "a.png", "depth": { "image": "b.png" }, "colour": 1 }"#),
        Err(DepthloopError::Validation(_))
    ));
    assert!(parse("{").is_err());
    assert!(parse(r#"{ "diffuse": "a.png" }"#).is_err());
}

#[test]
fn export_defaults_to_one_loop() {
    let p = parse(
        r#"{ "diffuse": "a.png", "depth": { "image": "b.png" }, "params": { "interval_secs": 3.0 } }"#,
    )
    .unwrap();
    let opts = p.export_opts(None, None).unwrap();
    assert_eq!(opts.duration_secs, 3.0);
    assert_eq!(opts.fps, ExportOpts::default().fps);
    assert!(p.export_opts(None, Some(0)).is_err());
}

#[test]
fn loads_image_pair_from_disk() {
    let dir = temp_dir("project_load");
    std::fs::create_dir_all(&dir).unwrap();

    let photo = image::RgbaImage::from_pixel(6, 4, image::Rgba([200, 100, 50, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(photo)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("photo.png"), &buf).unwrap();

    // Half-resolution disparity map, white (near) on the left.
    let depth = image::GrayImage::from_fn(3, 2, |x, _| image::Luma([255 - (x * 100) as u8]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageLuma8(depth)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("depth.png"), &buf).unwrap();

    let json = r#"{ "diffuse": "photo.png", "depth": { "image": "depth.png" } }"#;
    std::fs::write(dir.join("project.json"), json).unwrap();

    let project = Project::from_json_file(dir.join("project.json")).unwrap();
    let img = project.load_depth_image().unwrap();
    assert_eq!((img.width(), img.height()), (6, 4));
    // Near on the left after disparity inversion.
    assert!(img.depth().get(0, 0) < img.depth().get(5, 0));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_project_file_is_reported() {
    let err = Project::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open project JSON"));
}
