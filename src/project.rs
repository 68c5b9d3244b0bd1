use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    animation::params::AnimationParameters,
    assets::{
        decode::{load_depth_image, read_depth_f32le, read_diffuse},
        depth_image::DepthImage,
    },
    depth::normalize::{DepthEncoding, MissingDepth, NormalizeOpts},
    encode::export::ExportOpts,
    foundation::{
        core::Fps,
        error::{DepthloopError, DepthloopResult},
    },
    render::renderer::RenderOpts,
};

/// Where the depth half of a project comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DepthSource {
    /// Grayscale image file; luma is the raw sample.
    Image { image: PathBuf },
    /// Headerless little-endian `f32` samples.
    F32le {
        f32le: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Clip settings for `render`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportSettings {
    pub duration_secs: f64,
    pub fps: u32,
}

/// JSON project file driving the CLI: one photo, its depth, and the loop parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub diffuse: PathBuf,
    pub depth: DepthSource,
    #[serde(default)]
    pub depth_encoding: DepthEncoding,
    #[serde(default)]
    pub missing_depth: MissingDepth,
    #[serde(default)]
    pub params: AnimationParameters,
    #[serde(default)]
    pub render: RenderOpts,
    #[serde(default)]
    pub export: Option<ExportSettings>,
}

impl Project {
    /// Parse a project from JSON. Relative paths resolve against `base_dir`; parameters are
    /// clamped.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: &Path) -> DepthloopResult<Self> {
        let mut project: Project = serde_json::from_reader(r)
            .map_err(|e| DepthloopError::validation(format!("parse project JSON: {e}")))?;
        project.params = project.params.clamped();
        project.diffuse = resolve(base_dir, &project.diffuse);
        match &mut project.depth {
            DepthSource::Image { image } => *image = resolve(base_dir, image),
            DepthSource::F32le { f32le, .. } => *f32le = resolve(base_dir, f32le),
        }
        Ok(project)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> DepthloopResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DepthloopError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_reader(BufReader::new(f), base_dir)
    }

    pub fn normalize_opts(&self) -> NormalizeOpts {
        NormalizeOpts {
            encoding: self.depth_encoding,
            missing: self.missing_depth,
        }
    }

    /// Decode both files and pair them. This is the validation gate for the inputs.
    #[tracing::instrument(skip(self), fields(diffuse = %self.diffuse.display()))]
    pub fn load_depth_image(&self) -> DepthloopResult<DepthImage> {
        let opts = self.normalize_opts();
        match &self.depth {
            DepthSource::Image { image } => load_depth_image(&self.diffuse, image, &opts),
            DepthSource::F32le {
                f32le,
                width,
                height,
            } => DepthImage::new(
                read_diffuse(&self.diffuse)?,
                read_depth_f32le(f32le, *width, *height)?,
                &opts,
            ),
        }
    }

    /// Export options from the project, with explicit overrides from the caller.
    pub fn export_opts(
        &self,
        duration_secs: Option<f64>,
        fps: Option<u32>,
    ) -> DepthloopResult<ExportOpts> {
        let defaults = ExportOpts::default();
        let duration_secs = duration_secs
            .or(self.export.map(|e| e.duration_secs))
            .unwrap_or(self.params.interval_secs);
        let fps = match fps.or(self.export.map(|e| e.fps)) {
            Some(n) => Fps::integer(n)?,
            None => defaults.fps,
        };
        Ok(ExportOpts {
            duration_secs,
            fps,
            ..defaults
        })
    }
}

fn resolve(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
