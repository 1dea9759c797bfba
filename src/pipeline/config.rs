use std::path::{Path, PathBuf};

use crate::codec::pcm::DEFAULT_SAMPLE_RATE;
use crate::effects::chain::EffectSpec;
use crate::foundation::core::{BitDepth, FrameRate, PixelFormat, Resolution};
use crate::foundation::error::{MoshError, MoshResult};
use crate::frames::buffer::FrameLayout;
use crate::frames::reassemble::BlendFactor;
use crate::media::probe::MediaDescriptor;

/// Output frame rate when neither the user nor the source provides one.
pub const FALLBACK_FRAME_RATE: u32 = 10;

/// Resolved, validated settings of one run. Immutable once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PipelineConfig {
    /// Sample width of the pixel-derived stream.
    pub bit_depth: BitDepth,
    /// Pixel format frames are decoded to.
    pub pixel_format: PixelFormat,
    /// Target resolution; `None` keeps the source resolution.
    pub resolution: Option<Resolution>,
    /// Output frame rate; `None` keeps the source rate.
    pub frame_rate: Option<FrameRate>,
    /// Mix of reconstructed and source frames; `None` disables blending.
    pub blend: Option<BlendFactor>,
    /// Sample rate label of the pixel-derived stream.
    pub sample_rate: u32,
    /// Effects applied to every stream.
    pub effects: EffectSpec,
    /// Worker threads for the per-frame path; `None` uses the rayon default.
    pub threads: Option<usize>,
    /// Directory that holds run working directories; `None` uses the system temp dir.
    pub work_root: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::Eight,
            pixel_format: PixelFormat::Rgb24,
            resolution: None,
            frame_rate: None,
            blend: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            effects: EffectSpec::default(),
            threads: None,
            work_root: None,
        }
    }
}

/// Partial settings from a config file or the command line. Unset fields leave the value
/// below them untouched.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// See [`PipelineConfig::bit_depth`].
    pub bit_depth: Option<BitDepth>,
    /// See [`PipelineConfig::pixel_format`].
    pub pixel_format: Option<PixelFormat>,
    /// See [`PipelineConfig::resolution`].
    pub resolution: Option<Resolution>,
    /// See [`PipelineConfig::frame_rate`].
    pub frame_rate: Option<FrameRate>,
    /// See [`PipelineConfig::blend`].
    pub blend: Option<BlendFactor>,
    /// See [`PipelineConfig::sample_rate`].
    pub sample_rate: Option<u32>,
    /// Replaces the whole effect chain, never appends to it.
    pub effects: Option<EffectSpec>,
    /// See [`PipelineConfig::threads`].
    pub threads: Option<usize>,
    /// See [`PipelineConfig::work_root`].
    pub work_root: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Read overrides from a JSON file. Unknown keys are rejected.
    pub fn from_json_file(path: &Path) -> MoshResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            MoshError::usage(format!("cannot read config '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MoshError::usage(format!("invalid config '{}': {e}", path.display()))
        })
    }

    fn apply_to(self, cfg: &mut PipelineConfig) {
        if let Some(v) = self.bit_depth {
            cfg.bit_depth = v;
        }
        if let Some(v) = self.pixel_format {
            cfg.pixel_format = v;
        }
        if let Some(v) = self.resolution {
            cfg.resolution = Some(v);
        }
        if let Some(v) = self.frame_rate {
            cfg.frame_rate = Some(v);
        }
        if let Some(v) = self.blend {
            cfg.blend = Some(v);
        }
        if let Some(v) = self.sample_rate {
            cfg.sample_rate = v;
        }
        if let Some(v) = self.effects {
            cfg.effects = v;
        }
        if let Some(v) = self.threads {
            cfg.threads = Some(v);
        }
        if let Some(v) = self.work_root {
            cfg.work_root = Some(v);
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, then `file`, then `cli`, and validate the result.
    pub fn resolve(file: Option<ConfigOverrides>, cli: ConfigOverrides) -> MoshResult<Self> {
        let mut cfg = Self::default();
        if let Some(file) = file {
            file.apply_to(&mut cfg);
        }
        cli.apply_to(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject a zero or negative frame rate, a zero sample rate and zero threads.
    pub fn validate(&self) -> MoshResult<()> {
        if let Some(rate) = self.frame_rate
            && !rate.is_positive()
        {
            return Err(MoshError::usage(format!(
                "frame rate must be positive, got {rate}"
            )));
        }
        if self.sample_rate == 0 {
            return Err(MoshError::usage("sample rate must be positive"));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(MoshError::usage("'threads' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Layout every frame of `media` is decoded to.
    pub fn target_layout(&self, media: &MediaDescriptor) -> MoshResult<FrameLayout> {
        let resolution = match self.resolution {
            Some(r) => r,
            None => media.resolution()?,
        };
        Ok(FrameLayout::new(self.pixel_format, resolution))
    }

    /// Output frame rate: configured, else the source rate, else [`FALLBACK_FRAME_RATE`].
    pub fn output_frame_rate(&self, media: &MediaDescriptor) -> FrameRate {
        self.frame_rate
            .or_else(|| Some(media.frame_rate).filter(|r| r.is_positive()))
            .unwrap_or(FrameRate::integer(FALLBACK_FRAME_RATE))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
