use std::{fmt, str::FromStr};

use crate::foundation::error::{MoshError, MoshResult};

/// Raw pixel layout, named after the matching ffmpeg `pix_fmt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit luma.
    Gray,
    /// 16-bit little-endian luma.
    Gray16le,
    /// Packed 8-bit RGB.
    Rgb24,
    /// Packed 8-bit BGR.
    Bgr24,
    /// Packed 8-bit RGBA.
    Rgba,
    /// Packed 8-bit BGRA.
    Bgra,
    /// Packed 8-bit ARGB.
    Argb,
    /// Packed 8-bit ABGR.
    Abgr,
    /// Packed 16-bit little-endian RGB.
    Rgb48le,
    /// Packed 16-bit little-endian RGBA.
    Rgba64le,
    /// Planar YUV, chroma halved in both directions.
    Yuv420p,
    /// Planar YUV, chroma halved horizontally.
    Yuv422p,
    /// Planar YUV, full-resolution chroma.
    Yuv444p,
    /// Luma plane followed by one interleaved, half-resolution UV plane.
    Nv12,
}

impl PixelFormat {
    /// Every supported format, in catalog order.
    pub const ALL: [PixelFormat; 14] = [
        PixelFormat::Gray,
        PixelFormat::Gray16le,
        PixelFormat::Rgb24,
        PixelFormat::Bgr24,
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Argb,
        PixelFormat::Abgr,
        PixelFormat::Rgb48le,
        PixelFormat::Rgba64le,
        PixelFormat::Yuv420p,
        PixelFormat::Yuv422p,
        PixelFormat::Yuv444p,
        PixelFormat::Nv12,
    ];

    /// ffmpeg `pix_fmt` name.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            PixelFormat::Gray => "gray",
            PixelFormat::Gray16le => "gray16le",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::Bgr24 => "bgr24",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Bgra => "bgra",
            PixelFormat::Argb => "argb",
            PixelFormat::Abgr => "abgr",
            PixelFormat::Rgb48le => "rgb48le",
            PixelFormat::Rgba64le => "rgba64le",
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
            PixelFormat::Nv12 => "nv12",
        }
    }

    /// Bytes per pixel for packed formats, `None` for chroma-subsampled planar ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Gray => Some(1),
            PixelFormat::Gray16le => Some(2),
            PixelFormat::Rgb24 | PixelFormat::Bgr24 | PixelFormat::Yuv444p => Some(3),
            PixelFormat::Rgba | PixelFormat::Bgra | PixelFormat::Argb | PixelFormat::Abgr => {
                Some(4)
            }
            PixelFormat::Rgb48le => Some(6),
            PixelFormat::Rgba64le => Some(8),
            PixelFormat::Yuv420p | PixelFormat::Yuv422p | PixelFormat::Nv12 => None,
        }
    }

    /// Exact byte size of one `width`x`height` frame in this format.
    ///
    /// Subsampled chroma planes round odd dimensions up, matching ffmpeg's rawvideo layout.
    pub fn frame_bytes(self, width: u32, height: u32) -> usize {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        match self {
            PixelFormat::Yuv420p | PixelFormat::Nv12 => w * h + 2 * cw * ch,
            PixelFormat::Yuv422p => w * h + 2 * cw * h,
            other => w * h * other.bytes_per_pixel().unwrap_or(1),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_name())
    }
}

impl FromStr for PixelFormat {
    type Err = MoshError;

    fn from_str(s: &str) -> MoshResult<Self> {
        let s = s.trim();
        PixelFormat::ALL
            .into_iter()
            .find(|f| f.ffmpeg_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = PixelFormat::ALL.iter().map(|f| f.ffmpeg_name()).collect();
                MoshError::usage(format!(
                    "unsupported color format '{s}' (supported: {})",
                    names.join(", ")
                ))
            })
    }
}

/// Bits per PCM sample in the sample-domain view of the pixel bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    /// One byte per sample.
    #[default]
    Eight,
    /// Two bytes per sample, little-endian.
    Sixteen,
    /// Three bytes per sample, little-endian.
    TwentyFour,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
        }
    }

    /// Bytes per sample.
    pub fn bytes(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = MoshError;

    fn try_from(bits: u8) -> MoshResult<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            other => Err(MoshError::usage(format!(
                "unsupported bit depth {other} (expected 8, 16 or 24)"
            ))),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

impl FromStr for BitDepth {
    type Err = MoshError;

    fn from_str(s: &str) -> MoshResult<Self> {
        let bits = s
            .trim()
            .parse::<u8>()
            .map_err(|_| MoshError::usage(format!("invalid bit depth '{s}'")))?;
        BitDepth::try_from(bits)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Build a resolution, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> MoshResult<Self> {
        if width == 0 || height == 0 {
            return Err(MoshError::validation(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Resolution {
    type Err = MoshError;

    fn from_str(s: &str) -> MoshResult<Self> {
        let bad = || MoshError::usage(format!("invalid resolution '{s}' (expected <W>x<H>)"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width = w.trim().parse::<u32>().map_err(|_| bad())?;
        let height = h.trim().parse::<u32>().map_err(|_| bad())?;
        Resolution::new(width, height).map_err(|_| bad())
    }
}

impl TryFrom<String> for Resolution {
    type Error = MoshError;

    fn try_from(s: String) -> MoshResult<Self> {
        s.parse()
    }
}

impl From<Resolution> for String {
    fn from(r: Resolution) -> Self {
        r.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rational frame rate.
///
/// A zero denominator is representable (ffprobe reports `0/0` for some streams) and reads as
/// a rate of `0.0` rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameRate {
    /// Numerator.
    pub num: u32,
    /// Denominator.
    pub den: u32,
}

impl FrameRate {
    /// Whole-number frame rate.
    pub fn integer(fps: u32) -> Self {
        Self { num: fps, den: 1 }
    }

    /// Decimal value; `0.0` when the denominator is zero.
    pub fn as_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            f64::from(self.num) / f64::from(self.den)
        }
    }

    /// `true` when the rate is usable for timing output frames.
    pub fn is_positive(self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Parse an ffprobe-style `num/den` ratio. Zero denominators are kept, not rejected.
    pub fn from_ratio(s: &str) -> Option<Self> {
        let (a, b) = s.trim().split_once('/')?;
        Some(Self {
            num: a.trim().parse().ok()?,
            den: b.trim().parse().ok()?,
        })
    }
}

impl FromStr for FrameRate {
    type Err = MoshError;

    /// Accepts `30`, `29.97` or `30000/1001`.
    fn from_str(s: &str) -> MoshResult<Self> {
        let s = s.trim();
        let bad = || MoshError::usage(format!("invalid frame rate '{s}'"));
        if s.contains('/') {
            return FrameRate::from_ratio(s).ok_or_else(bad);
        }
        match s.split_once('.') {
            None => Ok(FrameRate::integer(s.parse().map_err(|_| bad())?)),
            Some((whole, frac)) => {
                let frac = frac.trim_end_matches('0');
                if frac.len() > 6 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(bad());
                }
                let den = 10u32.pow(frac.len() as u32);
                let whole: u32 = if whole.is_empty() {
                    0
                } else {
                    whole.parse().map_err(|_| bad())?
                };
                let frac_val: u32 = if frac.is_empty() {
                    0
                } else {
                    frac.parse().map_err(|_| bad())?
                };
                let num = whole
                    .checked_mul(den)
                    .and_then(|v| v.checked_add(frac_val))
                    .ok_or_else(bad)?;
                Ok(FrameRate { num, den })
            }
        }
    }
}

impl TryFrom<String> for FrameRate {
    type Error = MoshError;

    fn try_from(s: String) -> MoshResult<Self> {
        s.parse()
    }
}

impl From<FrameRate> for String {
    fn from(r: FrameRate) -> Self {
        r.to_string()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
