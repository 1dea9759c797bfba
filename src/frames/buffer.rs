use crate::foundation::core::{PixelFormat, Resolution};
use crate::foundation::error::{MoshError, MoshResult};

/// Pixel format and dimensions shared by every frame of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameLayout {
    /// Pixel byte layout.
    pub format: PixelFormat,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl FrameLayout {
    /// Build a layout from a pixel format and resolution.
    pub fn new(format: PixelFormat, resolution: Resolution) -> Self {
        Self {
            format,
            width: resolution.width,
            height: resolution.height,
        }
    }

    /// Byte length of one frame.
    pub fn frame_bytes(&self) -> usize {
        self.format.frame_bytes(self.width, self.height)
    }

    /// Dimensions as a [`Resolution`].
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }
}

/// Raw pixel bytes of one frame, tagged with their layout.
///
/// Invariant: `data.len() == layout.frame_bytes()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    layout: FrameLayout,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Wrap `data`, checking it matches the layout's frame size.
    pub fn new(layout: FrameLayout, data: Vec<u8>) -> MoshResult<Self> {
        let expected = layout.frame_bytes();
        if data.len() != expected {
            return Err(MoshError::validation(format!(
                "frame byte length {} does not match {}x{} {} ({expected} bytes)",
                data.len(),
                layout.width,
                layout.height,
                layout.format
            )));
        }
        Ok(Self { layout, data })
    }

    /// Split a contiguous buffer holding whole frames into frames.
    ///
    /// Fails unless `bytes.len()` is an exact multiple of the frame size; decoders are expected
    /// to produce whole frames only.
    pub fn split_exact(layout: FrameLayout, bytes: &[u8]) -> MoshResult<Vec<Self>> {
        let frame_bytes = layout.frame_bytes();
        if frame_bytes == 0 {
            return Err(MoshError::validation("frame layout has zero byte size"));
        }
        if !bytes.len().is_multiple_of(frame_bytes) {
            return Err(MoshError::validation(format!(
                "decoded buffer has invalid size: got {} bytes, expected a multiple of {frame_bytes}",
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(frame_bytes)
            .map(|chunk| Self {
                layout,
                data: chunk.to_vec(),
            })
            .collect())
    }

    /// Frame layout.
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Borrow the pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the pixel bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/buffer.rs"]
mod tests;
