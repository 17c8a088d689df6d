//! LED matrix output
//!
//! The Sense HAT's 8x8 matrix is driven by the `rpisense-fb` kernel driver,
//! which exposes it as a framebuffer of 64 RGB565 pixels.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{LoggerError, Result};
use crate::pattern::{Pattern, BLANK, MATRIX_CELLS};

/// Framebuffer name reported by the Sense HAT driver
pub const SENSE_HAT_FB_NAME: &str = "RPi-Sense FB";

/// A display that accepts a full 64-cell frame at a time
pub trait LedMatrix {
    /// Replace every cell with the given pattern
    fn set_pixels(&mut self, pattern: &Pattern) -> Result<()>;

    /// Turn every cell off
    fn clear(&mut self) -> Result<()> {
        self.set_pixels(&BLANK)
    }
}

impl<D: LedMatrix + ?Sized> LedMatrix for Box<D> {
    fn set_pixels(&mut self, pattern: &Pattern) -> Result<()> {
        (**self).set_pixels(pattern)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

/// LED matrix backed by a Linux framebuffer device
pub struct FramebufferMatrix {
    device: File,
    path: PathBuf,
}

impl FramebufferMatrix {
    /// Open a framebuffer device such as `/dev/fb1`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::Display(format!("Failed to open {}: {}", path.display(), e))
            })?;
        log::debug!("Opened LED matrix framebuffer {}", path.display());
        Ok(Self { device, path })
    }

    /// Locate and open the Sense HAT framebuffer
    ///
    /// # Arguments
    /// * `graphics_class` - sysfs graphics class directory, normally `/sys/class/graphics`
    /// * `dev_dir` - device node directory, normally `/dev`
    pub fn find<P: AsRef<Path>, Q: AsRef<Path>>(graphics_class: P, dev_dir: Q) -> Result<Self> {
        let graphics_class = graphics_class.as_ref();
        let entries = fs::read_dir(graphics_class).map_err(|e| {
            LoggerError::Display(format!(
                "Failed to list {}: {}",
                graphics_class.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry?;
            let fb = entry.file_name();
            let fb = fb.to_string_lossy();
            if !fb.starts_with("fb") {
                continue;
            }
            let name = match fs::read_to_string(entry.path().join("name")) {
                Ok(name) => name,
                Err(_) => continue,
            };
            if name.trim() == SENSE_HAT_FB_NAME {
                return Self::open(dev_dir.as_ref().join(fb.as_ref()));
            }
        }

        Err(LoggerError::Display(format!(
            "No framebuffer named '{}' under {}",
            SENSE_HAT_FB_NAME,
            graphics_class.display()
        )))
    }

    /// Device path this matrix writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encode a pattern as little-endian RGB565 framebuffer bytes
pub fn encode_frame(pattern: &Pattern) -> [u8; MATRIX_CELLS * 2] {
    let mut frame = [0u8; MATRIX_CELLS * 2];
    for (cell, bytes) in pattern.iter().zip(frame.chunks_exact_mut(2)) {
        bytes.copy_from_slice(&cell.to_rgb565().to_le_bytes());
    }
    frame
}

impl LedMatrix for FramebufferMatrix {
    fn set_pixels(&mut self, pattern: &Pattern) -> Result<()> {
        let frame = encode_frame(pattern);
        self.device
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.device.write_all(&frame))
            .map_err(|e| {
                LoggerError::Display(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }
}

/// Clears the wrapped matrix when dropped
///
/// Holds the display for the lifetime of a sampling run so the matrix is left
/// dark on every exit path, including errors. Dropping after an explicit
/// [`clear`](LedMatrix::clear) does not write again.
pub struct BlankOnDrop<D: LedMatrix> {
    display: D,
    lit: bool,
}

impl<D: LedMatrix> BlankOnDrop<D> {
    pub fn new(display: D) -> Self {
        // Contents left by a previous run are unknown
        Self { display, lit: true }
    }
}

impl<D: LedMatrix> LedMatrix for BlankOnDrop<D> {
    fn set_pixels(&mut self, pattern: &Pattern) -> Result<()> {
        self.lit = true;
        self.display.set_pixels(pattern)
    }

    fn clear(&mut self) -> Result<()> {
        self.display.clear()?;
        self.lit = false;
        Ok(())
    }
}

impl<D: LedMatrix> Drop for BlankOnDrop<D> {
    fn drop(&mut self) {
        if !self.lit {
            return;
        }
        if let Err(e) = self.display.clear() {
            log::warn!("Failed to clear LED matrix: {}", e);
        }
    }
}
