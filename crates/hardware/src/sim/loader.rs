//! Image Loader.
//!
//! This module provides utilities for placing a program into guest memory. It performs:
//! 1. **Image reading:** Reads a raw big-endian memory image from disk.
//! 2. **Placement:** Copies the image to a physical load address, failing if it does not fit.
//! 3. **Entry:** Optionally points the reset PSD at the loaded image.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::SimError;
use crate::core::Cpu;

/// Reads an image file from disk.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read.
pub fn load_binary(path: impl AsRef<Path>) -> Result<Vec<u8>, SimError> {
    Ok(fs::read(path)?)
}

/// Copies `image` into guest memory at physical address `addr`.
///
/// # Errors
///
/// [`SimError::ImageTooLarge`] if the image does not fit in installed memory.
pub fn load_image(cpu: &mut Cpu, image: &[u8], addr: u32) -> Result<(), SimError> {
    cpu.memory.load(addr, image)?;
    debug!(addr, bytes = image.len(), "image loaded");
    Ok(())
}

/// Reads the image at `path`, copies it to `addr` and starts execution there.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read, or
/// [`SimError::ImageTooLarge`] if it does not fit.
pub fn boot_file(cpu: &mut Cpu, path: impl AsRef<Path>, addr: u32) -> Result<(), SimError> {
    let image = load_binary(path)?;
    load_image(cpu, &image, addr)?;
    cpu.state.psd.set_pc(addr);
    Ok(())
}
