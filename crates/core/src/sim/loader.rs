//! Image loading.
//!
//! Places program bytes into the backing RAM: either a flat binary at a
//! caller-chosen address, or an ELF image whose loadable segments carry
//! their own physical addresses.

use object::{Object, ObjectSegment};
use thiserror::Error;

use crate::sim::ram::SimRam;

/// Errors produced while loading an image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// The image is not a parseable object file.
    #[error("failed to parse image: {0}")]
    Object(#[from] object::Error),

    /// The image contains nothing to load.
    #[error("image has no loadable segments")]
    Empty,
}

/// Copies a flat binary into RAM at `addr`.
pub fn load_flat(ram: &mut SimRam, addr: u64, bytes: &[u8]) {
    ram.write_bytes(addr, bytes);
}

/// Loads an ELF image's segments into RAM and returns the entry point.
///
/// # Errors
///
/// Returns [`LoadError`] if the image does not parse or has no loadable
/// segments.
pub fn load_elf(ram: &mut SimRam, bytes: &[u8]) -> Result<u32, LoadError> {
    let file = object::File::parse(bytes)?;
    let mut loaded = false;
    for segment in file.segments() {
        let data = segment.data()?;
        if data.is_empty() {
            continue;
        }
        ram.write_bytes(segment.address(), data);
        loaded = true;
    }
    if !loaded {
        return Err(LoadError::Empty);
    }
    Ok(file.entry() as u32)
}
