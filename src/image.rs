//! Loading program images from challenge binaries.
//!
//! A program image on disk is a flat sequence of little-endian 16-bit words
//! with no header. [`read_image`] turns one into the `Vec<u16>` that
//! [`crate::sim::Simulator::new`] and [`crate::disasm`] consume.

use std::fs;
use std::path::Path;

use crate::isa::MEM_SIZE;

/// Errors that can occur while loading a program image.
#[derive(Debug)]
pub enum ImageErr {
    /// Error from reading the image file.
    Io(std::io::Error),
    /// The file's byte length was odd, so it cannot be a word sequence.
    OddLength(usize),
    /// The image holds more words than fit in memory.
    TooLarge(usize),
}
impl std::fmt::Display for ImageErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageErr::Io(e)        => write!(f, "IO error: {e}"),
            ImageErr::OddLength(n) => write!(f, "image is {n} bytes, expected an even count"),
            ImageErr::TooLarge(n)  => write!(f, "image holds {n} words, at most {MEM_SIZE} fit in memory"),
        }
    }
}
impl std::error::Error for ImageErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageErr::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl From<std::io::Error> for ImageErr {
    fn from(value: std::io::Error) -> Self {
        ImageErr::Io(value)
    }
}

/// Reads a program image from a file.
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<u16>, ImageErr> {
    decode(&fs::read(path)?)
}

/// Decodes raw image bytes into words.
pub fn decode(bytes: &[u8]) -> Result<Vec<u16>, ImageErr> {
    if bytes.len() % 2 != 0 {
        return Err(ImageErr::OddLength(bytes.len()));
    }
    let words: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    if words.len() > MEM_SIZE {
        return Err(ImageErr::TooLarge(words.len()));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::{decode, ImageErr};

    #[test]
    fn test_decode_little_endian_words() {
        // out 'A', halt
        let bytes = [19, 0, 65, 0, 0, 0];
        assert_eq!(decode(&bytes).unwrap(), vec![19, 65, 0]);

        // High byte carries the upper 7 bits: 0x8000 = 32768.
        assert_eq!(decode(&[0x00, 0x80]).unwrap(), vec![32768]);
    }

    #[test]
    fn test_empty_image_is_valid() {
        assert_eq!(decode(&[]).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn test_odd_length_is_rejected() {
        assert!(matches!(decode(&[1, 2, 3]), Err(ImageErr::OddLength(3))));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let bytes = vec![0u8; (32768 + 1) * 2];
        assert!(matches!(decode(&bytes), Err(ImageErr::TooLarge(32769))));
    }
}
