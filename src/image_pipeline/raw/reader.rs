use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::RawFrame;

pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawFrame>;

    /// Reads `path` fully and decodes it. I/O failures surface as `DecodeError::Io`.
    fn read_file(&self, path: &Path) -> Result<RawFrame> {
        let data = std::fs::read(path)?;
        self.read_raw(&data)
    }
}
