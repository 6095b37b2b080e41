use hevc_recon::api::*;

use std::io;

pub mod demuxer;
pub mod muxer;

/// Stream properties taken from, or written to, a y4m header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub width: usize,
    pub height: usize,
    pub bit_depth: u32,
    pub chroma_sampling: ChromaSampling,
    pub frame_rate: (usize, usize),
}

pub fn map_y4m_error(e: y4m::Error) -> io::Error {
    match e {
        y4m::Error::IoError(e) => e,
        e => io::Error::new(io::ErrorKind::InvalidData, format!("y4m: {:?}", e)),
    }
}

pub fn map_recon_error(e: ReconError) -> io::Error {
    match e {
        ReconError::Io(e) => e,
        e => io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
    }
}
