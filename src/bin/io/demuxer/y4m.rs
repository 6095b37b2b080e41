use crate::io::{map_y4m_error, VideoInfo};

use std::fs::File;
use std::io;
use std::io::Read;

use hevc_recon::api::*;

pub struct Y4mDemuxer {
    reader: y4m::Decoder<Box<dyn Read>>,
    info: VideoInfo,
}

impl Y4mDemuxer {
    pub fn new(path: &str) -> io::Result<Self> {
        let reader: Box<dyn Read> = match path {
            "-" => Box::new(io::stdin()),
            f => Box::new(File::open(f)?),
        };
        let reader = y4m::Decoder::new(reader).map_err(map_y4m_error)?;

        let (chroma_sampling, bit_depth) = map_y4m_color_space(reader.get_colorspace());
        let rate = reader.get_framerate();
        let info = VideoInfo {
            width: reader.get_width(),
            height: reader.get_height(),
            bit_depth,
            chroma_sampling,
            frame_rate: (rate.num, rate.den),
        };

        Ok(Y4mDemuxer { reader, info })
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    /// Next picture of the stream, `None` once the stream is exhausted.
    pub fn read<T: Pixel>(&mut self) -> io::Result<Option<Frame<T>>> {
        let VideoInfo {
            width,
            height,
            chroma_sampling,
            ..
        } = self.info;
        let bytes = self.reader.get_bytes_per_sample();
        let (xdec, _) = chroma_sampling.decimation();
        let chroma_width = (width + xdec) >> xdec;

        match self.reader.read_frame() {
            Ok(frame) => {
                let mut f: Frame<T> = Frame::new(width, height, chroma_sampling);
                f.planes[Y_C].copy_from_raw_u8(frame.get_y_plane(), width * bytes, bytes);
                if chroma_sampling != ChromaSampling::Cs400 {
                    f.planes[U_C].copy_from_raw_u8(frame.get_u_plane(), chroma_width * bytes, bytes);
                    f.planes[V_C].copy_from_raw_u8(frame.get_v_plane(), chroma_width * bytes, bytes);
                }
                f.pad();
                Ok(Some(f))
            }
            Err(y4m::Error::EOF) => Ok(None),
            Err(e) => Err(map_y4m_error(e)),
        }
    }
}

fn map_y4m_color_space(color_space: y4m::Colorspace) -> (ChromaSampling, u32) {
    use hevc_recon::api::ChromaSampling::*;
    use y4m::Colorspace::*;
    match color_space {
        Cmono => (Cs400, 8),
        C420jpeg | C420paldv | C420mpeg2 | C420 => (Cs420, 8),
        C420p10 => (Cs420, 10),
        C420p12 => (Cs420, 12),
        C422 => (Cs422, 8),
        C422p10 => (Cs422, 10),
        C422p12 => (Cs422, 12),
        C444 => (Cs444, 8),
        C444p10 => (Cs444, 10),
        C444p12 => (Cs444, 12),
    }
}
