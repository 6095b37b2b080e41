use crate::io::{map_y4m_error, VideoInfo};

use std::fs::File;
use std::io;
use std::io::Write;

use hevc_recon::api::*;

pub struct Y4mMuxer {
    path: String,
    encoder: Option<y4m::Encoder<Box<dyn Write>>>,
}

impl Y4mMuxer {
    pub fn new(path: &str) -> Self {
        Y4mMuxer {
            path: path.to_owned(),
            encoder: None,
        }
    }

    /// Encoder of the output stream; the header is written on first use.
    fn encoder(&mut self, info: &VideoInfo) -> io::Result<&mut y4m::Encoder<Box<dyn Write>>> {
        let encoder = match self.encoder.take() {
            Some(encoder) => encoder,
            None => {
                let writer: Box<dyn Write> = match self.path.as_str() {
                    "-" => Box::new(io::stdout()),
                    f => Box::new(File::create(f)?),
                };
                y4m::EncoderBuilder::new(
                    info.width,
                    info.height,
                    y4m::Ratio::new(info.frame_rate.0, info.frame_rate.1),
                )
                .with_colorspace(map_color_space(info.chroma_sampling, info.bit_depth)?)
                .write_header(writer)
                .map_err(map_y4m_error)?
            }
        };
        Ok(self.encoder.get_or_insert(encoder))
    }

    pub fn write<T: Pixel>(&mut self, f: &Frame<T>, info: &VideoInfo) -> io::Result<()> {
        let bytes = if info.bit_depth > 8 { 2 } else { 1 };
        let planes = if info.chroma_sampling == ChromaSampling::Cs400 {
            1
        } else {
            N_C
        };

        let mut rec: Vec<Vec<u8>> = vec![Vec::new(); N_C];
        for (p, buf) in f.planes.iter().zip(rec.iter_mut()).take(planes) {
            let pitch = p.cfg.width * bytes;
            buf.resize(pitch * p.cfg.height, 0);
            p.copy_to_raw_u8(buf, pitch, bytes);
        }

        let encoder = self.encoder(info)?;
        let frame = y4m::Frame::new([&rec[Y_C], &rec[U_C], &rec[V_C]], None);
        encoder.write_frame(&frame).map_err(map_y4m_error)
    }
}

fn map_color_space(chroma_sampling: ChromaSampling, bit_depth: u32) -> io::Result<y4m::Colorspace> {
    use hevc_recon::api::ChromaSampling::*;
    use y4m::Colorspace::*;
    Ok(match (chroma_sampling, bit_depth) {
        (Cs400, 8) => Cmono,
        (Cs420, 8) => C420jpeg,
        (Cs420, 10) => C420p10,
        (Cs420, 12) => C420p12,
        (Cs422, 8) => C422,
        (Cs422, 10) => C422p10,
        (Cs422, 12) => C422p12,
        (Cs444, 8) => C444,
        (Cs444, 10) => C444p10,
        (Cs444, 12) => C444p12,
        (cs, bd) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("y4m cannot carry {} {}-bit video", cs, bd),
            ))
        }
    })
}
