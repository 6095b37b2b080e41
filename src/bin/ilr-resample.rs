mod io;

use clap::{App, AppSettings, Arg, ArgMatches};
use hevc_recon::api::*;
use hevc_recon::com::tracer::*;
use hevc_recon::com::upsample::*;
use log::*;

use std::io as stdio;
use std::time::Instant;

use self::io::{demuxer, map_recon_error, muxer, VideoInfo};

struct CLISettings {
    pub demuxer: demuxer::Y4mDemuxer,
    pub muxer: muxer::Y4mMuxer,
    pub width: usize,
    pub height: usize,
    pub output_depth: Option<u32>,
    pub frames: usize,
    pub verbose: bool,
}

fn parse_value<T: std::str::FromStr>(matches: &ArgMatches<'_>, name: &str) -> stdio::Result<T> {
    let v = matches.value_of(name).unwrap_or_default();
    v.parse().map_err(|_| {
        stdio::Error::new(
            stdio::ErrorKind::InvalidInput,
            format!("invalid value '{}' for {}", v, name),
        )
    })
}

fn parse_cli() -> stdio::Result<CLISettings> {
    let mut app = App::new("ilr-resample")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inter-layer reference resampler for y4m video")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::with_name("FULLHELP")
                .help("Prints more detailed help information")
                .long("fullhelp"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("base layer y4m file, '-' for stdin")
                .short("i")
                .long("input")
                .required_unless("FULLHELP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("resampled y4m file, '-' for stdout")
                .short("o")
                .long("output")
                .required_unless("FULLHELP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("WIDTH")
                .help("enhancement layer width")
                .long("width")
                .required_unless("FULLHELP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("HEIGHT")
                .help("enhancement layer height")
                .long("height")
                .required_unless("FULLHELP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("DEPTH")
                .help("enhancement layer bit depth, defaults to the input depth")
                .long("output-depth")
                .possible_values(&["8", "10", "12"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FRAMES")
                .help("maximum number of frames to resample, 0 for all")
                .short("f")
                .long("frames")
                .takes_value(true)
                .default_value("0"),
        )
        // DEBUGGING
        .arg(
            Arg::with_name("VERBOSE")
                .help("Verbose logging; outputs info for every frame")
                .long("verbose")
                .short("v"),
        );

    let matches = app.clone().get_matches();

    if matches.is_present("FULLHELP") {
        app.print_long_help().map_err(|e| stdio::Error::new(stdio::ErrorKind::Other, e.to_string()))?;
        std::process::exit(0);
    }

    Ok(CLISettings {
        demuxer: demuxer::new(matches.value_of("INPUT").unwrap_or("-"))?,
        muxer: muxer::new(matches.value_of("OUTPUT").unwrap_or("-")),
        width: parse_value(&matches, "WIDTH")?,
        height: parse_value(&matches, "HEIGHT")?,
        output_depth: if matches.is_present("DEPTH") {
            Some(parse_value(&matches, "DEPTH")?)
        } else {
            None
        },
        frames: parse_value(&matches, "FRAMES")?,
        verbose: matches.is_present("VERBOSE"),
    })
}

fn resample<B: BitDepth, E: BitDepth>(cli: &mut CLISettings) -> stdio::Result<usize> {
    let base = cli.demuxer.info();
    let mut cfg = InterLayerConfig::new(base.width, base.height, cli.width, cli.height);
    cfg.base_bit_depth_luma = B::BITS;
    cfg.base_bit_depth_chroma = B::BITS;
    cfg.enh_bit_depth_luma = E::BITS;
    cfg.enh_bit_depth_chroma = E::BITS;
    cfg.chroma_sampling = base.chroma_sampling;
    cfg.validate().map_err(map_recon_error)?;

    let enh = VideoInfo {
        width: cli.width,
        height: cli.height,
        bit_depth: E::BITS,
        ..base
    };

    let mut tracer = OPEN_TRACE();
    let mut frames = 0;
    while cli.frames == 0 || frames < cli.frames {
        let src: Frame<B::Pixel> = match cli.demuxer.read()? {
            Some(f) => f,
            None => break,
        };

        let start = Instant::now();
        let mut dst = Frame::new(enh.width, enh.height, enh.chroma_sampling);
        upsample_frame::<B, E>(&mut tracer, &cfg, &mut dst, &src);
        cli.muxer.write(&dst, &enh)?;

        info!(
            "frame {}: {}x{} -> {}x{} in {:?}",
            frames,
            base.width,
            base.height,
            enh.width,
            enh.height,
            start.elapsed()
        );
        frames += 1;
    }
    Ok(frames)
}

macro_rules! with_depths {
    ($base:expr, $enh:expr, $f:ident($($arg:expr),*)) => {
        match ($base, $enh) {
            (8, 8) => $f::<Depth8, Depth8>($($arg),*),
            (8, 10) => $f::<Depth8, Depth10>($($arg),*),
            (8, 12) => $f::<Depth8, Depth12>($($arg),*),
            (10, 8) => $f::<Depth10, Depth8>($($arg),*),
            (10, 10) => $f::<Depth10, Depth10>($($arg),*),
            (10, 12) => $f::<Depth10, Depth12>($($arg),*),
            (12, 8) => $f::<Depth12, Depth8>($($arg),*),
            (12, 10) => $f::<Depth12, Depth10>($($arg),*),
            (12, 12) => $f::<Depth12, Depth12>($($arg),*),
            (b, e) => Err(stdio::Error::new(
                stdio::ErrorKind::InvalidInput,
                format!("cannot resample {}-bit into {}-bit video", b, e),
            )),
        }
    };
}

fn main() -> stdio::Result<()> {
    let mut cli = parse_cli()?;

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let base_depth = cli.demuxer.info().bit_depth;
    let enh_depth = cli.output_depth.unwrap_or(base_depth);
    let frames = with_depths!(base_depth, enh_depth, resample(&mut cli))?;

    if cli.verbose {
        eprintln!("resampled {} frames", frames);
    }
    Ok(())
}
