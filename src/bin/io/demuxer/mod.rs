mod y4m;

pub use self::y4m::Y4mDemuxer;

use std::io;

pub fn new(filename: &str) -> io::Result<Y4mDemuxer> {
    Y4mDemuxer::new(filename)
}
