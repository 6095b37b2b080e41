mod y4m;

pub use self::y4m::Y4mMuxer;

pub fn new(filename: &str) -> Y4mMuxer {
    Y4mMuxer::new(filename)
}
