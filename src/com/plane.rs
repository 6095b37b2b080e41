use super::region::*;
use crate::api::frame::*;

use std::fmt::Debug;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut, Range};

/// Plane-specific configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneConfig {
    /// Data stride, in samples.
    pub stride: usize,
    /// Allocated height in samples.
    pub alloc_height: usize,
    /// Width of the visible area in samples.
    pub width: usize,
    /// Height of the visible area in samples.
    pub height: usize,
    /// Decimator along the X axis.
    ///
    /// For example, for chroma planes in a 4:2:0 configuration this would be 1.
    pub xdec: usize,
    /// Decimator along the Y axis.
    pub ydec: usize,
    /// Number of padding samples on the right and left.
    pub xpad: usize,
    /// Number of padding samples on the bottom and top.
    pub ypad: usize,
    /// X where the data starts.
    pub xorigin: usize,
    /// Y where the data starts.
    pub yorigin: usize,
}

impl PlaneConfig {
    /// Stride alignment in samples.
    const STRIDE_ALIGNMENT_LOG2: usize = 5;

    #[inline]
    pub fn new(
        width: usize,
        height: usize,
        xdec: usize,
        ydec: usize,
        xpad: usize,
        ypad: usize,
    ) -> Self {
        let xorigin = xpad.align_power_of_two(Self::STRIDE_ALIGNMENT_LOG2);
        let yorigin = ypad;
        let stride = (xorigin + width + xpad).align_power_of_two(Self::STRIDE_ALIGNMENT_LOG2);
        let alloc_height = yorigin + height + ypad;

        PlaneConfig {
            stride,
            alloc_height,
            width,
            height,
            xdec,
            ydec,
            xpad,
            ypad,
            xorigin,
            yorigin,
        }
    }
}

/// Absolute offset in samples inside a plane
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneOffset {
    pub x: isize,
    pub y: isize,
}

/// Backing buffer for a plane of a frame.
///
/// The visible area is surrounded by `xpad`/`ypad` samples of padding that
/// [`Plane::pad`] fills by edge replication. Kernels reaching outside a block
/// (interpolation taps, filter neighbours) read from that padding.
#[derive(Clone, Default)]
pub struct Plane<T: Pixel> {
    pub data: PlaneData<T>,
    pub cfg: PlaneConfig,
}

pub type PlaneData<T> = AlignedBoxedSlice<T>;

impl<T: Pixel> Default for AlignedBoxedSlice<T> {
    fn default() -> Self {
        AlignedBoxedSlice::new(0, T::default())
    }
}

impl<T: Pixel> Debug for Plane<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plane {{ data: [{}, ...], cfg: {:?} }}",
            self.data.first().copied().unwrap_or_default(),
            self.cfg
        )
    }
}

impl<T: Pixel> Plane<T> {
    pub fn new(
        width: usize,
        height: usize,
        xdec: usize,
        ydec: usize,
        xpad: usize,
        ypad: usize,
    ) -> Self {
        let cfg = PlaneConfig::new(width, height, xdec, ydec, xpad, ypad);
        let data = PlaneData::new(cfg.stride * cfg.alloc_height, T::cast_from(128u16));

        Plane { data, cfg }
    }

    /// Builds an unpadded plane holding a copy of `samples` laid out with `stride`.
    pub fn from_slice(samples: &[T], width: usize, height: usize, stride: usize) -> Self {
        let mut p = Plane::new(width, height, 0, 0, 0, 0);
        for (y, row) in samples.chunks(stride).take(height).enumerate() {
            p.row_mut(y).copy_from_slice(&row[..width]);
        }
        p
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        (y + self.cfg.yorigin) * self.cfg.stride + (x + self.cfg.xorigin)
    }

    /// Index of the visible (0, 0) sample in `data`.
    #[inline(always)]
    pub fn origin(&self) -> usize {
        self.index(0, 0)
    }

    #[inline]
    pub fn p(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.index(x, y);
        self.data[i] = v;
    }

    /// Visible part of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let base = self.index(0, y);
        &self.data[base..base + self.cfg.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let base = self.index(0, y);
        let width = self.cfg.width;
        &mut self.data[base..base + width]
    }

    pub fn rows_iter(&self) -> RowsIter<'_, T> {
        RowsIter {
            plane: self,
            rows: 0..self.cfg.height,
        }
    }

    pub fn data_origin(&self) -> &[T] {
        &self.data[self.origin()..]
    }

    /// Replicates the outermost visible samples into the padding.
    pub fn pad(&mut self) {
        let PlaneConfig {
            stride,
            alloc_height,
            width,
            height,
            xorigin,
            yorigin,
            ..
        } = self.cfg;
        if width == 0 || height == 0 {
            return;
        }

        for y in yorigin..yorigin + height {
            let row = &mut self.data[y * stride..(y + 1) * stride];
            let left = row[xorigin];
            let right = row[xorigin + width - 1];
            for v in row[..xorigin].iter_mut() {
                *v = left;
            }
            for v in row[xorigin + width..].iter_mut() {
                *v = right;
            }
        }

        let (above, rest) = self.data.split_at_mut(yorigin * stride);
        let first = &rest[..stride];
        for row in above.chunks_mut(stride) {
            row.copy_from_slice(first);
        }

        let last_start = (yorigin + height - 1) * stride;
        let (body, below) = self.data.split_at_mut((yorigin + height) * stride);
        let last = &body[last_start..last_start + stride];
        for row in below.chunks_mut(stride).take(alloc_height - yorigin - height) {
            row.copy_from_slice(last);
        }
    }

    /// Borrowed view of the whole visible area.
    pub fn as_region(&self) -> PlaneRegion<'_, T> {
        let origin = self.origin();
        PlaneRegion::new(
            &self.data,
            origin,
            self.cfg.stride,
            self.cfg.width,
            self.cfg.height,
        )
    }

    pub fn as_region_mut(&mut self) -> PlaneRegionMut<'_, T> {
        let origin = self.origin();
        let (stride, width, height) = (self.cfg.stride, self.cfg.width, self.cfg.height);
        PlaneRegionMut::new(&mut self.data, origin, stride, width, height)
    }

    /// View of `rect`, in coordinates relative to the visible origin; the
    /// rectangle may extend into the padding.
    pub fn region(&self, rect: Rect) -> PlaneRegion<'_, T> {
        self.as_region().subregion(rect)
    }

    pub fn region_mut(&mut self, rect: Rect) -> PlaneRegionMut<'_, T> {
        let origin = self.origin();
        let stride = self.cfg.stride;
        PlaneRegionMut::new(&mut self.data, origin, stride, self.cfg.width, self.cfg.height)
            .into_subregion(rect)
    }

    /// Loads packed little-endian samples of `bytewidth` bytes, `source_stride`
    /// bytes per row.
    pub fn copy_from_raw_u8(&mut self, source: &[u8], source_stride: usize, bytewidth: usize) {
        let width = self.cfg.width;
        for (y, row) in source.chunks(source_stride).take(self.cfg.height).enumerate() {
            let dst = self.row_mut(y);
            match bytewidth {
                1 => {
                    for (d, &s) in dst.iter_mut().zip(row[..width].iter()) {
                        *d = T::cast_from(s);
                    }
                }
                2 => {
                    for (d, s) in dst.iter_mut().zip(row[..width * 2].chunks(2)) {
                        *d = T::cast_from(u16::from(s[1]) << 8 | u16::from(s[0]));
                    }
                }
                _ => unreachable!("unsupported sample width {}", bytewidth),
            }
        }
    }

    /// Inverse of [`Plane::copy_from_raw_u8`].
    pub fn copy_to_raw_u8(&self, dest: &mut [u8], dest_stride: usize, bytewidth: usize) {
        let width = self.cfg.width;
        for (y, row) in dest.chunks_mut(dest_stride).take(self.cfg.height).enumerate() {
            let src = self.row(y);
            match bytewidth {
                1 => {
                    for (d, &s) in row[..width].iter_mut().zip(src.iter()) {
                        *d = u8::cast_from(s);
                    }
                }
                2 => {
                    for (d, &s) in row[..width * 2].chunks_mut(2).zip(src.iter()) {
                        let v = u16::cast_from(s);
                        d[0] = v as u8;
                        d[1] = (v >> 8) as u8;
                    }
                }
                _ => unreachable!("unsupported sample width {}", bytewidth),
            }
        }
    }
}

impl<T: Pixel> Index<usize> for Plane<T> {
    type Output = [T];
    #[inline(always)]
    fn index(&self, y: usize) -> &Self::Output {
        self.row(y)
    }
}

impl<T: Pixel> IndexMut<usize> for Plane<T> {
    #[inline(always)]
    fn index_mut(&mut self, y: usize) -> &mut Self::Output {
        self.row_mut(y)
    }
}

/// Iterator over the visible rows of a plane.
#[derive(Debug)]
pub struct RowsIter<'a, T: Pixel> {
    plane: &'a Plane<T>,
    rows: Range<usize>,
}

impl<'a, T: Pixel> Iterator for RowsIter<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        let plane = self.plane;
        self.rows.next().map(|y| plane.row(y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: Pixel> ExactSizeIterator for RowsIter<'_, T> {}
impl<T: Pixel> FusedIterator for RowsIter<'_, T> {}
