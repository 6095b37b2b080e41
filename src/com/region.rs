use crate::api::frame::Pixel;

use std::ops::{Index, IndexMut};

/// Rectangle of samples, positioned relative to the origin of the view it is
/// cut from. Negative positions reach into the parent's margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: isize,
    pub y: isize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: isize, y: isize, width: usize, height: usize) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

#[inline(always)]
fn offset_index(origin: usize, stride: usize, x: isize, y: isize) -> usize {
    let i = origin as isize + y * stride as isize + x;
    debug_assert!(i >= 0, "sample ({}, {}) before start of buffer", x, y);
    i as usize
}

#[inline(always)]
fn check_bounds(len: usize, origin: usize, stride: usize, width: usize, height: usize) {
    if width != 0 && height != 0 {
        assert!(
            origin + (height - 1) * stride + width <= len,
            "{}x{} region at {} (stride {}) overruns buffer of {} samples",
            width,
            height,
            origin,
            stride,
            len
        );
    }
}

/// Read-only rectangular view into a sample buffer.
///
/// The view holds the whole backing slice, so accessors taking signed
/// coordinates can reach neighbours outside the rectangle (filter taps,
/// deblocking P side). Any access outside the backing slice panics.
#[derive(Debug, Clone, Copy)]
pub struct PlaneRegion<'a, T: Pixel> {
    data: &'a [T],
    origin: usize,
    stride: usize,
    width: usize,
    height: usize,
}

impl<'a, T: Pixel> PlaneRegion<'a, T> {
    #[inline]
    pub fn new(data: &'a [T], origin: usize, stride: usize, width: usize, height: usize) -> Self {
        check_bounds(data.len(), origin, stride, width, height);
        PlaneRegion {
            data,
            origin,
            stride,
            width,
            height,
        }
    }

    /// View over a tightly packed or strided caller buffer starting at index 0.
    pub fn from_slice(data: &'a [T], stride: usize, width: usize, height: usize) -> Self {
        Self::new(data, 0, stride, width, height)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Backing slice together with the index of this view's (0, 0) sample.
    #[inline(always)]
    pub fn raw(&self) -> (&'a [T], usize) {
        (self.data, self.origin)
    }

    #[inline(always)]
    pub fn index_of(&self, x: isize, y: isize) -> usize {
        offset_index(self.origin, self.stride, x, y)
    }

    #[inline(always)]
    pub fn at(&self, x: isize, y: isize) -> T {
        self.data[self.index_of(x, y)]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height);
        let base = self.origin + y * self.stride;
        &self.data[base..base + self.width]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    pub fn subregion(&self, rect: Rect) -> PlaneRegion<'a, T> {
        let origin = self.index_of(rect.x, rect.y);
        PlaneRegion::new(self.data, origin, self.stride, rect.width, rect.height)
    }
}

impl<T: Pixel> Index<usize> for PlaneRegion<'_, T> {
    type Output = [T];

    #[inline(always)]
    fn index(&self, y: usize) -> &Self::Output {
        self.row(y)
    }
}

/// Mutable counterpart of [`PlaneRegion`].
#[derive(Debug)]
pub struct PlaneRegionMut<'a, T: Pixel> {
    data: &'a mut [T],
    origin: usize,
    stride: usize,
    width: usize,
    height: usize,
}

impl<'a, T: Pixel> PlaneRegionMut<'a, T> {
    #[inline]
    pub fn new(
        data: &'a mut [T],
        origin: usize,
        stride: usize,
        width: usize,
        height: usize,
    ) -> Self {
        check_bounds(data.len(), origin, stride, width, height);
        PlaneRegionMut {
            data,
            origin,
            stride,
            width,
            height,
        }
    }

    pub fn from_slice(data: &'a mut [T], stride: usize, width: usize, height: usize) -> Self {
        Self::new(data, 0, stride, width, height)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn raw_mut(&mut self) -> (&mut [T], usize) {
        (&mut *self.data, self.origin)
    }

    #[inline(always)]
    pub fn index_of(&self, x: isize, y: isize) -> usize {
        offset_index(self.origin, self.stride, x, y)
    }

    #[inline(always)]
    pub fn at(&self, x: isize, y: isize) -> T {
        self.data[self.index_of(x, y)]
    }

    #[inline(always)]
    pub fn set(&mut self, x: isize, y: isize, v: T) {
        let i = self.index_of(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height);
        let base = self.origin + y * self.stride;
        &self.data[base..base + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height);
        let base = self.origin + y * self.stride;
        &mut self.data[base..base + self.width]
    }

    /// Reborrows as a read-only view with the same geometry.
    pub fn as_const(&self) -> PlaneRegion<'_, T> {
        PlaneRegion {
            data: &*self.data,
            origin: self.origin,
            stride: self.stride,
            width: self.width,
            height: self.height,
        }
    }

    pub fn subregion_mut(&mut self, rect: Rect) -> PlaneRegionMut<'_, T> {
        let origin = self.index_of(rect.x, rect.y);
        PlaneRegionMut::new(&mut *self.data, origin, self.stride, rect.width, rect.height)
    }

    pub fn into_subregion(self, rect: Rect) -> PlaneRegionMut<'a, T> {
        let origin = self.index_of(rect.x, rect.y);
        PlaneRegionMut::new(self.data, origin, self.stride, rect.width, rect.height)
    }

    pub fn fill(&mut self, v: T) {
        for y in 0..self.height {
            for p in self.row_mut(y) {
                *p = v;
            }
        }
    }
}

impl<T: Pixel> Index<usize> for PlaneRegionMut<'_, T> {
    type Output = [T];

    #[inline(always)]
    fn index(&self, y: usize) -> &Self::Output {
        self.row(y)
    }
}

impl<T: Pixel> IndexMut<usize> for PlaneRegionMut<'_, T> {
    #[inline(always)]
    fn index_mut(&mut self, y: usize) -> &mut Self::Output {
        self.row_mut(y)
    }
}
