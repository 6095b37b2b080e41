use super::*;
use crate::com::plane::*;

use num_derive::FromPrimitive;
use num_traits::*;

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::fmt::{Debug, Display};
use std::{cmp, mem, ptr};

/// An analog to a Box<[T]> where the underlying slice is aligned.
/// Alignment is according to the architecture-specific SIMD constraints.
pub struct AlignedBoxedSlice<T> {
    ptr: std::ptr::NonNull<T>,
    len: usize,
}

impl<T> AlignedBoxedSlice<T> {
    // Data alignment in bytes.
    cfg_if::cfg_if! {
      if #[cfg(target_arch = "wasm32")] {
        // FIXME: wasm32 allocator fails for alignment larger than 3
        const DATA_ALIGNMENT_LOG2: usize = 3;
      } else {
        const DATA_ALIGNMENT_LOG2: usize = 5;
      }
    }

    unsafe fn layout(len: usize) -> Layout {
        // zero-sized planes still get a distinct aligned allocation
        Layout::from_size_align_unchecked(
            cmp::max(len * mem::size_of::<T>(), 1),
            1 << Self::DATA_ALIGNMENT_LOG2,
        )
    }

    unsafe fn alloc(len: usize) -> std::ptr::NonNull<T> {
        let layout = Self::layout(len);
        match ptr::NonNull::new(alloc(layout) as *mut T) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        }
    }

    /// Creates a ['AlignedBoxedSlice'] with a slice of length ['len'] filled with
    /// ['val'].
    pub fn new(len: usize, val: T) -> Self
    where
        T: Clone,
    {
        let p = unsafe { Self::alloc(len) };
        for i in 0..len {
            unsafe { ptr::write(p.as_ptr().add(i), val.clone()) };
        }

        Self { ptr: p, len }
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedBoxedSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: Clone> Clone for AlignedBoxedSlice<T> {
    fn clone(&self) -> Self {
        let p = unsafe { Self::alloc(self.len) };
        for (i, v) in self.iter().enumerate() {
            unsafe { ptr::write(p.as_ptr().add(i), v.clone()) };
        }

        Self {
            ptr: p,
            len: self.len,
        }
    }
}

impl<T> std::ops::Deref for AlignedBoxedSlice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe {
            let p = self.ptr.as_ptr();

            std::slice::from_raw_parts(p, self.len)
        }
    }
}

impl<T> std::ops::DerefMut for AlignedBoxedSlice<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe {
            let p = self.ptr.as_ptr();

            std::slice::from_raw_parts_mut(p, self.len)
        }
    }
}

impl<T> std::ops::Drop for AlignedBoxedSlice<T> {
    fn drop(&mut self) {
        unsafe {
            for a in self.iter_mut() {
                ptr::drop_in_place(a)
            }

            dealloc(self.ptr.as_ptr() as *mut u8, Self::layout(self.len));
        }
    }
}

unsafe impl<T> Send for AlignedBoxedSlice<T> where T: Send {}
unsafe impl<T> Sync for AlignedBoxedSlice<T> where T: Sync {}

pub trait Fixed {
    fn align_power_of_two(&self, n: usize) -> usize;
}

impl Fixed for usize {
    // round up to a multiple of 1 << n
    #[inline]
    fn align_power_of_two(&self, n: usize) -> usize {
        (self + (1 << n) - 1) & !((1 << n) - 1)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub trait CastFromPrimitive<T>: Copy + 'static {
    fn cast_from(v: T) -> Self;
}

macro_rules! impl_cast_from_primitive {
  ( $T:ty => $U:ty ) => {
    impl CastFromPrimitive<$U> for $T {
      #[inline(always)]
      fn cast_from(v: $U) -> Self { v as Self }
    }
  };
  ( $T:ty => { $( $U:ty ),* } ) => {
    $( impl_cast_from_primitive!($T => $U); )*
  };
}

// casts to { u8, u16 } are implemented separately using Pixel, so that the
// compiler understands that CastFromPrimitive<T: Pixel> is always implemented
impl_cast_from_primitive!(u8 => { u32, u64, usize });
impl_cast_from_primitive!(u8 => { i8, i16, i32, i64, isize });
impl_cast_from_primitive!(u16 => { u32, u64, usize });
impl_cast_from_primitive!(u16 => { i8, i16, i32, i64, isize });
impl_cast_from_primitive!(i16 => { u32, u64, usize });
impl_cast_from_primitive!(i16 => { i8, i16, i32, i64, isize });
impl_cast_from_primitive!(i32 => { u32, u64, usize });
impl_cast_from_primitive!(i32 => { i8, i16, i32, i64, isize });

pub trait Pixel:
    PrimInt
    + Into<u32>
    + Into<i32>
    + AsPrimitive<u8>
    + AsPrimitive<i16>
    + AsPrimitive<u16>
    + AsPrimitive<i32>
    + AsPrimitive<u32>
    + AsPrimitive<usize>
    + CastFromPrimitive<u8>
    + CastFromPrimitive<i16>
    + CastFromPrimitive<u16>
    + CastFromPrimitive<i32>
    + CastFromPrimitive<u32>
    + CastFromPrimitive<usize>
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + 'static
{
}

impl Pixel for u8 {}
impl Pixel for u16 {}

macro_rules! impl_cast_from_pixel_to_primitive {
    ( $T:ty ) => {
        impl<T: Pixel> CastFromPrimitive<T> for $T {
            #[inline(always)]
            fn cast_from(v: T) -> Self {
                v.as_()
            }
        }
    };
}

impl_cast_from_pixel_to_primitive!(u8);
impl_cast_from_pixel_to_primitive!(i16);
impl_cast_from_pixel_to_primitive!(u16);
impl_cast_from_pixel_to_primitive!(i32);
impl_cast_from_pixel_to_primitive!(u32);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Stream-wide sample width, resolved at compile time.
///
/// Every kernel is generic over a `BitDepth` marker so that one source carries all
/// depths while each instantiation sees its shifts and clip bounds as constants.
pub trait BitDepth: Copy + Clone + Debug + Default + Send + Sync + 'static {
    type Pixel: Pixel;
    const BITS: u32;

    #[inline(always)]
    fn max_value() -> i32 {
        (1 << Self::BITS) - 1
    }

    /// Saturates an intermediate into the valid sample range.
    #[inline(always)]
    fn clip_pixel(v: i32) -> Self::Pixel {
        Self::Pixel::cast_from(if v < 0 {
            0
        } else if v > Self::max_value() {
            Self::max_value()
        } else {
            v
        })
    }
}

macro_rules! impl_bit_depth {
    ($name:ident, $pixel:ty, $bits:expr) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl BitDepth for $name {
            type Pixel = $pixel;
            const BITS: u32 = $bits;
        }
    };
}

impl_bit_depth!(Depth8, u8, 8);
impl_bit_depth!(Depth10, u16, 10);
impl_bit_depth!(Depth12, u16, 12);
impl_bit_depth!(Depth14, u16, 14);
impl_bit_depth!(Depth16, u16, 16);

/// Runtime view of the supported depths, used when a session picks its
/// `BitDepth` marker from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum SampleDepth {
    Eight = 8,
    Ten = 10,
    Twelve = 12,
    Fourteen = 14,
    Sixteen = 16,
}

impl SampleDepth {
    pub fn from_bits(bits: u32) -> Result<Self, ReconError> {
        SampleDepth::from_u32(bits).ok_or(ReconError::UnsupportedBitDepth(bits))
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl Default for SampleDepth {
    fn default() -> Self {
        SampleDepth::Eight
    }
}

impl fmt::Display for SampleDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub const FRAME_PAD_LUMA: usize = 80;
pub const FRAME_PAD_CHROMA: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct Frame<T: Pixel> {
    pub planes: [Plane<T>; N_C],
    pub chroma_sampling: ChromaSampling,
}

impl<T: Pixel> Frame<T> {
    pub fn new(width: usize, height: usize, chroma_sampling: ChromaSampling) -> Self {
        let (xdec, ydec) = chroma_sampling.decimation();
        let chroma_plane = || {
            Plane::new(
                (width + xdec) >> xdec,
                (height + ydec) >> ydec,
                xdec,
                ydec,
                FRAME_PAD_CHROMA,
                FRAME_PAD_CHROMA,
            )
        };

        Frame {
            planes: [
                Plane::new(width, height, 0, 0, FRAME_PAD_LUMA, FRAME_PAD_LUMA),
                chroma_plane(),
                chroma_plane(),
            ],
            chroma_sampling,
        }
    }

    pub fn width(&self) -> usize {
        self.planes[Y_C].cfg.width
    }

    pub fn height(&self) -> usize {
        self.planes[Y_C].cfg.height
    }

    pub fn pad(&mut self) {
        for p in self.planes.iter_mut() {
            p.pad();
        }
    }
}
