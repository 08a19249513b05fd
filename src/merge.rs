//! Stable in-place merging of two adjacent sorted runs.
//!
//! Both kernels keep the slice a permutation of its input at every point
//! where the comparator may panic, so an interrupted merge never loses or
//! duplicates elements.

use std::mem;
use std::ptr;

/// How two adjacent sorted runs are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Copy the shorter run into a scratch allocation and merge back into
    /// place. Linear time; scratch is at most half of the merged range.
    #[default]
    Buffered,
    /// Allocation-free merge by binary search and rotation.
    /// O(n log n) element moves.
    Rotation,
}

impl MergeStrategy {
    /// Merge `v[..mid]` and `v[mid..]`, both already sorted by `is_less`.
    ///
    /// Equal elements keep their relative order; elements of the left run
    /// come first.
    ///
    /// # Panics
    /// Panics if `mid > v.len()`. A panic from `is_less` propagates after the
    /// slice has been restored to a permutation of its input.
    pub fn merge<T, F>(self, v: &mut [T], mid: usize, is_less: &F)
    where
        F: Fn(&T, &T) -> bool,
    {
        let len = v.len();
        assert!(mid <= len, "merge point {mid} out of bounds for length {len}");
        if mid == 0 || mid == len || !is_less(&v[mid], &v[mid - 1]) {
            return;
        }
        if mem::size_of::<T>() == 0 {
            return;
        }
        match self {
            MergeStrategy::Buffered => merge_buffered(v, mid, is_less),
            MergeStrategy::Rotation => merge_rotation(v, mid, is_less),
        }
    }
}

fn merge_buffered<T, F>(v: &mut [T], mid: usize, is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let shorter = mid.min(v.len() - mid);
    // Only the allocation is used; the vector stays empty so dropping it
    // never drops an element.
    let mut scratch: Vec<T> = Vec::with_capacity(shorter);
    // SAFETY: `0 < mid < v.len()`, `T` is not zero-sized and the buffer holds
    // `shorter` elements.
    unsafe { merge_with_buffer(v, mid, scratch.as_mut_ptr(), is_less) };
}

/// Merges non-decreasing runs `v[..mid]` and `v[mid..]` using `buf` as
/// temporary storage, and stores the result into `v[..]`.
///
/// # Safety
/// Both runs must be non-empty, `buf` must hold at least as many elements
/// as the shorter run, and `T` must not be zero-sized.
unsafe fn merge_with_buffer<T, F>(v: &mut [T], mid: usize, buf: *mut T, is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let len = v.len();
    let v = v.as_mut_ptr();
    let (v_mid, v_end) = unsafe { (v.add(mid), v.add(len)) };

    // The shorter run goes into `buf`; `hole` then tracks the part of it that
    // has not been written back yet. If `is_less` panics, dropping `hole`
    // copies that part into the gap left in `v`.
    let mut hole;

    if mid <= len - mid {
        unsafe {
            ptr::copy_nonoverlapping(v, buf, mid);
            hole = MergeHole {
                start: buf,
                end: buf.add(mid),
                dest: v,
            };
        }

        let left = &mut hole.start;
        let mut right = v_mid;
        let out = &mut hole.dest;

        while *left < hole.end && right < v_end {
            // Ties take from the left run.
            unsafe {
                let to_copy = if is_less(&*right, &**left) {
                    get_and_increment(&mut right)
                } else {
                    get_and_increment(left)
                };
                ptr::copy_nonoverlapping(to_copy, get_and_increment(out), 1);
            }
        }
    } else {
        unsafe {
            ptr::copy_nonoverlapping(v_mid, buf, len - mid);
            hole = MergeHole {
                start: buf,
                end: buf.add(len - mid),
                dest: v_mid,
            };
        }

        let left = &mut hole.dest;
        let right = &mut hole.end;
        let mut out = v_end;

        while v < *left && buf < *right {
            // Ties take from the right run, walking backwards.
            unsafe {
                let to_copy = if is_less(&*right.sub(1), &*left.sub(1)) {
                    decrement_and_get(left)
                } else {
                    decrement_and_get(right)
                };
                ptr::copy_nonoverlapping(to_copy, decrement_and_get(&mut out), 1);
            }
        }
    }
    // `hole` drops here and moves any leftover of the shorter run into place.

    unsafe fn get_and_increment<T>(ptr: &mut *mut T) -> *mut T {
        let old = *ptr;
        *ptr = unsafe { ptr.add(1) };
        old
    }

    unsafe fn decrement_and_get<T>(ptr: &mut *mut T) -> *mut T {
        *ptr = unsafe { ptr.sub(1) };
        *ptr
    }

    struct MergeHole<T> {
        start: *mut T,
        end: *mut T,
        dest: *mut T,
    }

    impl<T> Drop for MergeHole<T> {
        fn drop(&mut self) {
            // SAFETY: `start..end` is the unconsumed part of the buffer and
            // `dest` points at a gap of exactly that many elements.
            unsafe {
                let len = self.end.offset_from(self.start) as usize;
                ptr::copy_nonoverlapping(self.start, self.dest, len);
            }
        }
    }
}

fn merge_rotation<T, F>(v: &mut [T], mid: usize, is_less: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let len = v.len();
    if mid == 0 || mid == len {
        return;
    }
    if len == 2 {
        if is_less(&v[1], &v[0]) {
            v.swap(0, 1);
        }
        return;
    }

    // Split the longer run in half and find where its pivot lands in the
    // other run: first element not less than the pivot on the right,
    // first element greater than the pivot on the left.
    let (cut_left, cut_right) = if mid > len - mid {
        let cut_left = mid / 2;
        let pivot = &v[cut_left];
        (cut_left, mid + v[mid..].partition_point(|x| is_less(x, pivot)))
    } else {
        let cut_right = mid + (len - mid) / 2;
        let pivot = &v[cut_right];
        (v[..mid].partition_point(|x| !is_less(pivot, x)), cut_right)
    };

    v[cut_left..cut_right].rotate_left(mid - cut_left);
    let new_mid = cut_left + (cut_right - mid);

    let (front, back) = v.split_at_mut(new_mid);
    merge_rotation(front, cut_left, is_less);
    merge_rotation(back, cut_right - new_mid, is_less);
}
