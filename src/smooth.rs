//! N-point moving average over an owning ring.
//!
//! The window holds the last `N` appended samples. The average is the plain sum of the retained
//! samples divided by their count, using the accumulator's own division: integers truncate,
//! floats don't.
//!
//! The sum is taken in the accumulator type `Acc`, which defaults to the sample type. That is
//! right for floats; for integer samples pick an accumulator wide enough for `N` samples, e.g.
//! `MovingAverage<u8, 4, u16>`, otherwise the sum can overflow even when the mean fits.

use core::marker::PhantomData;
use core::ops::{Add, Div};

use num_traits::{NumCast, Zero};

use crate::ring::RingBuffer;

#[derive(Clone, Debug)]
pub struct MovingAverage<T, const N: usize, Acc = T> {
    ring: RingBuffer<T, N>,
    acc: PhantomData<fn() -> Acc>,
}

impl<T: Default, const N: usize, Acc> MovingAverage<T, N, Acc> {
    pub fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
            acc: PhantomData,
        }
    }
}

impl<T: Default, const N: usize, Acc> Default for MovingAverage<T, N, Acc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, Acc> MovingAverage<T, N, Acc> {
    /// Adds a sample, evicting the oldest once `N` are retained.
    #[inline]
    pub fn append(&mut self, value: T) {
        self.ring.put(value);
    }

    #[inline]
    pub const fn window(&self) -> usize {
        N
    }

    /// Number of retained samples, at most `N`.
    pub fn len(&mut self) -> usize {
        self.ring.length()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&mut self) -> bool {
        self.len() == N
    }

    /// Forgets every sample.
    pub fn reset(&mut self) {
        self.ring.clear();
    }
}

impl<T, const N: usize, Acc> MovingAverage<T, N, Acc>
where
    T: Clone + Default + Zero + NumCast,
    Acc: From<T> + Zero + Add<Output = Acc> + Div<Output = Acc> + NumCast,
{
    /// Mean of the retained samples; `None` when empty, when the sample count does not fit in
    /// `Acc`, or when the mean does not fit back into `T`.
    pub fn try_average(&mut self) -> Option<T> {
        let len = self.ring.length();
        if len == 0 {
            return None;
        }

        let mut sum = Acc::zero();
        for i in 0..len {
            sum = sum + <Acc as From<T>>::from(self.ring.peek(i));
        }
        let count = <Acc as NumCast>::from(len)?;
        <T as NumCast>::from(sum / count)
    }

    /// Mean of the retained samples, or zero when there are none.
    pub fn current_average(&mut self) -> T {
        self.try_average().unwrap_or_else(T::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::MovingAverage;
    use std::vec::Vec;

    #[test]
    fn constant_input_averages_to_itself() {
        let mut avg = MovingAverage::<i32, 5>::new();
        for _ in 0..8 {
            avg.append(2);
        }
        assert_eq!(avg.current_average(), 2);
    }

    #[test]
    fn integer_window_truncates() {
        let mut avg = MovingAverage::<i32, 5>::new();
        let mut seen = Vec::new();
        for v in 1..=7 {
            avg.append(v);
            seen.push(avg.current_average());
        }
        // Windows: [1] [1,2] [1..3] [1..4] [1..5] [2..6] [3..7]
        assert_eq!(seen, [1, 1, 2, 2, 3, 4, 5]);
    }

    #[test]
    fn float_window_slides() {
        let mut avg = MovingAverage::<f32, 4>::new();
        let expected = [
            11.0,
            (11.0 + 22.0) / 2.0,
            (11.0 + 22.0 + 33.0) / 3.0,
            (11.0 + 22.0 + 33.0 + 44.0) / 4.0,
            (22.0 + 33.0 + 44.0 + 55.0) / 4.0,
            (33.0 + 44.0 + 55.0 + 66.0) / 4.0,
            (44.0 + 55.0 + 66.0 + 77.0) / 4.0,
            (55.0 + 66.0 + 77.0 + 88.0) / 4.0,
            (66.0 + 77.0 + 88.0 + 99.0) / 4.0,
        ];

        for (i, want) in expected.into_iter().enumerate() {
            avg.append(11.0 * (i + 1) as f32);
            assert_eq!(avg.current_average(), want);
        }
        assert!(avg.is_full());
    }

    #[test]
    fn empty_is_zero() {
        let mut avg = MovingAverage::<u16, 3>::new();
        assert!(avg.is_empty());
        assert_eq!(avg.try_average(), None);
        assert_eq!(avg.current_average(), 0);

        avg.append(9);
        avg.reset();
        assert_eq!(avg.len(), 0);
        assert_eq!(avg.current_average(), 0);
    }

    #[test]
    fn wide_accumulator_holds_the_sum() {
        let mut avg = MovingAverage::<u8, 4, u16>::new();
        for _ in 0..4 {
            avg.append(100);
        }
        assert_eq!(avg.current_average(), 100);

        avg.append(255);
        avg.append(255);
        // (100 + 100 + 255 + 255) / 4
        assert_eq!(avg.current_average(), 177);
    }

    #[test]
    fn signed_samples_in_wide_accumulator() {
        let mut avg = MovingAverage::<i8, 3, i32>::new();
        for v in [-128, -128, -127] {
            avg.append(v);
        }
        assert_eq!(avg.current_average(), -127);
    }

    #[test]
    fn count_not_representable() {
        let mut avg = MovingAverage::<i8, 200>::new();
        for _ in 0..200 {
            avg.append(0);
        }
        // 200 does not fit in i8.
        assert_eq!(avg.try_average(), None);
    }
}
