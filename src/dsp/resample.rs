//! Linear-interpolation resampler
//!
//! Retargets a canonical buffer to an exact frame count. This serves both
//! explicit duration changes and sample-rate normalization. It is lossy and
//! not band-limited.

use crate::engine::WaveBuffer;

impl WaveBuffer {
    /// Return a new canonical buffer of exactly `new_frames` frames
    ///
    /// The last output frame is copied from the last input frame; every
    /// other frame `n` is interpolated at source position
    /// `n / (new_frames - 1) * (old_frames - 1)` and truncated toward zero.
    ///
    /// # Example
    /// ```
    /// use wavmix::engine::WaveBuffer;
    ///
    /// let mut buffer = WaveBuffer::silence(3);
    /// buffer.set(1, 100, -100);
    /// buffer.set(2, 200, -200);
    ///
    /// let longer = buffer.stretched(5);
    /// assert_eq!(longer.get(1), (50, -50));
    /// assert_eq!(longer.get(4), (200, -200));
    /// ```
    pub fn stretched(&self, new_frames: usize) -> WaveBuffer {
        let old_frames = self.frame_count();

        if new_frames == old_frames {
            return self.clone();
        }

        let mut out = WaveBuffer::silence(new_frames);
        if new_frames == 0 || old_frames == 0 {
            return out;
        }

        let last = self.frame(old_frames - 1).unwrap_or((0, 0));
        out.set_frame(new_frames - 1, last.0, last.1);

        let dst_span = (new_frames - 1) as f64;
        let src_span = (old_frames - 1) as f64;

        for n in 0..new_frames - 1 {
            let position = (n as f64 / dst_span) * src_span;
            let i = position.floor() as usize;
            let frac = position - i as f64;

            let a = self.frame(i).unwrap_or(last);
            let b = self.frame(i + 1).unwrap_or(a);

            out.set_frame(n, lerp(a.0, b.0, frac), lerp(a.1, b.1, frac));
        }

        out
    }

    /// [`stretched`](Self::stretched) to `floor(frame_count * multiplier)`
    ///
    /// Negative and NaN multipliers give an empty buffer.
    pub fn stretched_relative(&self, multiplier: f64) -> WaveBuffer {
        let new_frames = (self.frame_count() as f64 * multiplier).floor();
        // `as` saturates: NaN and negatives become 0
        self.stretched(new_frames as usize)
    }
}

#[inline]
fn lerp(a: i16, b: i16, frac: f64) -> i16 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a + (b - a) * frac) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(values: &[i16]) -> WaveBuffer {
        let mut buffer = WaveBuffer::silence(values.len());
        for (i, &v) in values.iter().enumerate() {
            buffer.set_frame(i, v, -v);
        }
        buffer
    }

    fn lefts(buffer: &WaveBuffer) -> Vec<i16> {
        (0..buffer.frame_count())
            .map(|i| buffer.frame(i).unwrap().0)
            .collect()
    }

    #[test]
    fn test_same_length_is_copy() {
        let buffer = ramp(&[1, 2, 3, 4]);
        assert_eq!(buffer.stretched(4), buffer.clone());
    }

    #[test]
    fn test_zero_frames() {
        let stretched = ramp(&[1, 2, 3]).stretched(0);
        assert!(stretched.is_empty());
        assert!(stretched.validate_canonical().is_ok());
    }

    #[test]
    fn test_upsample_interpolates() {
        let stretched = ramp(&[0, 100, 200]).stretched(5);

        assert_eq!(lefts(&stretched), vec![0, 50, 100, 150, 200]);
        assert_eq!(stretched.get(1), (50, -50));
    }

    #[test]
    fn test_downsample() {
        let stretched = ramp(&[0, 10, 20, 30, 40]).stretched(3);
        assert_eq!(lefts(&stretched), vec![0, 20, 40]);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // Midpoint of 0 and -101 is -50.5
        let stretched = ramp(&[0, -101]).stretched(3);
        assert_eq!(lefts(&stretched), vec![0, -50, -101]);
        // Right channel is +50.5
        assert_eq!(stretched.get(1), (-50, 50));
    }

    #[test]
    fn test_last_frame_anchored() {
        let buffer = ramp(&[7, -3, 12, 900, -450, 31]);
        let last = buffer.get(buffer.frame_count() - 1);

        for n in 1..20 {
            let stretched = buffer.stretched(n);
            assert_eq!(stretched.frame_count(), n);
            assert_eq!(stretched.get(n - 1), last, "anchor lost for {} frames", n);
        }
    }

    #[test]
    fn test_single_source_frame() {
        let stretched = ramp(&[42]).stretched(4);
        assert_eq!(lefts(&stretched), vec![42, 42, 42, 42]);
    }

    #[test]
    fn test_empty_source() {
        let stretched = WaveBuffer::silence(0).stretched(3);
        assert_eq!(stretched.frame_count(), 3);
        assert_eq!(stretched.get(2), (0, 0));
    }

    #[test]
    fn test_output_is_canonical() {
        let stretched = ramp(&[1, 2, 3, 4, 5]).stretched(11);
        assert!(stretched.validate_canonical().is_ok());
    }

    #[test]
    fn test_stretched_relative() {
        let buffer = ramp(&[0, 100, 200, 300]);

        assert_eq!(buffer.stretched_relative(2.0).frame_count(), 8);
        assert_eq!(buffer.stretched_relative(0.5).frame_count(), 2);
        // floor(4 * 1.3) = 5
        assert_eq!(buffer.stretched_relative(1.3).frame_count(), 5);
        assert_eq!(buffer.stretched_relative(1.0), buffer);
        assert!(buffer.stretched_relative(-1.0).is_empty());
        assert!(buffer.stretched_relative(f64::NAN).is_empty());
    }
}
