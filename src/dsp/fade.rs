//! Tail fade to silence

use crate::engine::WaveBuffer;

impl WaveBuffer {
    /// Ramp the last `n` frames down towards silence
    ///
    /// Frame `k` in `frame_count - n + 1 ..= frame_count - 1` is scaled by
    /// `(frame_count - k) / n`. Frame `frame_count - n` keeps full volume.
    /// `n` is clamped to the frame count; nothing happens for `n == 0` or
    /// buffers shorter than two frames.
    pub fn fade_samples(&mut self, n: usize) {
        let frames = self.frame_count();
        if n == 0 || frames < 2 {
            return;
        }
        let n = n.min(frames);

        for k in (frames - n + 1..frames).rev() {
            let factor = (frames - k) as f64 / n as f64;
            if let Some((left, right)) = self.frame(k) {
                self.set_frame(k, scale(left, factor), scale(right, factor));
            }
        }
    }

    /// Fade the last `fraction` of the buffer (clamped to `0.0..=1.0`)
    pub fn fade_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let n = (self.frame_count() as f64 * fraction).floor() as usize;
        self.fade_samples(n);
    }
}

#[inline]
fn scale(sample: i16, factor: f64) -> i16 {
    (f64::from(sample) * factor) as i16
}
