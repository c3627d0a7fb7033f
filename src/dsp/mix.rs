//! Additive mixer
//!
//! Blends a window of one canonical buffer into another, with a volume
//! factor, an optional linear fade-out over the end of the window, and
//! clamping to the 16-bit range.

use crate::engine::{DiagnosticKind, Diagnostics, WaveBuffer};

/// Where and how to mix a source buffer into a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixParams {
    /// First target frame written
    pub target_offset: usize,
    /// First source frame read
    pub source_offset: usize,
    /// Maximum number of frames to mix
    pub frames: usize,
    /// Source gain; 1.0 adds the source unscaled
    pub volume: f64,
    /// Length of the linear fade to silence at the end of the window
    pub fadeout: usize,
}

impl MixParams {
    /// Mix `frames` frames from the start of both buffers at unity volume
    pub fn new(frames: usize) -> Self {
        Self {
            target_offset: 0,
            source_offset: 0,
            frames,
            volume: 1.0,
            fadeout: 0,
        }
    }

    pub fn target_at(mut self, target_offset: usize) -> Self {
        self.target_offset = target_offset;
        self
    }

    pub fn source_at(mut self, source_offset: usize) -> Self {
        self.source_offset = source_offset;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn fadeout(mut self, fadeout: usize) -> Self {
        self.fadeout = fadeout;
        self
    }
}

/// What a call to [`WaveBuffer::add`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MixOutcome {
    /// Frames written to the target
    pub frames_added: usize,
    /// At least one sum was clamped
    pub clipped: bool,
}

impl WaveBuffer {
    /// Mix `source` into `self` in place; the target is never resized
    ///
    /// Mixing stops when either buffer runs out or `params.frames` frames
    /// have been added.
    pub fn add(&mut self, source: &WaveBuffer, params: &MixParams) -> MixOutcome {
        self.add_with(source, params, Diagnostics::global())
    }

    /// [`add`](Self::add) reporting clipping to `diagnostics`
    pub fn add_with(
        &mut self,
        source: &WaveBuffer,
        params: &MixParams,
        diagnostics: &Diagnostics,
    ) -> MixOutcome {
        let mut outcome = MixOutcome::default();
        let mut t = params.target_offset;
        let mut s = params.source_offset;

        while outcome.frames_added < params.frames {
            let (Some(target), Some(src)) = (self.frame(t), source.frame(s)) else {
                break;
            };

            let remaining = params.frames - outcome.frames_added;
            let fade = (remaining < params.fadeout)
                .then(|| remaining as f64 / params.fadeout as f64);

            let (left, l_clip) = mix_sample(target.0, src.0, fade, params.volume);
            let (right, r_clip) = mix_sample(target.1, src.1, fade, params.volume);
            outcome.clipped |= l_clip || r_clip;

            self.set_frame(t, left, right);

            t += 1;
            s += 1;
            outcome.frames_added += 1;
        }

        if outcome.clipped {
            diagnostics.report(DiagnosticKind::Clipping, || {
                format!(
                    "clipping while mixing {} frames at target frame {}",
                    outcome.frames_added, params.target_offset
                )
            });
        }

        outcome
    }
}

/// Sum one target and one source sample; returns the clamped sum and
/// whether it had to be clamped
#[inline]
fn mix_sample(target: i16, source: i16, fade: Option<f64>, volume: f64) -> (i16, bool) {
    let mut source = i32::from(source);

    if let Some(factor) = fade {
        source = (f64::from(source) * factor) as i32;
    }

    if volume != 1.0 {
        source = (f64::from(source) * volume) as i32;
    }

    let sum = i32::from(target) + source;
    let clamped = sum.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
    (clamped as i16, clamped != sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(frames: usize, left: i16, right: i16) -> WaveBuffer {
        let mut buffer = WaveBuffer::silence(frames);
        for i in 0..frames {
            buffer.set_frame(i, left, right);
        }
        buffer
    }

    fn lefts(buffer: &WaveBuffer) -> Vec<i16> {
        (0..buffer.frame_count())
            .map(|i| buffer.frame(i).unwrap().0)
            .collect()
    }

    #[test]
    fn test_basic_window() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(10);
        let source = filled(10, 1000, -1000);

        let outcome = target.add_with(&source, &MixParams::new(4).target_at(2), &diag);

        assert_eq!(outcome.frames_added, 4);
        assert!(!outcome.clipped);
        assert_eq!(lefts(&target), vec![0, 0, 1000, 1000, 1000, 1000, 0, 0, 0, 0]);
        assert_eq!(target.get(3), (1000, -1000));
    }

    #[test]
    fn test_adds_to_existing() {
        let diag = Diagnostics::new();
        let mut target = filled(3, 100, 200);
        let source = filled(3, 5, -5);

        target.add_with(&source, &MixParams::new(3), &diag);
        assert_eq!(target.get(1), (105, 195));
    }

    #[test]
    fn test_source_offset() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(4);
        let mut source = WaveBuffer::silence(4);
        for i in 0..4 {
            source.set_frame(i, i as i16 * 10, 0);
        }

        target.add_with(&source, &MixParams::new(10).source_at(1), &diag);
        assert_eq!(lefts(&target), vec![10, 20, 30, 0]);
    }

    #[test]
    fn test_stops_at_target_end() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(4);
        let source = filled(10, 1, 1);

        let outcome = target.add_with(&source, &MixParams::new(10).target_at(2), &diag);
        assert_eq!(outcome.frames_added, 2);
        assert_eq!(target.frame_count(), 4);
    }

    #[test]
    fn test_offset_past_end_adds_nothing() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(4);
        let source = filled(4, 1, 1);

        let outcome = target.add_with(&source, &MixParams::new(4).target_at(9), &diag);
        assert_eq!(outcome.frames_added, 0);
        assert_eq!(diag.occurrences(DiagnosticKind::OutOfRangeRead), 0);
    }

    #[test]
    fn test_fadeout_ramps_source() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(4);
        let source = filled(4, 1000, -1000);

        target.add_with(&source, &MixParams::new(4).fadeout(2), &diag);

        // Only the last frame has remaining (1) < fadeout (2)
        assert_eq!(lefts(&target), vec![1000, 1000, 1000, 500]);
        assert_eq!(target.get(3), (500, -500));
    }

    #[test]
    fn test_full_length_fadeout() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(4);
        let source = filled(4, 1000, 1000);

        target.add_with(&source, &MixParams::new(4).fadeout(5), &diag);
        assert_eq!(lefts(&target), vec![800, 600, 400, 200]);
    }

    #[test]
    fn test_volume_truncates() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(1);
        let source = filled(1, 1001, -1001);

        target.add_with(&source, &MixParams::new(1).volume(0.5), &diag);
        assert_eq!(target.get(0), (500, -500));
    }

    #[test]
    fn test_fade_applies_before_volume() {
        let diag = Diagnostics::new();
        let mut target = WaveBuffer::silence(1);
        let source = filled(1, 7, -7);

        // 7 * 0.5 truncates to 3, then 3 * 1.5 truncates to 4 (not 10 * 0.5 = 5)
        target.add_with(&source, &MixParams::new(1).fadeout(2).volume(1.5), &diag);
        assert_eq!(target.get(0), (4, -4));
    }

    #[test]
    fn test_clipping_clamps() {
        let diag = Diagnostics::new();
        let mut target = filled(2, 30000, -30000);
        let source = filled(2, 10000, -10000);

        let outcome = target.add_with(&source, &MixParams::new(2), &diag);

        assert!(outcome.clipped);
        assert_eq!(target.get(0), (32767, -32768));
        assert_eq!(target.get(1), (32767, -32768));
        assert_eq!(diag.occurrences(DiagnosticKind::Clipping), 1);
    }

    #[test]
    fn test_clipping_reported_once_across_calls() {
        let diag = Diagnostics::new();
        let source = filled(2, i16::MAX, i16::MIN);

        for _ in 0..3 {
            let mut target = filled(2, 1, -1);
            target.add_with(&source, &MixParams::new(2), &diag);
        }

        assert_eq!(diag.occurrences(DiagnosticKind::Clipping), 3);
        assert_eq!(diag.emitted(DiagnosticKind::Clipping), 1);
    }

    #[test]
    fn test_exact_bounds_do_not_clip() {
        let diag = Diagnostics::new();
        let mut target = filled(1, 32000, -32000);
        let source = filled(1, 767, -768);

        let outcome = target.add_with(&source, &MixParams::new(1), &diag);
        assert!(!outcome.clipped);
        assert_eq!(target.get(0), (32767, -32768));
    }

    #[test]
    fn test_source_unchanged() {
        let diag = Diagnostics::new();
        let mut target = filled(3, 1, 1);
        let source = filled(3, 2, 2);
        let before = source.clone();

        target.add_with(&source, &MixParams::new(3).volume(0.25), &diag);
        assert_eq!(source, before);
    }
}
