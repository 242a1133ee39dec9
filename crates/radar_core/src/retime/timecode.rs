//! Frame to millisecond conversion for scene boundaries.
//!
//! A boundary is the frame at which a scene begins, so the content before it
//! ends one frame earlier. The offset says how many source frames sit in
//! front of the scene that the target edit does not have (positive) or how
//! many it is missing (negative).

use serde::Serialize;

use crate::models::ScaleRate;

/// Millisecond cut points for one scene correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CutPlan {
    /// End of the content to keep before the scene. Zero means there is
    /// nothing to keep.
    pub prev_boundary_ms: u64,
    /// Where the kept tail of the stream begins.
    pub scene_start_ms: u64,
    /// Silence to insert between the two, zero for none.
    pub insert_ms: u64,
}

impl CutPlan {
    /// Whether the correction starts at the very beginning of the stream.
    pub fn is_leading(&self) -> bool {
        self.prev_boundary_ms == 0
    }

    /// Whether silence must be inserted.
    pub fn needs_silence(&self) -> bool {
        self.insert_ms > 0
    }

    /// Milliseconds of source audio dropped by this plan.
    pub fn discarded_ms(&self) -> u64 {
        self.scene_start_ms.saturating_sub(self.prev_boundary_ms)
    }
}

/// Convert a scene boundary and its offset into a cut plan.
///
/// Every value is rounded to the nearest millisecond with the same rule.
pub fn convert(frame: u64, offset_frames: i64, rate: ScaleRate) -> CutPlan {
    let prev_boundary_ms = if frame == 0 {
        0
    } else {
        rate.frames_to_ms(frame - 1)
    };

    let (scene_start_ms, insert_ms) = if offset_frames >= 0 {
        let start = frame.saturating_add(offset_frames.unsigned_abs());
        (rate.frames_to_ms(start), 0)
    } else {
        (
            rate.frames_to_ms(frame),
            rate.frames_to_ms(offset_frames.unsigned_abs()),
        )
    };

    CutPlan {
        prev_boundary_ms,
        scene_start_ms,
        insert_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fps(n: u64) -> ScaleRate {
        ScaleRate::integer(n).unwrap()
    }

    #[test]
    fn trims_extra_source_frames_mid_stream() {
        let plan = convert(100, 48, fps(24));
        assert_eq!(
            plan,
            CutPlan {
                prev_boundary_ms: 4125,
                scene_start_ms: 6167,
                insert_ms: 0,
            }
        );
        assert!(!plan.is_leading());
        assert!(!plan.needs_silence());
    }

    #[test]
    fn inserts_silence_at_stream_start() {
        let plan = convert(0, -24, fps(24));
        assert_eq!(
            plan,
            CutPlan {
                prev_boundary_ms: 0,
                scene_start_ms: 0,
                insert_ms: 1000,
            }
        );
        assert!(plan.is_leading());
        assert!(plan.needs_silence());
    }

    #[test]
    fn negative_offset_keeps_scene_start() {
        let plan = convert(240, -12, fps(24));
        assert_eq!(plan.prev_boundary_ms, 9958);
        assert_eq!(plan.scene_start_ms, 10000);
        assert_eq!(plan.insert_ms, 500);
    }

    #[test]
    fn frame_zero_never_keeps_a_lead() {
        for offset in [-100, -1, 0, 1, 100] {
            assert_eq!(convert(0, offset, ScaleRate::NTSC).prev_boundary_ms, 0);
        }
    }

    #[test]
    fn non_negative_offsets_keep_boundaries_ordered() {
        let rates = [ScaleRate::NTSC, ScaleRate::NTSC_FILM, fps(24), fps(25)];
        for rate in rates {
            for frame in [1u64, 2, 17, 1000, 43_157] {
                for offset in [0i64, 1, 7, 300] {
                    let plan = convert(frame, offset, rate);
                    assert!(
                        plan.scene_start_ms >= plan.prev_boundary_ms,
                        "frame {frame} offset {offset} at {rate}"
                    );
                    assert_eq!(plan.insert_ms, 0);
                }
            }
        }
    }

    #[test]
    fn negative_offsets_always_insert() {
        for offset in [-1i64, -2, -24, -1001] {
            let plan = convert(500, offset, ScaleRate::NTSC);
            assert!(plan.insert_ms > 0);
            assert_eq!(
                plan.insert_ms,
                ScaleRate::NTSC.frames_to_ms(offset.unsigned_abs())
            );
        }
    }

    #[test]
    fn discarded_duration() {
        assert_eq!(convert(100, 48, fps(24)).discarded_ms(), 2042);
        assert_eq!(convert(0, -24, fps(24)).discarded_ms(), 0);
    }
}
