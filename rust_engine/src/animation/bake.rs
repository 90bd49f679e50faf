//! 烘焙：把偏移动画展开成逐帧的相机属性
//!
//! 烘焙期间场景视为静止，所有锚点属性只抓取一次。
//! 每帧的区段查找互不依赖，使用 rayon 并行求值，
//! 最后按帧顺序串行修正欧拉角连续性。

use glam::{EulerRot, Vec3};
use rayon::prelude::*;

use super::{BakedKeyframe, OffsetTrack};
use crate::blend::interpolation::compatible_euler;
use crate::blend::{blend, AnchorAttributes};
use crate::controller::OffsetController;
use crate::path::SegmentResolver;
use crate::source::SourceResolver;
use crate::{MotionError, Result};

/// 烘焙参数，起止帧缺省时取轨道首尾关键帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeOptions {
    pub frame_start: Option<u32>,
    pub frame_end: Option<u32>,
    pub frame_step: u32,
    pub euler_order: EulerRot,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            frame_start: None,
            frame_end: None,
            frame_step: 1,
            euler_order: EulerRot::XYZ,
        }
    }
}

impl BakeOptions {
    pub fn range(frame_start: u32, frame_end: u32) -> Self {
        Self {
            frame_start: Some(frame_start),
            frame_end: Some(frame_end),
            ..Self::default()
        }
    }

    pub fn with_step(mut self, frame_step: u32) -> Self {
        self.frame_step = frame_step;
        self
    }
}

/// 烘焙结果，按帧号升序
#[derive(Debug, Clone, PartialEq)]
pub struct BakedTrack {
    pub euler_order: EulerRot,
    pub keyframes: Vec<BakedKeyframe>,
}

impl BakedTrack {
    pub fn get(&self, frame: u32) -> Option<&BakedKeyframe> {
        self.keyframes
            .binary_search_by_key(&frame, |kf| kf.frame)
            .ok()
            .map(|index| &self.keyframes[index])
    }

    pub fn frame_range(&self) -> Option<(u32, u32)> {
        Some((self.keyframes.first()?.frame, self.keyframes.last()?.frame))
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

/// 烘焙偏移动画
pub fn bake(
    controller: &OffsetController,
    track: &OffsetTrack,
    sources: &dyn SourceResolver,
    options: &BakeOptions,
) -> Result<BakedTrack> {
    let (first, last) = track.frame_range().ok_or(MotionError::EmptyOffsetTrack)?;
    let start = options.frame_start.unwrap_or(first);
    let end = options.frame_end.unwrap_or(last);
    let step = options.frame_step;
    if step == 0 || start > end {
        return Err(MotionError::InvalidFrameRange { start, end, step });
    }

    controller.prepare(sources)?;
    let fractions = controller.fractions();
    let anchors = {
        let compiled = controller
            .compiled_path()
            .ok_or(MotionError::InsufficientAnchors { valid: 0 })?;
        compiled
            .anchors()
            .iter()
            .map(|anchor| AnchorAttributes::capture(anchor.source, sources))
            .collect::<Result<Vec<_>>>()?
    };
    let closed = controller.path_spec().is_closed();
    let policy = controller.policy();
    let channels = controller.channels();
    let target = controller.target().intrinsics_target(sources);

    let frames: Vec<u32> = (start..=end).step_by(step as usize).collect();
    log::info!(
        "烘焙 {} 帧 ({}..={}, 步长 {}), 锚点 {}",
        frames.len(),
        start,
        end,
        step,
        anchors.len()
    );

    let mut keyframes = frames
        .par_iter()
        .map(|&frame| -> Result<BakedKeyframe> {
            let offset = policy.apply(track.seek(frame).unwrap_or(0.0));
            let hit = SegmentResolver::new(closed).resolve(offset, &fractions)?;
            let mut attributes = blend(&anchors[hit.from], &anchors[hit.to], hit.t, channels);
            match target {
                Some(target) => attributes.intrinsics_target = Some(target),
                None => attributes.strip_intrinsics(),
            }
            Ok(BakedKeyframe {
                frame,
                offset,
                attributes,
                euler: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut previous: Option<Vec3> = None;
    for keyframe in &mut keyframes {
        keyframe.euler = keyframe
            .attributes
            .rotation_euler(options.euler_order)
            .map(|euler| match previous {
                Some(prev) => compatible_euler(euler, prev),
                None => euler,
            });
        if keyframe.euler.is_some() {
            previous = keyframe.euler;
        }
    }

    Ok(BakedTrack {
        euler_order: options.euler_order,
        keyframes,
    })
}
