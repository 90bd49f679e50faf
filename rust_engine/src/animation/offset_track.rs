//! 偏移动画轨道
//!
//! 按帧存储偏移关键帧，求值规则与骨骼轨道一致：
//! 命中关键帧直接返回，两帧之间按后一帧的缓动曲线插值，
//! 超出首尾时保持端点值。

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use serde::{Deserialize, Serialize};

use super::OffsetKeyframe;
use crate::blend::interpolation::{coefficient, lerp_f32};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetTrack {
    keyframes: BTreeMap<u32, OffsetKeyframe>,
}

impl OffsetTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入关键帧，同帧已存在时替换并返回旧值
    pub fn insert_keyframe(&mut self, keyframe: OffsetKeyframe) -> Option<OffsetKeyframe> {
        self.keyframes.insert(keyframe.frame, keyframe)
    }

    pub fn remove_keyframe(&mut self, frame: u32) -> Option<OffsetKeyframe> {
        self.keyframes.remove(&frame)
    }

    pub fn find(&self, frame: u32) -> Option<&OffsetKeyframe> {
        self.keyframes.get(&frame)
    }

    /// 查找 frame 处（含）之前和之后最近的关键帧
    pub fn search_closest(&self, frame: u32) -> (Option<&OffsetKeyframe>, Option<&OffsetKeyframe>) {
        let prev = self.keyframes.range(..=frame).next_back().map(|(_, kf)| kf);
        let next = self
            .keyframes
            .range((Excluded(frame), Unbounded))
            .next()
            .map(|(_, kf)| kf);
        (prev, next)
    }

    /// 整数帧求值，空轨道返回 None
    pub fn seek(&self, frame: u32) -> Option<f32> {
        match self.search_closest(frame) {
            (Some(prev), Some(next)) => {
                if prev.frame == frame {
                    return Some(prev.value);
                }
                let coef = coefficient(prev.frame, next.frame, frame);
                let amount = next.easing.evaluate(coef);
                Some(lerp_f32(prev.value, next.value, amount))
            }
            (Some(kf), None) | (None, Some(kf)) => Some(kf.value),
            (None, None) => None,
        }
    }

    /// 帧间求值，amount 为 [0, 1) 的小数帧
    pub fn seek_precisely(&self, frame: u32, amount: f32) -> Option<f32> {
        let v0 = self.seek(frame)?;
        if amount > 0.0 {
            let v1 = self.seek(frame.saturating_add(1))?;
            Some(lerp_f32(v0, v1, amount))
        } else {
            Some(v0)
        }
    }

    /// 首尾关键帧的帧号
    pub fn frame_range(&self) -> Option<(u32, u32)> {
        let first = self.keyframes.keys().next()?;
        let last = self.keyframes.keys().next_back()?;
        Some((*first, *last))
    }

    pub fn max_frame_index(&self) -> u32 {
        self.keyframes.keys().next_back().copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OffsetKeyframe> {
        self.keyframes.values()
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

impl FromIterator<OffsetKeyframe> for OffsetTrack {
    fn from_iter<I: IntoIterator<Item = OffsetKeyframe>>(iter: I) -> Self {
        let mut track = Self::new();
        for keyframe in iter {
            track.insert_keyframe(keyframe);
        }
        track
    }
}
