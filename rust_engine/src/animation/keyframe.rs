//! 偏移关键帧与烘焙结果

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::BezierCurve;
use crate::blend::BlendedAttributes;

/// 偏移关键帧，缓动曲线作用在"上一帧 → 本帧"区间
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetKeyframe {
    pub frame: u32,
    pub value: f32,
    pub easing: BezierCurve,
}

impl OffsetKeyframe {
    pub fn new(frame: u32, value: f32) -> Self {
        Self {
            frame,
            value,
            easing: BezierCurve::linear(),
        }
    }

    pub fn with_easing(mut self, easing: BezierCurve) -> Self {
        self.easing = easing;
        self
    }
}

/// 烘焙出的一帧
#[derive(Clone, Debug, PartialEq)]
pub struct BakedKeyframe {
    pub frame: u32,
    /// 归一化后的偏移量
    pub offset: f32,
    pub attributes: BlendedAttributes,
    /// 与上一帧连续的欧拉角（未混合旋转时为 None）
    pub euler: Option<Vec3>,
}
