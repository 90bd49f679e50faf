//! 区段查找
//!
//! 给定偏移量和弧长比例表，找到包围它的锚点对和段内插值系数。
//! 先试上一次命中的区段，连续拖动时查找是 O(1) 摊销。

use serde::{Deserialize, Serialize};

use crate::{MotionError, Result};

/// 偏移量越界处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DomainPolicy {
    /// 夹取到 [0, 1]，越过终点停在最后一个相机源
    #[default]
    Clamp,
    /// 取模到 [0, 1)，首尾循环
    Loop,
}

impl DomainPolicy {
    /// 归一化偏移量，NaN 原样返回（由查找报错）
    pub fn apply(self, value: f32) -> f32 {
        match self {
            DomainPolicy::Clamp => value.clamp(0.0, 1.0),
            DomainPolicy::Loop => {
                let wrapped = value.rem_euclid(1.0);
                // 极小负数取模后会舍入成 1.0
                if wrapped >= 1.0 {
                    0.0
                } else {
                    wrapped
                }
            }
        }
    }
}

/// 查找结果：from → to 两个锚点（比例表下标）及段内系数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub from: usize,
    pub to: usize,
    /// 段内插值系数 [0, 1]
    pub t: f32,
}

impl SegmentHit {
    fn new(from: usize, to: usize, t: f32) -> Self {
        Self { from, to, t }
    }
}

/// 区段查找器
#[derive(Debug, Clone, Default)]
pub struct SegmentResolver {
    closed: bool,
    /// 上一次命中的区段
    last_segment: Option<usize>,
}

impl SegmentResolver {
    pub fn new(closed: bool) -> Self {
        Self {
            closed,
            last_segment: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
        self.last_segment = None;
    }

    /// 比例表变化后调用
    pub fn reset(&mut self) {
        self.last_segment = None;
    }

    /// 查找包围 `value` 的区段
    ///
    /// - 小于首项：第一段，t = 0
    /// - 不小于末端：最后一段，t = 1（停在最后一个相机源，不外推）
    /// - 零宽区段：t = 1（瞬间切换到后一个锚点）
    pub fn resolve(&mut self, value: f32, fractions: &[f32]) -> Result<SegmentHit> {
        let count = fractions.len();
        if count < 2 || !value.is_finite() {
            return Err(MotionError::NoBoundingSegment(value));
        }

        let segments = self.segment_count(count);
        let last = segments - 1;

        if value < fractions[0] {
            self.last_segment = Some(0);
            return Ok(SegmentHit::new(0, 1, 0.0));
        }

        let (_, end) = self.bounds(fractions, last);
        if value >= end {
            self.last_segment = Some(last);
            return Ok(SegmentHit::new(last, (last + 1) % count, 1.0));
        }

        if let Some(hint) = self.last_segment.filter(|i| *i < segments) {
            if let Some(hit) = self.try_segment(fractions, hint, value) {
                return Ok(hit);
            }
        }

        for segment in 0..segments {
            if let Some(hit) = self.try_segment(fractions, segment, value) {
                self.last_segment = Some(segment);
                return Ok(hit);
            }
        }

        Err(MotionError::NoBoundingSegment(value))
    }

    fn segment_count(&self, count: usize) -> usize {
        if self.closed {
            count
        } else {
            count - 1
        }
    }

    /// 区段上下界，闭合路径最后一段的上界为 1.0
    fn bounds(&self, fractions: &[f32], segment: usize) -> (f32, f32) {
        let start = fractions[segment];
        let end = fractions.get(segment + 1).copied().unwrap_or(1.0);
        (start, end)
    }

    fn try_segment(&self, fractions: &[f32], segment: usize, value: f32) -> Option<SegmentHit> {
        let (start, end) = self.bounds(fractions, segment);
        if !(start <= value && value < end) {
            return None;
        }

        let width = end - start;
        let t = if width > 0.0 {
            ((value - start) / width).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(SegmentHit::new(segment, (segment + 1) % fractions.len(), t))
    }
}
