//! 路径构建
//!
//! 从锚点世界坐标构建样条（平滑贝塞尔或折线），并按固定分辨率采样成稠密折线。
//! 弧长计算只依赖采样折线，与曲线表示无关。

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::arc_length;
use super::bezier::{auto_handles, cubic_point, BezierKnot};
use super::PathSpec;
use crate::config;
use crate::source::{SourceId, SourceResolver};
use crate::{MotionError, Result};

/// 曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveKind {
    /// 自动手柄三次贝塞尔
    #[default]
    Smooth,
    /// 折线
    Linear,
}

/// 解析到世界坐标的有效锚点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAnchor {
    /// 在锚点列表中的下标
    pub index: usize,
    pub source: SourceId,
    pub position: Vec3,
}

/// 构建完成的路径（只读快照，重建时整体替换）
#[derive(Debug, Clone)]
pub struct CompiledPath {
    kind: CurveKind,
    closed: bool,
    resolution: usize,
    anchors: Vec<ResolvedAnchor>,
    knots: Vec<BezierKnot>,
    samples: Vec<Vec3>,
    cumulative: Vec<f32>,
}

impl CompiledPath {
    fn new(kind: CurveKind, closed: bool, resolution: usize, anchors: Vec<ResolvedAnchor>) -> Self {
        let points: Vec<Vec3> = anchors.iter().map(|a| a.position).collect();
        let knots = match kind {
            CurveKind::Smooth => auto_handles(&points),
            CurveKind::Linear => points.iter().map(|p| BezierKnot::collapsed(*p)).collect(),
        };

        let count = knots.len();
        let segments = if closed { count } else { count - 1 };
        let mut samples = Vec::with_capacity(segments * resolution + 1);

        for segment in 0..segments {
            let from = &knots[segment];
            let to = &knots[(segment + 1) % count];
            for step in 0..resolution {
                let t = step as f32 / resolution as f32;
                let point = match kind {
                    CurveKind::Smooth => {
                        cubic_point(from.co, from.handle_right, to.handle_left, to.co, t)
                    }
                    CurveKind::Linear => from.co.lerp(to.co, t),
                };
                samples.push(point);
            }
        }
        samples.push(knots[segments % count].co);

        let cumulative = arc_length::cumulative_lengths(&samples);

        Self {
            kind,
            closed,
            resolution,
            anchors,
            knots,
            samples,
            cumulative,
        }
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 每段采样步数
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// 参与建路径的锚点数
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.anchors.len()
        } else {
            self.anchors.len() - 1
        }
    }

    pub fn anchors(&self) -> &[ResolvedAnchor] {
        &self.anchors
    }

    pub fn knots(&self) -> &[BezierKnot] {
        &self.knots
    }

    /// 稠密采样折线
    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    /// 每个采样点处的累计长度
    pub fn cumulative_lengths(&self) -> &[f32] {
        &self.cumulative
    }

    /// 第 k 个锚点在采样折线中的下标（构造保证落在段边界上）
    pub fn anchor_sample_index(&self, anchor: usize) -> usize {
        anchor * self.resolution
    }

    /// 路径总长
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// 按弧长比例取世界坐标（供路径跟随使用）
    pub fn point_at_fraction(&self, fraction: f32) -> Vec3 {
        let total = self.length();
        if !total.is_finite()
            || total <= config::get_config().zero_length_epsilon
            || !fraction.is_finite()
        {
            return self.samples[0];
        }

        let target = fraction.clamp(0.0, 1.0) * total;
        let upper = self
            .cumulative
            .partition_point(|length| *length <= target)
            .clamp(1, self.samples.len() - 1);
        let lower = upper - 1;

        let span = self.cumulative[upper] - self.cumulative[lower];
        let t = if span > 0.0 {
            (target - self.cumulative[lower]) / span
        } else {
            0.0
        };
        self.samples[lower].lerp(self.samples[upper], t)
    }

    /// 锚点集合与位置是否与当前快照一致（一致则无需重建）
    pub fn matches(&self, anchors: &[ResolvedAnchor], tolerance: f32) -> bool {
        self.anchors.len() == anchors.len()
            && self.anchors.iter().zip(anchors).all(|(a, b)| {
                a.index == b.index
                    && a.source == b.source
                    && a.position.distance(b.position) <= tolerance
            })
    }
}

/// 路径构建器，独占持有当前的 CompiledPath
#[derive(Debug, Clone)]
pub struct PathBuilder {
    resolution: usize,
    compiled: Option<CompiledPath>,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new(config::get_config().path_resolution)
    }
}

impl PathBuilder {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
            compiled: None,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// 收集能解析到世界坐标的锚点，失效引用直接跳过
    pub fn collect_anchors(spec: &PathSpec, sources: &dyn SourceResolver) -> Vec<ResolvedAnchor> {
        spec.anchors
            .iter()
            .enumerate()
            .filter_map(|(index, anchor)| match sources.position(anchor.source) {
                Some(position) if position.is_finite() => Some(ResolvedAnchor {
                    index,
                    source: anchor.source,
                    position,
                }),
                Some(position) => {
                    log::warn!("锚点 {} 的坐标无效 {:?}，按失效处理", index, position);
                    None
                }
                None => {
                    log::debug!("锚点 {} 的相机源 {} 已失效，跳过", index, anchor.source);
                    None
                }
            })
            .collect()
    }

    /// 构建路径
    pub fn build(&self, spec: &PathSpec, sources: &dyn SourceResolver) -> Result<CompiledPath> {
        let anchors = Self::collect_anchors(spec, sources);
        self.build_resolved(spec, anchors)
    }

    /// 用已解析的锚点构建路径
    pub fn build_resolved(&self, spec: &PathSpec, anchors: Vec<ResolvedAnchor>) -> Result<CompiledPath> {
        if anchors.len() < 2 {
            return Err(MotionError::InsufficientAnchors {
                valid: anchors.len(),
            });
        }
        Ok(CompiledPath::new(
            spec.curve_kind(),
            spec.is_closed(),
            self.resolution,
            anchors,
        ))
    }

    /// 重建并替换当前路径，失败时清空
    pub fn rebuild(&mut self, spec: &PathSpec, anchors: Vec<ResolvedAnchor>) -> Result<&CompiledPath> {
        self.compiled = None;
        let compiled = self.build_resolved(spec, anchors)?;
        log::info!(
            "路径重建: {} 个锚点, {:?}, closed={}, 长度={:.3}",
            compiled.anchor_count(),
            compiled.kind(),
            compiled.is_closed(),
            compiled.length()
        );
        Ok(self.compiled.insert(compiled))
    }

    pub fn compiled(&self) -> Option<&CompiledPath> {
        self.compiled.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.compiled = None;
    }
}
