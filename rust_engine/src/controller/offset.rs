//! 偏移控制器状态机
//!
//! 状态：
//! - Idle：有效锚点不足 2 个，偏移量只存储不应用
//! - Ready：路径和弧长比例表可用
//!
//! 写回受控相机时可能触发属性变化通知，再次调用 `set_offset`。
//! 写回期间置位 `suppress_feedback`，重入调用只记录数值，不再混合。
//! 标志挂在控制器实例上，多个受控相机互不影响。

use std::cell::{Cell, Ref, RefCell};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::blend::{blend, AnchorAttributes, AttributeChannelSet, BlendedAttributes, DrivenTarget};
use crate::config;
use crate::path::{
    arc_length, Anchor, CompiledPath, CurveKind, DomainPolicy, PathBuilder, PathSpec, SegmentHit,
    SegmentResolver,
};
use crate::source::{SourceId, SourceResolver};
use crate::{MotionError, Result};

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Ready,
}

/// 偏移量状态快照
///
/// 防重入标志只能读：真正的标志挂在控制器内部，修改快照不会影响控制器。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetState {
    pub factor: f32,
    pub policy: DomainPolicy,
    /// 取快照时是否处于写回中（运行时标志，不持久化）
    #[serde(skip)]
    suppress_feedback: bool,
}

impl OffsetState {
    pub fn new(factor: f32, policy: DomainPolicy) -> Self {
        Self {
            factor,
            policy,
            suppress_feedback: false,
        }
    }

    pub fn is_feedback_suppressed(&self) -> bool {
        self.suppress_feedback
    }
}

impl Default for OffsetState {
    fn default() -> Self {
        Self::new(0.0, config::get_config().default_domain_policy)
    }
}

/// 混合结果的写回目标（由宿主实现）
pub trait WriteSink {
    fn write(&mut self, attributes: &BlendedAttributes) -> Result<()>;
}

/// 只记录结果，测试和烘焙预览用
impl WriteSink for Vec<BlendedAttributes> {
    fn write(&mut self, attributes: &BlendedAttributes) -> Result<()> {
        self.push(attributes.clone());
        Ok(())
    }
}

/// 一次 `set_offset` 的结果（所有失败都在这里吸收，不会向外传播）
#[derive(Debug)]
pub enum UpdateStatus {
    /// 已混合并写回
    Applied(SegmentHit),
    /// 写回进行中的重入调用，只记录了数值
    Suppressed,
    /// 外部正在拖动变换，等拖动结束再统一计算
    Deferred,
    /// 总开关关闭
    Disabled,
    /// 本次未写回任何属性
    Skipped(MotionError),
}

impl UpdateStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateStatus::Applied(_))
    }

    pub fn error(&self) -> Option<&MotionError> {
        match self {
            UpdateStatus::Skipped(err) => Some(err),
            _ => None,
        }
    }
}

/// 需要持久化的配置，CompiledPath 和比例表总是加载后重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCamSettings {
    pub path: PathSpec,
    pub channels: AttributeChannelSet,
    pub target: DrivenTarget,
    pub offset: OffsetState,
}

impl MotionCamSettings {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 路径与查找缓存
struct PathCache {
    spec: PathSpec,
    builder: PathBuilder,
    fractions: Vec<f32>,
    resolver: SegmentResolver,
}

/// 写回期间置位防重入标志，离开作用域（包括 panic 展开）时复位
struct FeedbackGuard<'a>(&'a Cell<bool>);

impl<'a> FeedbackGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for FeedbackGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 偏移控制器（每个受控相机一个）
pub struct OffsetController {
    cache: RefCell<PathCache>,
    channels: AttributeChannelSet,
    target: DrivenTarget,
    policy: DomainPolicy,
    factor: Cell<f32>,
    suppress_feedback: Cell<bool>,
    state: Cell<ControllerState>,
    drag_active: Option<Box<dyn Fn() -> bool>>,
}

impl Default for OffsetController {
    fn default() -> Self {
        Self::new(PathSpec::default())
    }
}

impl OffsetController {
    pub fn new(spec: PathSpec) -> Self {
        let closed = spec.is_closed();
        let mut controller = Self {
            cache: RefCell::new(PathCache {
                spec,
                builder: PathBuilder::default(),
                fractions: Vec::new(),
                resolver: SegmentResolver::new(closed),
            }),
            channels: AttributeChannelSet::default(),
            target: DrivenTarget::default(),
            policy: config::get_config().default_domain_policy,
            factor: Cell::new(0.0),
            suppress_feedback: Cell::new(false),
            state: Cell::new(ControllerState::Idle),
            drag_active: None,
        };
        controller.anchor_set_changed();
        controller
    }

    /// 由相机源列表直接构造
    pub fn with_sources(sources: &[SourceId], curve_kind: CurveKind, closed: bool) -> Self {
        Self::new(PathSpec::from_sources(sources, curve_kind, closed))
    }

    /// 从持久化配置恢复
    pub fn from_settings(settings: MotionCamSettings) -> Result<Self> {
        settings.channels.validate()?;
        let mut controller = Self::new(settings.path);
        controller.channels = settings.channels;
        controller.target = settings.target;
        controller.policy = settings.offset.policy;
        controller
            .factor
            .set(settings.offset.policy.apply(settings.offset.factor));
        Ok(controller)
    }

    /// 导出持久化配置
    pub fn settings(&self) -> MotionCamSettings {
        MotionCamSettings {
            path: self.cache.borrow().spec.clone(),
            channels: self.channels.clone(),
            target: self.target.clone(),
            offset: OffsetState::new(self.factor.get(), self.policy),
        }
    }

    // ========== 偏移 ==========

    /// 设置偏移量并驱动受控相机
    pub fn set_offset(
        &self,
        value: f32,
        sources: &dyn SourceResolver,
        sink: &mut dyn WriteSink,
    ) -> UpdateStatus {
        let normalized = self.policy.apply(value);
        if normalized.is_finite() {
            self.factor.set(normalized);
        }

        if self.suppress_feedback.get() {
            return UpdateStatus::Suppressed;
        }
        if !normalized.is_finite() {
            return UpdateStatus::Skipped(MotionError::NoBoundingSegment(value));
        }
        if !self.channels.enabled {
            return UpdateStatus::Disabled;
        }
        if self.is_dragging() {
            return UpdateStatus::Deferred;
        }

        let (hit, blended) = match self.evaluate(normalized, sources) {
            Ok(result) => result,
            Err(err) => {
                log::debug!("偏移 {} 未应用: {}", normalized, err);
                return UpdateStatus::Skipped(err);
            }
        };

        let _guard = FeedbackGuard::engage(&self.suppress_feedback);
        match sink.write(&blended) {
            Ok(()) => UpdateStatus::Applied(hit),
            Err(err) => {
                log::warn!("写回受控相机失败: {}", err);
                UpdateStatus::Skipped(err)
            }
        }
    }

    /// 按当前偏移量重新计算一次（拖动结束时调用）
    pub fn refresh(&self, sources: &dyn SourceResolver, sink: &mut dyn WriteSink) -> UpdateStatus {
        self.set_offset(self.factor.get(), sources, sink)
    }

    /// 只计算不写回
    pub fn evaluate_at(&self, value: f32, sources: &dyn SourceResolver) -> Result<BlendedAttributes> {
        self.evaluate(self.policy.apply(value), sources)
            .map(|(_, blended)| blended)
    }

    fn evaluate(
        &self,
        value: f32,
        sources: &dyn SourceResolver,
    ) -> Result<(SegmentHit, BlendedAttributes)> {
        let (hit, from_id, to_id) = {
            let mut cache = self.cache.borrow_mut();
            self.ensure_ready(&mut cache, sources)?;

            let cache = &mut *cache;
            let hit = cache.resolver.resolve(value, &cache.fractions)?;
            let compiled = cache
                .builder
                .compiled()
                .ok_or(MotionError::InsufficientAnchors { valid: 0 })?;
            let anchors = compiled.anchors();
            (hit, anchors[hit.from].source, anchors[hit.to].source)
        };

        let from = AnchorAttributes::capture(from_id, sources)?;
        let to = AnchorAttributes::capture(to_id, sources)?;
        let mut blended = blend(&from, &to, hit.t, &self.channels);

        match self.target.intrinsics_target(sources) {
            Some(target) => blended.intrinsics_target = Some(target),
            None => blended.strip_intrinsics(),
        }

        if config::get_config().debug_log {
            log::debug!(
                "offset={:.4} -> 区段 {}->{} t={:.4}, 跳过通道 {:?}",
                value,
                hit.from,
                hit.to,
                hit.t,
                blended.skipped
            );
        }

        Ok((hit, blended))
    }

    /// 确保路径和比例表与场景一致，必要时重建
    fn ensure_ready(&self, cache: &mut PathCache, sources: &dyn SourceResolver) -> Result<()> {
        let anchors = PathBuilder::collect_anchors(&cache.spec, sources);

        if anchors.len() < 2 {
            if self.state.get() == ControllerState::Ready {
                log::info!("有效锚点不足 ({}), 进入 Idle", anchors.len());
            }
            cache.builder.invalidate();
            cache.fractions.clear();
            cache.resolver.reset();
            self.state.set(ControllerState::Idle);
            return Err(MotionError::InsufficientAnchors {
                valid: anchors.len(),
            });
        }

        let tolerance = config::get_config().rebuild_tolerance;
        let up_to_date = !cache.spec.is_dirty()
            && cache
                .builder
                .compiled()
                .map(|compiled| compiled.matches(&anchors, tolerance))
                .unwrap_or(false);

        if !up_to_date {
            let valid: Vec<usize> = anchors.iter().map(|a| a.index).collect();
            let count = anchors.len();
            let compiled = cache.builder.rebuild(&cache.spec, anchors)?;
            let fractions = arc_length::sample(compiled, count);

            cache.spec.anchors.apply_fractions(&valid, &fractions);
            cache.spec.anchors.clear_dirty();
            cache.fractions = fractions;
            cache.resolver.set_closed(cache.spec.is_closed());
        }

        self.state.set(ControllerState::Ready);
        Ok(())
    }

    /// 提前构建路径（烘焙、路径跟随前调用）
    pub fn prepare(&self, sources: &dyn SourceResolver) -> Result<()> {
        let mut cache = self.cache.borrow_mut();
        self.ensure_ready(&mut cache, sources)
    }

    /// 当前偏移量在路径上的世界坐标（路径跟随）
    pub fn path_position(&self, sources: &dyn SourceResolver) -> Option<Vec3> {
        self.prepare(sources).ok()?;
        self.compiled_path()
            .map(|compiled| compiled.point_at_fraction(self.factor.get()))
    }

    // ========== 拖拽抑制 ==========

    /// 设置"外部变换拖动中"判定
    pub fn set_drag_predicate(&mut self, predicate: impl Fn() -> bool + 'static) {
        self.drag_active = Some(Box::new(predicate));
    }

    pub fn clear_drag_predicate(&mut self) {
        self.drag_active = None;
    }

    fn is_dragging(&self) -> bool {
        self.drag_active.as_ref().map(|active| active()).unwrap_or(false)
    }

    // ========== 锚点编辑 ==========

    /// 锚点集合变化：按数量切换 Idle / Ready，路径标脏等下次查询重建
    pub fn anchor_set_changed(&mut self) {
        let cache = self.cache.get_mut();
        cache.spec.anchors.mark_dirty();
        cache.resolver.reset();
        let state = if cache.spec.anchors.len() >= 2 {
            ControllerState::Ready
        } else {
            ControllerState::Idle
        };
        self.state.set(state);
    }

    pub fn add_anchor(&mut self, source: SourceId) -> usize {
        let index = self.cache.get_mut().spec.anchors.add(source);
        self.anchor_set_changed();
        index
    }

    pub fn remove_anchor(&mut self, index: usize) -> Result<Anchor> {
        let removed = self.cache.get_mut().spec.anchors.remove(index)?;
        self.anchor_set_changed();
        Ok(removed)
    }

    pub fn move_anchor(&mut self, index: usize, new_index: usize) -> Result<()> {
        self.cache.get_mut().spec.anchors.move_anchor(index, new_index)?;
        self.anchor_set_changed();
        Ok(())
    }

    pub fn move_anchor_up(&mut self) -> Result<()> {
        self.cache.get_mut().spec.anchors.move_up()?;
        self.anchor_set_changed();
        Ok(())
    }

    pub fn move_anchor_down(&mut self) -> Result<()> {
        self.cache.get_mut().spec.anchors.move_down()?;
        self.anchor_set_changed();
        Ok(())
    }

    pub fn duplicate_anchor(&mut self, index: usize) -> Result<usize> {
        let new_index = self.cache.get_mut().spec.anchors.duplicate(index)?;
        self.anchor_set_changed();
        Ok(new_index)
    }

    pub fn set_active_anchor(&mut self, index: usize) -> Result<()> {
        self.cache.get_mut().spec.anchors.set_active(index)
    }

    pub fn set_curve_kind(&mut self, curve_kind: CurveKind) {
        self.cache.get_mut().spec.set_curve_kind(curve_kind);
    }

    pub fn set_closed(&mut self, closed: bool) {
        let cache = self.cache.get_mut();
        cache.spec.set_closed(closed);
        cache.resolver.set_closed(closed);
    }

    // ========== 配置 ==========

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DomainPolicy) {
        self.policy = policy;
        self.factor.set(policy.apply(self.factor.get()));
    }

    pub fn channels(&self) -> &AttributeChannelSet {
        &self.channels
    }

    /// 替换通道配置（先校验）
    pub fn set_channels(&mut self, channels: AttributeChannelSet) -> Result<()> {
        channels.validate()?;
        self.channels = channels;
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.channels.enabled = enabled;
    }

    pub fn target(&self) -> &DrivenTarget {
        &self.target
    }

    pub fn set_target(&mut self, target: DrivenTarget) {
        self.target = target;
    }

    // ========== 查询 ==========

    pub fn state(&self) -> ControllerState {
        self.state.get()
    }

    pub fn factor(&self) -> f32 {
        self.factor.get()
    }

    pub fn offset_state(&self) -> OffsetState {
        OffsetState {
            factor: self.factor.get(),
            policy: self.policy,
            suppress_feedback: self.suppress_feedback.get(),
        }
    }

    pub fn is_feedback_suppressed(&self) -> bool {
        self.suppress_feedback.get()
    }

    pub fn path_spec(&self) -> Ref<'_, PathSpec> {
        Ref::map(self.cache.borrow(), |cache| &cache.spec)
    }

    /// 最近一次重建的路径
    pub fn compiled_path(&self) -> Option<Ref<'_, CompiledPath>> {
        Ref::filter_map(self.cache.borrow(), |cache| cache.builder.compiled()).ok()
    }

    /// 最近一次重建的比例表（下标对应有效锚点）
    pub fn fractions(&self) -> Vec<f32> {
        self.cache.borrow().fractions.clone()
    }
}
