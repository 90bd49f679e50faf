//! 锚点列表
//!
//! 所有修改操作只打脏标记，不同步重建路径。

use serde::{Deserialize, Serialize};

use super::CurveKind;
use crate::config;
use crate::source::SourceId;
use crate::{MotionError, Result};

/// 单个相机源锚点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// 相机源引用
    pub source: SourceId,
    /// 显示名
    pub name: String,
    /// 弧长比例缓存，派生数据，不持久化
    #[serde(skip)]
    arc_fraction: f32,
}

impl Anchor {
    pub fn new(source: SourceId, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
            arc_fraction: 0.0,
        }
    }

    /// 最近一次重建得到的弧长比例
    pub fn arc_fraction(&self) -> f32 {
        self.arc_fraction
    }
}

/// 有序锚点列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorStore {
    anchors: Vec<Anchor>,
    /// 当前选中项
    active: usize,
    #[serde(skip)]
    dirty: bool,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加锚点，新锚点成为选中项
    pub fn add(&mut self, source: SourceId) -> usize {
        let name = format!("Motion{}", self.anchors.len() + 1);
        self.anchors.push(Anchor::new(source, name));
        self.active = self.anchors.len() - 1;
        self.dirty = true;
        self.active
    }

    /// 删除锚点，选中项若是被删的那个则退到前一个
    pub fn remove(&mut self, index: usize) -> Result<Anchor> {
        self.check_index(index)?;
        let removed = self.anchors.remove(index);

        if self.active == index {
            self.active = index.saturating_sub(1);
        } else if self.active > index {
            self.active -= 1;
        }
        self.active = self.active.min(self.anchors.len().saturating_sub(1));
        self.dirty = true;
        Ok(removed)
    }

    /// 调整顺序，选中项跟随被移动的锚点
    pub fn move_anchor(&mut self, index: usize, new_index: usize) -> Result<()> {
        self.check_index(index)?;
        self.check_index(new_index)?;
        if index == new_index {
            return Ok(());
        }

        let anchor = self.anchors.remove(index);
        self.anchors.insert(new_index, anchor);

        if self.active == index {
            self.active = new_index;
        } else if index < self.active && self.active <= new_index {
            self.active -= 1;
        } else if new_index <= self.active && self.active < index {
            self.active += 1;
        }
        self.dirty = true;
        Ok(())
    }

    /// 选中项上移一位
    pub fn move_up(&mut self) -> Result<()> {
        let index = self.active;
        self.move_anchor(index, index.saturating_sub(1))
    }

    /// 选中项下移一位
    pub fn move_down(&mut self) -> Result<()> {
        let index = self.active;
        let last = self.anchors.len().saturating_sub(1);
        self.move_anchor(index, (index + 1).min(last))
    }

    /// 复制锚点（只复制锚点字段，不复制引用的相机源）并插在其后
    pub fn duplicate(&mut self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        let copy = self.anchors[index].clone();
        let new_index = index + 1;
        self.anchors.insert(new_index, copy);
        self.active = new_index;
        self.dirty = true;
        Ok(new_index)
    }

    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// 当前选中项
    pub fn active(&self) -> Option<usize> {
        if self.anchors.is_empty() {
            None
        } else {
            Some(self.active)
        }
    }

    pub fn set_active(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// 回写弧长比例
    ///
    /// `valid` 为参与建路径的锚点下标（升序），失效锚点沿用前一个有效锚点的比例。
    pub(crate) fn apply_fractions(&mut self, valid: &[usize], fractions: &[f32]) {
        let mut current = 0.0;
        let mut next = valid.iter().zip(fractions.iter()).peekable();

        for (index, anchor) in self.anchors.iter_mut().enumerate() {
            if let Some((_, fraction)) = next.next_if(|(valid_index, _)| **valid_index == index) {
                current = *fraction;
            }
            anchor.arc_fraction = current;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.anchors.len() {
            Ok(())
        } else {
            Err(MotionError::IndexOutOfRange {
                index,
                len: self.anchors.len(),
            })
        }
    }
}

/// 路径定义：锚点列表 + 曲线类型 + 是否闭合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub anchors: AnchorStore,
    curve_kind: CurveKind,
    closed: bool,
}

impl Default for PathSpec {
    fn default() -> Self {
        let config = config::get_config();
        Self::new(config.default_curve_kind, config.default_closed)
    }
}

impl PathSpec {
    pub fn new(curve_kind: CurveKind, closed: bool) -> Self {
        Self {
            anchors: AnchorStore::new(),
            curve_kind,
            closed,
        }
    }

    /// 由相机源列表直接构造
    pub fn from_sources(sources: &[SourceId], curve_kind: CurveKind, closed: bool) -> Self {
        let mut spec = Self::new(curve_kind, closed);
        for source in sources {
            spec.anchors.add(*source);
        }
        spec
    }

    pub fn curve_kind(&self) -> CurveKind {
        self.curve_kind
    }

    pub fn set_curve_kind(&mut self, curve_kind: CurveKind) {
        if self.curve_kind != curve_kind {
            self.curve_kind = curve_kind;
            self.anchors.mark_dirty();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.closed = closed;
            self.anchors.mark_dirty();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.anchors.is_dirty()
    }
}
