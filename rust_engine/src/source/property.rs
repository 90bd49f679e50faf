//! 属性块 - 按点分路径寻址的嵌套属性
//!
//! 自定义通道通过 `"dof.aperture_blades"` 这样的路径在两侧相机源的属性块上取值。

use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::SourceId;
use crate::{MotionError, Result};

/// 属性值（封闭的标签联合，混合规则按变体定义）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// 标量，线性插值
    Scalar(f32),
    /// 向量，逐分量线性插值
    Vector3(Vec3),
    /// 矩阵，逐分量线性插值
    Matrix4(Mat4),
    /// 朝向，球面插值
    Orientation(Quat),
    /// 布尔，阶跃
    Flag(bool),
    /// 对象引用，阶跃
    Reference(SourceId),
}

impl AttributeValue {
    /// 类型名（用于日志和错误信息）
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Scalar(_) => "scalar",
            AttributeValue::Vector3(_) => "vector3",
            AttributeValue::Matrix4(_) => "matrix4",
            AttributeValue::Orientation(_) => "orientation",
            AttributeValue::Flag(_) => "flag",
            AttributeValue::Reference(_) => "reference",
        }
    }

    /// 是否为离散类型（不可插值）
    pub fn is_discrete(&self) -> bool {
        matches!(self, AttributeValue::Flag(_) | AttributeValue::Reference(_))
    }
}

/// 属性树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyNode {
    Value(AttributeValue),
    Group(PropertyBlock),
}

/// 属性块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBlock {
    entries: BTreeMap<String, PropertyNode>,
}

impl PropertyBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造时链式写入
    pub fn with(mut self, path: &str, value: AttributeValue) -> Self {
        self.set(path, value);
        self
    }

    /// 写入值，沿途缺失的分组会被创建，同名的叶子值会被分组替换
    pub fn set(&mut self, path: &str, value: AttributeValue) -> bool {
        let mut segments = path.split('.').peekable();
        let mut block = self;

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return false;
            }

            if segments.peek().is_none() {
                block
                    .entries
                    .insert(segment.to_string(), PropertyNode::Value(value));
                return true;
            }

            let node = block
                .entries
                .entry(segment.to_string())
                .or_insert_with(|| PropertyNode::Group(PropertyBlock::new()));
            if let PropertyNode::Value(_) = node {
                *node = PropertyNode::Group(PropertyBlock::new());
            }
            block = match node {
                PropertyNode::Group(inner) => inner,
                PropertyNode::Value(_) => unreachable!("value node replaced by group above"),
            };
        }

        false
    }

    /// 按点分路径取值
    pub fn get(&self, path: &str) -> Option<&AttributeValue> {
        self.resolve(path).ok()
    }

    /// 按点分路径取值，失败时给出原因
    pub fn resolve(&self, path: &str) -> Result<&AttributeValue> {
        let fail = |reason: String| MotionError::ChannelResolution {
            path: path.to_string(),
            reason,
        };

        let mut block = self;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return Err(fail("empty path segment".to_string()));
            }

            match (block.entries.get(segment), segments.peek().is_none()) {
                (None, _) => return Err(fail(format!("'{}' not found", segment))),
                (Some(PropertyNode::Value(value)), true) => return Ok(value),
                (Some(PropertyNode::Value(_)), false) => {
                    return Err(fail(format!("'{}' is a value, not a group", segment)))
                }
                (Some(PropertyNode::Group(_)), true) => {
                    return Err(fail(format!("'{}' is a group, not a value", segment)))
                }
                (Some(PropertyNode::Group(inner)), false) => block = inner,
            }
        }

        Err(fail("empty path".to_string()))
    }

    /// 删除叶子值
    pub fn remove(&mut self, path: &str) -> Option<AttributeValue> {
        match path.split_once('.') {
            None => match self.entries.remove(path) {
                Some(PropertyNode::Value(value)) => Some(value),
                Some(group) => {
                    self.entries.insert(path.to_string(), group);
                    None
                }
                None => None,
            },
            Some((head, rest)) => match self.entries.get_mut(head) {
                Some(PropertyNode::Group(inner)) => inner.remove(rest),
                _ => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
