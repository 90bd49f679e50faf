//! 混合通道配置

use serde::{Deserialize, Serialize};

use crate::source::{SourceId, SourceResolver};
use crate::{MotionError, Result};

/// 用户声明的自定义通道（属性块上的点分路径）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomChannel {
    pub path: String,
}

impl CustomChannel {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// 参与混合的通道集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChannelSet {
    /// 总开关，关闭时偏移变化不再驱动任何属性
    pub enabled: bool,
    /// 旋转
    pub rotation: bool,
    /// 焦距
    pub focal_length: bool,
    /// 光圈
    pub f_stop: bool,
    /// 对焦距离
    pub focus_distance: bool,
    /// 自定义通道（按声明顺序）
    pub custom: Vec<CustomChannel>,
}

impl Default for AttributeChannelSet {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation: true,
            focal_length: true,
            f_stop: true,
            focus_distance: true,
            custom: Vec::new(),
        }
    }
}

impl AttributeChannelSet {
    /// 只启用旋转
    pub fn rotation_only() -> Self {
        Self {
            focal_length: false,
            f_stop: false,
            focus_distance: false,
            ..Self::default()
        }
    }

    /// 添加自定义通道，返回其下标
    pub fn add_custom(&mut self, path: impl Into<String>) -> Result<usize> {
        let channel = CustomChannel::new(path);
        Self::check_path(&channel.path)?;
        self.custom.push(channel);
        Ok(self.custom.len() - 1)
    }

    pub fn remove_custom(&mut self, index: usize) -> Result<CustomChannel> {
        if index < self.custom.len() {
            Ok(self.custom.remove(index))
        } else {
            Err(MotionError::IndexOutOfRange {
                index,
                len: self.custom.len(),
            })
        }
    }

    /// 是否有需要相机内参目标的通道
    pub fn uses_intrinsics(&self) -> bool {
        self.focal_length || self.f_stop || self.focus_distance || !self.custom.is_empty()
    }

    /// 配置阶段校验，保证混合时不会遇到空路径
    pub fn validate(&self) -> Result<()> {
        self.custom
            .iter()
            .try_for_each(|channel| Self::check_path(&channel.path))
    }

    fn check_path(path: &str) -> Result<()> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(MotionError::ChannelResolution {
                path: path.to_string(),
                reason: "malformed data path".to_string(),
            });
        }
        Ok(())
    }
}

/// 内参写入目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntrinsicsTarget {
    /// 受控对象本身就是相机
    Driven,
    /// 写入子相机
    SubCamera(SourceId),
}

/// 受控对象的配置：内参写到哪里
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivenTarget {
    /// 受控对象本身是否为相机
    pub driven_is_camera: bool,
    /// 是否把内参写到子相机
    pub use_sub_camera: bool,
    pub sub_camera: Option<SourceId>,
}

impl Default for DrivenTarget {
    fn default() -> Self {
        Self {
            driven_is_camera: true,
            use_sub_camera: false,
            sub_camera: None,
        }
    }
}

impl DrivenTarget {
    /// 受控对象是空物体控制器，内参写到子相机
    pub fn controller_with_sub_camera(sub_camera: SourceId) -> Self {
        Self {
            driven_is_camera: false,
            use_sub_camera: true,
            sub_camera: Some(sub_camera),
        }
    }

    /// 决定内参写入目标：优先可用的子相机，其次受控对象本身，都不是相机则不写内参
    pub fn intrinsics_target(&self, sources: &dyn SourceResolver) -> Option<IntrinsicsTarget> {
        if self.use_sub_camera {
            if let Some(sub) = self.sub_camera {
                let is_camera = sources
                    .resolve(sub)
                    .map(|snapshot| snapshot.is_camera())
                    .unwrap_or(false);
                if is_camera {
                    return Some(IntrinsicsTarget::SubCamera(sub));
                }
                log::debug!("子相机 {} 不可用", sub);
            }
        }

        if self.driven_is_camera {
            Some(IntrinsicsTarget::Driven)
        } else {
            None
        }
    }
}
