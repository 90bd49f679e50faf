//! 混合输入与输出

use glam::{EulerRot, Quat, Vec3};

use super::IntrinsicsTarget;
use crate::source::{AttributeValue, CameraIntrinsics, PropertyBlock, SourceId, SourceResolver, SourceSnapshot};
use crate::{MotionError, Result};

/// 单个锚点在本次更新时的属性
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorAttributes {
    pub source: SourceId,
    pub position: Vec3,
    pub orientation: Quat,
    /// 非相机源为 None
    pub camera: Option<CameraIntrinsics>,
    /// 对焦物体在本次更新时的世界坐标
    pub focus_point: Option<Vec3>,
    pub properties: PropertyBlock,
}

impl AnchorAttributes {
    /// 直接由快照构造（不解析对焦物体）
    pub fn from_snapshot(source: SourceId, snapshot: SourceSnapshot) -> Self {
        Self {
            source,
            position: snapshot.position,
            orientation: snapshot.orientation,
            camera: snapshot.camera,
            focus_point: None,
            properties: snapshot.properties,
        }
    }

    /// 从场景抓取当前属性
    ///
    /// 对焦物体每次都重新解析，不做缓存（它可能独立移动）。
    /// 对焦物体失效时退回相机自身的对焦距离。
    pub fn capture(source: SourceId, sources: &dyn SourceResolver) -> Result<Self> {
        let snapshot = sources
            .resolve(source)
            .ok_or(MotionError::StaleSourceReference(source))?;

        let focus_object = snapshot.camera.as_ref().and_then(|c| c.focus_object);
        let mut attributes = Self::from_snapshot(source, snapshot);

        if let Some(target) = focus_object {
            attributes.focus_point = sources.position(target);
            if attributes.focus_point.is_none() {
                log::warn!("{} 的对焦物体 {} 已失效，使用对焦距离", source, target);
            }
        }

        Ok(attributes)
    }

    pub fn is_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// 有效对焦距离：有对焦物体时取到物体的距离，否则取数值
    pub fn focus_distance(&self) -> Option<f32> {
        self.camera.as_ref().map(|camera| match self.focus_point {
            Some(point) => point.distance(self.position),
            None => camera.focus_distance,
        })
    }
}

/// 混合结果（扁平属性集，由调用方写回受控相机）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendedAttributes {
    pub rotation: Option<Quat>,
    pub focal_length: Option<f32>,
    pub f_stop: Option<f32>,
    pub focus_distance: Option<f32>,
    /// 自定义通道（路径, 值），按声明顺序
    pub custom: Vec<(String, AttributeValue)>,
    /// 本次跳过的自定义通道路径
    pub skipped: Vec<String>,
    /// 内参写入目标，None 表示本次不写内参
    pub intrinsics_target: Option<IntrinsicsTarget>,
}

impl BlendedAttributes {
    /// 按指定顺序转成欧拉角
    pub fn rotation_euler(&self, order: EulerRot) -> Option<Vec3> {
        self.rotation.map(|q| {
            let (a, b, c) = q.to_euler(order);
            Vec3::new(a, b, c)
        })
    }

    pub fn custom_value(&self, path: &str) -> Option<&AttributeValue> {
        self.custom
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, value)| value)
    }

    /// 去掉所有需要写入相机内参的通道
    pub fn strip_intrinsics(&mut self) {
        self.focal_length = None;
        self.f_stop = None;
        self.focus_distance = None;
        self.custom.clear();
        self.intrinsics_target = None;
    }

    pub fn is_empty(&self) -> bool {
        self.rotation.is_none()
            && self.focal_length.is_none()
            && self.f_stop.is_none()
            && self.focus_distance.is_none()
            && self.custom.is_empty()
    }
}
