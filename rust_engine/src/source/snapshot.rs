//! 相机源快照与解析器

use std::collections::HashMap;
use std::fmt;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::PropertyBlock;

/// 外部对象 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// 相机内参
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// 焦距（毫米）
    pub lens: f32,
    /// 光圈 F 值
    pub f_stop: f32,
    /// 对焦距离（未设置对焦物体时使用）
    pub focus_distance: f32,
    /// 对焦物体，设置后对焦距离取相机到该物体的距离
    pub focus_object: Option<SourceId>,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            lens: 50.0,
            f_stop: 2.8,
            focus_distance: 10.0,
            focus_object: None,
        }
    }
}

impl CameraIntrinsics {
    pub fn new(lens: f32, f_stop: f32, focus_distance: f32) -> Self {
        Self {
            lens,
            f_stop,
            focus_distance,
            focus_object: None,
        }
    }

    pub fn with_focus_object(mut self, target: SourceId) -> Self {
        self.focus_object = Some(target);
        self
    }
}

/// 相机源在某一时刻的世界状态
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    /// 非相机对象为 None
    pub camera: Option<CameraIntrinsics>,
    /// 供自定义通道寻址的属性块
    pub properties: PropertyBlock,
}

impl SourceSnapshot {
    /// 相机类源
    pub fn camera(position: Vec3, orientation: Quat, intrinsics: CameraIntrinsics) -> Self {
        Self {
            position,
            orientation,
            camera: Some(intrinsics),
            properties: PropertyBlock::new(),
        }
    }

    /// 非相机对象（空物体、灯光等）
    pub fn object(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            camera: None,
            properties: PropertyBlock::new(),
        }
    }

    /// 从世界矩阵拆出位置和朝向（忽略缩放）
    pub fn from_matrix(world: Mat4, camera: Option<CameraIntrinsics>) -> Self {
        let (_scale, orientation, position) = world.to_scale_rotation_translation();
        Self {
            position,
            orientation: orientation.normalize(),
            camera,
            properties: PropertyBlock::new(),
        }
    }

    pub fn with_properties(mut self, properties: PropertyBlock) -> Self {
        self.properties = properties;
        self
    }

    pub fn is_camera(&self) -> bool {
        self.camera.is_some()
    }
}

/// 相机源解析器（由宿主场景实现）
///
/// 引用失效（对象被删除）时返回 None，引擎会把对应锚点当作不存在处理。
pub trait SourceResolver {
    fn resolve(&self, id: SourceId) -> Option<SourceSnapshot>;

    /// 只取世界坐标
    fn position(&self, id: SourceId) -> Option<Vec3> {
        self.resolve(id).map(|snapshot| snapshot.position)
    }
}

/// 内存中的场景源表
#[derive(Debug, Clone, Default)]
pub struct SceneSources {
    sources: HashMap<SourceId, SourceSnapshot>,
    next_id: u64,
}

impl SceneSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加源并返回新 ID
    pub fn insert(&mut self, snapshot: SourceSnapshot) -> SourceId {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.sources.insert(id, snapshot);
        id
    }

    /// 替换已有源，ID 不存在时返回 false
    pub fn update(&mut self, id: SourceId, snapshot: SourceSnapshot) -> bool {
        match self.sources.get_mut(&id) {
            Some(slot) => {
                *slot = snapshot;
                true
            }
            None => false,
        }
    }

    /// 移动源
    pub fn set_position(&mut self, id: SourceId, position: Vec3) -> bool {
        match self.sources.get_mut(&id) {
            Some(snapshot) => {
                snapshot.position = position;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceSnapshot> {
        self.sources.get(&id)
    }

    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut SourceSnapshot> {
        self.sources.get_mut(&id)
    }

    pub fn remove(&mut self, id: SourceId) -> Option<SourceSnapshot> {
        self.sources.remove(&id)
    }

    /// 撤销删除时按原 ID 放回
    pub fn restore(&mut self, id: SourceId, snapshot: SourceSnapshot) {
        self.next_id = self.next_id.max(id.0);
        self.sources.insert(id, snapshot);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceResolver for SceneSources {
    fn resolve(&self, id: SourceId) -> Option<SourceSnapshot> {
        self.sources.get(&id).cloned()
    }

    fn position(&self, id: SourceId) -> Option<Vec3> {
        self.sources.get(&id).map(|snapshot| snapshot.position)
    }
}
