//! Motion Camera 引擎 - 多机位路径插值核心
//!
//! 让一个受控相机沿着穿过多个相机源的路径连续运动：
//! - 相机源锚点列表与路径构建（平滑贝塞尔 / 折线）
//! - 弧长参数化（偏移量均匀映射到真实曲线长度）
//! - 区段查找（夹取 / 循环）
//! - 旋转、焦距、光圈、对焦距离及自定义属性的混合
//! - 偏移控制器（防重入、拖拽抑制）
//! - 偏移动画曲线与烘焙

pub mod animation;
pub mod blend;
pub mod config;
pub mod controller;
pub mod path;
pub mod source;

pub use animation::{bake, BakeOptions, BakedKeyframe, BakedTrack, BezierCurve, OffsetKeyframe, OffsetTrack};
pub use blend::{
    blend, AnchorAttributes, AttributeChannelSet, BlendedAttributes, CustomChannel, DrivenTarget,
    IntrinsicsTarget,
};
pub use controller::{
    CommandOutcome, ControllerState, MotionCamSettings, MotionCommand, OffsetController, OffsetState,
    UpdateStatus, WriteSink,
};
pub use path::{
    Anchor, AnchorStore, CompiledPath, CurveKind, DomainPolicy, PathBuilder, PathSpec,
    ResolvedAnchor, SegmentHit, SegmentResolver,
};
pub use source::{
    AttributeValue, CameraIntrinsics, PropertyBlock, SceneSources, SourceId, SourceResolver,
    SourceSnapshot,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotionError {
    #[error("insufficient anchors: {valid} valid, at least 2 required")]
    InsufficientAnchors { valid: usize },

    #[error("stale source reference: {0}")]
    StaleSourceReference(SourceId),

    #[error("no bounding segment for offset {0}")]
    NoBoundingSegment(f32),

    #[error("channel '{path}' skipped: {reason}")]
    ChannelResolution { path: String, reason: String },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("write sink failed: {0}")]
    WriteFailed(String),

    #[error("offset track has no keyframes")]
    EmptyOffsetTrack,

    #[error("invalid frame range {start}..={end} (step {step})")]
    InvalidFrameRange { start: u32, end: u32, step: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MotionError>;
