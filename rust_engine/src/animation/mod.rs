//! 偏移动画与烘焙
//!
//! 偏移量可以按帧打关键帧（贝塞尔缓动），
//! 烘焙时逐帧求值并混合出受控相机的属性序列。

mod bake;
mod bezier;
mod keyframe;
mod offset_track;

pub use bake::{bake, BakeOptions, BakedTrack};
pub use bezier::BezierCurve;
pub use keyframe::{BakedKeyframe, OffsetKeyframe};
pub use offset_track::OffsetTrack;
