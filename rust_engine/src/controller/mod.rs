//! 偏移控制器
//!
//! 持有偏移量和路径缓存，把一次偏移变化串成
//! 归一化 → 区段查找 → 属性混合 → 写回 的完整流程。

mod command;
mod offset;

pub use command::{CommandOutcome, MotionCommand};
pub use offset::{
    ControllerState, MotionCamSettings, OffsetController, OffsetState, UpdateStatus, WriteSink,
};
