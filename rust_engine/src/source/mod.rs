//! 相机源 - 外部场景对象的只读快照
//!
//! 引擎从不持有或修改相机源，只通过 `SourceId` 引用，
//! 每次需要时经 `SourceResolver` 取当前世界变换和内参。

mod property;
mod snapshot;

pub use property::{AttributeValue, PropertyBlock, PropertyNode};
pub use snapshot::{CameraIntrinsics, SceneSources, SourceId, SourceResolver, SourceSnapshot};
