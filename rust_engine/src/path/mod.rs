//! 路径系统
//!
//! 锚点列表 → 样条构建 → 弧长采样 → 区段查找。
//! 路径只在查询时按需重建（脏标记），批量编辑锚点不会反复重建。

mod anchor;
pub mod arc_length;
mod bezier;
mod builder;
mod segment;

pub use anchor::{Anchor, AnchorStore, PathSpec};
pub use bezier::{auto_handles, cubic_point, BezierKnot};
pub use builder::{CompiledPath, CurveKind, PathBuilder, ResolvedAnchor};
pub use segment::{DomainPolicy, SegmentHit, SegmentResolver};
