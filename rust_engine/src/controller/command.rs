//! 显式命令对象
//!
//! 宿主的 UI 操作统一转成命令，由控制器依次执行，
//! 便于记录、回放和撤销栈对接。

use serde::{Deserialize, Serialize};

use super::{OffsetController, UpdateStatus, WriteSink};
use crate::path::{Anchor, CurveKind, DomainPolicy};
use crate::source::{SourceId, SourceResolver};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionCommand {
    SetOffset(f32),
    AddAnchor(SourceId),
    RemoveAnchor(usize),
    MoveAnchor { from: usize, to: usize },
    /// 当前选中锚点上移一位
    MoveActiveUp,
    /// 当前选中锚点下移一位
    MoveActiveDown,
    DuplicateAnchor(usize),
    SetCurveKind(CurveKind),
    SetClosed(bool),
    SetDomainPolicy(DomainPolicy),
    SetEnabled(bool),
}

#[derive(Debug)]
pub enum CommandOutcome {
    Offset(UpdateStatus),
    /// 新锚点下标（添加或复制）
    AnchorInserted(usize),
    AnchorRemoved(Anchor),
    Updated,
}

impl OffsetController {
    /// 执行一条命令
    ///
    /// 结构性命令只标脏，路径在下一次偏移更新时重建。
    pub fn apply(
        &mut self,
        command: MotionCommand,
        sources: &dyn SourceResolver,
        sink: &mut dyn WriteSink,
    ) -> Result<CommandOutcome> {
        log::trace!("apply {:?}", command);

        let outcome = match command {
            MotionCommand::SetOffset(value) => {
                CommandOutcome::Offset(self.set_offset(value, sources, sink))
            }
            MotionCommand::AddAnchor(source) => CommandOutcome::AnchorInserted(self.add_anchor(source)),
            MotionCommand::RemoveAnchor(index) => CommandOutcome::AnchorRemoved(self.remove_anchor(index)?),
            MotionCommand::MoveAnchor { from, to } => {
                self.move_anchor(from, to)?;
                CommandOutcome::Updated
            }
            MotionCommand::MoveActiveUp => {
                self.move_anchor_up()?;
                CommandOutcome::Updated
            }
            MotionCommand::MoveActiveDown => {
                self.move_anchor_down()?;
                CommandOutcome::Updated
            }
            MotionCommand::DuplicateAnchor(index) => {
                CommandOutcome::AnchorInserted(self.duplicate_anchor(index)?)
            }
            MotionCommand::SetCurveKind(kind) => {
                self.set_curve_kind(kind);
                CommandOutcome::Updated
            }
            MotionCommand::SetClosed(closed) => {
                self.set_closed(closed);
                CommandOutcome::Updated
            }
            MotionCommand::SetDomainPolicy(policy) => {
                self.set_policy(policy);
                CommandOutcome::Updated
            }
            MotionCommand::SetEnabled(enabled) => {
                self.set_enabled(enabled);
                CommandOutcome::Updated
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerState;
    use crate::source::{CameraIntrinsics, SceneSources, SourceSnapshot};
    use crate::{BlendedAttributes, MotionError};
    use glam::{Quat, Vec3};

    #[test]
    fn test_command_sequence() {
        let mut scene = SceneSources::new();
        let ids: Vec<SourceId> = [10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, lens)| {
                scene.insert(SourceSnapshot::camera(
                    Vec3::new(i as f32, 0.0, 0.0),
                    Quat::IDENTITY,
                    CameraIntrinsics::new(*lens, 2.8, 10.0),
                ))
            })
            .collect();

        let mut controller = OffsetController::default();
        let mut writes: Vec<BlendedAttributes> = Vec::new();
        assert_eq!(controller.state(), ControllerState::Idle);

        for id in &ids {
            let outcome = controller
                .apply(MotionCommand::AddAnchor(*id), &scene, &mut writes)
                .unwrap();
            assert!(matches!(outcome, CommandOutcome::AnchorInserted(_)));
        }
        assert_eq!(controller.state(), ControllerState::Ready);
        assert_eq!(controller.path_spec().anchors.active(), Some(2));

        controller
            .apply(MotionCommand::SetCurveKind(CurveKind::Linear), &scene, &mut writes)
            .unwrap();
        controller
            .apply(MotionCommand::MoveActiveUp, &scene, &mut writes)
            .unwrap();
        let order: Vec<SourceId> = controller.path_spec().anchors.iter().map(|a| a.source).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[1]]);

        let outcome = controller
            .apply(MotionCommand::SetOffset(0.0), &scene, &mut writes)
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Offset(status) if status.is_applied()));
        assert_eq!(writes[0].focal_length, Some(10.0));

        match controller
            .apply(MotionCommand::RemoveAnchor(0), &scene, &mut writes)
            .unwrap()
        {
            CommandOutcome::AnchorRemoved(anchor) => assert_eq!(anchor.source, ids[0]),
            other => panic!("unexpected {:?}", other),
        }

        let err = controller
            .apply(MotionCommand::MoveAnchor { from: 7, to: 0 }, &scene, &mut writes)
            .unwrap_err();
        assert!(matches!(err, MotionError::IndexOutOfRange { index: 7, .. }));
    }

    #[test]
    fn test_disable_via_command() {
        let scene = SceneSources::new();
        let mut controller = OffsetController::default();
        let mut writes: Vec<BlendedAttributes> = Vec::new();

        controller
            .apply(MotionCommand::SetEnabled(false), &scene, &mut writes)
            .unwrap();
        let outcome = controller
            .apply(MotionCommand::SetOffset(0.3), &scene, &mut writes)
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Offset(UpdateStatus::Disabled)));
        assert_eq!(controller.factor(), 0.3);
    }
}
