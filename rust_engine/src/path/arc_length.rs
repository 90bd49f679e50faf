//! 弧长采样
//!
//! 沿采样折线累计欧氏长度，得到每个锚点的弧长比例表。
//! 锚点就是样条的原始控制点，在折线中的位置由构造保证（每 `resolution` 个采样一个），
//! 不需要最近点搜索。

use glam::Vec3;

use super::CompiledPath;
use crate::config;

/// 折线每个点处的累计长度，首项为 0
pub fn cumulative_lengths(points: &[Vec3]) -> Vec<f32> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;

    if let Some(first) = points.first() {
        cumulative.push(0.0);
        let mut prev = *first;
        for point in &points[1..] {
            total += prev.distance(*point);
            cumulative.push(total);
            prev = *point;
        }
    }

    cumulative
}

/// 折线总长
pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// 计算锚点弧长比例表
///
/// 单调不减，首项为 0。开放路径末项为 1；闭合路径末项小于 1，
/// 最后一段从末锚点绕回首锚点（隐含终点 1.0）。
/// 路径退化为零长度时按锚点序号均分。
pub fn sample(compiled: &CompiledPath, anchor_count: usize) -> Vec<f32> {
    let count = anchor_count.min(compiled.anchor_count());
    if count == 0 {
        return Vec::new();
    }

    let closed = compiled.is_closed();
    let cumulative = compiled.cumulative_lengths();
    let total = compiled.length();

    if !total.is_finite() || total <= config::get_config().zero_length_epsilon {
        log::warn!("路径长度无效 ({}), 锚点比例按序号均分", total);
        let divisor = if closed { count } else { count.saturating_sub(1).max(1) };
        return (0..count).map(|i| i as f32 / divisor as f32).collect();
    }

    let mut fractions = Vec::with_capacity(count);
    let mut previous = 0.0f32;
    for anchor in 0..count {
        let sample_index = compiled
            .anchor_sample_index(anchor)
            .min(cumulative.len() - 1);
        // NaN 比较恒为 false，max/min 会落回 previous
        let fraction = (cumulative[sample_index] / total).max(previous).min(1.0);
        fractions.push(fraction);
        previous = fraction;
    }

    // 浮点误差不能破坏端点
    fractions[0] = 0.0;
    if !closed && count == compiled.anchor_count() {
        fractions[count - 1] = 1.0;
    }

    fractions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{BezierKnot, CurveKind, PathBuilder, PathSpec};
    use crate::source::{SceneSources, SourceId, SourceSnapshot};
    use glam::Quat;
    use proptest::prelude::*;

    fn compile(points: &[Vec3], kind: CurveKind, closed: bool) -> CompiledPath {
        let mut scene = SceneSources::new();
        let ids: Vec<SourceId> = points
            .iter()
            .map(|p| scene.insert(SourceSnapshot::object(*p, Quat::IDENTITY)))
            .collect();
        let spec = PathSpec::from_sources(&ids, kind, closed);
        PathBuilder::new(12).build(&spec, &scene).unwrap()
    }

    fn assert_fractions(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-4, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_cumulative_lengths() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 2.0, 0.0)];
        assert_eq!(cumulative_lengths(&points), vec![0.0, 1.0, 3.0]);
        assert_eq!(polyline_length(&points), 3.0);
        assert!(cumulative_lengths(&[]).is_empty());
    }

    #[test]
    fn test_uneven_segments() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::new(4.0, 0.0, 0.0)];
        for kind in [CurveKind::Linear, CurveKind::Smooth] {
            let compiled = compile(&points, kind, false);
            assert_fractions(&sample(&compiled, 3), &[0.0, 0.25, 1.0]);
        }
    }

    #[test]
    fn test_closed_square() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        let compiled = compile(&points, CurveKind::Linear, true);
        assert_fractions(&sample(&compiled, 4), &[0.0, 0.25, 0.5, 0.75]);

        // 平滑闭合：首尾点无手柄，回绕段是直线，首尾两段关于 y=0.5 对称
        let compiled = compile(&points, CurveKind::Smooth, true);
        assert_eq!(compiled.knots()[0], BezierKnot::collapsed(points[0]));
        assert_eq!(compiled.knots()[3], BezierKnot::collapsed(points[3]));
        let fractions = sample(&compiled, 4);
        let total = compiled.length();
        assert!(((1.0 - fractions[3]) * total - 1.0).abs() < 1e-4);
        assert!((fractions[1] - (fractions[3] - fractions[2])).abs() < 1e-4);
        assert!(total > 4.0);
    }

    #[test]
    fn test_coincident_anchors_do_not_advance() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::X, Vec3::new(3.0, 0.0, 0.0)];
        for kind in [CurveKind::Linear, CurveKind::Smooth] {
            let fractions = sample(&compile(&points, kind, false), 4);
            assert!((fractions[1] - fractions[2]).abs() < 1e-6);
            assert_eq!(fractions[3], 1.0);
        }
    }

    #[test]
    fn test_overflowing_length_spreads_evenly() {
        let points = [
            Vec3::ZERO,
            Vec3::new(3e38, 0.0, 0.0),
            Vec3::new(-3e38, 0.0, 0.0),
            Vec3::new(3e38, 0.0, 0.0),
        ];
        let compiled = compile(&points, CurveKind::Linear, false);
        assert!(!compiled.length().is_finite());
        assert_fractions(&sample(&compiled, 4), &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_degenerate_path_spreads_evenly() {
        let points = [Vec3::ONE, Vec3::ONE, Vec3::ONE];
        let fractions = sample(&compile(&points, CurveKind::Linear, false), 3);
        assert_eq!(fractions, vec![0.0, 0.5, 1.0]);
    }

    proptest! {
        #[test]
        fn fractions_are_monotonic(
            coords in prop::collection::vec((-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0), 2..12),
            smooth in any::<bool>(),
            closed in any::<bool>(),
        ) {
            let points: Vec<Vec3> = coords.iter().map(|(x, y, z)| Vec3::new(*x, *y, *z)).collect();
            let kind = if smooth { CurveKind::Smooth } else { CurveKind::Linear };
            let compiled = compile(&points, kind, closed);
            let fractions = sample(&compiled, points.len());

            prop_assert_eq!(fractions.len(), points.len());
            prop_assert_eq!(fractions[0], 0.0);
            if !closed {
                prop_assert_eq!(fractions[points.len() - 1], 1.0);
            }
            for pair in fractions.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            for fraction in &fractions {
                prop_assert!((0.0..=1.0).contains(fraction));
            }
        }
    }
}
