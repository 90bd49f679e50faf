//! 关键帧缓动曲线

use serde::{Deserialize, Serialize};

/// 缓动曲线：端点固定为 (0,0) / (1,1) 的三次贝塞尔，两个控制点可调
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl BezierCurve {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// 线性
    pub fn linear() -> Self {
        Self::new(0.25, 0.25, 0.75, 0.75)
    }

    /// 缓入缓出
    pub fn ease_in_out() -> Self {
        Self::new(0.42, 0.0, 0.58, 1.0)
    }

    pub fn is_linear(&self) -> bool {
        (self.x1 - self.y1).abs() < f32::EPSILON && (self.x2 - self.y2).abs() < f32::EPSILON
    }

    /// 求 x = t 处的 y
    pub fn evaluate(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        if self.is_linear() {
            return t;
        }

        self.sample_y(self.solve_s(t))
    }

    /// 牛顿迭代求参数 s，导数过小时退回二分
    fn solve_s(&self, t: f32) -> f32 {
        let mut s = t;
        for _ in 0..15 {
            let dx = self.sample_dx(s);
            if dx.abs() < 1e-6 {
                break;
            }
            let next = (s - (self.sample_x(s) - t) / dx).clamp(0.0, 1.0);
            if (next - s).abs() < 1e-6 {
                return next;
            }
            s = next;
        }

        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        for _ in 0..32 {
            let mid = 0.5 * (lo + hi);
            if self.sample_x(mid) < t {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    fn sample_x(&self, s: f32) -> f32 {
        cubic(self.x1, self.x2, s)
    }

    fn sample_y(&self, s: f32) -> f32 {
        cubic(self.y1, self.y2, s)
    }

    fn sample_dx(&self, s: f32) -> f32 {
        let r = 1.0 - s;
        3.0 * r * r * self.x1 + 6.0 * r * s * (self.x2 - self.x1) + 3.0 * s * s * (1.0 - self.x2)
    }
}

#[inline]
fn cubic(p1: f32, p2: f32, s: f32) -> f32 {
    let r = 1.0 - s;
    3.0 * r * r * s * p1 + 3.0 * r * s * s * p2 + s * s * s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let curve = BezierCurve::linear();
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(0.3), 0.3);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_is_symmetric_and_monotonic() {
        let curve = BezierCurve::ease_in_out();
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-3);
        assert!(curve.evaluate(0.1) < 0.1);
        assert!(curve.evaluate(0.9) > 0.9);

        let mut prev = 0.0;
        for i in 1..=20 {
            let y = curve.evaluate(i as f32 / 20.0);
            assert!(y >= prev - 1e-5);
            prev = y;
        }
    }

    #[test]
    fn test_control_points() {
        let curve = BezierCurve::new(1.5, 0.2, -0.3, 0.8);
        assert_eq!((curve.x1, curve.x2), (1.0, 0.0));

        assert!(BezierCurve::new(0.1, 0.1, 0.9, 0.9).is_linear());

        let steep = BezierCurve::new(1.0, 0.0, 1.0, 0.0);
        assert!(!steep.is_linear());
        assert!(steep.evaluate(0.5) < 0.1);
    }
}
