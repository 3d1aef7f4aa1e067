use derive_more::Display;
use serde::{Deserialize, Serialize};

/// 平面上的点 - R-tree 中存储的数据条目
///
/// 值类型，没有坐标之外的身份；插入后归属于唯一的叶子节点
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建新的点
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// 两个坐标是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}
