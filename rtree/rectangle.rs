use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::point::Point;

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// 空矩形用 `min = +∞, max = -∞` 表示，与任何点或矩形求并集都会得到真实范围
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[display(fmt = "[{}, {}, {}, {}]", min_x, min_y, max_x, max_y)]
pub struct Rectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::empty()
    }
}

impl Rectangle {
    /// 创建新的矩形
    ///
    /// 不检查边界顺序：`min > max` 的矩形不包含任何点，查询时返回空结果
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rectangle {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// 空矩形
    pub fn empty() -> Self {
        Rectangle {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// 创建一个点矩形
    pub fn from_point(point: &Point) -> Self {
        Rectangle {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    /// 判断矩形是否为空（不包含任何点）
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// 计算矩形面积
    ///
    /// 直接按 宽 × 高 计算，不做截断；退化矩形（线段或点）面积为0
    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// 计算两个矩形的并集MBR
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// 扩展矩形使其包含给定的点
    pub fn expanded_to(&self, point: &Point) -> Rectangle {
        Rectangle {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }

    /// 计算扩大到包含给定点所需的面积增量
    pub fn enlargement(&self, point: &Point) -> f64 {
        self.expanded_to(point).area() - self.area()
    }

    /// 判断两个矩形是否相交（边界接触也算相交）
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// 判断当前矩形是否包含一个点（四条边都是闭区间）
    pub fn contains_point(&self, point: &Point) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    /// 计算矩形中心点的x坐标
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }
}
