use super::super::node::{NodeEntries, NodeId};
use super::super::point::Point;
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;

/// 搜索操作相关算法
impl RTree {
    /// 搜索落在查询矩形内的所有点（四条边都包含在内）
    ///
    /// 查询矩形可以是退化的（宽或高为0）。结果顺序为子节点顺序和叶子内的存储顺序
    pub fn search(&self, query: &Rectangle) -> Vec<Point> {
        let mut results = Vec::new();
        self.search_recursive(self.root, query, &mut results);
        results
    }

    /// 按边界坐标搜索
    pub fn search_range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Point> {
        self.search(&Rectangle::new(min_x, min_y, max_x, max_y))
    }

    /// 递归搜索 - MBR与查询矩形不相交的子树被剪枝
    fn search_recursive(&self, id: NodeId, query: &Rectangle, results: &mut Vec<Point>) {
        let node = &self.nodes[id];
        if !node.mbr.overlaps(query) {
            return;
        }

        match &node.entries {
            NodeEntries::Points(points) => {
                results.extend(points.iter().filter(|point| query.contains_point(point)));
            }
            NodeEntries::Children(children) => {
                for child in children {
                    self.search_recursive(*child, query, results);
                }
            }
        }
    }
}
