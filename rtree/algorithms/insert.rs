use tracing::trace;

use super::super::node::{NodeEntries, NodeId};
use super::super::point::Point;
use super::super::rtree::RTree;

/// 插入操作相关算法
impl RTree {
    /// 插入一个点
    ///
    /// 坐标必须是有限值，否则树的行为未定义
    pub fn insert(&mut self, point: Point) {
        debug_assert!(point.is_finite(), "non-finite point {}", point);

        // I1: 选择叶子节点
        let leaf = self.choose_leaf(self.root, &point);
        trace!(%point, leaf = %leaf, "chose leaf for insertion");

        // I2: 添加到叶子节点
        match &mut self.nodes[leaf].entries {
            NodeEntries::Points(points) => points.push(point),
            NodeEntries::Children(_) => unreachable!("choose_leaf returned index node {}", leaf),
        }
        self.nodes.recompute_mbr(leaf);
        self.len += 1;

        // I3: 叶子溢出则分裂
        if self.nodes[leaf].is_overflowing(self.max_entries()) {
            self.split_node(leaf);
        }

        // I4: 向上调整树
        self.adjust_tree(leaf);
    }

    /// 按坐标插入一个点
    pub fn insert_xy(&mut self, x: f64, y: f64) {
        self.insert(Point::new(x, y));
    }

    /// 选择叶子节点 - 每层选择面积扩大最小的子节点，相同时选第一个
    pub(crate) fn choose_leaf(&self, id: NodeId, point: &Point) -> NodeId {
        let node = &self.nodes[id];
        if node.is_leaf_node() {
            return id;
        }

        let chosen = self.choose_subtree(node.children(), point);
        self.choose_leaf(chosen, point)
    }

    /// 选择子树 - 计算扩大面积最小的子节点
    pub(crate) fn choose_subtree(&self, children: &[NodeId], point: &Point) -> NodeId {
        debug_assert!(!children.is_empty(), "index node without children");

        let mut best = children[0];
        let mut min_enlargement = f64::INFINITY;

        for &child in children {
            let enlargement = self.nodes[child].mbr.enlargement(point);
            if enlargement < min_enlargement {
                min_enlargement = enlargement;
                best = child;
            }
        }

        best
    }

    /// 向上调整树 - 更新祖先的MBR，并分裂溢出的祖先
    ///
    /// 从给定节点走到根节点为止，根节点的分裂由 `split_node` 处理
    pub(crate) fn adjust_tree(&mut self, id: NodeId) {
        let mut current = id;

        while current != self.root {
            let parent = match self.nodes[current].parent {
                Some(parent) => parent,
                None => unreachable!("non-root node {} has no parent", current),
            };

            self.nodes.recompute_mbr(parent);
            if self.nodes[parent].is_overflowing(self.max_entries()) {
                self.split_node(parent);
            }

            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtree::rectangle::Rectangle;

    #[test]
    fn test_insert_basic() {
        let mut rtree = RTree::new();

        assert!(rtree.is_empty());
        rtree.insert(Point::new(0.0, 0.0));
        assert_eq!(rtree.len(), 1);
        assert!(!rtree.is_empty());

        rtree.insert(Point::new(1.0, 1.0));
        rtree.insert_xy(2.0, 2.0);
        assert_eq!(rtree.len(), 3);

        // 没有溢出，根节点仍然是唯一的叶子
        let root = rtree.node(rtree.root()).unwrap();
        assert!(root.is_leaf_node());
        assert_eq!(root.points().len(), 3);
        assert_eq!(rtree.node_count(), 1);
        assert_eq!(*rtree.root_mbr(), Rectangle::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn test_insert_leaf_split() {
        let mut rtree = RTree::new();
        for x in [0.0, 1.0, 2.0, 3.0, 4.0] {
            rtree.insert_xy(x, 0.0);
        }

        let root = rtree.node(rtree.root()).unwrap();
        assert_eq!(root.level(), 1);
        assert_eq!(root.children().len(), 2);

        let left = rtree.node(root.children()[0]).unwrap();
        let right = rtree.node(root.children()[1]).unwrap();
        assert!(left.is_leaf_node() && right.is_leaf_node());
        assert_eq!(left.points().len() + right.points().len(), 5);
        assert_eq!(left.parent(), Some(rtree.root()));
        assert_eq!(right.parent(), Some(rtree.root()));
        assert_eq!(*rtree.root_mbr(), Rectangle::new(0.0, 0.0, 4.0, 0.0));
    }

    #[test]
    fn test_choose_leaf_ties_go_to_first_child() {
        let mut rtree = RTree::new();
        for x in [0.0, 1.0, 2.0, 3.0, 4.0] {
            rtree.insert_xy(x, 0.0);
        }

        // 两个叶子都是零面积的线段，扩大面积都为0
        let point = Point::new(1.5, 0.0);
        let first = rtree.node(rtree.root()).unwrap().children()[0];
        assert_eq!(rtree.choose_leaf(rtree.root(), &point), first);

        rtree.insert(point);
        assert_eq!(rtree.node(first).unwrap().points().len(), 3);
    }

    #[test]
    fn test_choose_subtree_minimal_enlargement() {
        let mut rtree = RTree::new();
        for (x, y) in [(0.0, 0.0), (1.0, 1.0), (10.0, 10.0), (11.0, 11.0), (12.0, 12.0)] {
            rtree.insert_xy(x, y);
        }

        let children = rtree.node(rtree.root()).unwrap().children().to_vec();
        assert_eq!(children.len(), 2);

        // 左叶子 (0,0)-(1,1)，右叶子 (10,10)-(12,12)
        let near_right = Point::new(11.5, 11.0);
        assert_eq!(rtree.choose_subtree(&children, &near_right), children[1]);

        let near_left = Point::new(0.5, 2.0);
        assert_eq!(rtree.choose_subtree(&children, &near_left), children[0]);
    }

    #[test]
    fn test_adjust_tree_from_root_is_noop() {
        let mut rtree = RTree::new();
        rtree.insert_xy(1.0, 1.0);
        let before = *rtree.root_mbr();

        rtree.adjust_tree(rtree.root());
        assert_eq!(*rtree.root_mbr(), before);
    }

    #[test]
    fn test_insert_grows_tree_uniformly() {
        let mut rtree = RTree::new();
        for i in 0..200 {
            let x = (i * 37 % 101) as f64;
            let y = (i * 53 % 89) as f64;
            rtree.insert_xy(x, y);
        }

        assert_eq!(rtree.len(), 200);
        assert!(rtree.depth() >= 4);
        rtree.check_integrity().unwrap();
    }

    #[test]
    fn test_insert_duplicate_points() {
        let mut rtree = RTree::new();
        for _ in 0..20 {
            rtree.insert_xy(3.0, 3.0);
        }

        assert_eq!(rtree.len(), 20);
        assert_eq!(rtree.search_range(3.0, 3.0, 3.0, 3.0).len(), 20);
        rtree.check_integrity().unwrap();
    }
}
