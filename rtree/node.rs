use std::ops::{Index, IndexMut};

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::point::Point;
use super::rectangle::Rectangle;

/// 每个节点允许的最大条目数M
pub const MAX_ENTRIES: usize = 4;

/// 每个节点的最小条目数m
///
/// 只作为配置项保留：插入不会产生欠满节点，删除不在支持范围内，因此不做最小填充约束
pub const MIN_ENTRIES: usize = 2;

/// 节点在树内节点池中的编号
///
/// 子节点指向父节点只是导航关系，不拥有父节点
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "#{}", _0)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 节点条目
///
/// 叶子节点（level == 0）只保存点，索引节点（level > 0）只保存子节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeEntries {
    Points(Vec<Point>),
    Children(Vec<NodeId>),
}

impl NodeEntries {
    pub fn len(&self) -> usize {
        match self {
            NodeEntries::Points(points) => points.len(),
            NodeEntries::Children(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// R-tree节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 节点的最小边界矩形
    ///
    /// 由条目推导而来，不参与序列化，加载时重新计算
    #[serde(skip)]
    pub(crate) mbr: Rectangle,

    pub(crate) entries: NodeEntries,

    /// 父节点，根节点没有父节点
    pub(crate) parent: Option<NodeId>,

    /// 节点在树中的层级，叶子层为0
    pub(crate) level: usize,
}

impl Node {
    /// 创建新的叶子节点
    pub fn new_leaf_node() -> Self {
        Self::new(0)
    }

    /// 创建指定层级的空节点，条目类型由层级决定
    pub fn new(level: usize) -> Self {
        let entries = if level == 0 {
            NodeEntries::Points(Vec::new())
        } else {
            NodeEntries::Children(Vec::new())
        };

        Node {
            mbr: Rectangle::empty(),
            entries,
            parent: None,
            level,
        }
    }

    /// 检查是否为叶子节点
    pub fn is_leaf_node(&self) -> bool {
        self.level == 0
    }

    pub fn mbr(&self) -> &Rectangle {
        &self.mbr
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn entries(&self) -> &NodeEntries {
        &self.entries
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 叶子节点中的点；索引节点返回空切片
    pub fn points(&self) -> &[Point] {
        match &self.entries {
            NodeEntries::Points(points) => points,
            NodeEntries::Children(_) => &[],
        }
    }

    /// 索引节点的子节点；叶子节点返回空切片
    pub fn children(&self) -> &[NodeId] {
        match &self.entries {
            NodeEntries::Points(_) => &[],
            NodeEntries::Children(children) => children,
        }
    }

    /// 检查节点是否溢出
    pub fn is_overflowing(&self, max_entries: usize) -> bool {
        self.len() > max_entries
    }
}

/// 节点池
///
/// 树的所有节点都保存在这里，节点之间通过 `NodeId` 互相引用。
/// 节点只会被添加，不会被删除
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// 添加节点并返回它的编号
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 遍历所有节点及其编号
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// 计算节点条目的并集MBR，不修改节点
    pub fn compute_mbr(&self, id: NodeId) -> Rectangle {
        match &self[id].entries {
            NodeEntries::Points(points) => points
                .iter()
                .fold(Rectangle::empty(), |mbr, point| mbr.expanded_to(point)),
            NodeEntries::Children(children) => children
                .iter()
                .fold(Rectangle::empty(), |mbr, child| mbr.union(&self[*child].mbr)),
        }
    }

    /// 重新计算节点的MBR
    ///
    /// 先重置为空矩形，再逐个并入条目的范围；条目变化后必须调用
    pub fn recompute_mbr(&mut self, id: NodeId) {
        debug_assert_eq!(
            self[id].is_leaf_node(),
            matches!(self[id].entries, NodeEntries::Points(_)),
            "node {} entry kind disagrees with its level",
            id
        );
        let mbr = self.compute_mbr(id);
        self[id].mbr = mbr;
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(points: &[(f64, f64)]) -> Node {
        let mut node = Node::new_leaf_node();
        node.entries = NodeEntries::Points(points.iter().map(|&p| Point::from(p)).collect());
        node
    }

    #[test]
    fn test_node_creation() {
        let leaf_node = Node::new_leaf_node();
        assert!(leaf_node.is_leaf_node());
        assert_eq!(leaf_node.level(), 0);
        assert!(leaf_node.is_empty());
        assert!(leaf_node.mbr().is_empty());
        assert!(matches!(leaf_node.entries(), NodeEntries::Points(_)));

        let index_node = Node::new(2);
        assert!(!index_node.is_leaf_node());
        assert_eq!(index_node.level(), 2);
        assert!(matches!(index_node.entries(), NodeEntries::Children(_)));
        assert!(index_node.parent().is_none());
    }

    #[test]
    fn test_recompute_leaf_mbr() {
        let mut arena = NodeArena::new();
        let id = arena.push(leaf_with(&[(0.0, 5.0), (3.0, -1.0), (2.0, 2.0)]));

        arena.recompute_mbr(id);
        assert_eq!(arena[id].mbr, Rectangle::new(0.0, -1.0, 3.0, 5.0));
    }

    #[test]
    fn test_recompute_index_mbr() {
        let mut arena = NodeArena::new();
        let left = arena.push(leaf_with(&[(0.0, 0.0), (1.0, 1.0)]));
        let right = arena.push(leaf_with(&[(5.0, 2.0), (6.0, 3.0)]));
        arena.recompute_mbr(left);
        arena.recompute_mbr(right);

        let mut parent = Node::new(1);
        parent.entries = NodeEntries::Children(vec![left, right]);
        let parent = arena.push(parent);
        arena.recompute_mbr(parent);

        assert_eq!(arena[parent].mbr, Rectangle::new(0.0, 0.0, 6.0, 3.0));
        assert_eq!(arena[parent].children(), &[left, right]);
        assert!(arena[parent].points().is_empty());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut arena = NodeArena::new();
        let id = arena.push(leaf_with(&[(1.0, 1.0), (4.0, 2.0)]));

        arena.recompute_mbr(id);
        let first = arena[id].mbr;
        arena.recompute_mbr(id);
        assert_eq!(arena[id].mbr, first);
    }

    #[test]
    fn test_recompute_empty_node() {
        let mut arena = NodeArena::new();
        let id = arena.push(leaf_with(&[(1.0, 1.0)]));
        arena.recompute_mbr(id);
        assert!(!arena[id].mbr.is_empty());

        arena[id].entries = NodeEntries::Points(Vec::new());
        arena.recompute_mbr(id);
        assert!(arena[id].mbr.is_empty());
    }

    #[test]
    fn test_overflow_check() {
        let node = leaf_with(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        assert!(node.is_overflowing(MAX_ENTRIES));
        assert!(!node.is_overflowing(5));
    }
}
