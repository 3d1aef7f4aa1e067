use serde::{Deserialize, Serialize};

use super::node::{Node, NodeArena, NodeEntries, NodeId, MAX_ENTRIES, MIN_ENTRIES};
use super::point::Point;
use super::rectangle::Rectangle;
use crate::config::{ConfigError, IndexConfig};

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeVisualization {
    /// 根节点（空树时为空）
    pub root: Option<NodeVisualization>,
    /// 树的配置参数
    pub config: TreeConfig,
    /// 点的总数
    pub len: usize,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_entries: usize,
    pub min_entries: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeVisualization {
    /// 节点的最小边界矩形
    pub mbr: Rectangle,
    /// 节点层级
    pub level: usize,
    /// 点（仅叶子节点）
    pub points: Vec<Point>,
    /// 子节点（仅索引节点）
    pub child_nodes: Vec<NodeVisualization>,
}

/// R-tree主结构
///
/// 所有节点保存在节点池中，根节点始终存在：空树的根是一个空的叶子节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RTree {
    pub(crate) nodes: NodeArena,
    /// 根节点
    pub(crate) root: NodeId,
    /// 最大条目数M
    max_entries: usize,
    /// 最小条目数m
    min_entries: usize,
    /// 点的总数
    pub(crate) len: usize,
}

impl Default for RTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RTree {
    /// 创建新的R-tree（M=4, m=2）
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES, MIN_ENTRIES)
    }

    /// 使用配置创建R-tree
    ///
    /// 配置不合法时返回 `ConfigError::Invalid`
    pub fn with_config(config: &IndexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_capacity(config.max_entries, config.min_entries))
    }

    fn with_capacity(max_entries: usize, min_entries: usize) -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.push(Node::new_leaf_node());

        RTree {
            nodes,
            root,
            max_entries,
            min_entries,
            len: 0,
        }
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取总的点数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 获取树的深度（只有根叶子节点时为1）
    pub fn depth(&self) -> usize {
        self.root_node().level + 1
    }

    /// 获取R-tree的根节点MBR
    pub fn root_mbr(&self) -> &Rectangle {
        &self.root_node().mbr
    }

    /// 获取最大条目数
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 获取最小条目数
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// 根节点编号
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 根据编号获取节点
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn root_node(&self) -> &Node {
        &self.nodes[self.root]
    }

    /// 按树的遍历顺序收集所有点
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.len);
        self.collect_points(self.root, &mut points);
        points
    }

    fn collect_points(&self, id: NodeId, points: &mut Vec<Point>) {
        match &self.nodes[id].entries {
            NodeEntries::Points(leaf_points) => points.extend_from_slice(leaf_points),
            NodeEntries::Children(children) => {
                for child in children {
                    self.collect_points(*child, points);
                }
            }
        }
    }

    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串，用于可视化
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = self.create_tree_visualization();
        serde_json::to_string_pretty(&visualization)
    }

    /// 创建用于可视化的树结构
    fn create_tree_visualization(&self) -> TreeVisualization {
        let root = if self.is_empty() {
            None
        } else {
            Some(self.create_node_visualization(self.root))
        };

        TreeVisualization {
            root,
            config: TreeConfig {
                max_entries: self.max_entries,
                min_entries: self.min_entries,
            },
            len: self.len,
        }
    }

    /// 递归创建节点的可视化结构
    fn create_node_visualization(&self, id: NodeId) -> NodeVisualization {
        let node = &self.nodes[id];

        NodeVisualization {
            mbr: node.mbr,
            level: node.level,
            points: node.points().to_vec(),
            child_nodes: node
                .children()
                .iter()
                .map(|child| self.create_node_visualization(*child))
                .collect(),
        }
    }
}
