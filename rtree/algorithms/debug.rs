use std::collections::HashSet;

use tracing::debug;

use super::super::node::{NodeEntries, NodeId};
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use crate::config::IndexConfig;

/// 树结构不一致错误
///
/// 正常插入不会产生这些错误；出现即说明树被破坏（例如加载了损坏的快照）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityError {
    #[error("node {0} does not exist")]
    MissingNode(NodeId),
    #[error("node {0} is reachable more than once")]
    SharedNode(NodeId),
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
    #[error("node {node} has parent {found:?}, expected {expected:?}")]
    ParentMismatch {
        node: NodeId,
        expected: Option<NodeId>,
        found: Option<NodeId>,
    },
    #[error("node {node} is at level {found}, expected {expected}")]
    LevelMismatch {
        node: NodeId,
        expected: usize,
        found: usize,
    },
    #[error("node {0} stores entries that do not match its level")]
    EntryKindMismatch(NodeId),
    #[error("index node {0} has no children")]
    EmptyIndexNode(NodeId),
    #[error("node {node} holds {entries} entries, more than {max}")]
    Overflow {
        node: NodeId,
        entries: usize,
        max: usize,
    },
    #[error("node {node} has mbr {found}, expected {expected}")]
    MbrMismatch {
        node: NodeId,
        expected: Rectangle,
        found: Rectangle,
    },
    #[error("tree records {expected} points but stores {found}")]
    LenMismatch { expected: usize, found: usize },
    #[error("invalid node capacity: max_entries = {max}, min_entries = {min}")]
    InvalidCapacity { max: usize, min: usize },
}

/// R-tree调试和一致性检查功能实现
impl RTree {
    /// 检查树的全部不变量
    ///
    /// - 每个节点的条目数不超过最大条目数
    /// - 每个节点的MBR恰好是其条目范围的并集
    /// - 子节点层级比父节点低1，叶子都在第0层
    /// - 父节点引用与实际的父子关系一致
    /// - 节点池中每个节点都能从根节点到达且只到达一次
    /// - 节点容量满足配置校验规则
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        self.verify(true)
    }

    /// 只检查结构（不检查MBR），用于加载后重建MBR之前
    pub(crate) fn check_structure(&self) -> Result<(), IntegrityError> {
        self.verify(false)
    }

    fn verify(&self, check_mbrs: bool) -> Result<(), IntegrityError> {
        // 容量不合法时根节点分裂后立即再次溢出，插入无法结束
        let capacity = IndexConfig {
            max_entries: self.max_entries(),
            min_entries: self.min_entries(),
        };
        if capacity.validate().is_err() {
            return Err(IntegrityError::InvalidCapacity {
                max: capacity.max_entries,
                min: capacity.min_entries,
            });
        }

        let root = self
            .nodes
            .get(self.root)
            .ok_or(IntegrityError::MissingNode(self.root))?;
        if root.parent.is_some() {
            return Err(IntegrityError::ParentMismatch {
                node: self.root,
                expected: None,
                found: root.parent,
            });
        }

        let mut visited = HashSet::new();
        let mut points = 0;
        self.verify_node(
            self.root,
            root.level,
            check_mbrs,
            &mut visited,
            &mut points,
        )?;

        if let Some((id, _)) = self.nodes.iter().find(|(id, _)| !visited.contains(id)) {
            return Err(IntegrityError::Unreachable(id));
        }

        if points != self.len {
            return Err(IntegrityError::LenMismatch {
                expected: self.len,
                found: points,
            });
        }

        Ok(())
    }

    fn verify_node(
        &self,
        id: NodeId,
        expected_level: usize,
        check_mbrs: bool,
        visited: &mut HashSet<NodeId>,
        points: &mut usize,
    ) -> Result<(), IntegrityError> {
        let node = self.nodes.get(id).ok_or(IntegrityError::MissingNode(id))?;
        if !visited.insert(id) {
            return Err(IntegrityError::SharedNode(id));
        }

        if node.level != expected_level {
            return Err(IntegrityError::LevelMismatch {
                node: id,
                expected: expected_level,
                found: node.level,
            });
        }

        if node.is_overflowing(self.max_entries()) {
            return Err(IntegrityError::Overflow {
                node: id,
                entries: node.len(),
                max: self.max_entries(),
            });
        }

        match &node.entries {
            NodeEntries::Points(leaf_points) => {
                if !node.is_leaf_node() {
                    return Err(IntegrityError::EntryKindMismatch(id));
                }
                *points += leaf_points.len();
            }
            NodeEntries::Children(children) => {
                if node.is_leaf_node() {
                    return Err(IntegrityError::EntryKindMismatch(id));
                }
                if children.is_empty() {
                    return Err(IntegrityError::EmptyIndexNode(id));
                }

                for &child in children {
                    let child_node = self
                        .nodes
                        .get(child)
                        .ok_or(IntegrityError::MissingNode(child))?;
                    if child_node.parent != Some(id) {
                        return Err(IntegrityError::ParentMismatch {
                            node: child,
                            expected: Some(id),
                            found: child_node.parent,
                        });
                    }
                    self.verify_node(child, expected_level - 1, check_mbrs, visited, points)?;
                }
            }
        }

        // 子节点已经检查完毕，此时重新计算的MBR只依赖于已验证的节点
        if check_mbrs {
            let expected = self.nodes.compute_mbr(id);
            if node.mbr != expected {
                return Err(IntegrityError::MbrMismatch {
                    node: id,
                    expected,
                    found: node.mbr,
                });
            }
        }

        Ok(())
    }

    /// 自底向上重新计算所有节点的MBR
    pub(crate) fn rebuild_mbrs(&mut self) {
        let mut ids: Vec<(usize, NodeId)> = self
            .nodes
            .iter()
            .map(|(id, node)| (node.level, id))
            .collect();
        ids.sort_unstable_by_key(|&(level, id)| (level, id.index()));

        for (_, id) in ids {
            self.nodes.recompute_mbr(id);
        }
    }

    /// 输出完整的树结构用于调试
    ///
    /// 递归遍历整个树，以 DEBUG 级别记录每个节点的层级、MBR和条目
    pub fn print_tree_structure_debug(&self) {
        debug!(
            len = self.len(),
            depth = self.depth(),
            nodes = self.node_count(),
            "=== R-tree Structure Debug ==="
        );
        self.print_node_recursive(self.root, 0, String::new());
        debug!("=== End Debug ===");
    }

    fn print_node_recursive(&self, id: NodeId, depth: usize, path: String) {
        let node = &self.nodes[id];
        let indent = "  ".repeat(depth);
        debug!(
            "{}Node{} {} (level={}, mbr={}, {} entries)",
            indent,
            path,
            id,
            node.level,
            node.mbr,
            node.len()
        );

        match &node.entries {
            NodeEntries::Points(points) => {
                for (i, point) in points.iter().enumerate() {
                    debug!("{}  [{}] Point {}", indent, i, point);
                }
            }
            NodeEntries::Children(children) => {
                for (i, child) in children.iter().enumerate() {
                    self.print_node_recursive(*child, depth + 1, format!("{}[{}]", path, i));
                }
            }
        }
    }
}
