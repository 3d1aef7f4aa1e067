use std::cmp::Ordering;

use tracing::debug;

use super::super::node::{Node, NodeEntries, NodeId};
use super::super::rtree::RTree;

/// 节点分裂算法 - 沿x轴排序后对半分裂
///
/// 只按x轴分裂，不做R*-tree的分裂轴选择和重叠最小化
impl RTree {
    /// 将溢出的节点分裂为两个同层兄弟节点
    ///
    /// 排序后从 `⌊count/2⌋` 开始的后半部分移动到新的兄弟节点。
    /// 根节点分裂时创建新的根节点，这是树长高的唯一方式；
    /// 非根节点分裂后父节点可能溢出，由调用方的 `adjust_tree` 继续处理
    pub(crate) fn split_node(&mut self, id: NodeId) {
        let level = self.nodes[id].level;
        let moved = self.split_entries(id);
        let moved_len = moved.len();

        let mut sibling = Node::new(level);
        sibling.entries = moved;
        let sibling = self.nodes.push(sibling);

        // 被移动的子节点改为指向新的兄弟节点
        let moved_children = self.nodes[sibling].children().to_vec();
        for child in moved_children {
            self.nodes[child].parent = Some(sibling);
        }

        self.nodes.recompute_mbr(id);
        self.nodes.recompute_mbr(sibling);

        debug!(
            node = %id,
            sibling = %sibling,
            level,
            kept = self.nodes[id].len(),
            moved = moved_len,
            "split overflowing node"
        );

        if id == self.root {
            self.grow_root(id, sibling);
        } else {
            let parent = match self.nodes[id].parent {
                Some(parent) => parent,
                None => unreachable!("non-root node {} has no parent", id),
            };

            self.nodes[sibling].parent = Some(parent);
            match &mut self.nodes[parent].entries {
                NodeEntries::Children(children) => children.push(sibling),
                NodeEntries::Points(_) => unreachable!("parent {} is a leaf", parent),
            }
            self.nodes.recompute_mbr(parent);
        }
    }

    /// 对节点条目按x轴排序，取出后半部分
    ///
    /// 叶子节点按点的x坐标排序，索引节点按子节点MBR中心的x坐标排序；排序是稳定的，
    /// 数值相等的键（包括 0.0 和 -0.0）保持原有顺序
    fn split_entries(&mut self, id: NodeId) -> NodeEntries {
        let mut entries = std::mem::replace(
            &mut self.nodes[id].entries,
            NodeEntries::Points(Vec::new()),
        );

        let moved = match &mut entries {
            NodeEntries::Points(points) => {
                points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
                let mid = points.len() / 2;
                NodeEntries::Points(points.split_off(mid))
            }
            NodeEntries::Children(children) => {
                children.sort_by(|a, b| {
                    let a = self.nodes[*a].mbr.center_x();
                    let b = self.nodes[*b].mbr.center_x();
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                });
                let mid = children.len() / 2;
                NodeEntries::Children(children.split_off(mid))
            }
        };

        self.nodes[id].entries = entries;
        moved
    }

    /// 根节点分裂 - 创建高一层的新根节点，两个分裂结果是它仅有的子节点
    fn grow_root(&mut self, old_root: NodeId, sibling: NodeId) {
        let mut new_root = Node::new(self.nodes[old_root].level + 1);
        new_root.entries = NodeEntries::Children(vec![old_root, sibling]);
        let new_root = self.nodes.push(new_root);

        self.nodes[old_root].parent = Some(new_root);
        self.nodes[sibling].parent = Some(new_root);
        self.nodes.recompute_mbr(new_root);
        self.root = new_root;

        debug!(
            root = %new_root,
            depth = self.depth(),
            "root split, tree height increased"
        );
    }
}
