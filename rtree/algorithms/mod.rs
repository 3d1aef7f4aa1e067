// R-tree算法模块
//
// 这个模块包含R-tree的所有核心算法实现，按功能分解为不同的子模块：
// - insert: 插入、选择叶子和向上调整
// - split: 沿x轴的节点分裂
// - search: 矩形范围查询
// - debug: 调试输出和不变量检查
// - persistence: 快照持久化（JSON / 二进制）
// - concurrent: 读写锁包装的并发R-tree

pub mod concurrent;
pub mod debug;
pub mod insert;
pub mod persistence;
pub mod search;
pub mod split;
