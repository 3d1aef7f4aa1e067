//! # 平面点空间索引
//!
//! 基于 R-tree 的二维点索引：点保存在高度平衡的嵌套边界矩形树中，
//! 矩形范围查询只访问与查询矩形相交的子树。
//!
//! - 插入：选择面积扩大最小的叶子，溢出时沿x轴排序对半分裂，再向上调整MBR
//! - 查询：按MBR剪枝的递归下降，四条边都是闭区间
//! - 不支持删除、批量加载和最近邻查询
//!
//! ## 使用示例
//!
//! ```rust
//! use planar_index::{Point, RTree, Rectangle};
//!
//! let mut rtree = RTree::new();
//! for x in 0..5 {
//!     rtree.insert(Point::new(x as f64, 0.0));
//! }
//!
//! // 第5个点使根叶子溢出并分裂
//! assert_eq!(rtree.depth(), 2);
//! assert_eq!(rtree.search(&Rectangle::new(-1.0, -1.0, 5.0, 1.0)).len(), 5);
//! assert!(rtree.search_range(2.0, 2.0, 3.0, 3.0).is_empty());
//! ```

pub mod config;
pub mod logging;
pub mod rtree;

// 重新导出主要的公共接口
pub use crate::config::{ConfigError, IndexConfig, LoggingConfig, PlanarIndexConfig};
pub use crate::logging::{init_logging, LoggingError};
pub use crate::rtree::{
    ConcurrentError, ConcurrentRTree, IntegrityError, Node, NodeEntries, NodeId,
    PersistenceError, Point, RTree, Rectangle, SerializationFormat, MAX_ENTRIES, MIN_ENTRIES,
};
