pub mod algorithms;
pub mod node;
pub mod point;
pub mod rectangle;
#[allow(clippy::module_inception)]
pub mod rtree;

// 重新导出主要类型
pub use algorithms::concurrent::{ConcurrentError, ConcurrentRTree};
pub use algorithms::debug::IntegrityError;
pub use algorithms::persistence::{PersistenceError, SerializationFormat};
pub use node::{Node, NodeEntries, NodeId, MAX_ENTRIES, MIN_ENTRIES};
pub use point::Point;
pub use rectangle::Rectangle;
pub use rtree::{NodeVisualization, RTree, TreeConfig, TreeVisualization};
