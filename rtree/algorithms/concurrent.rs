use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{ConfigError, IndexConfig};
use crate::rtree::point::Point;
use crate::rtree::rectangle::Rectangle;
use crate::rtree::rtree::RTree;

/// 并发错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConcurrentError {
    #[error("Lock was poisoned by a panicked thread")]
    LockPoisoned,
}

/// 并发安全的R-tree实现
///
/// `RTree` 本身不做同步，这个结构体在整棵树外面加一把读写锁：
/// - 读操作（search, len, is_empty）可以并发执行
/// - 写操作（insert）需要独占访问
///
/// # 示例
///
/// ```
/// use planar_index::ConcurrentRTree;
/// use std::thread;
///
/// let rtree = ConcurrentRTree::new();
///
/// let handles: Vec<_> = (0..4).map(|i| {
///     let rtree_clone = rtree.clone(); // 通过clone共享同一个树
///     thread::spawn(move || {
///         rtree_clone.insert_xy(i as f64, i as f64).unwrap();
///     })
/// }).collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(rtree.len().unwrap(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConcurrentRTree {
    inner: Arc<RwLock<RTree>>,
}

impl ConcurrentRTree {
    /// 创建新的并发R-tree
    pub fn new() -> Self {
        Self::from_tree(RTree::new())
    }

    /// 使用配置创建并发R-tree
    pub fn with_config(config: &IndexConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_tree(RTree::with_config(config)?))
    }

    /// 从现有的RTree创建并发版本
    pub fn from_tree(rtree: RTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rtree)),
        }
    }

    /// 插入一个点
    ///
    /// # 错误
    /// 如果锁被毒化，返回 `ConcurrentError::LockPoisoned`
    pub fn insert(&self, point: Point) -> Result<(), ConcurrentError> {
        let mut tree = self.write_lock()?;
        tree.insert(point);
        Ok(())
    }

    pub fn insert_xy(&self, x: f64, y: f64) -> Result<(), ConcurrentError> {
        self.insert(Point::new(x, y))
    }

    /// 搜索落在指定矩形内的所有点
    pub fn search(&self, query: &Rectangle) -> Result<Vec<Point>, ConcurrentError> {
        let tree = self.read_lock()?;
        Ok(tree.search(query))
    }

    /// 获取R-tree中点的总数
    pub fn len(&self) -> Result<usize, ConcurrentError> {
        Ok(self.read_lock()?.len())
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> Result<bool, ConcurrentError> {
        Ok(self.read_lock()?.is_empty())
    }

    pub fn depth(&self) -> Result<usize, ConcurrentError> {
        Ok(self.read_lock()?.depth())
    }

    /// 复制当前树的快照，之后的写入不会影响快照
    pub fn snapshot(&self) -> Result<RTree, ConcurrentError> {
        Ok(self.read_lock()?.clone())
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, RTree>, ConcurrentError> {
        self.inner.read().map_err(|_| ConcurrentError::LockPoisoned)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, RTree>, ConcurrentError> {
        self.inner.write().map_err(|_| ConcurrentError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_inserts() {
        let rtree = ConcurrentRTree::new();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let rtree = rtree.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        rtree.insert_xy(t as f64 * 100.0 + i as f64, i as f64).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(rtree.len().unwrap(), 400);
        let snapshot = rtree.snapshot().unwrap();
        snapshot.check_integrity().unwrap();

        // 每个线程的点都在自己的x区间内
        let query = Rectangle::new(300.0, 0.0, 399.0, 100.0);
        assert_eq!(rtree.search(&query).unwrap().len(), 50);
    }

    #[test]
    fn test_concurrent_readers() {
        let rtree = ConcurrentRTree::new();
        for i in 0..100 {
            rtree.insert_xy(i as f64, 0.0).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rtree = rtree.clone();
                thread::spawn(move || rtree.search(&Rectangle::new(10.0, -1.0, 19.0, 1.0)).unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 10);
        }
    }

    #[test]
    fn test_snapshot_is_independent() {
        let rtree = ConcurrentRTree::new();
        rtree.insert_xy(1.0, 1.0).unwrap();

        let snapshot = rtree.snapshot().unwrap();
        rtree.insert_xy(2.0, 2.0).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(rtree.len().unwrap(), 2);
        assert!(!rtree.is_empty().unwrap());
        assert_eq!(rtree.depth().unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock() {
        let rtree = ConcurrentRTree::new();
        let clone = rtree.clone();

        let _ = thread::spawn(move || {
            let _guard = clone.inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(rtree.len(), Err(ConcurrentError::LockPoisoned)));
        assert!(matches!(
            rtree.insert_xy(0.0, 0.0),
            Err(ConcurrentError::LockPoisoned)
        ));
    }

    #[test]
    fn test_with_config() {
        let config = IndexConfig {
            max_entries: 6,
            min_entries: 3,
        };
        let rtree = ConcurrentRTree::with_config(&config).unwrap();
        assert_eq!(rtree.snapshot().unwrap().max_entries(), 6);
    }
}
