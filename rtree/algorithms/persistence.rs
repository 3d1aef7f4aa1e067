use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::debug::IntegrityError;
use crate::rtree::rtree::RTree;

/// 持久化错误类型
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),
    #[error("Invalid file format: {0}")]
    InvalidFormat(#[from] IntegrityError),
}

/// 序列化格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    /// JSON格式 - 可读性好，方便调试
    Json,
    /// 二进制格式 - 性能好，体积小
    Binary,
}

impl SerializationFormat {
    /// 根据文件扩展名自动判断格式
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("json") => SerializationFormat::Json,
            _ => SerializationFormat::Binary,
        }
    }
}

/// R-tree持久化功能实现
///
/// MBR是推导数据，不写入快照，加载时自底向上重新计算
impl RTree {
    /// 导出到文件
    ///
    /// 根据文件扩展名自动选择序列化格式：
    /// - .json -> JSON格式（调试友好）
    /// - 其他 -> 二进制格式
    pub fn dump_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let format = SerializationFormat::from_extension(&path);
        self.dump_to_file_with_format(path, format)
    }

    /// 使用指定格式导出到文件
    ///
    /// 先写入临时文件，再原子性重命名
    pub fn dump_to_file_with_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: SerializationFormat,
    ) -> Result<(), PersistenceError> {
        let path = path.as_ref();

        let temp_path = path.with_extension(format!(
            "{}.tmp",
            path.extension().unwrap_or_default().to_string_lossy()
        ));

        let data = match format {
            SerializationFormat::Json => serde_json::to_vec_pretty(self)?,
            SerializationFormat::Binary => bincode::serialize(self)?,
        };

        fs::write(&temp_path, &data)?;
        fs::rename(&temp_path, path)?;

        info!(
            path = %path.display(),
            ?format,
            points = self.len(),
            bytes = data.len(),
            "dumped r-tree snapshot"
        );
        Ok(())
    }

    /// 从文件加载R-tree，格式由扩展名决定
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RTree, PersistenceError> {
        let format = SerializationFormat::from_extension(&path);
        Self::load_from_file_with_format(path, format)
    }

    /// 使用指定格式从文件加载R-tree
    ///
    /// 加载后重建MBR并检查全部不变量，不一致的快照返回 `InvalidFormat`
    pub fn load_from_file_with_format<P: AsRef<Path>>(
        path: P,
        format: SerializationFormat,
    ) -> Result<RTree, PersistenceError> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        let mut rtree: RTree = match format {
            SerializationFormat::Json => serde_json::from_slice(&data)?,
            SerializationFormat::Binary => bincode::deserialize(&data)?,
        };

        if let Err(e) = rtree.restore() {
            warn!(path = %path.display(), error = %e, "rejected corrupted r-tree snapshot");
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            ?format,
            points = rtree.len(),
            depth = rtree.depth(),
            "loaded r-tree snapshot"
        );
        Ok(rtree)
    }

    /// 校验结构、重建MBR，再做完整检查
    fn restore(&mut self) -> Result<(), IntegrityError> {
        self.check_structure()?;
        self.rebuild_mbrs();
        self.check_integrity()
    }
}
