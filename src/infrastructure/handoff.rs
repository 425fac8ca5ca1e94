// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// 交接文件错误类型
#[derive(Error, Debug)]
pub enum HandoffError {
    /// 文件不存在（子进程未履行写入契约）
    #[error("Handoff file missing")]
    Missing,
    /// 文件无法读取
    #[error("Handoff file unreadable: {0}")]
    Unreadable(#[from] std::io::Error),
    /// 内容不是JSON对象数组
    #[error("Handoff file is not a JSON array of objects")]
    NotAnArray,
}

/// 结果交接文件守卫
///
/// 子进程在提取完成时写入、编排器读取并删除的临时JSON工件。
/// 单写者/单读者，绝不跨作业复用。守卫在创建时清除同名的陈旧
/// 文件（崩溃作业的残留不可信），并在离开作用域时删除文件，
/// 使清理独立于作业的具体退出路径。
///
/// 删除必须在`Drop`里发生，而`Drop`无法await，所以守卫通篇
/// 使用同步`std::fs`。
pub struct HandoffFile {
    path: PathBuf,
}

impl HandoffFile {
    /// 占据一个交接文件路径
    ///
    /// 路径上已有的文件来自崩溃的先前运行，按不可信处理直接删除。
    pub fn acquire(path: PathBuf) -> Self {
        if path.exists() {
            warn!(path = %path.display(), "Removing stale handoff file from a previous run");
            let _ = std::fs::remove_file(&path);
        }
        Self { path }
    }

    /// 交接文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取并解析交接文件为JSON对象数组
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Value>)` - 数组元素（可能为空）
    /// * `Err(HandoffError)` - 文件缺失、不可读或不是数组
    pub fn read_elements(&self) -> Result<Vec<Value>, HandoffError> {
        if !self.path.exists() {
            return Err(HandoffError::Missing);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let parsed: Value = serde_json::from_str(&raw).map_err(|_| HandoffError::NotAnArray)?;
        match parsed {
            Value::Array(elements) => Ok(elements),
            _ => Err(HandoffError::NotAnArray),
        }
    }
}

impl Drop for HandoffFile {
    fn drop(&mut self) {
        if self.path.exists() {
            debug!(path = %self.path.display(), "Deleting handoff file");
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
