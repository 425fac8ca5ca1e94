// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::domain::models::vehicle::VehicleRecord;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 持久化的车辆列表条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredListing {
    /// 产生该条目的作业ID
    pub job_id: Uuid,
    /// 抓取时间
    pub scraped_at: DateTime<Utc>,
    /// 车辆记录
    #[serde(flatten)]
    pub record: VehicleRecord,
}

/// 本地列表存储
///
/// 成功作业的记录追加写入一个本地JSON数据文件。与原型保持
/// 一致的文件存储，不引入数据库。已损坏的数据文件按空文件
/// 处理，不让历史数据问题阻断新作业。
pub struct ListingStore {
    path: PathBuf,
}

impl ListingStore {
    /// 创建新的列表存储实例
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 追加一个作业的记录
    ///
    /// # 参数
    ///
    /// * `job_id` - 作业ID
    /// * `records` - 归一化后的车辆记录
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 追加后文件中的条目总数
    /// * `Err(StoreError)` - 写入失败
    pub async fn append(
        &self,
        job_id: Uuid,
        records: &[VehicleRecord],
    ) -> Result<usize, StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut all = self.load_existing().await;
        let scraped_at = Utc::now();
        all.extend(records.iter().map(|record| StoredListing {
            job_id,
            scraped_at,
            record: record.clone(),
        }));

        let serialized = serde_json::to_vec_pretty(&all)?;
        fs::write(&self.path, serialized).await?;
        Ok(all.len())
    }

    /// 读取既有条目，文件缺失或损坏时返回空集合
    async fn load_existing(&self) -> Vec<StoredListing> {
        match fs::read(&self.path).await {
            Ok(raw) => match serde_json::from_slice(&raw) {
                Ok(listings) => listings,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Data file corrupt, starting over");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }
}
