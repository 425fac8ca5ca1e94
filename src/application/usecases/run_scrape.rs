// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::dto::scrape_request::ScrapeRequestDto;
use crate::config::settings::ScraperSettings;
use crate::domain::models::scrape_result::{ScrapeResult, ScrapeStatus};
use crate::domain::models::vehicle::VehicleRecord;
use crate::engines::traits::{AutomationEngine, RunOutput, ScrapeJob};
use crate::infrastructure::handoff::HandoffFile;
use crate::utils::validators;

// === Section: Use Case Definition ===

/// 抓取作业编排器
///
/// 驱动一次完整的作业生命周期：凭证门卫、子进程启动、限时
/// 等待、输出标记与退出码分类、交接文件消费与删除、记录
/// 归一化。每条终止路径都解析为一个类型化的 [`ScrapeStatus`]，
/// 从不向调用方抛出未处理的子进程故障。此层不做任何自动重试，
/// 重试策略属于调用方。
pub struct RunScrapeUseCase {
    engine: Arc<dyn AutomationEngine>,
    handoff_dir: PathBuf,
    timeout: Duration,
}

// === Section: Implementation ===

impl RunScrapeUseCase {
    /// 创建新的编排器实例
    pub fn new(engine: Arc<dyn AutomationEngine>, handoff_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            engine,
            handoff_dir,
            timeout,
        }
    }

    /// 由抓取器配置构造编排器
    pub fn from_settings(engine: Arc<dyn AutomationEngine>, settings: &ScraperSettings) -> Self {
        Self::new(
            engine,
            PathBuf::from(&settings.handoff_dir),
            settings.job_timeout(),
        )
    }

    /// 运行一次抓取作业
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求（字段完整性由表示层验证）
    ///
    /// # 返回值
    ///
    /// 分类后的作业结果；交接文件在返回前已被删除。
    pub async fn execute(&self, request: &ScrapeRequestDto) -> ScrapeResult {
        // 1. Credential gate, before anything gets spawned.
        if validators::validate_api_key(&request.api_key).is_err() {
            let job_id = Uuid::new_v4();
            warn!(%job_id, "Scrape job rejected: missing AI API key");
            return ScrapeResult::classified(job_id, ScrapeStatus::AuthError);
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.handoff_dir).await {
            error!(error = %e, dir = %self.handoff_dir.display(), "Cannot prepare handoff directory");
            return ScrapeResult::classified(Uuid::new_v4(), ScrapeStatus::CrashError);
        }

        let job = ScrapeJob::new(
            request.brand.clone(),
            request.model.clone(),
            request.year,
            request.url.clone(),
            request.api_key.clone(),
            &self.handoff_dir,
        );
        info!(job_id = %job.job_id, engine = self.engine.name(), brand = %job.brand, model = %job.model, year = job.year, "Starting scrape job");

        // The guard owns the handoff path from here on: stale leftovers are
        // removed now and the file is deleted again when the guard drops,
        // whatever branch this job ends on.
        let handoff = HandoffFile::acquire(job.handoff_path.clone());

        let result = match self.engine.run_job(&job, self.timeout).await {
            Ok(run) => self.classify(&job, run, &handoff),
            Err(e) => {
                error!(job_id = %job.job_id, error = %e, "Automation subprocess could not run");
                ScrapeResult::classified(job.job_id, ScrapeStatus::CrashError)
            }
        };

        info!(job_id = %job.job_id, status = ?result.status, records = result.records.len(), "Scrape job finished");
        result
    }

    /// 对一次已终止的子进程运行进行分类
    fn classify(&self, job: &ScrapeJob, run: RunOutput, handoff: &HandoffFile) -> ScrapeResult {
        if run.timed_out {
            return ScrapeResult::classified(job.job_id, ScrapeStatus::Timeout);
        }

        if run.exit_code != Some(0) {
            // Structured failure markers carry an operator-readable message;
            // their absence means the subprocess died without reporting.
            match run.error_marker_message() {
                Some(msg) => {
                    warn!(job_id = %job.job_id, exit_code = ?run.exit_code, message = %msg, "Subprocess reported a failure")
                }
                None => {
                    warn!(job_id = %job.job_id, exit_code = ?run.exit_code, "Subprocess crashed without a failure marker")
                }
            }
            return ScrapeResult::classified(job.job_id, ScrapeStatus::CrashError);
        }

        // A clean exit alone is not enough: the contract requires the
        // explicit completion marker on stdout.
        if !run.has_success_marker() {
            warn!(job_id = %job.job_id, "Subprocess exited cleanly without the completion marker");
            return ScrapeResult::classified(job.job_id, ScrapeStatus::MalformedOutput);
        }

        let elements = match handoff.read_elements() {
            Ok(elements) => elements,
            Err(e) => {
                warn!(job_id = %job.job_id, error = %e, "Handoff contract not fulfilled");
                return ScrapeResult::classified(job.job_id, ScrapeStatus::MalformedOutput);
            }
        };

        if elements.is_empty() {
            return ScrapeResult::classified(job.job_id, ScrapeStatus::EmptyResult);
        }

        let total = elements.len();
        let records: Vec<VehicleRecord> = elements
            .iter()
            .filter_map(VehicleRecord::from_value)
            .collect();
        if records.len() < total {
            warn!(job_id = %job.job_id, dropped = total - records.len(), "Dropped records missing brand/model/price");
        }

        ScrapeResult::success(job.job_id, records)
    }
}

// === Section: Tests ===
