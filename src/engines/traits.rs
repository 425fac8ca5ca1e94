// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// 子进程在stdout上打印的成功标记行
///
/// 表示"提取完成，交接文件已写入"。分类逻辑依赖该字面量的
/// 精确出现，而不是解析任意日志文本。
pub const SUCCESS_MARKER: &str = "EXTRACTION_COMPLETE";

/// 子进程在stderr上打印的错误标记前缀
///
/// 前缀之后是面向操作者的可读消息。
pub const ERROR_MARKER_PREFIX: &str = "CRITICAL_ERROR:";

/// 向子进程传递交接文件路径的环境变量
pub const HANDOFF_PATH_ENV: &str = "CARCRAWL_HANDOFF_FILE";

/// 向子进程传递自动化引擎基础URL的环境变量
pub const ENGINE_URL_ENV: &str = "CARCRAWL_ENGINE_URL";

/// 向子进程传递模型标识的环境变量
pub const MODEL_NAME_ENV: &str = "CARCRAWL_MODEL_NAME";

/// 向子进程传递沉降等待秒数的环境变量
pub const SETTLE_SECS_ENV: &str = "CARCRAWL_SETTLE_SECS";

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 子进程启动失败
    #[error("Failed to spawn automation subprocess: {0}")]
    SpawnFailed(std::io::Error),
    /// 子进程I/O失败
    #[error("Subprocess I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// 抓取作业
///
/// 启动一次自动化子进程所需的全部参数。交接文件路径由
/// 作业ID派生，每个作业唯一，允许并发作业安全共存。
pub struct ScrapeJob {
    /// 作业唯一标识符
    pub job_id: Uuid,
    /// 品牌
    pub brand: String,
    /// 型号
    pub model: String,
    /// 年份
    pub year: i32,
    /// 目标市场页面URL
    pub target_url: String,
    /// AI API密钥，只作为启动参数传递，绝不写入日志
    pub api_key: String,
    /// 本作业专属的交接文件路径
    pub handoff_path: PathBuf,
}

impl ScrapeJob {
    /// 创建新的抓取作业
    ///
    /// # 参数
    ///
    /// * `brand` - 品牌
    /// * `model` - 型号
    /// * `year` - 年份
    /// * `target_url` - 目标URL
    /// * `api_key` - AI API密钥
    /// * `handoff_dir` - 交接文件目录
    pub fn new(
        brand: String,
        model: String,
        year: i32,
        target_url: String,
        api_key: String,
        handoff_dir: &std::path::Path,
    ) -> Self {
        let job_id = Uuid::new_v4();
        let handoff_path = handoff_dir.join(format!("scrape-{}.json", job_id));
        Self {
            job_id,
            brand,
            model,
            year,
            target_url,
            api_key,
            handoff_path,
        }
    }
}

// Manual Debug so the api_key can never leak through "{:?}" logging.
impl fmt::Debug for ScrapeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeJob")
            .field("job_id", &self.job_id)
            .field("brand", &self.brand)
            .field("model", &self.model)
            .field("year", &self.year)
            .field("target_url", &self.target_url)
            .field("api_key", &"[REDACTED]")
            .field("handoff_path", &self.handoff_path)
            .finish()
    }
}

/// 子进程运行输出
///
/// 编排器据此对作业结果进行分类。
#[derive(Debug)]
pub struct RunOutput {
    /// 退出码（被信号终止时为None）
    pub exit_code: Option<i32>,
    /// 捕获的标准输出
    pub stdout: String,
    /// 捕获的标准错误
    pub stderr: String,
    /// 是否因超过截止时间被强制终止
    pub timed_out: bool,
}

impl RunOutput {
    /// stdout是否出现成功标记行
    pub fn has_success_marker(&self) -> bool {
        self.stdout.lines().any(|line| line.trim() == SUCCESS_MARKER)
    }

    /// 提取stderr中错误标记之后的可读消息（若存在）
    pub fn error_marker_message(&self) -> Option<&str> {
        self.stderr.lines().find_map(|line| {
            line.trim()
                .strip_prefix(ERROR_MARKER_PREFIX)
                .map(|msg| msg.trim())
        })
    }
}

/// 自动化引擎特质
///
/// 抽象"启动一次自动化子进程并等待其终止"这一操作，
/// 便于在测试中替换为计数替身验证门卫不启动任何进程。
#[async_trait]
pub trait AutomationEngine: Send + Sync {
    /// 运行一次作业，在截止时间内等待子进程终止
    async fn run_job(&self, job: &ScrapeJob, timeout: Duration) -> Result<RunOutput, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
