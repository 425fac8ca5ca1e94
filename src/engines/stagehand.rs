// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::settings::ScraperSettings;
use crate::engines::traits::{
    AutomationEngine, EngineError, RunOutput, ScrapeJob, ENGINE_URL_ENV, HANDOFF_PATH_ENV,
    MODEL_NAME_ENV, SETTLE_SECS_ENV,
};

/// Stagehand子进程引擎
///
/// 每个作业fork一次外部运行器进程（carcrawl-runner），由运行器
/// 驱动真实浏览器完成act/extract循环。引擎只负责启动、限时等待、
/// 捕获输出流，以及超时后终止整棵进程树（浏览器引擎经常派生
/// 更多子进程）。
pub struct StagehandEngine {
    settings: ScraperSettings,
}

impl StagehandEngine {
    /// 创建新的Stagehand引擎实例
    pub fn new(settings: ScraperSettings) -> Self {
        Self { settings }
    }

    /// 构造运行器启动命令
    ///
    /// 五个位置参数顺序固定：brand、model、year、target_url、api_key。
    /// 交接路径与引擎配置通过环境变量传递。
    fn build_command(&self, job: &ScrapeJob) -> Command {
        let mut cmd = Command::new(&self.settings.runner_command);
        cmd.args(&self.settings.runner_args)
            .arg(&job.brand)
            .arg(&job.model)
            .arg(job.year.to_string())
            .arg(&job.target_url)
            .arg(&job.api_key)
            .env(HANDOFF_PATH_ENV, &job.handoff_path)
            .env(ENGINE_URL_ENV, &self.settings.engine_url)
            .env(MODEL_NAME_ENV, &self.settings.model_name)
            .env(SETTLE_SECS_ENV, self.settings.settle_secs.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take the whole tree down.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

#[async_trait]
impl AutomationEngine for StagehandEngine {
    /// 启动运行器并在截止时间内等待其终止
    ///
    /// # 参数
    ///
    /// * `job` - 抓取作业
    /// * `deadline` - 作业超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(RunOutput)` - 子进程终止（含超时被杀的情况）
    /// * `Err(EngineError)` - 子进程无法启动或I/O失败
    async fn run_job(&self, job: &ScrapeJob, deadline: Duration) -> Result<RunOutput, EngineError> {
        let mut cmd = self.build_command(job);

        let child = cmd.spawn().map_err(EngineError::SpawnFailed)?;
        let pid = child.id();
        debug!(job_id = %job.job_id, pid = ?pid, "Automation subprocess spawned");

        match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(RunOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
            }),
            Ok(Err(e)) => Err(EngineError::Io(e)),
            Err(_) => {
                warn!(
                    job_id = %job.job_id,
                    timeout_secs = deadline.as_secs(),
                    "Automation subprocess exceeded deadline, killing process tree"
                );
                // Dropping the wait future drops the child handle, which already
                // SIGKILLs the direct child (kill_on_drop). The group kill also
                // reaps any browser processes the runner spawned underneath.
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                Ok(RunOutput {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                })
            }
        }
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "stagehand"
    }
}

/// 终止整个进程组
///
/// 子进程以自身为组长启动（process_group(0)），因此负PID信号
/// 会送达它派生的所有后代进程。组已消失时静默忽略。
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    unsafe {
        libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {
    // kill_on_drop is the only available mechanism on non-unix targets.
}
