// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use carcrawl::engines::traits::{ERROR_MARKER_PREFIX, SUCCESS_MARKER};
use carcrawl::runner::{self, RunnerArgs, RunnerConfig};

/// 自动化子进程入口（carcrawl-runner）
///
/// 编排器的分类逻辑依赖这里的退出契约：提取完成且交接文件
/// 写好后在stdout打印成功标记；任何失败在stderr打印错误标记
/// 并以非零状态退出。
#[tokio::main]
async fn main() {
    let outcome = async {
        let config = RunnerConfig::from_env()?;
        let args = RunnerArgs::parse(std::env::args().skip(1))?;
        runner::run(&config, &args).await
    }
    .await;

    match outcome {
        Ok(()) => println!("{}", SUCCESS_MARKER),
        Err(e) => {
            eprintln!("{} {:#}", ERROR_MARKER_PREFIX, e);
            std::process::exit(1);
        }
    }
}
