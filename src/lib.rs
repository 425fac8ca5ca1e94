// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含应用程序的核心业务逻辑和用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和结果模型
pub mod domain;

/// 引擎模块
///
/// 实现浏览器自动化子进程的启动与监督
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如结果交接文件、本地存储和自动化引擎客户端
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 运行器模块
///
/// 实现自动化子进程（carcrawl-runner）的行为
pub mod runner;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
