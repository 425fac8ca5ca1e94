// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// 提供结果交接文件、本地列表存储和自动化引擎会话客户端
pub mod handoff;
pub mod stagehand_client;
pub mod storage;
