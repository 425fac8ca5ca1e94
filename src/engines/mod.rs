// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 引擎模块
///
/// 定义自动化引擎抽象以及基于子进程的Stagehand引擎实现
pub mod stagehand;
pub mod traits;
