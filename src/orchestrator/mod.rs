//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责状态持有与流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `lifecycle` - 生命周期状态机
//! - 唯一的状态持有者（Upload / Generating / Quiz / Grading / Results）
//! - 把协作方失败吸收为状态转移加用户提示
//! - 向表现层暴露当前状态、题目投影、等待提示与结果
//!
//! ### `generation` - 生成编排器
//! - 校验配置、委托生成协作方、校验题目集
//!
//! ### `grading` - 批改编排器
//! - 规整作答列表、委托批改协作方、对齐与结算结果
//!
//! ## 层次关系
//!
//! ```text
//! lifecycle (持有 QuizState)
//!     ↓
//! generation / grading (一次协作方调用的编排)
//!     ↓
//! workflow::QuizSession (一次作答的流程)
//!     ↓
//! services (能力层：出题 / 批改)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一状态持有者**：只有 lifecycle 持有并转移状态
//! 2. **失败即转移**：协作方失败不向上抛，落为状态加提示
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **单飞**：同一时刻只有一次尝试在进行

pub mod generation;
pub mod grading;
pub mod lifecycle;

// 重新导出主要类型
pub use generation::GenerationOrchestrator;
pub use grading::GradingOrchestrator;
pub use lifecycle::{QuizLifecycle, QuizState, GENERATING_MESSAGE, GRADING_MESSAGE};
