//! 测验任务装载 - 数据层
//!
//! 从 TOML 任务文件读取出题设置与文档清单，把文档读入内存并
//! base64 编码，产出一份可直接提交给生成编排器的 [`QuizConfiguration`]。
//! 这是本仓库对"上传步骤"边界的落地实现。

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::models::quiz::{Difficulty, QuestionType, QuizConfiguration, UploadedDocument};

/// 扩展名 → MIME 类型
static MIME_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "txt" => "text/plain",
    "md" => "text/markdown",
    "html" => "text/html",
    "csv" => "text/csv",
    "json" => "application/json",
    "pdf" => "application/pdf",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
};

/// TOML 任务文件的结构
#[derive(Debug, Deserialize)]
struct QuizJob {
    /// 任务名称（仅用于日志）
    #[serde(default)]
    name: String,
    /// 文档路径列表（相对任务文件所在目录）
    documents: Vec<String>,
    /// 请求的题目数量
    num_questions: u32,
    /// 允许的题型（snake_case 标签）
    #[serde(default)]
    question_types: Vec<QuestionType>,
    /// 是否由生成方自动选择题型
    #[serde(default)]
    auto_detect: bool,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    custom_instructions: Option<String>,
    /// 时间限制（秒），0 或缺省表示不限时
    #[serde(default)]
    time_limit_secs: u64,
}

/// 根据文件扩展名推断 MIME 类型
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or("application/octet-stream")
}

/// 从 TOML 任务文件装载测验配置
///
/// 逐个读取清单中的文档并编码；任一文档缺失即整体失败
pub async fn load_quiz_job(job_path: &Path) -> Result<QuizConfiguration> {
    let content = fs::read_to_string(job_path)
        .await
        .with_context(|| format!("无法读取任务文件: {}", job_path.display()))?;

    let job: QuizJob = toml::from_str(&content)
        .with_context(|| format!("无法解析任务文件: {}", job_path.display()))?;

    if job.documents.is_empty() {
        anyhow::bail!("任务文件未列出任何文档: {}", job_path.display());
    }

    let base_dir = job_path.parent().unwrap_or_else(|| Path::new("."));
    let mut documents = Vec::new();

    for (idx, rel_path) in job.documents.iter().enumerate() {
        let path = base_dir.join(rel_path);
        info!("📄 正在装载文档: {}", path.display());

        let bytes = fs::read(&path)
            .await
            .with_context(|| format!("无法读取文档: {}", path.display()))?;

        documents.push(UploadedDocument {
            id: format!("doc-{}", idx + 1),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| rel_path.clone()),
            base64: STANDARD.encode(&bytes),
            mime_type: mime_for_path(&path).to_string(),
        });
    }

    if !job.name.is_empty() {
        info!("✓ 任务「{}」装载完成，共 {} 篇文档", job.name, documents.len());
    } else {
        info!("✓ 任务装载完成，共 {} 篇文档", documents.len());
    }

    Ok(QuizConfiguration {
        documents,
        num_questions: job.num_questions,
        selected_types: job.question_types,
        auto_detect: job.auto_detect,
        difficulty: job.difficulty,
        custom_instructions: job.custom_instructions,
        time_limit_secs: job.time_limit_secs,
    })
}
