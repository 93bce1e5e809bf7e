//! AI 出题服务 - 业务能力层
//!
//! 只负责"根据课程资料出题"能力，不关心流程：
//! - 不持有题目集合的生命周期
//! - 不关心状态机处于哪个阶段
//! - 校验题目集合法性是编排层的职责

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Question, QuestionType, QuizConfiguration, UploadedDocument};
use crate::services::{extract_json_block, GenerationBackend, LlmChat};
use crate::utils::logging::truncate_text;

/// 出题回复的长度上限
const GENERATION_MAX_TOKENS: u32 = 4096;

/// AI 出题服务
pub struct LlmGenerator {
    chat: LlmChat,
    verbose_logging: bool,
}

impl LlmGenerator {
    /// 创建新的出题服务
    pub fn new(config: &Config) -> Self {
        Self {
            chat: LlmChat::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 构建出题消息
    ///
    /// 返回 (user_message, system_message, image_urls)
    fn build_generation_messages(
        &self,
        config: &QuizConfiguration,
    ) -> Result<(String, String, Vec<String>)> {
        let system_message = "你是一位专业的出题老师，擅长根据课程资料命制高质量的测验题。\
                             你命制的每道题都必须能从资料中找到依据，表述准确、选项无歧义。\
                             你只返回 JSON，不返回任何其他内容。"
            .to_string();

        let (document_block, image_urls) = render_documents(&config.documents)?;

        let type_constraint = if config.auto_detect {
            "题型不限，由你根据资料特点从上述题型中自动选择。".to_string()
        } else {
            let allowed: Vec<String> = config
                .selected_types
                .iter()
                .map(|t| format!("{}（{}）", t.wire_name(), t.label()))
                .collect();
            format!("只允许以下题型: {}。", allowed.join("、"))
        };

        let custom_block = match &config.custom_instructions {
            Some(text) if !text.trim().is_empty() => format!("\n【额外出题要求】\n{}\n", text),
            _ => String::new(),
        };

        let user_message = format!(
            r#"请根据下面的课程资料出 {count} 道测验题，难度为{difficulty}。

可用题型标签: {all_types}
{type_constraint}{custom_block}
【课程资料】
{documents}
【输出格式】
只返回一个 JSON 数组，每个元素为一道题，字段如下：
- id: 数字，从 1 开始递增，组内唯一
- type: 题型标签（上述 snake_case 标签之一）
- text: 题干
- options: 仅 multiple_choice 提供，4 个选项的字符串数组
- matchingPairs: 仅 matching 提供，形如 [{{"left": "...", "right": "..."}}] 的数组
- sequencingItems: 仅 sequencing 提供，按正确顺序排列的字符串数组
- correctAnswer: 标准答案（true_false 为 "True"/"False"；multiple_choice 为正确选项原文；
  fill_in_blank/short_answer 为参考答案；matching/sequencing 可省略）

禁止出现与题型无关的字段。题目语言与课程资料语言保持一致。"#,
            count = config.num_questions,
            difficulty = config.difficulty.label(),
            all_types = QuestionType::ALL
                .iter()
                .map(|t| t.wire_name())
                .collect::<Vec<_>>()
                .join(" | "),
            type_constraint = type_constraint,
            custom_block = custom_block,
            documents = document_block,
        );

        Ok((user_message, system_message, image_urls))
    }
}

impl GenerationBackend for LlmGenerator {
    async fn generate(&self, config: &QuizConfiguration) -> Result<Vec<Question>> {
        info!(
            "🤖 开始出题: {} 篇文档, {} 道题, 难度{}",
            config.documents.len(),
            config.num_questions,
            config.difficulty.label()
        );

        let (user_message, system_message, image_urls) =
            self.build_generation_messages(config)?;

        let response = self
            .chat
            .send(
                &user_message,
                Some(&system_message),
                &image_urls,
                GENERATION_MAX_TOKENS,
            )
            .await?;

        if self.verbose_logging {
            info!("LLM 出题原始返回: {}", truncate_text(&response, 400));
        } else {
            debug!("LLM 出题原始返回: {}", truncate_text(&response, 400));
        }

        parse_questions(&response)
    }
}

/// 把文档渲染为提示词文本块与图片 URL 列表
///
/// 图片文档以 data URL 附带，其余文档按 UTF-8 文本内联
fn render_documents(documents: &[UploadedDocument]) -> Result<(String, Vec<String>)> {
    let mut text_block = String::new();
    let mut image_urls = Vec::new();

    for doc in documents {
        if doc.mime_type.starts_with("image/") {
            image_urls.push(format!("data:{};base64,{}", doc.mime_type, doc.base64));
            text_block.push_str(&format!("【图片文档: {}】（见附图）\n\n", doc.name));
        } else {
            let bytes = STANDARD
                .decode(&doc.base64)
                .with_context(|| format!("文档 {} 的内容不是合法的 base64", doc.name))?;
            text_block.push_str(&format!(
                "【文档: {}】\n{}\n\n",
                doc.name,
                String::from_utf8_lossy(&bytes)
            ));
        }
    }

    Ok((text_block, image_urls))
}

/// 解析出题回复
fn parse_questions(raw: &str) -> Result<Vec<Question>> {
    let json = extract_json_block(raw)?;
    let questions: Vec<Question> = serde_json::from_str(json)
        .with_context(|| format!("无法解析出题结果: {}", truncate_text(json, 200)))?;
    Ok(questions)
}
