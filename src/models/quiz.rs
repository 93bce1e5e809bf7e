//! 测验数据契约 - 数据层
//!
//! 定义上传文档、测验配置、题目、作答等共享数据结构。
//! 字段的序列化名称与前端/协作方约定的 camelCase 线上格式保持一致。

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 题型枚举
///
/// 线上格式使用 snake_case 标签（`multiple_choice` 等）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 选择题
    MultipleChoice,
    /// 判断题
    TrueFalse,
    /// 填空题
    FillInBlank,
    /// 简答题
    ShortAnswer,
    /// 连线题
    Matching,
    /// 排序题
    Sequencing,
}

impl QuestionType {
    /// 全部题型（顺序即展示顺序）
    pub const ALL: [QuestionType; 6] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FillInBlank,
        QuestionType::ShortAnswer,
        QuestionType::Matching,
        QuestionType::Sequencing,
    ];

    /// 线上格式标签
    pub fn wire_name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::Matching => "matching",
            QuestionType::Sequencing => "sequencing",
        }
    }

    /// 中文名称（用于日志和终端展示）
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "选择题",
            QuestionType::TrueFalse => "判断题",
            QuestionType::FillInBlank => "填空题",
            QuestionType::ShortAnswer => "简答题",
            QuestionType::Matching => "连线题",
            QuestionType::Sequencing => "排序题",
        }
    }
}

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 中文名称
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// 上传的课程文档
///
/// 内容以 base64 编码传输；会话重启或生成完成后即丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    /// 会话内唯一标识
    pub id: String,
    /// 展示名称（通常为文件名）
    pub name: String,
    /// base64 编码的文件内容
    pub base64: String,
    /// 内容类型（如 `text/markdown`、`image/png`）
    pub mime_type: String,
}

/// 测验配置
///
/// 由上传步骤构造，被生成编排器一次性消费
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfiguration {
    /// 课程文档（有序）
    pub documents: Vec<UploadedDocument>,
    /// 请求的题目数量（≥1）
    pub num_questions: u32,
    /// 允许的题型集合
    pub selected_types: Vec<QuestionType>,
    /// 是否由生成方自动选择题型（为 true 时忽略 selected_types）
    pub auto_detect: bool,
    /// 难度等级
    pub difficulty: Difficulty,
    /// 自定义出题要求
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    /// 时间限制（秒），0 表示不限时
    #[serde(rename = "timeLimit")]
    pub time_limit_secs: u64,
}

/// 连线题的左右配对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

/// 一道题目
///
/// 不变量：题型专属字段的有无与 `kind` 严格对应——
/// 连线题必有 `matching_pairs`，绝不会带 `options`。
/// 校验由 [`Question::validate_payload`] 完成，
/// 违反该不变量的题目按生成失败处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 组内唯一的数字标识
    pub id: u32,
    /// 题型标签
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// 题干
    pub text: String,
    /// 选项列表（仅选择题）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 标准答案（作答阶段对 UI 隐藏）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// 左右配对列表（仅连线题）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_pairs: Option<Vec<MatchingPair>>,
    /// 按正确顺序排列的条目（仅排序题）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencing_items: Option<Vec<String>>,
}

impl Question {
    /// 校验题型与专属字段是否严格对应
    ///
    /// 要求的字段必须非空，无关题型的字段必须缺席
    pub fn validate_payload(&self) -> Result<(), String> {
        let options = self.options.as_ref().map_or(0, |v| v.len());
        let pairs = self.matching_pairs.as_ref().map_or(0, |v| v.len());
        let items = self.sequencing_items.as_ref().map_or(0, |v| v.len());

        match self.kind {
            QuestionType::MultipleChoice => {
                if options < 2 {
                    return Err(format!("题目 {} 为选择题但缺少选项", self.id));
                }
                if self.matching_pairs.is_some() || self.sequencing_items.is_some() {
                    return Err(format!("题目 {} 为选择题却携带了其他题型的字段", self.id));
                }
            }
            QuestionType::Matching => {
                if pairs < 2 {
                    return Err(format!("题目 {} 为连线题但缺少配对", self.id));
                }
                if self.options.is_some() || self.sequencing_items.is_some() {
                    return Err(format!("题目 {} 为连线题却携带了其他题型的字段", self.id));
                }
            }
            QuestionType::Sequencing => {
                if items < 2 {
                    return Err(format!("题目 {} 为排序题但缺少排序条目", self.id));
                }
                if self.options.is_some() || self.matching_pairs.is_some() {
                    return Err(format!("题目 {} 为排序题却携带了其他题型的字段", self.id));
                }
            }
            QuestionType::TrueFalse | QuestionType::FillInBlank | QuestionType::ShortAnswer => {
                if self.options.is_some()
                    || self.matching_pairs.is_some()
                    || self.sequencing_items.is_some()
                {
                    return Err(format!(
                        "题目 {} 为{}却携带了其他题型的字段",
                        self.id,
                        self.kind.label()
                    ));
                }
            }
        }

        Ok(())
    }
}

/// 题目的展示投影 - 供作答界面使用
///
/// 所有含答案信息的字段在此被剥离：
/// - 不包含标准答案
/// - 排序条目被打乱，不泄露正确顺序
/// - 连线题右列被打乱，不泄露配对关系
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 连线题左列（保持原序）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_left: Option<Vec<String>>,
    /// 连线题右列（已打乱）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_right: Option<Vec<String>>,
    /// 排序条目（已打乱）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequencing_items: Option<Vec<String>>,
}

impl QuestionView {
    /// 从题目构建展示投影
    ///
    /// 打乱结果若与原序相同则旋转一位，保证正确顺序不被原样呈现
    pub fn from_question(question: &Question, rng: &mut impl Rng) -> Self {
        let matching_left = question
            .matching_pairs
            .as_ref()
            .map(|pairs| pairs.iter().map(|p| p.left.clone()).collect());
        let matching_right = question
            .matching_pairs
            .as_ref()
            .map(|pairs| shuffled(pairs.iter().map(|p| p.right.clone()).collect(), rng));
        let sequencing_items = question
            .sequencing_items
            .as_ref()
            .map(|items| shuffled(items.clone(), rng));

        Self {
            id: question.id,
            kind: question.kind,
            text: question.text.clone(),
            options: question.options.clone(),
            matching_left,
            matching_right,
            sequencing_items,
        }
    }
}

/// 打乱条目；若打乱后仍与原序一致则旋转一位
fn shuffled(items: Vec<String>, rng: &mut impl Rng) -> Vec<String> {
    let original = items.clone();
    let mut items = items;
    items.shuffle(rng);
    if items == original && items.len() > 1 {
        items.rotate_left(1);
    }
    items
}

/// 一次作答
///
/// 连线/排序等结构化作答由作答层序列化为单个字符串
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: u32,
    pub answer: String,
}
