//! 生成编排器 - 编排层
//!
//! 围绕一次生成协作方调用的请求/响应适配：
//! 校验输入配置 → 委托协作方 → 校验返回的题目集。
//! 绝不在本地编造题目，也不做离线兜底或自动重试。

use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::GenerationFailure;
use crate::models::{Question, QuizConfiguration};
use crate::services::GenerationBackend;

/// 生成编排器
pub struct GenerationOrchestrator<B: GenerationBackend> {
    backend: B,
}

impl<B: GenerationBackend> GenerationOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// 执行一次生成
    ///
    /// 成功返回有序且 id 唯一的题目列表；任何失败都转换为
    /// [`GenerationFailure`]，由上层落为状态转移加用户提示
    pub async fn generate(
        &self,
        config: &QuizConfiguration,
    ) -> Result<Vec<Question>, GenerationFailure> {
        validate_config(config)?;

        info!(
            "📨 调用生成服务: {} 篇文档, 请求 {} 道题",
            config.documents.len(),
            config.num_questions
        );

        let questions = self
            .backend
            .generate(config)
            .await
            .map_err(GenerationFailure::collaborator)?;

        validate_question_set(&questions, config)?;

        info!("✓ 生成完成，共 {} 道题", questions.len());
        Ok(questions)
    }
}

/// 校验输入配置
fn validate_config(config: &QuizConfiguration) -> Result<(), GenerationFailure> {
    if config.documents.is_empty() {
        return Err(GenerationFailure::InvalidConfig {
            reason: "至少需要一篇文档".to_string(),
        });
    }
    if config.num_questions < 1 {
        return Err(GenerationFailure::InvalidConfig {
            reason: "题目数量至少为 1".to_string(),
        });
    }
    if !config.auto_detect && config.selected_types.is_empty() {
        return Err(GenerationFailure::InvalidConfig {
            reason: "未开启自动选择题型时必须至少指定一种题型".to_string(),
        });
    }
    Ok(())
}

/// 校验协作方返回的题目集
///
/// 题型与字段不匹配的题目不做修补，整组按生成失败处理
fn validate_question_set(
    questions: &[Question],
    config: &QuizConfiguration,
) -> Result<(), GenerationFailure> {
    if questions.is_empty() {
        return Err(GenerationFailure::EmptyQuestionSet);
    }

    let mut seen = HashSet::new();
    for question in questions {
        if !seen.insert(question.id) {
            return Err(GenerationFailure::MalformedQuestionSet {
                reason: format!("题目 id {} 重复", question.id),
            });
        }
        question
            .validate_payload()
            .map_err(|reason| GenerationFailure::MalformedQuestionSet { reason })?;
    }

    if questions.len() != config.num_questions as usize {
        warn!(
            "⚠️ 生成题数 {} 与请求题数 {} 不一致，按实际返回继续",
            questions.len(),
            config.num_questions
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionType, UploadedDocument};

    /// 返回固定题目集的桩协作方
    struct StubBackend {
        questions: Vec<Question>,
        fail: bool,
    }

    impl GenerationBackend for StubBackend {
        async fn generate(&self, _config: &QuizConfiguration) -> anyhow::Result<Vec<Question>> {
            if self.fail {
                anyhow::bail!("服务不可达");
            }
            Ok(self.questions.clone())
        }
    }

    fn config() -> QuizConfiguration {
        QuizConfiguration {
            documents: vec![UploadedDocument {
                id: "doc-1".to_string(),
                name: "lesson.md".to_string(),
                base64: "5YWJ".to_string(),
                mime_type: "text/markdown".to_string(),
            }],
            num_questions: 2,
            selected_types: vec![QuestionType::MultipleChoice],
            auto_detect: false,
            difficulty: Difficulty::Easy,
            custom_instructions: None,
            time_limit_secs: 0,
        }
    }

    fn mcq(id: u32) -> Question {
        Question {
            id,
            kind: QuestionType::MultipleChoice,
            text: format!("第 {} 题", id),
            options: Some(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
            correct_answer: Some("A".to_string()),
            matching_pairs: None,
            sequencing_items: None,
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![mcq(1), mcq(2)],
            fail: false,
        });
        let questions = orchestrator.generate(&config()).await.unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_documents() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![mcq(1)],
            fail: false,
        });
        let mut bad = config();
        bad.documents.clear();
        let err = orchestrator.generate(&bad).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_zero_questions() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![mcq(1)],
            fail: false,
        });
        let mut bad = config();
        bad.num_questions = 0;
        let err = orchestrator.generate(&bad).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_types_without_auto_detect() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![mcq(1)],
            fail: false,
        });
        let mut bad = config();
        bad.selected_types.clear();
        assert!(orchestrator.generate(&bad).await.is_err());

        // 开启自动选择后同样的配置应当通过
        bad.auto_detect = true;
        assert!(orchestrator.generate(&bad).await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_wraps_collaborator_error() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: Vec::new(),
            fail: true,
        });
        let err = orchestrator.generate(&config()).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_question_set() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: Vec::new(),
            fail: false,
        });
        let err = orchestrator.generate(&config()).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::EmptyQuestionSet));
    }

    #[tokio::test]
    async fn test_generate_rejects_duplicate_ids() {
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![mcq(1), mcq(1)],
            fail: false,
        });
        let err = orchestrator.generate(&config()).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedQuestionSet { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_foreign_payload() {
        // 判断题携带连线配对：不修补，整组拒绝
        let mut malformed = mcq(1);
        malformed.kind = QuestionType::TrueFalse;
        malformed.options = None;
        malformed.matching_pairs = Some(vec![crate::models::MatchingPair {
            left: "a".to_string(),
            right: "b".to_string(),
        }]);
        let orchestrator = GenerationOrchestrator::new(StubBackend {
            questions: vec![malformed],
            fail: false,
        });
        let err = orchestrator.generate(&config()).await.unwrap_err();
        assert!(matches!(err, GenerationFailure::MalformedQuestionSet { .. }));
    }
}
