//! 会话动作入口
//!
//! 展示层的每个用户动作（生成新计划、选择历史、清空历史、追问、生成测验）都在这里执行，
//! 结果写回调用方传入的 [`SessionState`]。每个动作完整执行后才接受下一个。

use std::sync::Arc;

use crate::core::SessionError;
use crate::llm::LlmClient;
use crate::plan::{Plan, PlanBuilder, PlanRequest};
use crate::session::context::{chat_messages, quiz_messages};
use crate::session::SessionState;

pub struct Tutor {
    builder: PlanBuilder,
    llm: Arc<dyn LlmClient>,
}

impl Tutor {
    pub fn new(builder: PlanBuilder) -> Self {
        let llm = builder.llm().clone();
        Self { builder, llm }
    }

    pub fn builder(&self) -> &PlanBuilder {
        &self.builder
    }

    /// 生成新计划。topic 为空白时不做任何事并返回 None。
    ///
    /// 先清空对话与测验，再构建计划并设为当前计划；与最近一条历史同主题时不重复追加。
    pub async fn new_plan(&self, state: &mut SessionState, request: PlanRequest) -> Option<Arc<Plan>> {
        if request.topic.trim().is_empty() {
            tracing::debug!("empty topic, ignoring new plan request");
            return None;
        }

        state.reset_plan_context();
        let plan = Arc::new(self.builder.build(&request).await);
        state.switch_plan(plan.clone());
        if !state.record_history(plan.clone()) {
            tracing::debug!(topic = %plan.topic(), "same topic as last history entry, not appended");
        }
        Some(plan)
    }

    /// 选择历史计划（时间序下标）；下标无效时不做任何事
    pub fn select_history(&self, state: &mut SessionState, index: usize) -> Option<Arc<Plan>> {
        let plan = state.select_history(index);
        match &plan {
            Some(p) => tracing::info!(index, topic = %p.topic(), "history plan selected"),
            None => tracing::debug!(index, "no history entry at index"),
        }
        plan
    }

    pub fn clear_history(&self, state: &mut SessionState) {
        state.clear_history();
        tracing::info!("history cleared");
    }

    /// 追问：没有当前计划或消息为空白时不做任何事，返回 Ok(None)。
    ///
    /// 生成失败时对话记录中只保留用户消息，并返回 [`SessionError::ChatUnavailable`]。
    pub async fn chat(&self, state: &mut SessionState, message: &str) -> Result<Option<String>, SessionError> {
        let Some(plan) = state.current_plan().cloned() else {
            tracing::debug!("chat without current plan ignored");
            return Ok(None);
        };
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        state.transcript_mut().push_user(message);
        let messages = chat_messages(&plan, state.transcript());
        match self.llm.complete(&messages).await {
            Some(answer) => {
                state.transcript_mut().push_assistant(answer.clone());
                Ok(Some(answer))
            }
            None => {
                tracing::warn!(topic = %plan.topic(), "tutor reply unavailable");
                Err(SessionError::ChatUnavailable)
            }
        }
    }

    /// 生成 / 重新生成测验：覆盖旧内容；失败时测验清空并返回 [`SessionError::QuizUnavailable`]
    pub async fn quiz(&self, state: &mut SessionState) -> Result<Option<String>, SessionError> {
        let Some(plan) = state.current_plan().cloned() else {
            tracing::debug!("quiz without current plan ignored");
            return Ok(None);
        };

        let quiz = self.llm.complete(&quiz_messages(&plan)).await;
        state.set_quiz(quiz.clone());
        match quiz {
            Some(q) => Ok(Some(q)),
            None => {
                tracing::warn!(topic = %plan.topic(), "quiz generation failed");
                Err(SessionError::QuizUnavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::sample_artifacts;
    use crate::classifier::DifficultyClassifier;
    use crate::llm::MockLlmClient;
    use crate::memory::Role;
    use crate::plan::DifficultySource;
    use crate::services::{StaticImage, StaticSearch};

    fn tutor(llm: Arc<MockLlmClient>) -> Tutor {
        let classifier =
            Arc::new(DifficultyClassifier::from_artifacts(sample_artifacts("1.0.0")).unwrap());
        Tutor::new(PlanBuilder::new(
            classifier,
            Arc::new(StaticSearch::failing()),
            Arc::new(StaticImage::none()),
            llm,
        ))
    }

    fn request(topic: &str) -> PlanRequest {
        PlanRequest::new(topic, DifficultySource::UserSelected("Beginner".into()))
    }

    #[tokio::test]
    async fn test_empty_topic_is_noop() {
        let llm = Arc::new(MockLlmClient::new());
        let t = tutor(llm.clone());
        let mut state = SessionState::new();
        assert!(t.new_plan(&mut state, request("   ")).await.is_none());
        assert!(state.current_plan().is_none());
        assert!(state.history().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_same_topic_not_duplicated_in_history() {
        let t = tutor(Arc::new(MockLlmClient::new()));
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.new_plan(&mut state, request("Rust")).await;
        assert_eq!(state.history().len(), 1);
        t.new_plan(&mut state, request("Go")).await;
        t.new_plan(&mut state, request("Rust")).await;
        let topics: Vec<&str> = state.history().iter().map(|p| p.topic()).collect();
        assert_eq!(topics, vec!["Rust", "Go", "Rust"]);
    }

    #[tokio::test]
    async fn test_duplicate_submission_still_replaces_current_plan() {
        let llm = Arc::new(MockLlmClient::with_replies(["first guide", "second guide"]));
        let t = tutor(llm);
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.new_plan(&mut state, request("Rust")).await;
        assert_eq!(state.current_plan().unwrap().text(), "second guide");
        assert_eq!(state.history()[0].text(), "first guide");
    }

    #[tokio::test]
    async fn test_chat_appends_both_turns_and_replays_transcript() {
        let llm = Arc::new(MockLlmClient::with_replies(["guide text", "answer one", "answer two"]));
        let t = tutor(llm.clone());
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Piano")).await;

        assert_eq!(t.chat(&mut state, "What is a scale?").await.unwrap().as_deref(), Some("answer one"));
        t.chat(&mut state, "And a chord?").await.unwrap();
        assert_eq!(state.transcript().len(), 4);

        let last_call = llm.calls().pop().unwrap();
        assert_eq!(last_call[0].role, Role::System);
        assert!(last_call[0].content.contains("tutor for the topic: Piano"));
        assert_eq!(last_call[1].role, Role::Assistant);
        assert_eq!(last_call[1].content, "guide text");
        assert_eq!(last_call.len(), 2 + 3);
        assert_eq!(last_call[4].content, "And a chord?");
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_user_turn_only() {
        let llm = Arc::new(MockLlmClient::with_replies(["guide"]));
        llm.push_failure();
        let t = tutor(llm);
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Piano")).await;

        let err = t.chat(&mut state, "hello?").await.unwrap_err();
        assert_eq!(err, SessionError::ChatUnavailable);
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript().turns()[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_chat_without_plan_is_noop() {
        let llm = Arc::new(MockLlmClient::new());
        let t = tutor(llm.clone());
        let mut state = SessionState::new();
        assert_eq!(t.chat(&mut state, "hi").await, Ok(None));
        assert!(state.transcript().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quiz_overwrites_and_failure_clears() {
        let llm = Arc::new(MockLlmClient::with_replies(["guide", "quiz v1", "quiz v2"]));
        llm.push_failure();
        let t = tutor(llm.clone());
        let mut state = SessionState::new();
        assert_eq!(t.quiz(&mut state).await, Ok(None));

        t.new_plan(&mut state, request("Chess")).await;
        t.quiz(&mut state).await.unwrap();
        assert_eq!(state.quiz_text(), Some("quiz v1"));
        t.quiz(&mut state).await.unwrap();
        assert_eq!(state.quiz_text(), Some("quiz v2"));

        assert_eq!(t.quiz(&mut state).await, Err(SessionError::QuizUnavailable));
        assert_eq!(state.quiz_text(), None);

        let quiz_prompt = &llm.calls()[1][0];
        assert_eq!(quiz_prompt.role, Role::User);
        assert!(quiz_prompt.content.contains("Create a quiz for: Chess"));
        assert!(quiz_prompt.content.contains("3 multiple choice questions"));
    }

    #[tokio::test]
    async fn test_plan_switch_clears_chat_and_quiz() {
        let t = tutor(Arc::new(MockLlmClient::new()));
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.chat(&mut state, "ownership?").await.unwrap();
        t.quiz(&mut state).await.unwrap();

        t.new_plan(&mut state, request("Go")).await;
        assert!(state.transcript().is_empty());
        assert!(state.quiz_text().is_none());

        t.chat(&mut state, "goroutines?").await.unwrap();
        t.quiz(&mut state).await.unwrap();
        let selected = t.select_history(&mut state, 0).unwrap();
        assert_eq!(selected.topic(), "Rust");
        assert!(state.transcript().is_empty());
        assert!(state.quiz_text().is_none());
    }

    #[tokio::test]
    async fn test_select_history_shares_plan_and_bad_index_is_noop() {
        let t = tutor(Arc::new(MockLlmClient::new()));
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.new_plan(&mut state, request("Go")).await;

        let picked = t.select_history(&mut state, 0).unwrap();
        assert!(Arc::ptr_eq(&picked, &state.history()[0]));

        t.chat(&mut state, "still here?").await.unwrap();
        assert!(t.select_history(&mut state, 9).is_none());
        assert_eq!(state.current_plan().unwrap().topic(), "Rust");
        assert_eq!(state.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_current_plan() {
        let t = tutor(Arc::new(MockLlmClient::new()));
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.clear_history(&mut state);
        assert!(state.history().is_empty());
        assert_eq!(state.current_plan().unwrap().topic(), "Rust");

        // 清空后同主题可再次进入历史
        t.new_plan(&mut state, request("Rust")).await;
        assert_eq!(state.history().len(), 1);
    }

    #[tokio::test]
    async fn test_history_entries_most_recent_first() {
        let t = tutor(Arc::new(MockLlmClient::new()));
        let mut state = SessionState::new();
        t.new_plan(&mut state, request("Rust")).await;
        t.new_plan(&mut state, request("Go")).await;
        let entries = state.history_entries();
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].label, "Go (Beginner)");
        assert_eq!(entries[1].label, "Rust (Beginner)");
    }
}
