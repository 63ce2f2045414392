//! 会话状态：当前计划、计划历史、对话记录、测验
//!
//! 状态对象由调用方显式持有（每个会话一份），不存在进程级单例。
//! 不变量：对话记录与测验永远只属于当前计划；切换计划时二者同时清空。

use std::sync::Arc;

use crate::memory::ChatTranscript;
use crate::plan::Plan;

#[derive(Debug, Default, Clone)]
pub struct SessionState {
    current_plan: Option<Arc<Plan>>,
    history: Vec<Arc<Plan>>,
    transcript: ChatTranscript,
    quiz_text: Option<String>,
}

/// 历史列表中的一项（供展示层按最近优先渲染）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 在 history 中的时间序下标，用于 select_history
    pub index: usize,
    pub label: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_plan(&self) -> Option<&Arc<Plan>> {
        self.current_plan.as_ref()
    }

    /// 按时间顺序的全部历史计划
    pub fn history(&self) -> &[Arc<Plan>] {
        &self.history
    }

    /// 最近优先的历史条目
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .enumerate()
            .rev()
            .map(|(index, plan)| HistoryEntry {
                index,
                label: plan.history_label(),
            })
            .collect()
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn quiz_text(&self) -> Option<&str> {
        self.quiz_text.as_deref()
    }

    /// 清空对话与测验（生成新计划前调用）
    pub(crate) fn reset_plan_context(&mut self) {
        self.transcript.clear();
        self.quiz_text = None;
    }

    /// 切换当前计划，同时清空对话与测验
    pub(crate) fn switch_plan(&mut self, plan: Arc<Plan>) {
        self.reset_plan_context();
        self.current_plan = Some(plan);
    }

    /// 追加到历史；与最近一条同主题时跳过。返回是否追加
    pub(crate) fn record_history(&mut self, plan: Arc<Plan>) -> bool {
        if self
            .history
            .last()
            .is_some_and(|last| last.topic() == plan.topic())
        {
            return false;
        }
        self.history.push(plan);
        true
    }

    /// 从历史中选择（时间序下标）；下标无效时返回 None，状态不变
    pub(crate) fn select_history(&mut self, index: usize) -> Option<Arc<Plan>> {
        let plan = self.history.get(index).cloned()?;
        self.switch_plan(plan.clone());
        Some(plan)
    }

    /// 清空历史，不影响当前计划
    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut ChatTranscript {
        &mut self.transcript
    }

    pub(crate) fn set_quiz(&mut self, quiz: Option<String>) {
        self.quiz_text = quiz;
    }
}
