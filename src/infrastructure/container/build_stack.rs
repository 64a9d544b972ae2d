//! 构建栈跟踪
//!
//! 每个线程一条独立的栈，互不干扰的并发解析不会把诊断信息混在一起。
//! 入栈返回 [`BuildGuard`]，出栈在 guard 析构时完成，成功和失败路径都会弹出。

use dashmap::DashMap;
use std::thread::{self, ThreadId};

#[derive(Default)]
pub struct BuildStack {
    stacks: DashMap<ThreadId, Vec<String>>,
}

impl BuildStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前线程的构建链快照，最近入栈的在最后
    pub fn snapshot(&self) -> Vec<String> {
        self.stacks
            .get(&thread::current().id())
            .map(|stack| stack.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stacks
            .get(&thread::current().id())
            .map(|stack| stack.iter().any(|entry| entry == id))
            .unwrap_or(false)
    }

    pub fn depth(&self) -> usize {
        self.stacks
            .get(&thread::current().id())
            .map(|stack| stack.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// 入栈，返回的 guard 析构时出栈
    pub fn enter(&self, id: &str) -> BuildGuard<'_> {
        let thread_id = thread::current().id();
        self.stacks.entry(thread_id).or_default().push(id.to_string());
        BuildGuard {
            stack: self,
            thread_id,
        }
    }

    fn pop(&self, thread_id: ThreadId) {
        let now_empty = match self.stacks.get_mut(&thread_id) {
            Some(mut stack) => {
                stack.pop();
                stack.is_empty()
            }
            None => false,
        };

        if now_empty {
            self.stacks.remove_if(&thread_id, |_, stack| stack.is_empty());
        }
    }
}

/// 构建栈出栈守卫
pub struct BuildGuard<'a> {
    stack: &'a BuildStack,
    thread_id: ThreadId,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop(self.thread_id);
    }
}
