// ==========================================
// 木工车间产量系统 - 用户提示
// ==========================================
// 职责: API 操作返回的本地化提示（成功/信息/错误）
// ==========================================

use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "INFO"),
            NoticeLevel::Success => write!(f, "OK"),
            NoticeLevel::Error => write!(f, "ERRO"),
        }
    }
}

/// 本地化提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(key: &str, args: &[(&str, &str)]) -> Self {
        Self::new(NoticeLevel::Info, translate(key, args))
    }

    pub fn success(key: &str, args: &[(&str, &str)]) -> Self {
        Self::new(NoticeLevel::Success, translate(key, args))
    }

    pub fn error(key: &str, args: &[(&str, &str)]) -> Self {
        Self::new(NoticeLevel::Error, translate(key, args))
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

fn translate(key: &str, args: &[(&str, &str)]) -> String {
    if args.is_empty() {
        t(key)
    } else {
        t_with_args(key, args)
    }
}
