//! Cosmetic sign-in. Credentials are only checked for presence; the role
//! picked on the form decides what the header shows.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const LOGIN_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Manager => "manager",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Citizen => "시민",
            Role::Manager => "관리자",
        }
    }

    /// Tab caption on the login form.
    pub fn tab_label(self) -> &'static str {
        match self {
            Role::Citizen => "시민",
            Role::Manager => "업무 담당자",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Role::Citizen => "간편 로그인",
            Role::Manager => "행정망 로그인",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Citizen => "시민 홍길동",
            Role::Manager => "김춘천 주무관",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Role::Citizen => Role::Manager,
            Role::Manager => Role::Citizen,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("아이디(이메일)를 입력해 주세요.")]
    MissingAccount,
    #[error("비밀번호를 입력해 주세요.")]
    MissingPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub role: Role,
    pub account: String,
    pub password: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            role: Role::Manager,
            account: String::new(),
            password: String::new(),
        }
    }
}

/// Accepted form, waiting out the simulated network delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRequest {
    pub role: Role,
    pub delay: Duration,
}

impl LoginForm {
    pub fn submit(&self) -> Result<LoginRequest, LoginError> {
        if self.account.trim().is_empty() {
            return Err(LoginError::MissingAccount);
        }
        if self.password.is_empty() {
            return Err(LoginError::MissingPassword);
        }
        Ok(LoginRequest {
            role: self.role,
            delay: LOGIN_DELAY,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub role: Role,
    pub name: String,
    pub logged_in_at: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn login(&mut self, role: Role) -> &User {
        self.user.insert(User {
            role,
            name: role.display_name().to_string(),
            logged_in_at: Local::now(),
        })
    }

    /// Returns the user that was signed out, if any.
    pub fn logout(&mut self) -> Option<User> {
        self.user.take()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

pub fn login_notice(role: Role) -> String {
    format!("{} 계정으로 로그인되었습니다.", role.label())
}

pub const LOGOUT_NOTICE: &str = "로그아웃 되었습니다.";
