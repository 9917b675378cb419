//! User-facing notices.
//!
//! The session layer only produces results; which of them reach the user is
//! decided here by a [`NotifyPolicy`].

use std::time::{Duration, Instant};

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Which notices are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum NotifyPolicy {
    /// Every notice.
    All,
    /// Only errors.
    #[default]
    Errors,
}

impl NotifyPolicy {
    pub fn admits(self, notice: &Notice) -> bool {
        match self {
            Self::All => true,
            Self::Errors => notice.level == NoticeLevel::Error,
        }
    }
}

/// Sink for notices.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

const TOAST_TTL: Duration = Duration::from_secs(4);

/// Keeps the most recent admitted notice for a few seconds.
#[derive(Debug)]
pub struct Toasts {
    policy: NotifyPolicy,
    current: Option<(Notice, Instant)>,
}

impl Toasts {
    pub fn new(policy: NotifyPolicy) -> Self {
        Self {
            policy,
            current: None,
        }
    }

    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// The notice to show, if it has not expired yet.
    pub fn current(&self) -> Option<&Notice> {
        self.visible_at(Instant::now())
    }

    /// Forget an expired notice.
    pub fn prune(&mut self) {
        if self.current().is_none() {
            self.current = None;
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    fn visible_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| now.duration_since(*shown_at) < TOAST_TTL)
            .map(|(notice, _)| notice)
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, notice: Notice) {
        if self.policy.admits(&notice) {
            self.current = Some((notice, Instant::now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_policy_drops_non_errors() {
        let mut toasts = Toasts::new(NotifyPolicy::Errors);

        toasts.notify(Notice::success("Quiz ready"));
        assert!(toasts.current().is_none());

        toasts.notify(Notice::error("Something went wrong"));
        assert_eq!(toasts.current().unwrap().message, "Something went wrong");
    }

    #[test]
    fn test_all_policy_keeps_latest_notice() {
        let mut toasts = Toasts::new(NotifyPolicy::All);

        toasts.notify(Notice::info("Generating"));
        toasts.notify(Notice::success("Quiz ready"));
        assert_eq!(toasts.current(), Some(&Notice::success("Quiz ready")));

        toasts.dismiss();
        assert!(toasts.current().is_none());
    }

    #[test]
    fn test_notice_expires() {
        let mut toasts = Toasts::new(NotifyPolicy::All);
        toasts.notify(Notice::info("hello"));

        let later = Instant::now() + TOAST_TTL + Duration::from_millis(1);
        assert!(toasts.visible_at(later).is_none());
    }

    #[test]
    fn test_policy_parses_from_cli_values() {
        assert_eq!(NotifyPolicy::from_str("all", true), Ok(NotifyPolicy::All));
        assert_eq!(NotifyPolicy::from_str("errors", true), Ok(NotifyPolicy::Errors));
        assert_eq!(NotifyPolicy::default(), NotifyPolicy::Errors);
    }
}
