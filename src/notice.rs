//! User facing notifications, the equivalent of toasts.

use std::borrow::Cow;
use tokio::sync::mpsc;

pub const SIGN_IN_TO_VOTE: &str = "Please sign in to vote";
pub const VOTE_FAILED: &str = "Failed to vote";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(Cow<'static, str>),
    Error(Cow<'static, str>),
    /// The action needs a signed in user.
    SignInRequired(Cow<'static, str>),
    /// Send the user back to the sign in page.
    RedirectToSignIn,
    /// A read failed; whatever was shown before stays on screen.
    CouldNotLoad(String),
}

impl Notice {
    pub fn success(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Error(message.into())
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success(..))
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(message) | Self::Error(message) | Self::SignInRequired(message) => {
                f.write_str(message)
            }
            Self::RedirectToSignIn => f.write_str("Please sign in to continue"),
            Self::CouldNotLoad(message) => write!(f, "Could not load: {message}"),
        }
    }
}

pub fn channel() -> (Notifier, Notices) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier(tx), Notices(rx))
}

#[derive(Debug, Clone)]
pub struct Notifier(mpsc::UnboundedSender<Notice>);

impl Notifier {
    /// Nobody listening is fine, the notice is dropped.
    pub fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "notice");
        self.0.send(notice).ok();
    }
}

#[derive(Debug)]
pub struct Notices(mpsc::UnboundedReceiver<Notice>);

impl Notices {
    pub async fn recv(&mut self) -> Option<Notice> {
        self.0.recv().await
    }

    /// Takes every notice sent so far without waiting.
    pub fn drain(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.0.try_recv() {
            notices.push(notice);
        }
        notices
    }
}
