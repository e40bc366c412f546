use std::fmt;
use yansi::Paint;

/// Notification kinds shown while an image is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Committing,
    Committed,
    ImageWaiting,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Committing => "committing",
            NotificationKind::Committed => "committed",
            NotificationKind::ImageWaiting => "imageWaiting",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, channel: &str, kind: NotificationKind);

    /// Removes any visible notification of this kind.
    fn dismiss(&self, kind: NotificationKind);
}

/// Prints notifications to the terminal.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, channel: &str, kind: NotificationKind) {
        tracing::info!(channel, kind = kind.as_str(), "notification");
        let line = match kind {
            NotificationKind::Committing => format!("Committing blueprint {}...", channel),
            NotificationKind::Committed => format!("Blueprint {} committed", channel),
            NotificationKind::ImageWaiting => format!("Image creation for {} has been added to the queue", channel),
        };
        match kind {
            NotificationKind::Committing => println!("{}", Paint::new(line).yellow()),
            _ => println!("{}", Paint::new(line).green()),
        }
    }

    fn dismiss(&self, kind: NotificationKind) {
        tracing::debug!(kind = kind.as_str(), "dismiss notification");
    }
}
