//! Process liveness while a stream is active.
//!
//! On a phone this is the foreground notification plus a partial wake lock.
//! The service only needs the acquire/release pairing; what "staying awake"
//! means is up to the platform implementation.

/// Keeps the host process alive and visible while media is being cast.
pub trait KeepAlive: Send + Sync {
    /// Called once when the first session starts.
    fn acquire(&self, title: &str);

    /// Called when a new session replaces the current one.
    fn retitle(&self, title: &str) {
        let _ = title;
    }

    /// Called once when the last session is torn down.
    fn release(&self);
}

/// Text shown while `name` is being cast.
pub fn notification_title(name: &str) -> String {
    format!("Casting {}", name)
}

/// Records liveness transitions in the log. Used on hosts that need no
/// wake lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingKeepAlive;

impl KeepAlive for TracingKeepAlive {
    fn acquire(&self, title: &str) {
        tracing::info!(title = %title, "Streaming notification shown");
    }

    fn retitle(&self, title: &str) {
        tracing::info!(title = %title, "Streaming notification updated");
    }

    fn release(&self) {
        tracing::info!("Streaming notification cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_title() {
        assert_eq!(notification_title("Holiday.mp4"), "Casting Holiday.mp4");
    }

    #[test]
    fn test_tracing_keep_alive_is_object_safe() {
        let keep_alive: Box<dyn KeepAlive> = Box::new(TracingKeepAlive);
        keep_alive.acquire("Casting a.mp4");
        keep_alive.retitle("Casting b.mp4");
        keep_alive.release();
    }
}
