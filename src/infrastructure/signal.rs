use tokio::sync::watch;

/// One-shot stop flag backed by a watch channel.
///
/// Used both for process shutdown and for cancelling background pollers.
#[derive(Clone)]
pub struct StopSignal {
    sender: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct StopListener {
    receiver: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn new() -> (Self, StopListener) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, StopListener { receiver })
    }

    pub fn subscribe(&self) -> StopListener {
        StopListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }
}

impl StopListener {
    /// Resolves once stop is triggered or the signal is dropped.
    pub async fn notified(&mut self) {
        if *self.receiver.borrow() {
            return;
        }
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

pub fn install_signal_handlers(shutdown: StopSignal) {
    let ctrlc = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "app", "ctrl-c received");
            ctrlc.trigger();
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let term = shutdown.clone();
        tokio::spawn(async move {
            if let Ok(mut sig) = signal(SignalKind::terminate()) {
                sig.recv().await;
                tracing::info!(target: "app", "SIGTERM received");
                term.trigger();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn listeners_observe_trigger() {
        let (signal, mut first) = StopSignal::new();
        let mut late = signal.subscribe();
        assert!(!first.is_triggered());

        let waiter = tokio::spawn(async move {
            first.notified().await;
        });
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("listener should wake")
            .expect("listener task should not panic");

        assert!(signal.is_triggered());
        late.notified().await;
        assert!(late.is_triggered());
    }

    #[tokio::test]
    async fn dropped_signal_releases_listeners() {
        let (signal, mut listener) = StopSignal::new();
        drop(signal);
        tokio::time::timeout(Duration::from_secs(1), listener.notified())
            .await
            .expect("dropping the signal should release waiters");
    }
}
