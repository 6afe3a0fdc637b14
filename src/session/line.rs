use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::event::{CallOutcome, SessionCommand, SessionEvent, TranscriptRole};

const CHANNEL_DEPTH: usize = 100;

/// Both ends of a live line: provider events in, commands out. The real
/// vendor connection and a scripted rehearsal line both reduce to this.
pub struct SessionHandle {
    pub events: mpsc::Receiver<SessionEvent>,
    pub commands: mpsc::Sender<SessionCommand>,
}

/// A caller script for rehearsal mode: (delay before the event, event).
#[derive(Debug, Clone, Default)]
pub struct CallScript {
    steps: Vec<(Duration, SessionEvent)>,
}

impl CallScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, delay_ms: u64, event: SessionEvent) -> Self {
        self.steps.push((Duration::from_millis(delay_ms), event));
        self
    }

    pub fn caller_says(self, delay_ms: u64, text: &str) -> Self {
        self.then(
            delay_ms,
            SessionEvent::Transcript {
                role: TranscriptRole::Caller,
                text: text.to_string(),
                is_final: true,
            },
        )
    }
}

/// Replay a script as if the provider were pushing events. HangUp ends the
/// call immediately; cancellation tears the task down without a CallEnded.
pub fn spawn_scripted(script: CallScript, cancel: CancellationToken) -> SessionHandle {
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (command_tx, mut command_rx) = mpsc::channel::<SessionCommand>(CHANNEL_DEPTH);

    tokio::spawn(async move {
        let mut commands_open = true;
        for (delay, event) in script.steps {
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("scripted line cancelled");
                        return;
                    }
                    command = command_rx.recv(), if commands_open => {
                        match command {
                            Some(SessionCommand::HangUp) => {
                                let _ = event_tx
                                    .send(SessionEvent::CallEnded { outcome: CallOutcome::Completed })
                                    .await;
                                return;
                            }
                            Some(SessionCommand::Say { text, .. }) => {
                                // The assistant's own speech comes back as a
                                // transcript event, same as the live provider.
                                let _ = event_tx
                                    .send(SessionEvent::Transcript {
                                        role: TranscriptRole::Assistant,
                                        text,
                                        is_final: true,
                                    })
                                    .await;
                            }
                            Some(SessionCommand::Mute(_)) => {}
                            None => commands_open = false,
                        }
                    }
                    _ = &mut sleep => {
                        if event_tx.send(event).await.is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
        }
        // Dropping event_tx closes the line; the driver sees recv() = None.
        debug!("scripted line finished");
    });

    SessionHandle {
        events: event_rx,
        commands: command_tx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_script_replays_in_order() {
        let cancel = CancellationToken::new();
        let script = CallScript::new()
            .then(1, SessionEvent::CallStarted { session_id: Uuid::new_v4() })
            .caller_says(1, "hello")
            .then(1, SessionEvent::CallEnded { outcome: CallOutcome::Completed });

        let mut handle = spawn_scripted(script, cancel);
        assert!(matches!(
            handle.events.recv().await,
            Some(SessionEvent::CallStarted { .. })
        ));
        assert!(matches!(
            handle.events.recv().await,
            Some(SessionEvent::Transcript { .. })
        ));
        assert!(matches!(
            handle.events.recv().await,
            Some(SessionEvent::CallEnded { .. })
        ));
        assert!(handle.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_line() {
        let cancel = CancellationToken::new();
        let script = CallScript::new().caller_says(5_000, "never delivered");
        let mut handle = spawn_scripted(script, cancel.clone());

        cancel.cancel();
        assert!(handle.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_say_echoes_as_assistant_transcript() {
        let cancel = CancellationToken::new();
        // A slow step keeps the line alive while the command goes through.
        let script = CallScript::new().caller_says(500, "later");
        let mut handle = spawn_scripted(script, cancel);

        handle
            .commands
            .send(SessionCommand::Say {
                text: "one moment".to_string(),
                interrupt_assistant: false,
            })
            .await
            .unwrap();

        match handle.events.recv().await {
            Some(SessionEvent::Transcript { role, text, .. }) => {
                assert_eq!(role, TranscriptRole::Assistant);
                assert_eq!(text, "one moment");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
