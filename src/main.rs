use std::time::Duration;

use anyhow::Result;
use chairside::config::Config;
use chairside::services::store::{PracticeStore, Table};
use chairside::session::assistant::{office_status, AssistantOptions, OfficeStatus};
use chairside::session::engine::{CallEngine, EngineConfig, SideEffect};
use chairside::session::event::{SessionCommand, SessionEvent, SessionStatus, TranscriptRole};
use chairside::session::line::{spawn_scripted, CallScript, SessionHandle};
use chairside::telemetry::metrics;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// Driver-internal results; these never reach the engine as session events.
enum DriverEvent {
    StoreResult { table: &'static str, ok: bool },
    Redialed(SessionHandle),
}

const TICK_MS: u64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("chairside driver booting");

    let config = Config::from_env()?;
    let store = config.store.as_ref().map(PracticeStore::new);
    if store.is_none() {
        tracing::warn!("store not configured; call logs will be dropped after redaction");
    }
    if config.voice.is_none() {
        tracing::info!("voice provider not configured; running the line in rehearsal mode");
    }

    let status = office_status(&chrono::Local::now());
    let assistant = AssistantOptions::for_status(status);
    tracing::info!(
        open = (status == OfficeStatus::Open),
        greeting = %assistant.first_message,
        "assistant configured"
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            cancel.cancel();
        });
    }

    let (driver_tx, mut driver_rx) = mpsc::channel::<DriverEvent>(100);

    let mut engine = CallEngine::new(EngineConfig {
        max_reconnect_attempts: config.max_reconnect_attempts,
        reconnect_base_delay: config.reconnect_base_delay,
    });
    engine.begin();
    let mut handle = spawn_scripted(rehearsal_call(), cancel.clone());

    let mut pending_writes: u32 = 0;
    let mut cadence = tokio::time::interval(Duration::from_millis(TICK_MS));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cadence.tick().await;
        if cancel.is_cancelled() {
            break;
        }

        // 1. Drain line events
        let mut events = Vec::new();
        while let Ok(event) = handle.events.try_recv() {
            events.push(event);
        }

        // 2. Drain driver results
        while let Ok(result) = driver_rx.try_recv() {
            match result {
                DriverEvent::StoreResult { table, ok } => {
                    pending_writes = pending_writes.saturating_sub(1);
                    engine
                        .telemetry()
                        .record(chairside::telemetry::OpsEvent::StoreWrite { ok });
                    if ok {
                        tracing::info!(table, "store write ok");
                    } else {
                        tracing::warn!(table, "store write failed");
                    }
                }
                DriverEvent::Redialed(new_handle) => {
                    handle = new_handle;
                }
            }
        }

        // 3. Engine step
        let effects = engine.tick_step(events);

        // 4. Carry out side effects
        for effect in effects {
            match effect {
                SideEffect::Speak {
                    text,
                    interrupt_assistant,
                } => {
                    let _ = handle
                        .commands
                        .send(SessionCommand::Say {
                            text,
                            interrupt_assistant,
                        })
                        .await;
                }

                SideEffect::Escalate {
                    urgency,
                    wait_window,
                } => {
                    tracing::warn!(
                        urgency,
                        within_hours = wait_window.hours(),
                        "EMERGENCY flagged; notify the front desk"
                    );
                }

                SideEffect::PersistCallLog(log) => match &store {
                    Some(store) => {
                        pending_writes += 1;
                        let store = store.clone();
                        let tx = driver_tx.clone();
                        tokio::spawn(async move {
                            let ok = match store.create(Table::CallLogs, &log).await {
                                Ok(_) => true,
                                Err(e) => {
                                    tracing::warn!(error = %e, "call log write failed");
                                    false
                                }
                            };
                            let _ = tx
                                .send(DriverEvent::StoreResult {
                                    table: Table::CallLogs.name(),
                                    ok,
                                })
                                .await;
                        });
                    }
                    None => {
                        tracing::info!(
                            emergency = log.emergency,
                            phi_matches = log.phi_matches,
                            "dry run; dropping call log"
                        );
                    }
                },

                SideEffect::Reconnect { attempt, delay } => {
                    tracing::warn!(attempt, ?delay, "line dropped; redialing");
                    let tx = driver_tx.clone();
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        // Cancellation cuts the backoff short instead of
                        // sleeping it out.
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            _ = tokio::time::sleep(delay) => {
                                let _ = tx
                                    .send(DriverEvent::Redialed(spawn_scripted(
                                        resumed_call(),
                                        cancel.clone(),
                                    )))
                                    .await;
                            }
                        }
                    });
                }
            }
        }

        // 5. Exit once the call is over and every write has landed
        if matches!(
            engine.status(),
            SessionStatus::Ended | SessionStatus::Failed
        ) && pending_writes == 0
        {
            break;
        }
    }

    let snapshot = engine.snapshot();
    tracing::info!(
        calls = snapshot.calls_started,
        emergencies = snapshot.emergencies_flagged,
        phi_scrubbed = snapshot.phi_matches_scrubbed,
        health = ?metrics::health(&snapshot),
        "driver done"
    );

    Ok(())
}

/// A representative walk-in emergency, line drop included. Stands in for
/// the provider until a live key is wired up.
fn rehearsal_call() -> CallScript {
    let session_id = Uuid::new_v4();
    CallScript::new()
        .then(100, SessionEvent::CallStarted { session_id })
        .then(
            200,
            SessionEvent::Transcript {
                role: TranscriptRole::Assistant,
                text: "Thanks for calling Bright Smile Dental! How can I help you today?"
                    .to_string(),
                is_final: true,
            },
        )
        .then(
            400,
            SessionEvent::SpeechStart {
                role: TranscriptRole::Caller,
            },
        )
        .caller_says(
            600,
            "Hi, I cracked a tooth this morning and the pain is unbearable. \
             You can reach me at 555-123-4567.",
        )
        .then(
            700,
            SessionEvent::SpeechEnd {
                role: TranscriptRole::Caller,
            },
        )
        .then(
            900,
            SessionEvent::Error {
                message: "media socket closed".to_string(),
            },
        )
}

/// Continuation script after a redial.
fn resumed_call() -> CallScript {
    let session_id = Uuid::new_v4();
    CallScript::new()
        .then(100, SessionEvent::CallStarted { session_id })
        .caller_says(300, "Sorry, I think the line cut out. Did you get my number?")
        .then(
            500,
            SessionEvent::Transcript {
                role: TranscriptRole::Assistant,
                text: "I did. The front desk will call you back within the hour.".to_string(),
                is_final: true,
            },
        )
        .then(
            700,
            SessionEvent::CallEnded {
                outcome: chairside::session::event::CallOutcome::Completed,
            },
        )
}
