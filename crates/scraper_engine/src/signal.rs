//! Operator interrupt handling.
//!
//! Interrupts are forwarded into a channel so the cancellation logic can be
//! driven by anything that sends `()`, not only a real signal.

use std::io;

use engine_logging::engine_info;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Starts listening for SIGINT (Ctrl+C elsewhere) and forwards every
/// occurrence into the returned channel.
///
/// Must be called inside a tokio runtime. Once registered, interrupts no
/// longer terminate the process on their own.
#[cfg(unix)]
pub fn interrupt_channel() -> io::Result<mpsc::UnboundedReceiver<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            engine_info!("Received SIGINT signal (Ctrl+C)");
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    Ok(rx)
}

#[cfg(not(unix))]
pub fn interrupt_channel() -> io::Result<mpsc::UnboundedReceiver<()>> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    engine_info!("Received Ctrl+C signal");
                    if tx.send(()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    engine_logging::engine_error!("Failed to listen for Ctrl+C signal: {}", err);
                    break;
                }
            }
        }
    });
    Ok(rx)
}

/// Cancels `token` on the first interrupt and calls `on_first` exactly once.
///
/// Later interrupts are absorbed: cancelling an already cancelled token is a
/// no-op. Returns when the interrupt channel closes.
pub async fn cancel_on<F>(
    mut interrupts: mpsc::UnboundedReceiver<()>,
    token: CancellationToken,
    on_first: F,
) where
    F: FnOnce(),
{
    let mut on_first = Some(on_first);
    while interrupts.recv().await.is_some() {
        if let Some(notify) = on_first.take() {
            notify();
        } else {
            engine_info!("interrupt received again; shutdown already in progress");
        }
        token.cancel();
    }
}
