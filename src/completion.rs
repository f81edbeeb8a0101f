//! One-shot completion handles.
//!
//! Motions, avatar steps and walk scripts hand their caller a [`Completion`]
//! that the frame tick fulfils through the matching [`CompletionSender`].
//! The pair is a bounded crossbeam channel of capacity one, so resolving
//! never blocks and a dropped receiver is harmless.
//!
//! Nothing here waits: the runtime is cooperative, so holders poll the
//! handle once per tick (see [`Completion::poll`]).

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

/// Create a connected sender/handle pair.
pub fn completion<T>() -> (CompletionSender<T>, Completion<T>) {
    let (tx, rx) = bounded(1);
    (
        CompletionSender { tx },
        Completion {
            rx,
            value: None,
            resolved: false,
            abandoned: false,
        },
    )
}

/// Fulfilling side, owned by whoever runs the work.
#[derive(Debug)]
pub struct CompletionSender<T> {
    tx: Sender<T>,
}

impl<T> CompletionSender<T> {
    /// Resolve the paired handle. Consumes the sender so it can fire once.
    pub fn resolve(self, value: T) {
        // The caller may have dropped its handle; that is not an error.
        let _ = self.tx.send(value);
    }
}

/// Poll state of a [`Completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Still in flight.
    Pending,
    /// Resolved with a value.
    Resolved,
    /// The sender was dropped without resolving (its entity went away).
    Abandoned,
}

/// Caller-visible deferred result.
#[derive(Debug)]
pub struct Completion<T> {
    rx: Receiver<T>,
    value: Option<T>,
    resolved: bool,
    abandoned: bool,
}

impl<T> Completion<T> {
    /// Pull the result from the channel if it has arrived.
    pub fn poll(&mut self) -> CompletionState {
        if self.resolved {
            return CompletionState::Resolved;
        }
        if self.abandoned {
            return CompletionState::Abandoned;
        }
        match self.rx.try_recv() {
            Ok(value) => {
                self.value = Some(value);
                self.resolved = true;
                CompletionState::Resolved
            }
            Err(TryRecvError::Empty) => CompletionState::Pending,
            Err(TryRecvError::Disconnected) => {
                self.abandoned = true;
                CompletionState::Abandoned
            }
        }
    }

    /// True once the result is available.
    pub fn is_resolved(&mut self) -> bool {
        self.poll() == CompletionState::Resolved
    }

    /// True when the work finished one way or another.
    pub fn is_finished(&mut self) -> bool {
        self.poll() != CompletionState::Pending
    }

    /// Borrow the result, if resolved.
    pub fn value(&mut self) -> Option<&T> {
        self.poll();
        self.value.as_ref()
    }

    /// Take the result out of the handle, if resolved.
    pub fn take(&mut self) -> Option<T> {
        self.poll();
        self.value.take()
    }
}

/// A completion that is already resolved. Used for requests that finish
/// synchronously (instant moves).
pub fn resolved<T>(value: T) -> Completion<T> {
    let (tx, rx) = completion();
    tx.resolve(value);
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_until_resolved() {
        let (tx, mut rx) = completion::<u32>();
        assert_eq!(rx.poll(), CompletionState::Pending);
        assert!(!rx.is_finished());
        tx.resolve(7);
        assert!(rx.is_resolved());
        assert_eq!(rx.value(), Some(&7));
        // Stays resolved after being observed.
        assert_eq!(rx.poll(), CompletionState::Resolved);
    }

    #[test]
    fn test_dropped_sender_is_abandoned() {
        let (tx, mut rx) = completion::<u32>();
        drop(tx);
        assert_eq!(rx.poll(), CompletionState::Abandoned);
        assert!(rx.is_finished());
        assert!(!rx.is_resolved());
        assert!(rx.take().is_none());
    }

    #[test]
    fn test_resolve_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = completion::<u32>();
        drop(rx);
        tx.resolve(1);
    }

    #[test]
    fn test_take_moves_value_out() {
        let mut rx = resolved(String::from("done"));
        assert_eq!(rx.take().as_deref(), Some("done"));
        assert!(rx.take().is_none());
        assert!(rx.is_resolved());
    }
}
