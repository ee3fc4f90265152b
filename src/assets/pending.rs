//! Image loads shared between every registration of the same source path.

use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use super::image::Image;

/// Outcome of a finished load as seen by the registrations waiting on it.
///
/// The error is reduced to its message because only the registration that started the load owns the original error.
pub(crate) type SharedOutcome = Result<Rc<Image>, String>;

/// Load in flight, started by one registration and awaited by any others.
#[derive(Default)]
pub(crate) struct PendingLoad {
    /// Set once the load finished.
    outcome: Option<SharedOutcome>,
    /// Registrations waiting for the outcome.
    wakers: Vec<Waker>,
}

impl PendingLoad {
    /// Create a new shared pending load.
    pub(crate) fn new_shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Store the outcome and wake everything waiting for it.
    ///
    /// Only the first outcome is kept.
    pub(crate) fn finish(&mut self, outcome: SharedOutcome) {
        if self.outcome.is_some() {
            return;
        }

        self.outcome = Some(outcome);
        self.wakers.drain(..).for_each(Waker::wake);
    }

    /// Whether an outcome is already known.
    pub(crate) const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Future resolving when a load started elsewhere finishes.
pub(crate) struct WaitForLoad(pub(crate) Rc<RefCell<PendingLoad>>);

impl Future for WaitForLoad {
    type Output = SharedOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut pending = self.0.borrow_mut();

        if let Some(outcome) = &pending.outcome {
            return Poll::Ready(outcome.clone());
        }

        // Avoid growing the list when polled repeatedly by the same task
        if !pending
            .wakers
            .iter()
            .any(|waker| waker.will_wake(cx.waker()))
        {
            pending.wakers.push(cx.waker().clone());
        }

        Poll::Pending
    }
}
