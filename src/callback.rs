//! Custom-scheme callbacks coming back from the payment page.
//!
//! When the hosted form finishes it redirects the browser to a
//! `kryptonim-demo://` URL. The host hands that URL to
//! [`CallbackRouter::open_url`], which forwards it as a [`CallbackEvent`] over
//! a channel to whoever observes the payment.

use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use url::Url;

pub const CALLBACK_SCHEME: &str = "kryptonim-demo";
pub const SUCCESS_URL: &str = "kryptonim-demo://kryptonim.purchase.success";
pub const FAILURE_URL: &str = "kryptonim-demo://kryptonim.purchase.failure";

lazy_static! {
    static ref CALLBACK_URL_SUCCESS: Url = Url::parse(SUCCESS_URL).unwrap();
    static ref CALLBACK_URL_FAILURE: Url = Url::parse(FAILURE_URL).unwrap();
}

/// A single intercepted callback URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEvent {
    url: Url,
}

impl CallbackEvent {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failure,
    Unrecognized,
}

impl PaymentOutcome {
    /// Matches the whole callback URL against the known literals.
    pub fn classify(event: &CallbackEvent) -> PaymentOutcome {
        if event.url == *CALLBACK_URL_SUCCESS {
            PaymentOutcome::Success
        } else if event.url == *CALLBACK_URL_FAILURE {
            PaymentOutcome::Failure
        } else {
            PaymentOutcome::Unrecognized
        }
    }

    /// Whether the payment page has reached a final answer.
    pub fn is_final(self) -> bool {
        self != PaymentOutcome::Unrecognized
    }
}

impl Display for PaymentOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentOutcome::Success => "SUCCESS",
            PaymentOutcome::Failure => "FAILURE",
            PaymentOutcome::Unrecognized => "UNRECOGNIZED",
        };
        f.write_str(s)
    }
}

/// Entry point for URLs the host asks the app to open.
#[derive(Debug, Clone)]
pub struct CallbackRouter {
    sender: Sender<CallbackEvent>,
}

impl CallbackRouter {
    pub fn channel() -> (CallbackRouter, Receiver<CallbackEvent>) {
        let (sender, receiver) = mpsc::channel();
        (CallbackRouter { sender }, receiver)
    }

    /// Publishes `url` when it uses [`CALLBACK_SCHEME`].
    ///
    /// Returns `false` for URLs that belong to some other handler, and when
    /// nobody is listening anymore.
    pub fn open_url(&self, url: &Url) -> bool {
        if url.scheme() != CALLBACK_SCHEME {
            tracing::debug!(url = %url, "ignoring url with foreign scheme");
            return false;
        }

        let event = CallbackEvent { url: url.clone() };
        match self.sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(url = %url, "callback observer is gone");
                false
            }
        }
    }

    /// Same as [`CallbackRouter::open_url`] for raw text; unparsable input is ignored.
    pub fn open_url_str(&self, input: &str) -> bool {
        match Url::parse(input.trim()) {
            Ok(url) => self.open_url(&url),
            Err(e) => {
                tracing::debug!(input, error = %e, "ignoring unparsable url");
                false
            }
        }
    }
}

/// Classifies every event already queued on `receiver`, handing each outcome
/// to `on_outcome`. Returns how many events were handled.
pub fn observe<F>(receiver: &Receiver<CallbackEvent>, mut on_outcome: F) -> usize
where
    F: FnMut(&CallbackEvent, PaymentOutcome),
{
    let mut handled = 0;
    loop {
        match receiver.try_recv() {
            Ok(event) => {
                let outcome = PaymentOutcome::classify(&event);
                tracing::info!(url = %event.url, %outcome, "payment callback");
                on_outcome(&event, outcome);
                handled += 1;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return handled,
        }
    }
}
