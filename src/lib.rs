//! Demo integration with the Kryptonim hosted payment form.
//!
//! A [`PaymentLink`](payment_link::PaymentLink) builds the URL of the hosted
//! form, a [`PaymentBrowser`](browser::PaymentBrowser) shows it, and the
//! `kryptonim-demo://` URL the form redirects to on completion is routed
//! through a [`CallbackRouter`](callback::CallbackRouter) and classified as a
//! [`PaymentOutcome`](callback::PaymentOutcome).

#[macro_use]
extern crate lazy_static;

pub mod browser;
pub mod callback;
pub mod cli;
pub mod error;
pub mod payment_link;

pub use error::{Error, Result};
