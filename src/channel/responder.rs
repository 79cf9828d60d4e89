//! Single-use reply handles.
//!
//! Every call gets exactly one reply. A `Responder` is consumed by
//! [`Responder::send`]; one dropped without an answer (controller torn down,
//! inbox closed) answers `false` on its own so the host is never left waiting.

use crate::channel::types::Reply;
use crossbeam_channel::{bounded, Receiver};

type ReplyFn = Box<dyn FnOnce(Reply) + Send>;

pub struct Responder {
    method: String,
    reply: Option<ReplyFn>,
}

impl Responder {
    /// Wrap a reply callback.
    pub fn new(method: impl Into<String>, reply: impl FnOnce(Reply) + Send + 'static) -> Self {
        Self {
            method: method.into(),
            reply: Some(Box::new(reply)),
        }
    }

    /// A responder paired with the receiver its reply lands on.
    pub fn channel(method: impl Into<String>) -> (Self, Receiver<Reply>) {
        let (tx, rx) = bounded(1);
        let responder = Self::new(method, move |reply| {
            // The caller may have stopped waiting; that is its business.
            let _ = tx.send(reply);
        });
        (responder, rx)
    }

    /// Name of the method this responder answers.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Deliver the reply.
    pub fn send(mut self, reply: Reply) {
        if let Some(f) = self.reply.take() {
            f(reply);
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(f) = self.reply.take() {
            tracing::debug!(method = %self.method, "request dropped unanswered, replying false");
            f(Reply::Bool(false));
        }
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("method", &self.method)
            .field("answered", &self.reply.is_none())
            .finish()
    }
}
