//! Application-level events used to coordinate UI actions.

use crate::composer::Attachment;

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// The chat call settled. On failure this carries the fixed fallback
    /// reply, so the UI never needs a failure-specific branch.
    AssistantReply(String),

    /// Result of the startup health probe.
    HealthResult(bool),

    /// An image finished encoding into a data URI and can join the
    /// composer's attachment set.
    AttachmentReady(Attachment),

    /// An image could not be read or encoded. Dropped silently; this event
    /// only keeps the pending-encode counter honest.
    AttachmentFailed,

    /// The 2-second "copied" acknowledgment for the given sequence id ran
    /// out.
    CopyAckExpired(u64),
}
