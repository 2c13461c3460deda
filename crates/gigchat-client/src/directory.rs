//! Conversation directory: navigation-driven auto-selection.
//!
//! When the view is entered with a target job and counterpart user, the
//! fetched directory is scanned once for the conversation they identify.
//! The scan never overrides an existing selection, and only an unambiguous
//! match selects.

use tracing::debug;

use gigchat_shared::protocol::Conversation;
use gigchat_shared::types::{JobId, UserId};

use crate::client::NavTarget;
use crate::state::ChatState;

/// Resolve the conversation the navigation params point at, if the scan
/// should run at all: nothing selected yet and both params present.
pub(crate) fn navigation_target<'a>(
    state: &'a ChatState,
    nav: &NavTarget,
) -> Option<&'a Conversation> {
    if state.selected.is_some() {
        return None;
    }
    let (job_id, other_user_id) = match (nav.job_id, nav.other_user_id) {
        (Some(job_id), Some(other_user_id)) => (job_id, other_user_id),
        _ => return None,
    };
    unique_match(&state.conversations, job_id, other_user_id)
}

/// Find the conversation for `job_id` whose client/freelancer pair contains
/// `other_user_id`. Zero or multiple candidates leave the selection alone.
pub(crate) fn unique_match(
    conversations: &[Conversation],
    job_id: JobId,
    other_user_id: UserId,
) -> Option<&Conversation> {
    let mut candidates = conversations
        .iter()
        .filter(|c| c.job_id == Some(job_id) && c.has_participant(other_user_id));

    let first = candidates.next()?;
    if candidates.next().is_some() {
        debug!(
            job = %job_id,
            user = %other_user_id,
            "Navigation params match multiple conversations, leaving selection empty"
        );
        return None;
    }
    Some(first)
}
