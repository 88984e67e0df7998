//! Release note composition from merged request metadata.
//!
//! A release is bounded by the two most recent merged requests carrying the
//! release label. Every request merged between those two boundaries that
//! names a ticket in its title contributes one line:
//!
//! ```text
//! ABC-123 - Fix login redirect - `bug` `frontend`
//! ```
use log::*;
use regex::Regex;
use std::sync::LazyLock;

use crate::{
    config::ReleaseNotesConfig,
    error::{ReleaseBuilderError, Result},
    forge::{
        manager::ForgeManager,
        request::{ListMergeRequestsRequest, MergeRequest},
    },
};

/// Ticket reference as written in a title, brackets included when present.
static TICKET_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[?[a-zA-Z]+-[0-9]+\]?").unwrap());

/// Bare ticket id.
static TICKET_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]+-[0-9]+").unwrap());

/// A ticket reference found in a merge request title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRef<'a> {
    /// Reference exactly as it appears, e.g. `[ABC-123]`.
    pub token: &'a str,
    /// Reference without brackets, e.g. `ABC-123`.
    pub id: &'a str,
}

/// Find the first ticket reference in `title`.
pub fn find_ticket(title: &str) -> Option<TicketRef<'_>> {
    let token = TICKET_TOKEN_REGEX.find(title)?.as_str();
    let id = TICKET_ID_REGEX.find(token)?.as_str();
    Some(TicketRef { token, id })
}

/// Text after the last occurrence of `target` in `value`, without a leading
/// `" - "` separator and surrounding whitespace.
///
/// Only the separator right after `target` is dropped; any `" - "` further
/// into the suffix is kept, so `"[ABC-1] Fix thing - Some Title"` yields
/// `"Fix thing - Some Title"`.
pub fn substring_after<'a>(value: &'a str, target: &str) -> &'a str {
    let Some(pos) = value.rfind(target) else {
        return "";
    };

    let rest = &value[pos + target.len()..];

    rest.strip_prefix(" - ").unwrap_or(rest).trim()
}

/// Render labels as back-tick quoted, space separated tokens.
pub fn format_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("`{label}`"))
        .collect::<Vec<String>>()
        .join(" ")
}

/// One note line for a merge request, or `None` when its title names no
/// ticket.
pub fn note_line(mr: &MergeRequest) -> Option<String> {
    let ticket = find_ticket(&mr.title)?;
    let title = substring_after(&mr.title, ticket.token);

    Some(format!(
        "{} - {} - {}\n",
        ticket.id,
        title,
        format_labels(&mr.labels)
    ))
}

/// Release note for the given merge requests, in order.
pub fn build_release_note(merge_requests: &[MergeRequest]) -> String {
    merge_requests
        .iter()
        .filter_map(|mr| {
            let line = note_line(mr);
            if line.is_none() {
                debug!("skipping !{} without ticket: {}", mr.iid, mr.title);
            }
            line
        })
        .collect()
}

/// Compose the release note for the release currently being cut.
pub async fn compose(
    forge: &ForgeManager,
    config: &ReleaseNotesConfig,
) -> Result<String> {
    info!("composing release note");

    let boundaries = forge
        .list_merged_merge_requests(ListMergeRequestsRequest {
            target_branch: config.target_branch.clone(),
            labels: vec![config.label.clone()],
            ..Default::default()
        })
        .await?;

    let (current, previous) = match boundaries.as_slice() {
        [current, previous, ..] => (current, previous),
        _ => {
            return Err(ReleaseBuilderError::MissingReleaseBoundary {
                label: config.label.clone(),
                branch: config.target_branch.clone(),
                found: boundaries.len(),
            });
        }
    };

    let merged_at = |mr: &MergeRequest| {
        mr.merged_at.ok_or_else(|| {
            ReleaseBuilderError::forge(format!(
                "release boundary !{} has no merge timestamp",
                mr.iid
            ))
        })
    };

    let after = merged_at(previous)?;
    let before = merged_at(current)?;

    info!(
        "collecting merged requests between !{} ({after}) and !{} ({before})",
        previous.iid, current.iid
    );

    let merge_requests = forge
        .list_merged_merge_requests(ListMergeRequestsRequest {
            target_branch: config.target_branch.clone(),
            labels: vec![],
            updated_after: Some(after),
            updated_before: Some(before),
        })
        .await?;

    Ok(build_release_note(&merge_requests))
}

#[cfg(test)]
mod tests;
