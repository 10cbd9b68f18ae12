// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV`-Sync (RFC 6578) row classification.

use url::Url;

use crate::contextual_url::resolve;
use crate::error::CalDavError;
use crate::response::Multistatus;
use crate::types::Event;

/// Result of one sync-collection round trip.
///
/// The `sync_token` of one call is the required input to the next; it is the
/// only state a caller must persist to resume incremental sync.
#[derive(Debug, Clone)]
pub struct SyncCollection {
    /// Created or modified resources, in document order.
    ///
    /// The wire cannot distinguish VEVENT from VTODO payloads without
    /// interpreting them, so changes arrive as [`Event`] values; convert
    /// with [`crate::Todo::from`] where VTODO semantics are needed.
    pub changes: Vec<Event>,
    /// URLs of resources deleted since the previous token.
    pub deletions: Vec<Url>,
    /// Token to pass to the next sync call.
    pub sync_token: String,
    /// Whether the server truncated the result and a re-sync is needed.
    pub more: bool,
}

/// Classifies the rows of a sync-collection REPORT response.
///
/// The row whose href denotes the calendar itself carries only the
/// pagination signal (a `507 Insufficient Storage` property status). Every
/// other row is a deletion when its status says `404 Not Found`, a change
/// when it carries calendar data, and is ignored otherwise: some servers
/// emit bodyless rows for resources of a non-matching type, and only rows
/// with an actual payload count as calendar changes.
pub(crate) fn collect(
    calendar_url: &Url,
    multistatus: &Multistatus,
) -> Result<SyncCollection, CalDavError> {
    let calendar_path = calendar_url.path();
    let mut changes = Vec::new();
    let mut deletions = Vec::new();
    let mut more = false;

    for row in &multistatus.responses {
        let row_url = resolve(calendar_url, Some(&row.href))?;
        if row.href == calendar_path || row_url == *calendar_url {
            if row.status_contains("507") {
                more = true;
            }
            continue;
        }

        if row
            .status
            .as_deref()
            .is_some_and(|status| status.contains("404 Not Found"))
        {
            deletions.push(row_url);
        } else {
            let event = Event::from_row(calendar_url, row)?;
            if event.calendar_data().is_some() {
                changes.push(event);
            }
        }
    }

    let sync_token = multistatus.sync_token.clone().ok_or_else(|| {
        CalDavError::InvalidResponse("multistatus did not carry a sync-token".to_string())
    })?;

    Ok(SyncCollection {
        changes,
        deletions,
        sync_token,
        more,
    })
}
