// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` client operations.

use std::sync::OnceLock;

use jiff::Timestamp;
use url::Url;
use uuid::Uuid;

use crate::config::Credentials;
use crate::contextual_url::resolve;
use crate::endpoint::{ContentType, DavResponse, Depth, Endpoint, RawResponse};
use crate::error::CalDavError;
use crate::request::{
    CalendarAttributes, CalendarHomeSetRequest, CalendarPatch, CalendarQueryRequest,
    ComponentKind, CurrentUserPrincipalRequest, FreeBusyQueryRequest, ListCalendarsRequest,
    MakeCalendarRequest, SyncCollectionRequest, UpdateCalendarRequest,
};
use crate::response::Multistatus;
use crate::sync::{self, SyncCollection};
use crate::types::{Calendar, ETag, Event, FreeBusy, Todo};

/// `CalDAV` client for accessing and managing calendars, events and to-dos.
///
/// Every public operation issues exactly one blocking network round trip.
/// The resolved principal and calendar-home URLs are memoized per instance;
/// use independent instances for concurrent access.
///
/// # Example
///
/// ```ignore
/// use calendav::{CalDavClient, Credentials};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::fastmail("user@example.com", "app-password")?;
/// let client = CalDavClient::new(credentials)?;
///
/// for calendar in client.list_calendars().await? {
///     println!("{} {:?}", calendar.url, calendar.display_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CalDavClient {
    endpoint: Endpoint,
    credentials: Credentials,
    principal: OnceLock<Url>,
    calendar_home: OnceLock<Url>,
}

impl CalDavClient {
    /// Creates a new `CalDAV` client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(credentials: Credentials) -> Result<Self, CalDavError> {
        let endpoint = Endpoint::new(credentials.clone())?;
        Ok(Self {
            endpoint,
            credentials,
            principal: OnceLock::new(),
            calendar_home: OnceLock::new(),
        })
    }

    /// Checks whether the server advertises `calendar-access` support.
    ///
    /// # Errors
    ///
    /// Returns an error if the OPTIONS request fails.
    pub async fn supports_calendar_access(&self) -> Result<bool, CalDavError> {
        let response = self.endpoint.options(&self.credentials.host).await?;
        let raw = into_raw(response)?;
        Ok(raw.dav.is_some_and(|header| header.contains("calendar-access")))
    }

    /// Discovers the current user's principal URL. Computed once per
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the server omits the property.
    pub async fn principal_url(&self) -> Result<Url, CalDavError> {
        if let Some(url) = self.principal.get() {
            return Ok(url.clone());
        }

        let body = CurrentUserPrincipalRequest::new().build()?;
        let multistatus = into_multistatus(
            self.endpoint
                .propfind(&self.credentials.host, body, Depth::Zero)
                .await?,
        )?;

        let href = multistatus
            .responses
            .iter()
            .find_map(|row| row.ok_props().current_user_principal)
            .ok_or_else(|| {
                CalDavError::InvalidResponse(
                    "server did not return current-user-principal".to_string(),
                )
            })?;
        let url = resolve(&self.credentials.host, Some(&href))?;

        Ok(self.principal.get_or_init(|| url).clone())
    }

    /// Discovers the calendar home collection URL. Computed once per
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the server omits the property.
    pub async fn calendar_home_url(&self) -> Result<Url, CalDavError> {
        if let Some(url) = self.calendar_home.get() {
            return Ok(url.clone());
        }

        let principal = self.principal_url().await?;
        let body = CalendarHomeSetRequest::new().build()?;
        let multistatus =
            into_multistatus(self.endpoint.propfind(&principal, body, Depth::Zero).await?)?;

        let href = multistatus
            .responses
            .iter()
            .find_map(|row| row.ok_props().calendar_home_set)
            .ok_or_else(|| {
                CalDavError::InvalidResponse("server did not return calendar-home-set".to_string())
            })?;
        let url = resolve(&self.credentials.host, Some(&href))?;

        Ok(self.calendar_home.get_or_init(|| url).clone())
    }

    /// Lists the calendar collections under the calendar home.
    ///
    /// A row counts as a calendar when it reports a
    /// supported-calendar-component-set; some servers omit `resourcetype`
    /// details, so the component set is the authoritative test.
    ///
    /// # Errors
    ///
    /// Returns an error if the PROPFIND fails.
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, CalDavError> {
        let home = self.calendar_home_url().await?;
        tracing::debug!(%home, "listing calendars");

        let body = ListCalendarsRequest::all().build()?;
        let multistatus =
            into_multistatus(self.endpoint.propfind(&home, body, Depth::One).await?)?;

        let mut calendars = Vec::new();
        for row in &multistatus.responses {
            if row.ok_props().supported_components.is_none() {
                continue;
            }
            calendars.push(Calendar::from_row(&home, row)?);
        }
        Ok(calendars)
    }

    /// Fetches one calendar collection by URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the PROPFIND fails or returns no rows.
    pub async fn find_calendar(&self, url: &Url) -> Result<Calendar, CalDavError> {
        let body = ListCalendarsRequest::all().build()?;
        let multistatus =
            into_multistatus(self.endpoint.propfind(url, body, Depth::Zero).await?)?;

        let row = multistatus.responses.first().ok_or_else(|| {
            CalDavError::InvalidResponse("empty multistatus for calendar".to_string())
        })?;
        Calendar::from_row(url, row)
    }

    /// Creates a calendar collection under the calendar home and returns its
    /// URL.
    ///
    /// When `identifier` is absent a random one is generated. The collection
    /// URL is `home` joined with the identifier and a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the MKCALENDAR fails.
    pub async fn create_calendar(
        &self,
        identifier: Option<&str>,
        attributes: CalendarAttributes,
    ) -> Result<Url, CalDavError> {
        let home = self.calendar_home_url().await?;
        let generated;
        let identifier = match identifier {
            Some(identifier) => identifier,
            None => {
                generated = Uuid::new_v4().to_string();
                &generated
            }
        };
        let url = merged_url(&home, identifier, true)?;
        tracing::debug!(%url, "creating calendar");

        let body = MakeCalendarRequest::new(attributes).build()?;
        self.endpoint.mkcalendar(&url, body).await?;
        Ok(url)
    }

    /// Updates calendar collection properties; only supplied attributes are
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the PROPPATCH fails.
    pub async fn update_calendar(
        &self,
        url: &Url,
        patch: CalendarPatch,
    ) -> Result<bool, CalDavError> {
        let body = UpdateCalendarRequest::new(patch).build()?;
        self.endpoint.proppatch(url, body).await?;
        Ok(true)
    }

    /// Deletes a calendar collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE fails.
    pub async fn delete_calendar(&self, url: &Url) -> Result<bool, CalDavError> {
        let response = self.endpoint.delete(url, None).await?;
        Ok(delete_succeeded(&response))
    }

    /// Runs one incremental sync round trip against a calendar.
    ///
    /// Pass an empty `sync_token` for the initial sync; afterwards pass the
    /// token from the previous [`SyncCollection`]. An invalid or expired
    /// token surfaces as the server's request error, never as an empty
    /// result.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails or the response carries no new
    /// token.
    pub async fn sync(
        &self,
        calendar_url: &Url,
        sync_token: &str,
    ) -> Result<SyncCollection, CalDavError> {
        tracing::debug!(%calendar_url, initial = sync_token.is_empty(), "synchronizing calendar");
        let body = SyncCollectionRequest::new(sync_token).build()?;
        let multistatus =
            into_multistatus(self.endpoint.report(calendar_url, body, None).await?)?;
        sync::collect(calendar_url, &multistatus)
    }

    /// Lists events in a calendar, optionally filtered to a UTC time range
    /// and optionally with server-side recurrence expansion.
    ///
    /// Rows without a calendar-data payload are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn list_events(
        &self,
        calendar_url: &Url,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        expand_recurrences: bool,
    ) -> Result<Vec<Event>, CalDavError> {
        let request = CalendarQueryRequest::new(ComponentKind::Event)
            .time_range(from, to)
            .expand_recurrences(expand_recurrences);
        let multistatus = into_multistatus(
            self.endpoint
                .report(calendar_url, request.build()?, Some(Depth::One))
                .await?,
        )?;

        let mut events = Vec::new();
        for row in &multistatus.responses {
            let event = Event::from_row(calendar_url, row)?;
            if event.calendar_data().is_none_or(str::is_empty) {
                continue;
            }
            events.push(event);
        }
        Ok(events)
    }

    /// Fetches one event by URL, loading its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the GET fails; a missing resource surfaces as a
    /// 404-class [`CalDavError::Request`].
    pub async fn find_event(&self, url: &Url) -> Result<Event, CalDavError> {
        let raw = into_raw(self.endpoint.get(url).await?)?;
        Ok(Event::new(
            url.clone(),
            Some(raw.body),
            raw.etag.map(ETag::from),
        ))
    }

    /// Creates an event resource inside a calendar and returns it.
    ///
    /// The resource URL is the calendar URL joined with `identifier`; when
    /// the server relocates the resource via a `Location` header, the
    /// relocated URL wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails.
    pub async fn create_event(
        &self,
        calendar_url: &Url,
        identifier: &str,
        ics: &str,
    ) -> Result<Event, CalDavError> {
        let url = merged_url(calendar_url, identifier, false)?;
        let raw = into_raw(
            self.endpoint
                .put(&url, ics.to_string(), ContentType::Ics, None)
                .await?,
        )?;

        let url = match raw.location {
            Some(location) => resolve(calendar_url, Some(&location))?,
            None => url,
        };
        Ok(Event::new(url, None, raw.etag.map(ETag::from)))
    }

    /// Updates an event resource, conditionally when an etag is supplied.
    ///
    /// Returns `None` when the etag no longer matches the stored resource;
    /// the failed optimistic-concurrency check is an expected outcome, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails for any other reason.
    pub async fn update_event(
        &self,
        url: &Url,
        ics: &str,
        etag: Option<&ETag>,
    ) -> Result<Option<Event>, CalDavError> {
        match self
            .endpoint
            .put(url, ics.to_string(), ContentType::Ics, etag)
            .await
        {
            Ok(response) => {
                let raw = into_raw(response)?;
                Ok(Some(Event::new(
                    url.clone(),
                    None,
                    raw.etag.map(ETag::from),
                )))
            }
            Err(CalDavError::Precondition { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Deletes an event resource, conditionally when an etag is supplied.
    ///
    /// Returns `false` when the etag no longer matches the stored resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE fails for any other reason.
    pub async fn delete_event(
        &self,
        url: &Url,
        etag: Option<&ETag>,
    ) -> Result<bool, CalDavError> {
        match self.endpoint.delete(url, etag).await {
            Ok(response) => Ok(delete_succeeded(&response)),
            Err(CalDavError::Precondition { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Lists to-dos in a calendar, optionally filtered to a UTC time range.
    ///
    /// Rows without a calendar-data payload are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn list_todos(
        &self,
        calendar_url: &Url,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Todo>, CalDavError> {
        let request = CalendarQueryRequest::new(ComponentKind::Todo).time_range(from, to);
        let multistatus = into_multistatus(
            self.endpoint
                .report(calendar_url, request.build()?, Some(Depth::One))
                .await?,
        )?;

        let mut todos = Vec::new();
        for row in &multistatus.responses {
            let todo = Todo::from_row(calendar_url, row)?;
            if todo.calendar_data().is_none_or(str::is_empty) {
                continue;
            }
            todos.push(todo);
        }
        Ok(todos)
    }

    /// Fetches one to-do by URL, loading its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the GET fails.
    pub async fn find_todo(&self, url: &Url) -> Result<Todo, CalDavError> {
        let raw = into_raw(self.endpoint.get(url).await?)?;
        Ok(Todo::new(
            url.clone(),
            Some(raw.body),
            raw.etag.map(ETag::from),
        ))
    }

    /// Creates a to-do resource inside a calendar and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails.
    pub async fn create_todo(
        &self,
        calendar_url: &Url,
        identifier: &str,
        ics: &str,
    ) -> Result<Todo, CalDavError> {
        self.create_event(calendar_url, identifier, ics)
            .await
            .map(Todo::from)
    }

    /// Updates a to-do resource, conditionally when an etag is supplied.
    ///
    /// Returns `None` when the etag no longer matches the stored resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails for any other reason.
    pub async fn update_todo(
        &self,
        url: &Url,
        ics: &str,
        etag: Option<&ETag>,
    ) -> Result<Option<Todo>, CalDavError> {
        Ok(self.update_event(url, ics, etag).await?.map(Todo::from))
    }

    /// Deletes a to-do resource, conditionally when an etag is supplied.
    ///
    /// Returns `false` when the etag no longer matches the stored resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE fails for any other reason.
    pub async fn delete_todo(&self, url: &Url, etag: Option<&ETag>) -> Result<bool, CalDavError> {
        self.delete_event(url, etag).await
    }

    /// Queries free/busy information for a calendar over a UTC time range.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn free_busy(
        &self,
        calendar_url: &Url,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<FreeBusy, CalDavError> {
        let body = FreeBusyQueryRequest::new(from, to).build()?;
        let raw = into_raw(
            self.endpoint
                .report(calendar_url, body, Some(Depth::Zero))
                .await?,
        )?;
        Ok(FreeBusy::new(calendar_url.clone(), raw.body))
    }
}

fn delete_succeeded(response: &DavResponse) -> bool {
    match response {
        DavResponse::Raw(raw) => raw.status.is_success(),
        DavResponse::Xml(_) | DavResponse::MultiStatus(_) => true,
    }
}

/// Joins a collection URL and a child identifier.
fn merged_url(base: &Url, identifier: &str, collection: bool) -> Result<Url, CalDavError> {
    let mut merged = format!("{}/{}", base.as_str().trim_end_matches('/'), identifier);
    if collection && !merged.ends_with('/') {
        merged.push('/');
    }
    Ok(Url::parse(&merged)?)
}

fn into_multistatus(response: DavResponse) -> Result<Multistatus, CalDavError> {
    match response {
        DavResponse::MultiStatus(multistatus) => Ok(multistatus),
        DavResponse::Raw(_) | DavResponse::Xml(_) => Err(CalDavError::InvalidResponse(
            "expected a multistatus response".to_string(),
        )),
    }
}

fn into_raw(response: DavResponse) -> Result<RawResponse, CalDavError> {
    match response {
        DavResponse::Raw(raw) => Ok(raw),
        DavResponse::Xml(_) | DavResponse::MultiStatus(_) => Err(CalDavError::InvalidResponse(
            "expected an empty or calendar-data response".to_string(),
        )),
    }
}
