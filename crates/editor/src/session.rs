//! Edit/save sessions.
//!
//! An [`EditSession`] holds one open document: its body, frontmatter, live
//! TOC and save status. A [`Session`] owns the process-wide editor state
//! (edit mode, navigation tree, the open document) and is passed explicitly to
//! whatever needs it.
//!
//! Saving is split into [`EditSession::begin_save`], [`SaveJob::run`] and
//! [`EditSession::finish_save`] so a caller can run the I/O elsewhere while
//! the session keeps accepting edits. [`EditSession::save`] does all three.

use crate::config::SiteConfig;
use crate::error::{EditorError, StoreError};
use crate::images::{ImageUpload, upload_image};
use crate::navigation::NavigationTree;
use crate::pages::{CreatedPage, LoadedDocument, NewPage, create_page, load_document};
use crate::path::DocPath;
use crate::store::{ContentStore, ImageStore, NavigationStore, persist_navigation};
use docsmith_core::{Frontmatter, SourceDocument, Slugger, TocEntry, extract_with};
use docsmith_render::{RenderError, RenderedDocument, Renderer};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Save state machine: `Idle -> Saving -> {Saved, Error} -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A save job has been issued and not yet finished.
    Saving,
    /// The last save fully succeeded.
    Saved,
    /// The last save failed, in whole or in part.
    Error,
}

/// Current save state plus its message and settle time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    state: SaveState,
    message: Option<String>,
    settled_at: Option<Instant>,
    display: Duration,
}

impl SaveStatus {
    /// Idle status whose settled states last `display`.
    pub fn new(display: Duration) -> Self {
        Self {
            state: SaveState::Idle,
            message: None,
            settled_at: None,
            display,
        }
    }

    /// Current state, without applying the auto-revert.
    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Message of the last settled save.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Reverts `Saved`/`Error` to `Idle` once the display interval has passed
    /// and returns the resulting state.
    pub fn refresh(&mut self, now: Instant) -> SaveState {
        if let Some(settled_at) = self.settled_at
            && now.saturating_duration_since(settled_at) >= self.display
        {
            self.reset();
        }
        self.state
    }

    fn reset(&mut self) {
        self.state = SaveState::Idle;
        self.message = None;
        self.settled_at = None;
    }

    fn start(&mut self) {
        self.reset();
        self.state = SaveState::Saving;
    }

    fn settle(&mut self, state: SaveState, message: String, now: Instant) {
        self.state = state;
        self.message = Some(message);
        self.settled_at = Some(now);
    }
}

/// The I/O half of a save: everything needed to write the document and the
/// navigation tree, detached from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveJob {
    /// Edit session that issued the job.
    pub session_id: Uuid,
    /// Document being saved.
    pub path: DocPath,
    /// Serialized document.
    pub raw: String,
    /// Navigation tree as it was when the save began.
    pub navigation: NavigationTree,
}

impl SaveJob {
    /// Writes the document and the navigation tree concurrently.
    ///
    /// Both writes are always attempted; neither failure cancels the other.
    pub async fn run(
        &self,
        content: &dyn ContentStore,
        navigation: &dyn NavigationStore,
    ) -> SaveReport {
        let (content_result, navigation_result) = tokio::join!(
            content.write(&self.path, &self.raw),
            persist_navigation(navigation, &self.navigation)
        );
        if let Err(err) = &content_result {
            log::error!("Failed to save document {}: {err}", self.path);
        }
        if let Err(err) = &navigation_result {
            log::error!("Failed to save navigation: {err}");
        }
        SaveReport {
            session_id: self.session_id,
            path: self.path.clone(),
            content: content_result,
            navigation: navigation_result.map(|_| ()),
        }
    }
}

/// Outcome of both halves of a [`SaveJob`].
#[derive(Debug)]
pub struct SaveReport {
    /// Edit session that issued the job.
    pub session_id: Uuid,
    /// Document that was saved.
    pub path: DocPath,
    /// Content write result.
    pub content: Result<(), StoreError>,
    /// Navigation write result. A skipped empty tree counts as success.
    pub navigation: Result<(), StoreError>,
}

impl SaveReport {
    /// Returns true if both writes succeeded.
    pub fn is_success(&self) -> bool {
        self.content.is_ok() && self.navigation.is_ok()
    }

    /// Every failure message, joined with `; `.
    pub fn failure_message(&self) -> Option<String> {
        let mut messages = Vec::new();
        if let Err(err) = &self.content {
            messages.push(format!("Failed to save document: {err}"));
        }
        if let Err(err) = &self.navigation {
            messages.push(format!("Failed to save navigation: {err}"));
        }
        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

/// One open document.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: Uuid,
    path: DocPath,
    href: String,
    document: SourceDocument,
    toc: Vec<TocEntry>,
    status: SaveStatus,
    dedupe_anchor_ids: bool,
}

impl EditSession {
    /// Session over a loaded document.
    pub fn new(
        loaded: LoadedDocument,
        docs_route: &str,
        status_display: Duration,
        dedupe_anchor_ids: bool,
    ) -> Self {
        let href = loaded.path.href(docs_route);
        let mut session = Self {
            id: Uuid::new_v4(),
            path: loaded.path,
            href,
            document: loaded.document,
            toc: Vec::new(),
            status: SaveStatus::new(status_display),
            dedupe_anchor_ids,
        };
        session.refresh_toc();
        session
    }

    /// Identifies this session in the jobs it issues. Reopening a document
    /// yields a new id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Document path.
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Public URL of the document; the key of its navigation link.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Current body.
    pub fn body(&self) -> &str {
        &self.document.body
    }

    /// Current frontmatter.
    pub fn frontmatter(&self) -> &Frontmatter {
        &self.document.frontmatter
    }

    /// Headings of the current body.
    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    /// Save status.
    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Applies the status auto-revert.
    pub fn refresh_status(&mut self, now: Instant) -> SaveState {
        self.status.refresh(now)
    }

    /// Replaces the body and re-derives the TOC. Never fails.
    pub fn on_body_change(&mut self, body: impl Into<String>) -> &[TocEntry] {
        self.document.body = body.into();
        self.refresh_toc();
        &self.toc
    }

    fn refresh_toc(&mut self) {
        let mut slugger = Slugger::with_dedupe(self.dedupe_anchor_ids);
        self.toc = extract_with(&self.document.body, &mut slugger);
    }

    /// Sets one frontmatter field.
    pub fn set_frontmatter_field(&mut self, key: impl Into<String>, value: JsonValue) {
        self.document.frontmatter.insert(key.into(), value);
    }

    /// Removes one frontmatter field, keeping the order of the rest.
    pub fn remove_frontmatter_field(&mut self, key: &str) -> Option<JsonValue> {
        self.document.frontmatter.shift_remove(key)
    }

    /// Frontmatter `title`, if it is a string.
    pub fn title(&self) -> Option<&str> {
        self.document.title()
    }

    /// Sets the frontmatter `title`.
    pub fn set_title(&mut self, title: &str) {
        self.set_frontmatter_field("title", JsonValue::String(title.to_string()));
    }

    /// Joins frontmatter and body into file contents.
    pub fn serialize(&self) -> Result<String, EditorError> {
        Ok(self.document.to_raw()?)
    }

    /// Starts a save.
    ///
    /// Returns `None` without side effects while a save is already in flight.
    /// A `Saved` or `Error` status is cleared first. If the document cannot be
    /// serialized the status goes straight to `Error` and no job is returned.
    pub fn begin_save(&mut self, navigation: &NavigationTree, now: Instant) -> Option<SaveJob> {
        if self.status.state == SaveState::Saving {
            log::debug!("Save of {} already in flight; ignoring trigger", self.path);
            return None;
        }
        self.status.start();
        match self.serialize() {
            Ok(raw) => Some(SaveJob {
                session_id: self.id,
                path: self.path.clone(),
                raw,
                navigation: navigation.clone(),
            }),
            Err(err) => {
                log::error!("Failed to serialize {}: {err}", self.path);
                self.status.settle(
                    SaveState::Error,
                    format!("Failed to save document: {err}"),
                    now,
                );
                None
            }
        }
    }

    /// Settles the status from a finished job issued by this session.
    ///
    /// Reports from any other session are ignored and `None` is returned.
    pub fn finish_save(&mut self, report: &SaveReport, now: Instant) -> Option<SaveState> {
        if report.session_id != self.id {
            log::debug!(
                "Dropping save report for {} from session {}",
                report.path,
                report.session_id
            );
            return None;
        }
        match report.failure_message() {
            Some(message) => self.status.settle(SaveState::Error, message, now),
            None => {
                log::info!("Saved {}", self.path);
                self.status
                    .settle(SaveState::Saved, "Document saved".to_string(), now);
            }
        }
        Some(self.status.state)
    }

    /// Runs a whole save and returns the settled state, or `None` if a save
    /// was already in flight.
    pub async fn save(
        &mut self,
        content: &dyn ContentStore,
        navigation_store: &dyn NavigationStore,
        navigation: &NavigationTree,
    ) -> Option<SaveState> {
        if self.status.state == SaveState::Saving {
            return None;
        }
        let Some(job) = self.begin_save(navigation, Instant::now()) else {
            return Some(self.status.state);
        };
        let report = job.run(content, navigation_store).await;
        self.finish_save(&report, Instant::now())
    }

    /// Renders the current body.
    pub fn preview(&self, renderer: &Renderer) -> Result<RenderedDocument, RenderError> {
        renderer.render(&self.document.body)
    }
}

/// Editor state shared by every view: edit mode, navigation tree and the
/// currently open document.
#[derive(Debug, Clone)]
pub struct Session {
    editing: bool,
    navigation: NavigationTree,
    navigation_error: Option<String>,
    document: Option<EditSession>,
    docs_route: String,
    status_display: Duration,
    dedupe_anchor_ids: bool,
    allowed_image_types: Vec<String>,
}

impl Session {
    /// Fresh session: not editing, empty navigation, no document.
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            editing: false,
            navigation: NavigationTree::default(),
            navigation_error: None,
            document: None,
            docs_route: config.docs_route.clone(),
            status_display: config.save_status_display(),
            dedupe_anchor_ids: config.render.dedupe_anchor_ids,
            allowed_image_types: config.allowed_image_types.clone(),
        }
    }

    /// Whether edit mode is on.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Turns edit mode on or off.
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// The in-memory navigation tree.
    pub fn navigation(&self) -> &NavigationTree {
        &self.navigation
    }

    /// Mutable navigation tree. Changes are persisted by the next save.
    pub fn navigation_mut(&mut self) -> &mut NavigationTree {
        &mut self.navigation
    }

    /// Message of the last failed navigation load.
    pub fn navigation_error(&self) -> Option<&str> {
        self.navigation_error.as_deref()
    }

    /// Loads the navigation tree. On failure the tree is emptied and the
    /// error kept for display.
    pub async fn load_navigation(&mut self, store: &dyn NavigationStore) -> &NavigationTree {
        match store.load().await {
            Ok(tree) => {
                self.navigation = tree;
                self.navigation_error = None;
            }
            Err(err) => {
                log::error!("Failed to load navigation: {err}");
                self.navigation = NavigationTree::default();
                self.navigation_error = Some(err.to_string());
            }
        }
        &self.navigation
    }

    /// Loads `path` and makes it the open document. Any previous edit session
    /// is discarded, including unsaved edits.
    pub async fn open(
        &mut self,
        store: &dyn ContentStore,
        path: &DocPath,
    ) -> Result<&mut EditSession, EditorError> {
        self.close_document();
        let loaded = load_document(store, path).await?;
        Ok(self.open_document(loaded))
    }

    /// Makes an already loaded document the open one.
    pub fn open_document(&mut self, loaded: LoadedDocument) -> &mut EditSession {
        let session = EditSession::new(
            loaded,
            &self.docs_route,
            self.status_display,
            self.dedupe_anchor_ids,
        );
        self.document.insert(session)
    }

    /// Drops the open document.
    pub fn close_document(&mut self) {
        if let Some(document) = self.document.take() {
            log::debug!("Closing {}", document.path());
        }
    }

    /// The open document.
    pub fn document(&self) -> Option<&EditSession> {
        self.document.as_ref()
    }

    /// The open document, mutably.
    pub fn document_mut(&mut self) -> Option<&mut EditSession> {
        self.document.as_mut()
    }

    /// Sets the open document's title and renames its navigation links.
    ///
    /// Returns how many navigation nodes were renamed, or `None` with no
    /// document open.
    pub fn set_display_name(&mut self, name: &str) -> Option<usize> {
        let document = self.document.as_mut()?;
        document.set_title(name);
        Some(self.navigation.rename(document.href(), name))
    }

    /// Starts saving the open document together with the navigation tree.
    pub fn begin_save(&mut self, now: Instant) -> Option<SaveJob> {
        self.document.as_mut()?.begin_save(&self.navigation, now)
    }

    /// Applies a finished job to the open document. Reports issued by an
    /// edit session that has since been closed are dropped, even when the
    /// same document was reopened.
    pub fn finish_save(&mut self, report: &SaveReport, now: Instant) -> Option<SaveState> {
        match self.document.as_mut() {
            Some(document) => document.finish_save(report, now),
            None => {
                log::debug!("Dropping save report for {}; document no longer open", report.path);
                None
            }
        }
    }

    /// Saves the open document and the navigation tree.
    pub async fn save(
        &mut self,
        content: &dyn ContentStore,
        navigation_store: &dyn NavigationStore,
    ) -> Option<SaveState> {
        let document = self.document.as_mut()?;
        document
            .save(content, navigation_store, &self.navigation)
            .await
    }

    /// Creates a page and adopts the resulting navigation tree.
    pub async fn create_page(
        &mut self,
        content: &dyn ContentStore,
        navigation_store: &dyn NavigationStore,
        page: &NewPage,
    ) -> Result<CreatedPage, EditorError> {
        let created = create_page(content, navigation_store, page, &self.docs_route).await?;
        self.navigation = created.navigation.clone();
        Ok(created)
    }

    /// Uploads an image with the configured type allow-list.
    pub async fn upload_image(
        &self,
        store: &dyn ImageStore,
        upload: &ImageUpload,
    ) -> Result<String, EditorError> {
        upload_image(store, upload, &self.allowed_image_types).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationNode;

    fn loaded(raw: &str) -> LoadedDocument {
        let document = SourceDocument::parse(raw).unwrap();
        LoadedDocument {
            path: DocPath::parse("guide/setup").unwrap(),
            toc: docsmith_core::extract(&document.body),
            document,
        }
    }

    fn edit_session(raw: &str) -> EditSession {
        EditSession::new(loaded(raw), "/docs", Duration::from_secs(3), false)
    }

    fn ok_report(job: &SaveJob) -> SaveReport {
        SaveReport {
            session_id: job.session_id,
            path: job.path.clone(),
            content: Ok(()),
            navigation: Ok(()),
        }
    }

    #[test]
    fn body_change_rederives_toc() {
        let mut session = edit_session("---\ntitle: Setup\n---\n# Setup\n");
        let toc = session.on_body_change("# Hello World\n\ntext\n## Sub Heading");
        let ids: Vec<_> = toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["hello-world", "sub-heading"]);
        assert_eq!(session.href(), "/docs/guide/setup");
    }

    #[test]
    fn second_trigger_while_saving_is_noop() {
        let mut session = edit_session("# A\n");
        let now = Instant::now();
        assert!(session.begin_save(&NavigationTree::default(), now).is_some());
        assert_eq!(session.status().state(), SaveState::Saving);
        assert!(session.begin_save(&NavigationTree::default(), now).is_none());
    }

    #[test]
    fn job_carries_serialized_document() {
        let mut session = edit_session("---\ntitle: Old\n---\nBody\n");
        session.set_title("New");
        let job = session
            .begin_save(&NavigationTree::default(), Instant::now())
            .unwrap();
        assert_eq!(job.raw, "---\ntitle: New\n---\nBody\n");
    }

    #[test]
    fn partial_failure_is_error_with_both_messages() {
        let mut session = edit_session("# A\n");
        let now = Instant::now();
        let job = session.begin_save(&NavigationTree::default(), now).unwrap();
        let report = SaveReport {
            session_id: job.session_id,
            path: job.path.clone(),
            content: Err(StoreError::InvalidPath("x".into())),
            navigation: Err(StoreError::NotFound("navigation.json".into())),
        };
        assert_eq!(session.finish_save(&report, now), Some(SaveState::Error));
        assert_eq!(
            session.status().message(),
            Some(
                "Failed to save document: invalid document path `x`; \
                 Failed to save navigation: not found: navigation.json"
            )
        );
    }

    #[test]
    fn settled_status_reverts_after_display_interval() {
        let mut session = edit_session("# A\n");
        let start = Instant::now();
        let job = session.begin_save(&NavigationTree::default(), start).unwrap();
        assert_eq!(
            session.finish_save(&ok_report(&job), start),
            Some(SaveState::Saved)
        );
        assert_eq!(
            session.refresh_status(start + Duration::from_secs(1)),
            SaveState::Saved
        );
        assert_eq!(
            session.refresh_status(start + Duration::from_secs(3)),
            SaveState::Idle
        );
        assert_eq!(session.status().message(), None);
    }

    #[test]
    fn saving_never_auto_reverts() {
        let mut session = edit_session("# A\n");
        let start = Instant::now();
        session.begin_save(&NavigationTree::default(), start);
        assert_eq!(
            session.refresh_status(start + Duration::from_secs(60)),
            SaveState::Saving
        );
    }

    #[test]
    fn display_name_updates_title_and_navigation() {
        let mut session = Session::new(&SiteConfig::default());
        *session.navigation_mut() =
            NavigationTree::new(vec![NavigationNode::link("Setup", "/docs/guide/setup")]);
        assert_eq!(session.set_display_name("Install"), None);

        session.open_document(loaded("---\ntitle: Setup\n---\n"));
        assert_eq!(session.set_display_name("Install"), Some(1));
        assert_eq!(session.document().unwrap().title(), Some("Install"));
        assert_eq!(
            session.navigation().display_name("/docs/guide/setup"),
            Some("Install")
        );
    }

    #[test]
    fn stale_report_is_dropped() {
        let mut session = Session::new(&SiteConfig::default());
        session.open_document(loaded("# A\n"));
        let job = session.begin_save(Instant::now()).unwrap();
        session.close_document();
        assert!(session.finish_save(&ok_report(&job), Instant::now()).is_none());
    }

    #[test]
    fn report_from_before_reopen_is_dropped() {
        let mut session = Session::new(&SiteConfig::default());
        let now = Instant::now();
        session.open_document(loaded("# A\n"));
        let first = session.begin_save(now).unwrap();
        session.close_document();

        session.open_document(loaded("# A\n"));
        let second = session.begin_save(now).unwrap();
        assert_ne!(first.session_id, second.session_id);

        assert_eq!(session.finish_save(&ok_report(&first), now), None);
        assert_eq!(
            session.document().unwrap().status().state(),
            SaveState::Saving
        );
        assert!(session.begin_save(now).is_none());

        assert_eq!(
            session.finish_save(&ok_report(&second), now),
            Some(SaveState::Saved)
        );
    }

    #[test]
    fn preview_renders_current_body() {
        let mut session = edit_session("# A\n");
        session.on_body_change("## Fresh");
        let renderer = Renderer::new(&Default::default());
        let rendered = session.preview(&renderer).unwrap();
        assert_eq!(rendered.toc[0].id, "fresh");
    }
}
