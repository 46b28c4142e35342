//! # API Facade
//!
//! [`MarkdraftApi`] is the single value a host (browser shell, desktop app,
//! test) owns. It replaces any notion of global editor state: the store, the
//! session, the version history and the autosave debouncer all live inside
//! it and are only changed through its methods.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** document operations to [`commands`](crate::commands).
//! - **Keeps the pieces consistent**: after every mutation the session's dirty
//!   flag is recomputed against the store and a draft write is scheduled.
//! - **Owns the history rules**: snapshots are recorded only on an explicit
//!   [`save_version`](MarkdraftApi::save_version) or an applied AI edit, and
//!   the history is reset whenever a different document is opened.
//!
//! ## AI Edits
//!
//! Generation is asynchronous and the facade never holds state across the
//! call. The host drives it in three steps:
//!
//! ```text
//! let request = api.begin_ai_edit(range, prompt)?;       // snapshot
//! let text = ai::generate_edit(&generator, &request).await?;
//! api.apply_ai_edit(&request, &text);                    // merge into *current* content
//! ```
//!
//! If generation fails the third step never runs, so session and history are
//! untouched.
//!
//! ## Autosave
//!
//! Mutations schedule a [`Draft`]; the host calls [`tick`](MarkdraftApi::tick)
//! from its event loop and [`close`](MarkdraftApi::close) on teardown. The
//! draft is restored by [`open`](MarkdraftApi::open).
//!
//! ## Testing Strategy
//!
//! Tests here check the wiring between the pieces. The rules of each piece
//! are tested in their own modules.

use crate::ai::{EditRequest, GeminiClient, Merge};
use crate::autosave::{Debouncer, Draft};
use crate::commands::helpers::prompt_excerpt;
use crate::commands::list::DocumentFilter;
use crate::commands::save::QuickSave;
use crate::commands::{self, CmdMessage, CmdResult};
use crate::config::MarkdraftConfig;
use crate::error::{MarkdraftError, Result};
use crate::export::{self, DocumentStats, ExportOptions};
use crate::history::VersionHistory;
use crate::model::UNTITLED;
use crate::session::Session;
use crate::store::{DocumentStore, Persistence, API_KEY_SETTING, DRAFT_SETTING};
use crate::stylesheet::RuleBlock;
use crate::table::{self, TableDraft};
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A markdown file ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExport {
    pub filename: String,
    pub content: String,
}

pub struct MarkdraftApi<B: Persistence> {
    store: DocumentStore<B>,
    session: Session,
    history: VersionHistory,
    autosave: Debouncer<Draft>,
    config: MarkdraftConfig,
    export_options: ExportOptions,
}

impl<B: Persistence> MarkdraftApi<B> {
    /// Open the store and restore the last autosaved draft, if any.
    pub fn open(backend: B, config: MarkdraftConfig) -> Result<Self> {
        let store = DocumentStore::open(backend)?;
        let mut session = Session::with_seed(config.welcome_template(), config.default_title.clone());

        if let Some(draft) = read_draft(&store)? {
            restore_draft(&store, &mut session, draft);
        }
        let bound = session.bound_id().and_then(|id| store.get(id));
        session.recompute_dirty(bound);

        let history = VersionHistory::new(session.content());
        let autosave = Debouncer::new(config.autosave_delay());
        info!(documents = store.len(), "markdraft opened");

        Ok(Self {
            store,
            session,
            history,
            autosave,
            config,
            export_options: ExportOptions::default(),
        })
    }

    // --- Accessors ---

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    pub fn config(&self) -> &MarkdraftConfig {
        &self.config
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(self.session.content())
    }

    // --- Document lifecycle ---

    /// Start a blank, unbound, clean document.
    pub fn new_document(&mut self) -> CmdResult {
        self.session.new_session();
        self.session.set_title(self.config.default_title.clone());
        self.history.reset(String::new());
        self.touch();
        CmdResult::default().with_message(CmdMessage::info("New document"))
    }

    pub fn load_document(&mut self, id: &str) -> Result<CmdResult> {
        let doc = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| MarkdraftError::DocumentNotFound(id.to_string()))?;

        self.session.load(&doc);
        self.history.reset(doc.content.clone());
        self.touch();

        Ok(CmdResult::default()
            .with_message(CmdMessage::success(format!("Opened \"{}\"", doc.title)))
            .with_affected_documents(vec![doc]))
    }

    pub fn edit(&mut self, content: impl Into<String>) {
        self.session.edit(content);
        self.touch();
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.session.set_style(style);
        self.touch();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.session.set_title(title);
        self.touch();
    }

    pub fn save_as(&mut self, title: &str) -> Result<CmdResult> {
        let result = commands::save::save_as(&mut self.store, &mut self.session, title)?;
        self.touch();
        Ok(result)
    }

    pub fn quick_save(&mut self) -> Result<QuickSave> {
        let outcome = commands::save::quick_save(&mut self.store, &mut self.session)?;
        self.touch();
        Ok(outcome)
    }

    pub fn rename(&mut self, id: &str, new_title: &str) -> Result<CmdResult> {
        let result = commands::rename::run(&mut self.store, &mut self.session, id, new_title)?;
        self.touch();
        Ok(result)
    }

    pub fn delete(&mut self, id: &str) -> Result<CmdResult> {
        self.delete_many(&[id])
    }

    pub fn delete_many<I: AsRef<str>>(&mut self, ids: &[I]) -> Result<CmdResult> {
        let result = commands::delete::run(&mut self.store, &mut self.session, ids)?;
        self.touch();
        Ok(result)
    }

    pub fn list(&self, filter: &DocumentFilter) -> CmdResult {
        commands::list::run(&self.store, filter)
    }

    // --- Version history ---

    /// Snapshot the current content. Identical content is not recorded twice.
    pub fn save_version(&mut self, annotation: Option<String>) -> CmdResult {
        if self.history.record(self.session.content(), annotation) {
            CmdResult::default().with_message(CmdMessage::success(format!(
                "Version saved ({})",
                self.history.position_label()
            )))
        } else {
            CmdResult::default().with_message(CmdMessage::info("No changes since this version"))
        }
    }

    /// Step back one version. Returns false at the oldest version.
    pub fn undo(&mut self) -> bool {
        let Some(content) = self.history.undo().map(str::to_string) else {
            return false;
        };
        self.show_version(content);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(content) = self.history.redo().map(str::to_string) else {
            return false;
        };
        self.show_version(content);
        true
    }

    pub fn jump_to_latest(&mut self) -> bool {
        let Some(content) = self.history.jump_to_latest().map(str::to_string) else {
            return false;
        };
        self.show_version(content);
        true
    }

    // --- Styles ---

    pub fn apply_rule(&mut self, selector: &str, properties: &str) -> Result<CmdResult> {
        let result = commands::style::apply_rule(&mut self.session, selector, properties)?;
        self.touch();
        Ok(result)
    }

    /// Apply the inspector editor's text for `selector`.
    pub fn apply_style_edit(&mut self, selector: &str, edited: &str) -> Result<CmdResult> {
        let result = commands::style::apply_edit(&mut self.session, selector, edited)?;
        self.touch();
        Ok(result)
    }

    /// Apply a block from [`ai::generate_rule`](crate::ai::generate_rule).
    pub fn apply_generated_rule(&mut self, block: &RuleBlock) -> Result<CmdResult> {
        let mut result = commands::style::apply_block(&mut self.session, block)?;
        self.touch();
        if let Some(comment) = block.comment.as_deref() {
            let prompt = comment.trim_start_matches("AI Generated:").trim();
            result.messages = vec![CmdMessage::success(format!(
                "AI styles applied: {}",
                prompt_excerpt(prompt)
            ))];
        }
        Ok(result)
    }

    pub fn remove_rule(&mut self, selector: &str) -> Result<CmdResult> {
        let result = commands::style::clear_rule(&mut self.session, selector)?;
        self.touch();
        Ok(result)
    }

    pub fn clear_styles(&mut self) -> CmdResult {
        let result = commands::style::clear_all(&mut self.session);
        self.touch();
        result
    }

    pub fn style_template(&self, selector: &str) -> Result<String> {
        commands::style::style_template(&self.session, selector)
    }

    // --- AI edits ---

    /// Snapshot `range` of the current content for a generation request.
    pub fn begin_ai_edit(&self, range: Range<usize>, prompt: &str) -> Result<EditRequest> {
        EditRequest::capture(self.session.content(), range, prompt)
    }

    /// Merge generated text into the content as it is now and record a
    /// version annotated with the prompt.
    ///
    /// The pre-merge content is recorded first, so one `undo` returns to the
    /// text as it was just before the result landed.
    pub fn apply_ai_edit(&mut self, request: &EditRequest, generated: &str) -> CmdResult {
        let merge = request.merge(self.session.content(), generated);
        let appended = matches!(merge, Merge::Appended(_));

        self.history.record(self.session.content(), None);
        self.session.edit(merge.into_content());
        self.history
            .record(self.session.content(), Some(request.prompt().to_string()));
        self.touch();

        let mut result = CmdResult::default().with_message(CmdMessage::success(format!(
            "AI edit applied: {}",
            prompt_excerpt(request.prompt())
        )));
        if appended {
            result.add_message(CmdMessage::warning(
                "The text changed while generating; the result was added at the end",
            ));
        }
        result
    }

    /// A generation client using the stored or configured key.
    pub fn generator(&self) -> Result<GeminiClient> {
        let key = self
            .api_key()?
            .ok_or_else(|| MarkdraftError::Generation("no API key configured".to_string()))?;
        GeminiClient::new(key, &self.config)
    }

    // --- Tables ---

    /// Replace `range` with `draft`. Returns the cursor offset after it.
    pub fn insert_table(&mut self, range: Range<usize>, draft: &TableDraft) -> Result<usize> {
        let (content, cursor) = table::insert_table(self.session.content(), range, draft)?;
        self.session.edit(content);
        self.touch();
        Ok(cursor)
    }

    // --- Export ---

    pub fn set_export_options(&mut self, options: ExportOptions) {
        self.export_options = options;
    }

    pub fn export_markdown(&self) -> MarkdownExport {
        MarkdownExport {
            filename: export::markdown_filename(self.session.title()),
            content: self.session.content().to_string(),
        }
    }

    pub fn export_html(&self) -> String {
        export::html_document(
            self.display_title(),
            self.session.content(),
            self.session.style(),
            &self.export_options,
        )
    }

    pub fn export_print(&self) -> String {
        export::print_document(
            self.display_title(),
            self.session.content(),
            self.session.style(),
            &self.export_options,
        )
    }

    // --- Settings & autosave ---

    /// The generation key: the stored setting, else the configured one.
    pub fn api_key(&self) -> Result<Option<String>> {
        let stored = self
            .store
            .backend()
            .get_setting(API_KEY_SETTING)?
            .filter(|key| !key.trim().is_empty());
        Ok(stored.or_else(|| self.config.api_key().map(str::to_string)))
    }

    /// Store the generation key; a blank key removes it.
    pub fn set_api_key(&mut self, key: &str) -> Result<CmdResult> {
        let key = key.trim();
        if key.is_empty() {
            self.store.backend().remove_setting(API_KEY_SETTING)?;
            return Ok(CmdResult::default().with_message(CmdMessage::info("API key removed")));
        }
        self.store.backend().set_setting(API_KEY_SETTING, key)?;
        Ok(CmdResult::default().with_message(CmdMessage::success("API key saved")))
    }

    /// Write the pending draft if its delay has elapsed. Returns whether a
    /// write happened.
    /// A failed write leaves the draft pending for the next call.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        let Some(draft) = self.autosave.due(now) else {
            return Ok(false);
        };
        write_draft(&self.store, draft)?;
        self.autosave.cancel();
        Ok(true)
    }

    /// Flush any pending draft. Call on teardown.
    pub fn close(&mut self) -> Result<bool> {
        let Some(draft) = self.autosave.pending() else {
            return Ok(false);
        };
        write_draft(&self.store, draft)?;
        self.autosave.cancel();
        debug!("draft flushed on close");
        Ok(true)
    }

    // --- Internals ---

    fn show_version(&mut self, content: String) {
        self.session.edit(content);
        self.touch();
        debug!(position = %self.history.position_label(), "moved in version history");
    }

    /// Recompute dirty and schedule a draft after any session change.
    fn touch(&mut self) {
        let bound = self
            .session
            .bound_id()
            .and_then(|id| self.store.get(id));
        self.session.recompute_dirty(bound);
        self.autosave.schedule(self.draft(), Instant::now());
    }

    fn draft(&self) -> Draft {
        Draft {
            title: self.session.title().to_string(),
            content: self.session.content().to_string(),
            style: self.session.style().to_string(),
            bound_id: self.session.bound_id().map(str::to_string),
        }
    }

    fn display_title(&self) -> &str {
        let title = self.session.title().trim();
        if title.is_empty() {
            UNTITLED
        } else {
            title
        }
    }
}

fn read_draft<B: Persistence>(store: &DocumentStore<B>) -> Result<Option<Draft>> {
    let Some(raw) = store.backend().get_setting(DRAFT_SETTING)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(draft) => Ok(Some(draft)),
        Err(err) => {
            warn!(%err, "ignoring unreadable draft");
            Ok(None)
        }
    }
}

fn write_draft<B: Persistence>(store: &DocumentStore<B>, draft: &Draft) -> Result<()> {
    let json = serde_json::to_string(draft)?;
    store.backend().set_setting(DRAFT_SETTING, &json)?;
    debug!(bound = ?draft.bound_id, "draft written");
    Ok(())
}

/// Put a draft back into a freshly seeded session. A draft bound to a
/// document that no longer exists comes back unbound.
fn restore_draft<B: Persistence>(store: &DocumentStore<B>, session: &mut Session, draft: Draft) {
    match draft.bound_id.as_deref().and_then(|id| store.get(id)) {
        Some(doc) => session.load(doc),
        None => session.set_title(draft.title),
    }
    session.edit(draft.content);
    session.set_style(draft.style);
    debug!(bound = session.is_bound(), "draft restored");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WELCOME_TEMPLATE;
    use crate::store::mem_backend::MemBackend;
    use std::time::Duration;

    fn api() -> MarkdraftApi<MemBackend> {
        MarkdraftApi::open(MemBackend::new(), MarkdraftConfig::default()).unwrap()
    }

    #[test]
    fn opens_with_welcome_template() {
        let api = api();
        assert_eq!(api.session().content(), WELCOME_TEMPLATE);
        assert_eq!(api.session().title(), "New Document");
        assert!(!api.session().is_dirty());
        assert_eq!(api.history().len(), 1);
    }

    #[test]
    fn edit_marks_dirty_and_save_cleans() {
        let mut api = api();
        api.edit("# Notes");
        assert!(api.session().is_dirty());

        api.save_as("Notes").unwrap();
        assert!(!api.session().is_dirty());
        assert!(api.session().is_bound());

        api.edit("# Notes!");
        assert!(matches!(api.quick_save().unwrap(), QuickSave::Saved(_)));
        assert!(!api.session().is_dirty());
    }

    #[test]
    fn load_resets_history() {
        let mut api = api();
        api.edit("one");
        api.save_version(None);
        let id = api.save_as("Doc").unwrap().affected_documents[0].id.clone();
        assert_eq!(api.history().len(), 2);

        api.load_document(&id).unwrap();
        assert_eq!(api.history().len(), 1);
        assert_eq!(api.history().current().content, "one");
    }

    #[test]
    fn load_unknown_document_fails() {
        let mut api = api();
        assert!(matches!(
            api.load_document("nope"),
            Err(MarkdraftError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn undo_applies_previous_content() {
        let mut api = api();
        api.new_document();
        api.edit("A");
        api.save_version(None);
        api.edit("B");
        api.save_version(None);

        assert!(api.undo());
        assert_eq!(api.session().content(), "A");
        assert!(api.redo());
        assert_eq!(api.session().content(), "B");
        assert!(!api.redo());
        assert!(api.undo() && api.undo());
        assert_eq!(api.session().content(), "");
        assert!(api.jump_to_latest());
        assert_eq!(api.session().content(), "B");
    }

    #[test]
    fn ai_edit_records_annotated_version() {
        let mut api = api();
        api.new_document();
        api.edit("Hello old world");

        let request = api.begin_ai_edit(6..9, "modernize").unwrap();
        let result = api.apply_ai_edit(&request, "new");

        assert_eq!(api.session().content(), "Hello new world");
        assert_eq!(api.history().current().annotation.as_deref(), Some("modernize"));
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn ai_edit_keeps_typed_text_in_history() {
        let mut api = api();
        api.new_document();
        api.edit("Typed paragraph. old");

        let request = api.begin_ai_edit(17..20, "modernize").unwrap();
        api.apply_ai_edit(&request, "new");

        assert_eq!(api.session().content(), "Typed paragraph. new");
        assert!(api.undo());
        assert_eq!(api.session().content(), "Typed paragraph. old");
        assert!(api.undo());
        assert_eq!(api.session().content(), "");
    }

    #[test]
    fn ai_edit_after_concurrent_change_appends() {
        let mut api = api();
        api.new_document();
        api.edit("Hello old world");
        let request = api.begin_ai_edit(6..9, "modernize").unwrap();

        api.edit("Oh. Hello old world");
        let result = api.apply_ai_edit(&request, "new");

        assert_eq!(api.session().content(), "Oh. Hello old world\n\nnew");
        assert_eq!(result.messages[1].level, commands::MessageLevel::Warning);
    }

    #[test]
    fn api_key_prefers_stored_setting() {
        let config = MarkdraftConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        let mut api = MarkdraftApi::open(MemBackend::new(), config).unwrap();
        assert_eq!(api.api_key().unwrap().as_deref(), Some("from-config"));

        api.set_api_key(" stored ").unwrap();
        assert_eq!(api.api_key().unwrap().as_deref(), Some("stored"));

        api.set_api_key("").unwrap();
        assert_eq!(api.api_key().unwrap().as_deref(), Some("from-config"));
    }

    #[test]
    fn generator_requires_key() {
        let api = api();
        assert!(matches!(
            api.generator(),
            Err(MarkdraftError::Generation(_))
        ));
    }

    #[test]
    fn autosave_waits_for_delay() {
        let mut api = api();
        api.edit("draft text");
        let now = Instant::now();

        assert!(!api.tick(now).unwrap());
        assert!(api.tick(now + Duration::from_millis(600)).unwrap());
        assert!(!api.tick(now + Duration::from_secs(5)).unwrap());
    }

    #[test]
    fn failed_draft_write_stays_pending() {
        let mut api = api();
        api.edit("precious draft");
        let later = Instant::now() + Duration::from_millis(600);

        api.store().backend().set_simulate_write_error(true);
        assert!(api.tick(later).is_err());
        assert!(api.close().is_err());

        api.store().backend().set_simulate_write_error(false);
        assert!(api.tick(later).unwrap());
        assert!(!api.close().unwrap());

        let stored = read_draft(api.store()).unwrap().unwrap();
        assert_eq!(stored.content, "precious draft");
    }

    #[test]
    fn insert_table_edits_session_only() {
        let mut api = api();
        api.new_document();
        api.edit("Shopping");

        let mut table = TableDraft::default();
        table.set_cell(0, 0, "Item");
        let cursor = api.insert_table(8..8, &table).unwrap();

        assert_eq!(api.session().content(), format!("Shopping\n\n{}", table.to_markdown()));
        assert_eq!(cursor, api.session().content().len());
        assert_eq!(api.history().len(), 1);
        assert!(api.insert_table(99..99, &table).is_err());
    }

    #[test]
    fn export_uses_session_title() {
        let mut api = api();
        api.set_title("My Notes");
        api.edit("# Hi");
        api.set_style("h1 { color: red; }");

        let md = api.export_markdown();
        assert_eq!(md.filename, "my-notes.md");
        assert_eq!(md.content, "# Hi");
        assert!(api.export_html().contains("h1 { color: red; }"));
        assert!(api.export_print().contains("My Notes - PDF Export"));
    }
}
