use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::Session;
use crate::store::{DocumentStore, Persistence};

/// Outcome of a quick save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickSave {
    /// The bound document was overwritten in place.
    Saved(String),
    /// The session is not bound; the shell should ask for a title and call
    /// [`save_as`].
    NeedsTitle,
}

/// Store the session as a new document titled `title` and bind to it.
pub fn save_as<B: Persistence>(
    store: &mut DocumentStore<B>,
    session: &mut Session,
    title: &str,
) -> Result<CmdResult> {
    let style = Some(session.style()).filter(|style| !style.trim().is_empty());
    let id = store.save_as(title, session.content(), style)?;

    let saved = store.get(&id).cloned();
    if let Some(doc) = &saved {
        session.bind(doc.id.clone(), doc.title.clone());
    }
    session.recompute_dirty(saved.as_ref());

    let mut result = CmdResult::default();
    if let Some(doc) = saved {
        result.add_message(CmdMessage::success(format!("Saved \"{}\"", doc.title)));
        result.affected_documents.push(doc);
    }
    Ok(result)
}

/// Overwrite the bound document with the session's content and style.
pub fn quick_save<B: Persistence>(
    store: &mut DocumentStore<B>,
    session: &mut Session,
) -> Result<QuickSave> {
    let Some(bound_id) = session.bound_id().filter(|id| store.get(id).is_some()) else {
        return Ok(QuickSave::NeedsTitle);
    };
    let bound_id = bound_id.to_string();

    let id = store.quick_save(
        Some(&bound_id),
        session.title(),
        session.content(),
        Some(session.style()),
    )?;
    session.recompute_dirty(store.get(&id));
    Ok(QuickSave::Saved(id))
}
