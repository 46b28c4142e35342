use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::Session;
use crate::store::{DocumentStore, Persistence};

/// Retitle document `id`. The session follows when it is bound to it.
///
/// An unknown id is not an error: nothing is written and an info message is
/// returned.
pub fn run<B: Persistence>(
    store: &mut DocumentStore<B>,
    session: &mut Session,
    id: &str,
    new_title: &str,
) -> Result<CmdResult> {
    if !store.rename(id, new_title)? {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "No document with id {}",
            id
        ))));
    }

    let mut result = CmdResult::default();
    if let Some(doc) = store.get(id).cloned() {
        if session.bound_id() == Some(id) {
            session.set_title(doc.title.clone());
        }
        result.add_message(CmdMessage::success(format!("Renamed to \"{}\"", doc.title)));
        result.affected_documents.push(doc);
    }
    Ok(result)
}
