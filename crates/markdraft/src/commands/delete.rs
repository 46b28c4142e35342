use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::session::Session;
use crate::store::{DocumentStore, Persistence};
use tracing::debug;

/// Delete every document in `ids`. Unknown ids are skipped.
///
/// If the session is bound to one of the deleted documents it is unbound and
/// keeps its content, so the text survives as an unsaved draft.
pub fn run<B: Persistence, I: AsRef<str>>(
    store: &mut DocumentStore<B>,
    session: &mut Session,
    ids: &[I],
) -> Result<CmdResult> {
    let doomed: Vec<_> = store
        .list()
        .iter()
        .filter(|doc| ids.iter().any(|id| id.as_ref() == doc.id))
        .cloned()
        .collect();

    if doomed.is_empty() {
        return Ok(CmdResult::default().with_message(CmdMessage::info("No documents to delete")));
    }

    store.delete_many(ids)?;

    let bound_deleted = session
        .bound_id()
        .is_some_and(|bound| doomed.iter().any(|doc| doc.id == bound));
    if bound_deleted {
        debug!("bound document deleted, session unbound");
        session.unbind();
        session.recompute_dirty(None);
    }

    let mut result = CmdResult::default();
    let message = match doomed.as_slice() {
        [doc] => format!("Deleted \"{}\"", doc.title),
        many => format!("Deleted {} documents", many.len()),
    };
    result.add_message(CmdMessage::success(message));
    if bound_deleted {
        result.add_message(CmdMessage::warning(
            "The open document was deleted; its content is kept as an unsaved draft",
        ));
    }
    Ok(result.with_affected_documents(doomed))
}
