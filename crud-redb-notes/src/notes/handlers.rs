use chrono::Local;
use redb::ReadableTable;

use crate::{
    store::{self, Store},
    Error, Result,
};

use super::{note_id, NewNote, Note};

pub async fn find_notes(store: Store) -> Result<Vec<Note>> {
    store
        .call(|db| {
            db.with_read(|bucket| {
                bucket
                    .iter()?
                    .map(|entry| -> store::Result<Note> {
                        let (_, value) = entry?;
                        Note::decode(value.value())
                    })
                    .collect::<store::Result<Vec<_>>>()
            })
        })
        .await
        .map_err(Error::from)
}

pub async fn get_note(id: String, store: Store) -> Result<Note> {
    store
        .call(move |db| {
            db.with_read(|bucket| {
                let value = bucket.get(id.as_str())?.ok_or(store::Error::NotFound)?;
                Note::decode(value.value())
            })
        })
        .await
        .map_err(Error::from)
}

pub async fn create_note(new_note: NewNote, store: Store) -> Result<Note> {
    let note = Note::new(note_id(&Local::now()), new_note);

    let stored = note.clone();
    store.call(move |db| put_note(db, &stored)).await?;

    tracing::debug!(id = %note.id, "note created");
    Ok(note)
}

pub async fn delete_note(id: String, store: Store) -> Result<String> {
    let key = id.clone();
    store
        .call(move |db| {
            db.with_write(|bucket| {
                bucket.remove(key.as_str()).map_err(|e| {
                    tracing::warn!("delete of {key} failed: {e}");
                    store::Error::Write("can't delete note".into())
                })?;
                Ok(())
            })
        })
        .await?;

    Ok(format!("deleted note {id}"))
}

pub async fn count_notes(store: Store) -> Result<usize> {
    store
        .call(|db| db.with_read(|bucket| Ok(bucket.iter()?.count())))
        .await
        .map_err(Error::from)
}

/// Stores `note` under its own id, replacing whatever was there.
pub fn put_note(db: &Store, note: &Note) -> store::Result<()> {
    let bytes = note.encode()?;
    db.with_write(|bucket| {
        bucket.insert(note.id.as_str(), bytes.as_slice()).map_err(|e| {
            tracing::warn!("put of {} failed: {e}", note.id);
            store::Error::Write("can't create note".into())
        })?;
        Ok(())
    })
}
