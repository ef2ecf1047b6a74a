mod tables;

use std::{
    fs::{File, OpenOptions},
    path::Path,
    sync::Arc,
};

use redb::{Database, ReadOnlyTable, ReadTransaction, ReadableTable, Table, TableError, WriteTransaction};

use tables::{NOTES, NOTES_BUCKET, NOTES_TABLE, ROOT};

pub type Result<T> = std::result::Result<T, Error>;

/// The `NOTES` bucket as seen from inside a write transaction.
pub type Bucket<'txn> = Table<'txn, &'static str, &'static [u8]>;

/// The `NOTES` bucket as seen from inside a read transaction.
pub type ReadBucket = ReadOnlyTable<&'static str, &'static [u8]>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        source: redb::Error,
    },
    #[error("can't access notes")]
    Access,
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("can't find note")]
    NotFound,
    #[error("{0}")]
    Write(String),
}

impl Error {
    pub fn store(context: &'static str, source: impl Into<redb::Error>) -> Self {
        Self::Store {
            context,
            source: source.into(),
        }
    }
}

macro_rules! store_errors {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for Error {
                fn from(error: $error) -> Self {
                    Self::store("store transaction failed", error)
                }
            }
        )*
    };
}

store_errors!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Shared handle to the notes file.
///
/// Cloning is cheap; every clone refers to the same open database, which stays
/// locked for the lifetime of the last clone.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Opens the store at `path`, creating the file with owner-only
    /// permissions when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = open_file(path.as_ref()).map_err(|e| Error::store("could not open db", redb::Error::Io(e)))?;
        let db = Database::builder()
            .create_file(file)
            .map_err(|e| Error::store("could not open db", e))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Creates `DB` and its nested `NOTES` bucket when missing. Existing
    /// buckets and their contents are left untouched.
    pub fn ensure_schema(&self) -> Result<()> {
        self.create_buckets()
            .map_err(|e| Error::store("could not set up database", e))
    }

    fn create_buckets(&self) -> std::result::Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut root = txn.open_table(ROOT)?;
            if root.get(NOTES_BUCKET)?.is_none() {
                root.insert(NOTES_BUCKET, NOTES_TABLE)?;
            }
            txn.open_table(NOTES)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Runs `f` against a read snapshot of the `NOTES` bucket.
    pub fn with_read<T>(&self, f: impl FnOnce(&ReadBucket) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_read()?;
        let bucket = open_notes(&txn)?;
        f(&bucket)
    }

    /// Runs `f` inside a write transaction on the `NOTES` bucket.
    ///
    /// The transaction commits when `f` returns `Ok`; any error rolls back
    /// every mutation `f` made.
    pub fn with_write<T>(&self, f: impl FnOnce(&mut Bucket<'_>) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_write()?;
        let result = open_notes_mut(&txn).and_then(|mut bucket| f(&mut bucket));

        match result {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(error) => {
                txn.abort()?;
                Err(error)
            }
        }
    }

    /// Runs a blocking store closure on the blocking thread pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| Error::store("store task failed", redb::Error::Io(std::io::Error::other(e))))?
    }
}

fn open_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

fn open_notes(txn: &ReadTransaction) -> Result<ReadBucket> {
    let root = txn.open_table(ROOT).map_err(missing_bucket)?;
    if root.get(NOTES_BUCKET)?.is_none() {
        return Err(Error::Access);
    }
    txn.open_table(NOTES).map_err(missing_bucket)
}

// Opening a table in a write transaction creates it, so the registration in
// `DB` is what decides whether the bucket exists. A failed check aborts the
// transaction and with it anything the lookup created.
fn open_notes_mut(txn: &WriteTransaction) -> Result<Bucket<'_>> {
    {
        let root = txn.open_table(ROOT)?;
        if root.get(NOTES_BUCKET)?.is_none() {
            return Err(Error::Access);
        }
    }
    Ok(txn.open_table(NOTES)?)
}

fn missing_bucket(error: TableError) -> Error {
    match error {
        TableError::TableDoesNotExist(_) => Error::Access,
        error => error.into(),
    }
}

/// Opens the store and makes sure the bucket hierarchy exists.
pub fn init_store(path: impl AsRef<Path>) -> Result<Store> {
    let path = path.as_ref();
    let store = Store::open(path)?;
    store.ensure_schema()?;

    tracing::info!(path = %path.display(), "notes store ready");

    Ok(store)
}

#[cfg(test)]
pub fn init_test_store() -> Result<Store> {
    let db = Database::builder()
        .create_with_backend(redb::backends::InMemoryBackend::new())
        .map_err(|e| Error::store("could not open db", e))?;

    let store = Store { db: Arc::new(db) };
    store.ensure_schema()?;

    Ok(store)
}
