use annodb_core::{
    entities::*,
    filter::*,
    repositories::{self as repo, Pagination},
    usecases::{self as uc, CommentUpdate},
};

use super::*;

type Result<T> = std::result::Result<T, uc::Error>;

fn from_connection_err(err: anyhow::Error) -> uc::Error {
    repo::Error::Other(err).into()
}

/// Durable comment storage backed by an SQLite database.
///
/// Every operation is a blocking round trip to the database. Reads
/// may run concurrently, writes are serialized.
#[derive(Clone)]
pub struct CommentStore {
    connections: Connections,
}

impl CommentStore {
    /// Connects to the database at `url`.
    ///
    /// With `install` the schema is created unless it already exists.
    pub fn open(url: &str, pool_size: u32, install: bool) -> Fallible<Self> {
        log::info!("Opening comment store with {pool_size} connection(s)");
        let store = Self {
            connections: Connections::init(url, pool_size)?,
        };
        if install {
            store.install()?;
        }
        Ok(store)
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn install(&self) -> Fallible<()> {
        run_embedded_database_migrations(self.connections.exclusive()?)
    }

    pub fn uninstall(&self) -> Fallible<()> {
        revert_embedded_database_migrations(self.connections.exclusive()?)
    }

    fn shared(&self) -> Result<DbReadOnly> {
        self.connections.shared().map_err(from_connection_err)
    }

    fn exclusive(&self) -> Result<DbReadWrite> {
        self.connections.exclusive().map_err(from_connection_err)
    }

    pub fn create(&self, new_comment: NewComment) -> Result<Comment> {
        uc::create_comment(&self.exclusive()?, new_comment)
    }

    pub fn get(&self, id: impl Into<IdInput>) -> Result<Option<Comment>> {
        uc::get_comment(&self.shared()?, &id.into())
    }

    pub fn update(&self, id: impl Into<IdInput>, update: CommentUpdate) -> Result<()> {
        uc::update_comment(&self.exclusive()?, &id.into(), update)
    }

    pub fn delete(&self, id: impl Into<IdInput>) -> Result<()> {
        uc::delete_comment(&self.exclusive()?, &id.into())
    }

    pub fn count(&self, filter: &CommentFilter) -> Result<u64> {
        uc::count_comments(&self.shared()?, filter)
    }

    pub fn search(
        &self,
        filter: &CommentFilter,
        sort: CommentSort,
        pagination: &Pagination,
    ) -> Result<IdCollection<Comment>> {
        uc::search_comments(&self.shared()?, filter, sort, pagination)
    }

    /// Returns the id that replaced `user_id`.
    pub fn anonymize_user(
        &self,
        user_id: impl Into<IdInput>,
        new_user_id: Option<IdInput>,
    ) -> Result<Id> {
        uc::anonymize_user(&self.exclusive()?, &user_id.into(), new_user_id.as_ref())
    }

    /// Returns the number of updated comments.
    pub fn anonymize_origins<'a>(
        &self,
        comments: impl IntoIterator<Item = &'a Comment>,
    ) -> Result<usize> {
        uc::anonymize_origins(&self.exclusive()?, comments)
    }
}
