// Low-level storage access traits.
// Repositories only persist and retrieve already validated
// entities. All input validation happens in the use cases.

use crate::{entities::*, filter::*};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error(transparent)]
    UnsupportedAddressFamily(#[from] UnsupportedAddressFamily),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    /// Selects the zero-based `page` of `per_page` results.
    ///
    /// Without `per_page` all results are selected.
    pub fn page(page: u64, per_page: Option<u64>) -> Self {
        match per_page {
            Some(per_page) => Self {
                offset: Some(page.saturating_mul(per_page)),
                limit: Some(per_page),
            },
            None => Self::default(),
        }
    }
}

/// Validated field changes of a stored comment.
///
/// Absent fields are left untouched.
#[rustfmt::skip]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentChanges {
    pub creation_time : Option<Timestamp>,
    pub edit_time     : Option<Timestamp>,
    pub subject_id    : Option<Id>,
    pub remote_origin : Option<RemoteOrigin>,
    pub user_id       : Option<Id>,
    pub body          : Option<String>,
}

impl CommentChanges {
    pub fn is_empty(&self) -> bool {
        let Self {
            creation_time,
            edit_time,
            subject_id,
            remote_origin,
            user_id,
            body,
        } = self;
        creation_time.is_none()
            && edit_time.is_none()
            && subject_id.is_none()
            && remote_origin.is_none()
            && user_id.is_none()
            && body.is_none()
    }
}

pub trait CommentRepository {
    fn create_comment(&self, comment: &Comment) -> Result<()>;

    // Returns the number of affected comments (0 or 1)
    fn update_comment(&self, id: &Id, changes: &CommentChanges) -> Result<usize>;
    fn delete_comment(&self, id: &Id) -> Result<usize>;

    fn count_comments(&self, filter: &CommentFilter) -> Result<u64>;
    fn search_comments(
        &self,
        filter: &CommentFilter,
        sort: CommentSort,
        pagination: &Pagination,
    ) -> Result<IdCollection<Comment>>;

    fn load_comment(&self, id: &Id) -> Result<Comment> {
        self.search_comments(
            &CommentFilter::new().ids([*id]),
            CommentSort::default(),
            &Pagination::default(),
        )?
        .into_values()
        .into_iter()
        .next()
        .ok_or(Error::NotFound)
    }

    fn replace_comment_user_id(&self, user_id: &Id, new_user_id: &Id) -> Result<usize>;
    fn replace_comment_remote_origin(&self, id: &Id, remote_origin: RemoteOrigin)
        -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_by_page() {
        assert_eq!(Pagination::default(), Pagination::page(3, None));
        assert_eq!(
            Pagination {
                offset: Some(200),
                limit: Some(100)
            },
            Pagination::page(2, Some(100))
        );
        assert_eq!(
            Pagination {
                offset: Some(0),
                limit: Some(10)
            },
            Pagination::page(0, Some(10))
        );
    }

    #[test]
    fn empty_changes() {
        assert!(CommentChanges::default().is_empty());
        assert!(!CommentChanges {
            body: Some(String::new()),
            ..Default::default()
        }
        .is_empty());
    }
}
