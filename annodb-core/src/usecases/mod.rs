use crate::{
    entities::*,
    filter::*,
    repositories::{Error as RepoError, *},
};

mod anonymize_origins;
mod anonymize_user;
mod create_comment;
mod error;
mod update_comment;


type Result<T> = std::result::Result<T, Error>;

pub use self::{
    anonymize_origins::*, anonymize_user::*, create_comment::*, error::Error, update_comment::*,
};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{entities::*, filter::*, repositories::*};
}

/// Loads a single comment.
///
/// An empty or unknown id yields `None`.
pub fn get_comment<R: CommentRepository>(repo: &R, id: &IdInput) -> Result<Option<Comment>> {
    let Some(id) = id.parse()? else {
        return Ok(None);
    };
    match repo.load_comment(&id) {
        Ok(comment) => Ok(Some(comment)),
        Err(RepoError::NotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Deletes a single comment. Deleting a missing comment is not an error.
pub fn delete_comment<R: CommentRepository>(repo: &R, id: &IdInput) -> Result<()> {
    let Some(id) = id.parse()? else {
        log::debug!("No comment to delete");
        return Ok(());
    };
    let count = repo.delete_comment(&id)?;
    debug_assert!(count <= 1);
    if count == 0 {
        log::debug!("Comment {id} did not exist");
    } else {
        log::debug!("Deleted comment {id}");
    }
    Ok(())
}

pub fn count_comments<R: CommentRepository>(repo: &R, filter: &CommentFilter) -> Result<u64> {
    Ok(repo.count_comments(filter)?)
}

pub fn search_comments<R: CommentRepository>(
    repo: &R,
    filter: &CommentFilter,
    sort: CommentSort,
    pagination: &Pagination,
) -> Result<IdCollection<Comment>> {
    Ok(repo.search_comments(filter, sort, pagination)?)
}
