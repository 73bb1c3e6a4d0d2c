use super::prelude::*;

/// Raw, not yet validated changes of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentUpdate {
    pub creation_time: Option<Timestamp>,
    pub edit_time: Option<Timestamp>,
    pub subject_id: Option<IdInput>,
    pub remote_origin: Option<OriginInput>,
    pub user_id: Option<IdInput>,
    pub body: Option<String>,
}

impl CommentUpdate {
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

impl TryFrom<CommentUpdate> for CommentChanges {
    type Error = Error;

    // Same normalization as for new comments
    fn try_from(from: CommentUpdate) -> Result<Self> {
        let CommentUpdate {
            creation_time,
            edit_time,
            subject_id,
            remote_origin,
            user_id,
            body,
        } = from;
        Ok(Self {
            creation_time,
            edit_time,
            subject_id: subject_id.map(|id| id.parse_or_nil()).transpose()?,
            remote_origin: remote_origin.map(|o| o.parse()).transpose()?,
            user_id: user_id.map(|id| id.parse_or_nil()).transpose()?,
            body,
        })
    }
}

/// Applies the given changes to a stored comment.
///
/// If any field changes and no edit time is given the comment is
/// marked as edited now. Updating a missing comment is not an error.
pub fn update_comment<R: CommentRepository>(
    repo: &R,
    id: &IdInput,
    update: CommentUpdate,
) -> Result<()> {
    let id = id.parse()?;
    if update.is_empty() {
        log::debug!("Nothing to update");
        return Ok(());
    }
    let mut changes = CommentChanges::try_from(update)?;
    let Some(id) = id else {
        log::debug!("No comment to update");
        return Ok(());
    };
    changes.edit_time.get_or_insert_with(Timestamp::now);
    let count = repo.update_comment(&id, &changes)?;
    debug_assert!(count <= 1);
    if count == 0 {
        log::debug!("Comment {id} does not exist");
    }
    Ok(())
}
