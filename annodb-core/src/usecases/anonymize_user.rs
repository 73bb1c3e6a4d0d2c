use super::prelude::*;

/// Replaces the user reference of all comments of a user.
///
/// Without a replacement a fresh random id is used, which unlinks the
/// comments from the user while keeping them grouped together.
/// Returns the id that has been written. The nil id is rejected as
/// replacement, it would turn authored comments into anonymous ones.
pub fn anonymize_user<R: CommentRepository>(
    repo: &R,
    user_id: &IdInput,
    new_user_id: Option<&IdInput>,
) -> Result<Id> {
    let user_id = user_id
        .parse()?
        .filter(|id| !id.is_nil())
        .ok_or(Error::InvalidIdentifier)?;
    let new_user_id = match new_user_id {
        Some(id) => id.generate_or_parse()?,
        None => Id::new(),
    };
    if new_user_id.is_nil() {
        return Err(Error::InvalidIdentifier);
    }
    let count = repo.replace_comment_user_id(&user_id, &new_user_id)?;
    log::info!("Anonymized user of {count} comment(s)");
    Ok(new_user_id)
}
