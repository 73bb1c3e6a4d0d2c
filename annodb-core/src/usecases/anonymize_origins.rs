use super::prelude::*;

/// Replaces the remote origin of each given comment by its
/// anonymized network prefix.
///
/// The comments are updated one after another. A failure leaves
/// the preceding updates in place. Returns the number of updated
/// comments.
pub fn anonymize_origins<'a, R, I>(repo: &R, comments: I) -> Result<usize>
where
    R: CommentRepository,
    I: IntoIterator<Item = &'a Comment>,
{
    let mut count = 0;
    for comment in comments {
        let anonymized = comment.remote_origin.anonymized();
        count += repo.replace_comment_remote_origin(&comment.id, anonymized)?;
    }
    log::info!("Anonymized remote origin of {count} comment(s)");
    Ok(count)
}
