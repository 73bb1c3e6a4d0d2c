use super::prelude::*;

/// Validates and stores a new comment.
///
/// Missing fields are filled in with their defaults, i.e. a fresh id,
/// the current time as creation time and the loopback origin.
pub fn create_comment<R: CommentRepository>(repo: &R, new_comment: NewComment) -> Result<Comment> {
    let comment = Comment::try_from(new_comment)?;
    // The insert below still detects collisions that happen in between
    if repo.count_comments(&CommentFilter::new().ids([comment.id]))? > 0 {
        log::warn!("Comment {} already exists", comment.id);
        return Err(Error::IdentifierCollision);
    }
    repo.create_comment(&comment)?;
    log::debug!("Created comment {}", comment.id);
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockDb;
    use super::*;

    #[test]
    fn create_with_defaults() {
        let db = MockDb::default();
        let before = Timestamp::now();
        let comment = create_comment(
            &db,
            NewComment {
                body: "A comment".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!comment.id.is_nil());
        assert!(comment.creation_time >= before);
        assert!(!comment.is_edited());
        assert_eq!(RemoteOrigin::default(), comment.remote_origin);
        assert_eq!(vec![comment], *db.comments.borrow());
    }

    #[test]
    fn create_with_explicit_id() {
        let db = MockDb::default();
        let id = Id::new();
        let comment = create_comment(
            &db,
            NewComment {
                id: Some(id.to_string().into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(id, comment.id);
    }

    #[test]
    fn reject_id_collision() {
        let db = MockDb::default();
        let id = Id::new();
        let new_comment = NewComment {
            id: Some(id.into()),
            body: "first".into(),
            ..Default::default()
        };
        create_comment(&db, new_comment.clone()).unwrap();
        let err = create_comment(
            &db,
            NewComment {
                body: "second".into(),
                ..new_comment
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::IdentifierCollision));
        assert_eq!(1, db.comments.borrow().len());
        assert_eq!("first", db.comments.borrow()[0].body);
    }

    #[test]
    fn reject_invalid_input() {
        let db = MockDb::default();
        let err = create_comment(
            &db,
            NewComment {
                subject_id: Some("not an id".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier));
        let err = create_comment(
            &db,
            NewComment {
                remote_origin: Some("300.1.1.1".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOrigin(_)));
        assert!(db.comments.borrow().is_empty());
    }
}
