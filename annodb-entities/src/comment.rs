use thiserror::Error;

use crate::{collection::*, id::*, origin::*, time::*};

/// A short, attributable annotation of some subject.
///
/// `subject_id` and `user_id` are loose references: they are never
/// checked against the referenced entities. [`Id::NIL`] means "not set".
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id            : Id,
    pub creation_time : Timestamp,
    // Timestamp::ZERO if never edited
    pub edit_time     : Timestamp,
    pub subject_id    : Id,
    pub remote_origin : RemoteOrigin,
    pub user_id       : Id,
    pub body          : String,
}

impl Comment {
    /// Maximum number of characters in the body that can be stored.
    pub const BODY_MAX_LEN: usize = 128;

    pub fn is_edited(&self) -> bool {
        !self.edit_time.is_zero()
    }

    /// Comments with the same id denote the same logical comment,
    /// regardless of their other fields.
    pub fn is_same(&self, other: &Comment) -> bool {
        self.id == other.id
    }
}

impl HasId for Comment {
    fn id(&self) -> &Id {
        &self.id
    }
}

/// Raw, not yet validated fields of a comment.
///
/// Absent fields are filled in with defaults during construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewComment {
    pub id: Option<IdInput>,
    pub creation_time: Option<Timestamp>,
    pub edit_time: Option<Timestamp>,
    pub subject_id: Option<IdInput>,
    pub remote_origin: Option<OriginInput>,
    pub user_id: Option<IdInput>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentInvalidation {
    #[error(transparent)]
    Identifier(#[from] InvalidIdentifier),
    #[error(transparent)]
    Origin(#[from] InvalidOrigin),
}

impl TryFrom<NewComment> for Comment {
    type Error = CommentInvalidation;

    fn try_from(from: NewComment) -> Result<Self, Self::Error> {
        let NewComment {
            id,
            creation_time,
            edit_time,
            subject_id,
            remote_origin,
            user_id,
            body,
        } = from;
        let id = match id {
            Some(id) => id.generate_or_parse()?,
            None => Id::new(),
        };
        let subject_id = subject_id
            .map(|id| id.parse_or_nil())
            .transpose()?
            .unwrap_or(Id::NIL);
        let user_id = user_id
            .map(|id| id.parse_or_nil())
            .transpose()?
            .unwrap_or(Id::NIL);
        let remote_origin = remote_origin
            .map(|origin| origin.parse())
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            id,
            creation_time: creation_time.unwrap_or_else(Timestamp::now),
            edit_time: edit_time.unwrap_or(Timestamp::ZERO),
            subject_id,
            remote_origin,
            user_id,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_with_defaults() {
        let before = Timestamp::now();
        let comment = Comment::try_from(NewComment::default()).unwrap();
        assert!(!comment.id.is_nil());
        assert!(comment.creation_time >= before);
        assert_eq!(Timestamp::ZERO, comment.edit_time);
        assert!(!comment.is_edited());
        assert_eq!(Id::NIL, comment.subject_id);
        assert_eq!(Id::NIL, comment.user_id);
        assert_eq!(RemoteOrigin::default(), comment.remote_origin);
        assert_eq!("", comment.body);
    }

    #[test]
    fn construct_with_all_fields() {
        let id = Id::new();
        let subject_id = Id::new();
        let user_id = Id::new();
        let comment = Comment::try_from(NewComment {
            id: Some(id.to_string().into()),
            creation_time: Some(Timestamp::from_secs(1_111_111_111)),
            edit_time: Some(Timestamp::from_secs(1_234_567_890)),
            subject_id: Some((*subject_id.as_bytes()).into()),
            remote_origin: Some("1.2.3.4".into()),
            user_id: Some(user_id.into()),
            body: "text".into(),
        })
        .unwrap();
        assert_eq!(id, comment.id);
        assert_eq!(Timestamp::from_secs(1_111_111_111), comment.creation_time);
        assert_eq!(Timestamp::from_secs(1_234_567_890), comment.edit_time);
        assert!(comment.is_edited());
        assert_eq!(subject_id, comment.subject_id);
        assert_eq!(user_id, comment.user_id);
        assert_eq!("1.2.3.4".parse::<RemoteOrigin>().unwrap(), comment.remote_origin);
        assert_eq!("text", comment.body);
    }

    #[test]
    fn empty_references_are_nil() {
        let comment = Comment::try_from(NewComment {
            id: Some("".into()),
            subject_id: Some("".into()),
            user_id: Some(Vec::<u8>::new().into()),
            ..Default::default()
        })
        .unwrap();
        assert!(!comment.id.is_nil());
        assert!(comment.subject_id.is_nil());
        assert!(comment.user_id.is_nil());
    }

    #[test]
    fn reject_invalid_ids() {
        for field in 0..3 {
            let invalid = Some(IdInput::from("$%^~"));
            let mut new_comment = NewComment::default();
            match field {
                0 => new_comment.id = invalid,
                1 => new_comment.subject_id = invalid,
                _ => new_comment.user_id = invalid,
            }
            assert_eq!(
                Err(CommentInvalidation::Identifier(InvalidIdentifier)),
                Comment::try_from(new_comment)
            );
        }
    }

    #[test]
    fn reject_invalid_origin() {
        let err = Comment::try_from(NewComment {
            remote_origin: Some("localhost".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CommentInvalidation::Origin(_)));
    }

    #[test]
    fn same_id_means_same_comment() {
        let c1 = Comment::try_from(NewComment::default()).unwrap();
        let c2 = Comment {
            body: "other".into(),
            ..c1.clone()
        };
        assert!(c1.is_same(&c2));
        assert_ne!(c1, c2);
    }
}
