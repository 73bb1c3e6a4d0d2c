pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::comment_builder::*;

pub mod comment_builder {

    use super::*;
    use crate::{comment::*, id::*, origin::*, time::*};

    #[derive(Debug)]
    pub struct CommentBuild {
        comment: Comment,
    }

    impl CommentBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.comment.id = id.parse().unwrap();
            self
        }
        pub fn creation_time(mut self, secs: i64) -> Self {
            self.comment.creation_time = Timestamp::from_secs(secs);
            self
        }
        pub fn edit_time(mut self, secs: i64) -> Self {
            self.comment.edit_time = Timestamp::from_secs(secs);
            self
        }
        pub fn subject_id(mut self, id: Id) -> Self {
            self.comment.subject_id = id;
            self
        }
        pub fn user_id(mut self, id: Id) -> Self {
            self.comment.user_id = id;
            self
        }
        pub fn remote_origin(mut self, origin: &str) -> Self {
            self.comment.remote_origin = origin.parse().unwrap();
            self
        }
        pub fn body(mut self, body: &str) -> Self {
            self.comment.body = body.into();
            self
        }
        pub fn finish(self) -> Comment {
            self.comment
        }
    }

    impl Builder for Comment {
        type Build = CommentBuild;
        fn build() -> CommentBuild {
            CommentBuild {
                comment: Comment {
                    id: Id::new(),
                    creation_time: Timestamp::now(),
                    edit_time: Timestamp::ZERO,
                    subject_id: Id::NIL,
                    remote_origin: RemoteOrigin::default(),
                    user_id: Id::NIL,
                    body: String::new(),
                },
            }
        }
    }
}
