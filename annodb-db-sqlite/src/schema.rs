///////////////////////////////////////////////////////////////////////
// Comments
///////////////////////////////////////////////////////////////////////

table! {
    comments (id) {
        id -> Binary,
        creation_time -> BigInt,
        edit_time -> BigInt,
        subject_id -> Binary,
        remote_origin -> Binary,
        user_id -> Binary,
        body -> Text,
    }
}
