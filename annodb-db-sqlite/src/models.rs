#![allow(clippy::extra_unused_lifetimes)]

// NOTE:
// All timestamps are stored as unix timestamps in seconds,
// all identifiers and addresses as raw bytes.

use super::schema::*;

#[derive(Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment<'a> {
    pub id: &'a [u8],
    pub creation_time: i64,
    pub edit_time: i64,
    pub subject_id: &'a [u8],
    pub remote_origin: &'a [u8],
    pub user_id: &'a [u8],
    pub body: &'a str,
}

#[derive(Queryable)]
pub struct Comment {
    pub id: Vec<u8>,
    pub creation_time: i64,
    pub edit_time: i64,
    pub subject_id: Vec<u8>,
    pub remote_origin: Vec<u8>,
    pub user_id: Vec<u8>,
    pub body: String,
}

// Absent fields are not touched
#[derive(AsChangeset)]
#[diesel(table_name = comments)]
pub struct CommentChangeset<'a> {
    pub creation_time: Option<i64>,
    pub edit_time: Option<i64>,
    pub subject_id: Option<&'a [u8]>,
    pub remote_origin: Option<Vec<u8>>,
    pub user_id: Option<&'a [u8]>,
    pub body: Option<&'a str>,
}
