use super::*;

use diesel::{dsl::count_star, sql_types::Bool, sqlite::Sqlite};

impl<'a> CommentRepository for DbReadWrite<'a> {
    fn create_comment(&self, comment: &Comment) -> Result<()> {
        create_comment(&mut self.conn.borrow_mut(), comment)
    }
    fn update_comment(&self, id: &Id, changes: &CommentChanges) -> Result<usize> {
        update_comment(&mut self.conn.borrow_mut(), id, changes)
    }
    fn delete_comment(&self, id: &Id) -> Result<usize> {
        delete_comment(&mut self.conn.borrow_mut(), id)
    }
    fn count_comments(&self, filter: &CommentFilter) -> Result<u64> {
        count_comments(&mut self.conn.borrow_mut(), filter)
    }
    fn search_comments(
        &self,
        filter: &CommentFilter,
        sort: CommentSort,
        pagination: &Pagination,
    ) -> Result<IdCollection<Comment>> {
        search_comments(&mut self.conn.borrow_mut(), filter, sort, pagination)
    }
    fn load_comment(&self, id: &Id) -> Result<Comment> {
        load_comment(&mut self.conn.borrow_mut(), id)
    }
    fn replace_comment_user_id(&self, user_id: &Id, new_user_id: &Id) -> Result<usize> {
        replace_comment_user_id(&mut self.conn.borrow_mut(), user_id, new_user_id)
    }
    fn replace_comment_remote_origin(
        &self,
        id: &Id,
        remote_origin: RemoteOrigin,
    ) -> Result<usize> {
        replace_comment_remote_origin(&mut self.conn.borrow_mut(), id, remote_origin)
    }
}

impl<'a> CommentRepository for DbReadOnly<'a> {
    fn create_comment(&self, _comment: &Comment) -> Result<()> {
        unreachable!();
    }
    fn update_comment(&self, _id: &Id, _changes: &CommentChanges) -> Result<usize> {
        unreachable!();
    }
    fn delete_comment(&self, _id: &Id) -> Result<usize> {
        unreachable!();
    }
    fn count_comments(&self, filter: &CommentFilter) -> Result<u64> {
        count_comments(&mut self.conn.borrow_mut(), filter)
    }
    fn search_comments(
        &self,
        filter: &CommentFilter,
        sort: CommentSort,
        pagination: &Pagination,
    ) -> Result<IdCollection<Comment>> {
        search_comments(&mut self.conn.borrow_mut(), filter, sort, pagination)
    }
    fn load_comment(&self, id: &Id) -> Result<Comment> {
        load_comment(&mut self.conn.borrow_mut(), id)
    }
    fn replace_comment_user_id(&self, _user_id: &Id, _new_user_id: &Id) -> Result<usize> {
        unreachable!();
    }
    fn replace_comment_remote_origin(
        &self,
        _id: &Id,
        _remote_origin: RemoteOrigin,
    ) -> Result<usize> {
        unreachable!();
    }
}

type CommentPredicate = Box<dyn BoxableExpression<schema::comments::table, Sqlite, SqlType = Bool>>;

fn id_bytes(ids: &[Id]) -> Vec<Vec<u8>> {
    ids.iter().map(|id| id.as_bytes().to_vec()).collect()
}

// Wildcards in the search text must match literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn comment_predicates(filter: &CommentFilter) -> Vec<CommentPredicate> {
    use schema::comments::dsl;
    let mut predicates: Vec<CommentPredicate> = Vec::with_capacity(filter.criteria().len());
    for criterion in filter.criteria() {
        match criterion {
            Criterion::Ids(ids) => {
                predicates.push(Box::new(dsl::id.eq_any(id_bytes(ids))));
            }
            Criterion::Created(cutoff) => {
                // Since (inclusive)
                if let Some(after) = cutoff.after {
                    predicates.push(Box::new(dsl::creation_time.ge(after.as_secs())));
                }
                // Until (exclusive)
                if let Some(before) = cutoff.before {
                    predicates.push(Box::new(dsl::creation_time.lt(before.as_secs())));
                }
            }
            Criterion::Edited(cutoff) => {
                if let Some(after) = cutoff.after {
                    predicates.push(Box::new(dsl::edit_time.ge(after.as_secs())));
                }
                if let Some(before) = cutoff.before {
                    predicates.push(Box::new(dsl::edit_time.lt(before.as_secs())));
                }
            }
            Criterion::SubjectIds(ids) => {
                predicates.push(Box::new(dsl::subject_id.eq_any(id_bytes(ids))));
            }
            Criterion::RemoteOrigins(prefixes) => {
                // Packed origins of a prefix form a contiguous range
                let any_prefix = prefixes
                    .iter()
                    .map(|prefix| {
                        let (lower, upper) = prefix.packed_range();
                        Box::new(dsl::remote_origin.between(lower.to_vec(), upper.to_vec()))
                            as CommentPredicate
                    })
                    .reduce(|lhs, rhs| Box::new(lhs.or(rhs)) as CommentPredicate);
                if let Some(any_prefix) = any_prefix {
                    predicates.push(any_prefix);
                }
            }
            Criterion::UserIds(ids) => {
                predicates.push(Box::new(dsl::user_id.eq_any(id_bytes(ids))));
            }
            Criterion::BodyContains(text) => {
                let pattern = format!("%{}%", escape_like(text));
                predicates.push(Box::new(dsl::body.like(pattern).escape('\\')));
            }
        }
    }
    predicates
}

fn load_comment_row(row: models::Comment) -> Result<Comment> {
    let models::Comment {
        id,
        creation_time,
        edit_time,
        subject_id,
        remote_origin,
        user_id,
        body,
    } = row;
    Ok(Comment {
        id: load_id(&id)?,
        creation_time: Timestamp::from_secs(creation_time),
        edit_time: Timestamp::from_secs(edit_time),
        subject_id: load_id(&subject_id)?,
        remote_origin: RemoteOrigin::from_packed(&remote_origin)?,
        user_id: load_id(&user_id)?,
        body,
    })
}

fn create_comment(conn: &mut SqliteConnection, comment: &Comment) -> Result<()> {
    let remote_origin = comment.remote_origin.to_packed();
    let new_comment = models::NewComment {
        id: comment.id.as_bytes(),
        creation_time: comment.creation_time.as_secs(),
        edit_time: comment.edit_time.as_secs(),
        subject_id: comment.subject_id.as_bytes(),
        remote_origin: &remote_origin,
        user_id: comment.user_id.as_bytes(),
        body: &comment.body,
    };
    let _count = diesel::insert_into(schema::comments::table)
        .values(&new_comment)
        .execute(conn)
        .map_err(from_diesel_err)?;
    debug_assert_eq!(1, _count);
    Ok(())
}

fn update_comment(conn: &mut SqliteConnection, id: &Id, changes: &CommentChanges) -> Result<usize> {
    use schema::comments::dsl;
    if changes.is_empty() {
        return Ok(0);
    }
    let CommentChanges {
        creation_time,
        edit_time,
        subject_id,
        remote_origin,
        user_id,
        body,
    } = changes;
    let changeset = models::CommentChangeset {
        creation_time: creation_time.map(Timestamp::as_secs),
        edit_time: edit_time.map(Timestamp::as_secs),
        subject_id: subject_id.as_ref().map(|id| &id.as_bytes()[..]),
        remote_origin: remote_origin.map(|origin| origin.to_packed().to_vec()),
        user_id: user_id.as_ref().map(|id| &id.as_bytes()[..]),
        body: body.as_deref(),
    };
    let count = diesel::update(schema::comments::table.filter(dsl::id.eq(&id.as_bytes()[..])))
        .set(&changeset)
        .execute(conn)
        .map_err(from_diesel_err)?;
    debug_assert!(count <= 1);
    Ok(count)
}

fn delete_comment(conn: &mut SqliteConnection, id: &Id) -> Result<usize> {
    use schema::comments::dsl;
    let count = diesel::delete(schema::comments::table.filter(dsl::id.eq(&id.as_bytes()[..])))
        .execute(conn)
        .map_err(from_diesel_err)?;
    debug_assert!(count <= 1);
    Ok(count)
}

fn load_comment(conn: &mut SqliteConnection, id: &Id) -> Result<Comment> {
    use schema::comments::dsl;
    let row = schema::comments::table
        .filter(dsl::id.eq(&id.as_bytes()[..]))
        .first::<models::Comment>(conn)
        .map_err(from_diesel_err)?;
    load_comment_row(row)
}

fn count_comments(conn: &mut SqliteConnection, filter: &CommentFilter) -> Result<u64> {
    if filter.matches_nothing() {
        return Ok(0);
    }
    let mut query = schema::comments::table.select(count_star()).into_boxed();
    for predicate in comment_predicates(filter) {
        query = query.filter(predicate);
    }
    let count = query.get_result::<i64>(conn).map_err(from_diesel_err)?;
    debug_assert!(count >= 0);
    Ok(count as u64)
}

fn search_comments(
    conn: &mut SqliteConnection,
    filter: &CommentFilter,
    sort: CommentSort,
    pagination: &Pagination,
) -> Result<IdCollection<Comment>> {
    use schema::comments::dsl;
    if filter.matches_nothing() {
        return Ok(IdCollection::new());
    }
    if filter.is_empty() && pagination.limit.is_none() {
        log::warn!("Loading all comments without any restriction");
    }

    let mut query = schema::comments::table.into_boxed();
    for predicate in comment_predicates(filter) {
        query = query.filter(predicate);
    }

    // Ties are broken by the id in the same direction
    query = match (sort.key, sort.order) {
        (SortKey::CreationTime, SortOrder::Ascending) => query
            .order_by(dsl::creation_time.asc())
            .then_order_by(dsl::id.asc()),
        (SortKey::CreationTime, SortOrder::Descending) => query
            .order_by(dsl::creation_time.desc())
            .then_order_by(dsl::id.desc()),
        (SortKey::Id, SortOrder::Ascending) => query.order_by(dsl::id.asc()),
        (SortKey::Id, SortOrder::Descending) => query.order_by(dsl::id.desc()),
    };

    // Pagination
    let Ok(offset) = i64::try_from(pagination.offset.unwrap_or(0)) else {
        // No table can hold that many rows
        return Ok(IdCollection::new());
    };
    // SQLite does not support an OFFSET without a LIMIT
    // <https://www.sqlite.org/lang_select.html>
    if let Some(limit) = pagination.limit {
        query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        // Optional OFFSET
        if offset > 0 {
            query = query.offset(offset);
        }
    } else if offset > 0 {
        // Mandatory LIMIT
        query = query.limit(i64::MAX);
        query = query.offset(offset);
    }

    let rows = query
        .load::<models::Comment>(conn)
        .map_err(from_diesel_err)?;
    log::debug!("Loaded {} comment(s)", rows.len());
    rows.into_iter().map(load_comment_row).collect()
}

fn replace_comment_user_id(
    conn: &mut SqliteConnection,
    user_id: &Id,
    new_user_id: &Id,
) -> Result<usize> {
    use schema::comments::dsl;
    diesel::update(schema::comments::table.filter(dsl::user_id.eq(&user_id.as_bytes()[..])))
        .set(dsl::user_id.eq(&new_user_id.as_bytes()[..]))
        .execute(conn)
        .map_err(from_diesel_err)
}

fn replace_comment_remote_origin(
    conn: &mut SqliteConnection,
    id: &Id,
    remote_origin: RemoteOrigin,
) -> Result<usize> {
    use schema::comments::dsl;
    let packed = remote_origin.to_packed();
    let count = diesel::update(schema::comments::table.filter(dsl::id.eq(&id.as_bytes()[..])))
        .set(dsl::remote_origin.eq(&packed[..]))
        .execute(conn)
        .map_err(from_diesel_err)?;
    debug_assert!(count <= 1);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_wildcards() {
        assert_eq!("abc", escape_like("abc"));
        assert_eq!("100\\%", escape_like("100%"));
        assert_eq!("a\\_b\\\\c", escape_like("a_b\\c"));
    }
}
