use std::path::PathBuf;

use annodb_core::{
    entities::*,
    filter::*,
    repositories::Pagination,
};
use annodb_db_sqlite::CommentStore;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::config::Config;

/// Store, query and anonymize comments
#[derive(Debug, Parser)]
#[command(name = "annodb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database connection, overrides the configuration and DATABASE_URL
    #[arg(long, global = true, value_name = "DATABASE_URL")]
    pub db_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema
    Install,

    /// Drop the database schema including all comments
    Uninstall {
        /// Confirm that all comments will be lost
        #[arg(long)]
        yes: bool,
    },

    /// Count matching comments
    Count(FilterArgs),

    /// List matching comments
    Search(SearchArgs),

    /// Delete a single comment
    Delete {
        /// Comment id
        id: String,
    },

    /// Replace the user reference of all comments of a user
    AnonymizeUser {
        /// User id
        id: String,
        /// Replacement id, a random id is generated if omitted
        #[arg(long)]
        new_id: Option<String>,
    },

    /// Coarsen the remote origins of all matching comments
    AnonymizeOrigins(FilterArgs),
}

#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Comment id (repeatable)
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<Id>,

    /// Subject id (repeatable)
    #[arg(long = "subject-id", value_name = "ID")]
    pub subject_ids: Vec<Id>,

    /// User id (repeatable)
    #[arg(long = "user-id", value_name = "ID")]
    pub user_ids: Vec<Id>,

    /// Remote origin address or network prefix (repeatable)
    #[arg(long = "origin", value_name = "ADDR[/LEN]")]
    pub origins: Vec<OriginPrefix>,

    /// Text contained in the body
    #[arg(long)]
    pub body: Option<String>,

    /// Created at or after (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub created_after: Option<Timestamp>,

    /// Created before (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub created_before: Option<Timestamp>,

    /// Edited at or after (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub edited_after: Option<Timestamp>,

    /// Edited before (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub edited_before: Option<Timestamp>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sort key: creation_time or id
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort order: asc or desc
    #[arg(long)]
    pub order: Option<SortOrder>,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u64,

    /// Number of comments per page, all comments if omitted
    #[arg(long)]
    pub per_page: Option<u64>,
}

fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(Timestamp::from_secs(secs));
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .map(Into::into)
        .map_err(|err| format!("invalid timestamp '{s}': {err}"))
}

impl FilterArgs {
    // Omitted options do not restrict the result
    pub fn into_filter(self) -> CommentFilter {
        let Self {
            ids,
            subject_ids,
            user_ids,
            origins,
            body,
            created_after,
            created_before,
            edited_after,
            edited_before,
        } = self;
        let mut filter = CommentFilter::new();
        if !ids.is_empty() {
            filter = filter.ids(ids);
        }
        if !subject_ids.is_empty() {
            filter = filter.subject_ids(subject_ids);
        }
        if !user_ids.is_empty() {
            filter = filter.user_ids(user_ids);
        }
        if !origins.is_empty() {
            filter = filter.remote_origins(origins);
        }
        if let Some(body) = body {
            filter = filter.body_contains(body);
        }
        let created = TimeCutoff {
            after: created_after,
            before: created_before,
        };
        if !created.is_unbounded() {
            filter = filter.created(created);
        }
        let edited = TimeCutoff {
            after: edited_after,
            before: edited_before,
        };
        if !edited.is_unbounded() {
            filter = filter.edited(edited);
        }
        filter
    }
}

fn print_comment(comment: &Comment) {
    let Comment {
        id,
        creation_time,
        edit_time,
        subject_id,
        remote_origin,
        user_id,
        body,
    } = comment;
    let edit_time = if edit_time.is_zero() {
        "-".to_string()
    } else {
        edit_time.to_string()
    };
    println!("{id}\t{creation_time}\t{edit_time}\t{subject_id}\t{user_id}\t{remote_origin}\t{body}");
}

pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        db_url,
        command,
    } = cli;
    let mut cfg = Config::try_load_from_file_or_default(config)?;
    if let Some(db_url) = db_url {
        cfg.db.conn_sqlite = db_url;
    }

    if let Command::Uninstall { yes: false } = command {
        bail!("Refusing to drop all comments without --yes");
    }

    log::info!(
        "Connecting to SQLite database '{}' (pool size = {})",
        cfg.db.conn_sqlite,
        cfg.db.conn_pool_size
    );
    let install = cfg.db.install || matches!(command, Command::Install);
    let store = CommentStore::open(
        &cfg.db.conn_sqlite,
        cfg.db.conn_pool_size.into(),
        install,
    )?;

    match command {
        Command::Install => {
            // Already done while opening the store
        }
        Command::Uninstall { .. } => {
            store.uninstall()?;
        }
        Command::Count(filter) => {
            let count = store.count(&filter.into_filter())?;
            println!("{count}");
        }
        Command::Search(args) => {
            let SearchArgs {
                filter,
                sort,
                order,
                page,
                per_page,
            } = args;
            let sort = CommentSort::new(sort.unwrap_or_default(), order.unwrap_or_default());
            let comments = store.search(
                &filter.into_filter(),
                sort,
                &Pagination::page(page, per_page),
            )?;
            for comment in &comments {
                print_comment(comment);
            }
            log::info!("Found {} comment(s)", comments.len());
        }
        Command::Delete { id } => {
            store.delete(id)?;
        }
        Command::AnonymizeUser { id, new_id } => {
            let new_id = store.anonymize_user(id, new_id.map(Into::into))?;
            println!("{new_id}");
        }
        Command::AnonymizeOrigins(filter) => {
            let comments = store.search(
                &filter.into_filter(),
                CommentSort::default(),
                &Pagination::default(),
            )?;
            let count = store.anonymize_origins(&comments)?;
            println!("{count}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_timestamps() {
        assert_eq!(Ok(Timestamp::from_secs(1_700_000_000)), parse_timestamp("1700000000"));
        assert_eq!(
            Ok(Timestamp::from_secs(1_700_000_000)),
            parse_timestamp("2023-11-14T22:13:20Z")
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn omitted_filter_options_match_everything() {
        assert!(FilterArgs::default().into_filter().is_empty());
    }

    #[test]
    fn parse_search_args() {
        let cli = Cli::try_parse_from([
            "annodb",
            "--db-url",
            ":memory:",
            "search",
            "--origin",
            "10.0.0.0/8",
            "--created-after",
            "100",
            "--sort",
            "id",
            "--order",
            "asc",
            "--page",
            "2",
            "--per-page",
            "10",
        ])
        .unwrap();
        assert_eq!(Some(":memory:"), cli.db_url.as_deref());
        let Command::Search(args) = cli.command else {
            panic!("unexpected command");
        };
        assert_eq!(Some(SortKey::Id), args.sort);
        assert_eq!(Some(SortOrder::Ascending), args.order);
        assert_eq!(2, args.page);
        assert_eq!(Some(10), args.per_page);
        let filter = args.filter.into_filter();
        assert_eq!(2, filter.criteria().len());
        assert_eq!(
            &Criterion::Created(TimeCutoff::after(Timestamp::from_secs(100))),
            &filter.criteria()[1]
        );
    }

    #[test]
    fn reject_malformed_ids() {
        assert!(Cli::try_parse_from(["annodb", "count", "--user-id", "not-an-id"]).is_err());
    }
}
