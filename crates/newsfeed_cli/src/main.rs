//! Operator CLI over the newsfeed core.
//!
//! # Responsibility
//! - Open (and migrate) the configured SQLite database.
//! - Drive follow, post, feed and inbox use-cases for local inspection.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use newsfeed_core::db::migrations::current_version;
use newsfeed_core::db::open_db_with_options;
use newsfeed_core::{
    core_version, init_logging, logging_status, report_fallbacks, CommentService, ConfigFallback, ContentRef, CoreConfig, FriendshipService,
    LikeService, LogSettings, NewsfeedService, NotificationService, PageQuery, SqliteCommentRepository,
    SqliteFriendshipRepository, SqliteLikeRepository, SqliteNewsfeedRepository,
    SqliteNotificationRepository, SqliteTweetRepository, SqliteUserRepository, TweetService,
    UserId, UserService,
};
use rusqlite::Connection;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "newsfeed")]
#[command(about = "Social graph and newsfeed maintenance tool", long_about = None)]
struct Cli {
    /// SQLite database file (overrides NEWSFEED_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files (overrides NEWSFEED_LOG_DIR)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and schema information
    Info,
    /// Create an account
    CreateUser {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Make FROM follow TO
    Follow { from: UserId, to: UserId },
    /// Remove the FROM -> TO edge
    Unfollow { from: UserId, to: UserId },
    /// List users following USER, newest first
    Followers { user: UserId },
    /// List users USER follows, newest first
    Followings { user: UserId },
    /// Post a tweet and fan it out
    Tweet { author: UserId, content: String },
    /// Show a user's newsfeed
    Feed {
        user: UserId,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Comment on a tweet
    Comment {
        author: UserId,
        tweet: i64,
        content: String,
    },
    /// Like a tweet or a comment
    Like {
        user: UserId,
        #[arg(long, conflicts_with = "comment", required_unless_present = "comment")]
        tweet: Option<i64>,
        #[arg(long)]
        comment: Option<i64>,
    },
    /// Show a user's notifications
    Inbox {
        user: UserId,
        /// Mark everything read after listing
        #[arg(long)]
        mark_read: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, fallbacks) = CoreConfig::load_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }

    if let Some(settings) = LogSettings::from_config(&config) {
        init_logging(&settings?.echo_warnings(true)).context("failed to start logging")?;
    }
    report_config_fallbacks(&fallbacks);

    let conn = open_db_with_options(&config.db_path, &config.db_options())
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    info!("event=cli_start module=cli status=ok");

    run(&conn, &config, cli.command)
}

/// Logs config fallbacks, or prints them when no log directory is set.
fn report_config_fallbacks(fallbacks: &[ConfigFallback]) {
    if logging_status().is_some() {
        report_fallbacks(fallbacks);
        return;
    }
    for notice in fallback_notices(fallbacks) {
        eprintln!("{notice}");
    }
}

fn fallback_notices(fallbacks: &[ConfigFallback]) -> Vec<String> {
    fallbacks
        .iter()
        .map(|fallback| format!("warning: {fallback}"))
        .collect()
}

fn run(conn: &Connection, config: &CoreConfig, command: Commands) -> Result<()> {
    let users = SqliteUserRepository::try_new(conn)?;
    let graph = SqliteFriendshipRepository::try_new(conn)?;
    let tweets = SqliteTweetRepository::try_new(conn)?;
    let feeds = SqliteNewsfeedRepository::try_new(conn)?;
    let comments = SqliteCommentRepository::try_new(conn)?;
    let likes = SqliteLikeRepository::try_new(conn)?;
    let notifications = SqliteNotificationRepository::try_new(conn)?;

    let friendships = FriendshipService::new(users, graph);
    let newsfeed = NewsfeedService::new(graph, feeds, tweets);
    let notifier = NotificationService::new(tweets, comments, notifications);

    match command {
        Commands::Info => {
            println!("newsfeed_core version={}", core_version());
            println!("database={}", config.db_path.display());
            println!("schema_version={}", current_version(conn)?);
        }
        Commands::CreateUser { username, email } => {
            let user = UserService::new(users).create_user(&username, email)?;
            println!("created user id={} username={}", user.id, user.username);
        }
        Commands::Follow { from, to } => {
            let edge = friendships.follow(from, to)?;
            println!("{} now follows {} (edge {})", from, to, edge.id);
        }
        Commands::Unfollow { from, to } => {
            let deleted = friendships.unfollow(from, to)?;
            println!("deleted={deleted}");
        }
        Commands::Followers { user } => {
            for listing in friendships.followers_of(user)? {
                println!("{}\t{}\t{}", listing.created_at, listing.user.id, listing.user.username);
            }
        }
        Commands::Followings { user } => {
            for listing in friendships.followings_of(user)? {
                println!("{}\t{}\t{}", listing.created_at, listing.user.id, listing.user.username);
            }
        }
        Commands::Tweet { author, content } => {
            let created = TweetService::new(tweets, &newsfeed).create_tweet(author, content)?;
            println!(
                "tweet id={} recipients={} inserted={}",
                created.tweet.id, created.fanout.recipients, created.fanout.inserted
            );
        }
        Commands::Feed {
            user,
            limit,
            offset,
        } => {
            let page = PageQuery {
                limit: Some(limit.unwrap_or(config.feed_page_size)),
                offset,
            };
            for item in newsfeed.list_newsfeed_with_tweets(user, &page)? {
                println!(
                    "{}\ttweet={}\tauthor={}\t{}",
                    item.entry.created_at, item.tweet.id, item.tweet.author_id, item.tweet.content
                );
            }
        }
        Commands::Comment {
            author,
            tweet,
            content,
        } => {
            let comment =
                CommentService::new(comments, tweets, &notifier).create_comment(author, tweet, content)?;
            println!("comment id={}", comment.id);
        }
        Commands::Like {
            user,
            tweet,
            comment,
        } => {
            let target = match (tweet, comment) {
                (Some(id), None) => ContentRef::Tweet(id),
                (None, Some(id)) => ContentRef::Comment(id),
                _ => bail!("pass exactly one of --tweet or --comment"),
            };
            let outcome = LikeService::new(likes, tweets, comments, &notifier).like(user, target)?;
            println!("like id={} created={}", outcome.like.id, outcome.created);
        }
        Commands::Inbox { user, mark_read } => {
            println!("unread={}", notifier.unread_count(user)?);
            for notification in notifier.list_notifications(user, &PageQuery::default())? {
                println!(
                    "{}\t{}\tactor={}\t{}={}\tunread={}",
                    notification.created_at,
                    notification.subject_kind.as_str(),
                    notification.actor_user_id,
                    notification.target.kind_str(),
                    notification.target.id(),
                    notification.unread
                );
            }
            if mark_read {
                println!("marked_read={}", notifier.mark_all_read(user)?);
            }
        }
    }

    Ok(())
}
