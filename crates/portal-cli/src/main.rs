//! # portal-admin
//!
//! Command-line front end for the alumni portal. Every command runs one
//! portal operation against the local database and prints the result as
//! JSON.
//!
//! Commands that need a caller sign in with `--email`/`--secret`, or fall
//! back to the session left behind by an earlier `login`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use portal_core::{Portal, PortalConfig, Role, Session, Snapshot, UserDraft, UserFilter};
use portal_shared::{DepartmentId, TestimonialId, ThreadId, UserId};

#[derive(Parser, Debug)]
#[command(name = "portal-admin", version)]
#[command(about = "Administer a JNTU-GV alumni portal database")]
struct Cli {
    /// Sign in as this account before running the command
    #[arg(long, global = true, env = "PORTAL_EMAIL")]
    email: Option<String>,

    #[arg(long, global = true, env = "PORTAL_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session for later commands
    Login,
    /// Forget the stored session
    Logout,
    /// Create a pending account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long = "account-email")]
        account_email: String,
        #[arg(long = "account-secret")]
        account_secret: String,
        #[arg(long)]
        role: Role,
        #[arg(long)]
        department: Option<String>,
    },
    /// List the users visible to the caller
    Users {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        pending: bool,
    },
    Approve { id: String },
    DeleteUser { id: String },
    Departments,
    AddDepartment { name: String },
    /// Testimonials in the caller's moderation view, or the public feed
    Testimonials {
        #[arg(long)]
        public: bool,
    },
    /// Approve or reject a testimonial
    Moderate {
        id: String,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
    Threads,
    Post {
        title: String,
    },
    Reply {
        thread: String,
        text: String,
    },
    Contacts,
    Send {
        peer: String,
        text: String,
    },
    /// Print a conversation, and with --follow keep printing it as it changes
    Conversation {
        peer: String,
        #[arg(long)]
        follow: bool,
    },
    Dashboard,
    /// Write every collection to a JSON file (stdout when omitted)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace every collection with the contents of a JSON snapshot
    Import { path: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn sign_in(portal: &Portal, cli: &Cli) -> anyhow::Result<Session> {
    if let (Some(email), Some(secret)) = (&cli.email, &cli.secret) {
        return Ok(portal.authenticate(email, secret)?);
    }
    match portal.restore_session()? {
        Some(session) => Ok(session),
        None => bail!("not signed in: pass --email and --secret or run `login` first"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,portal_core=debug,portal_store=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::from_env();
    info!(?config, "Loaded configuration");

    let portal = Arc::new(Portal::open(config)?);

    match &cli.command {
        Command::Login => {
            let (Some(email), Some(secret)) = (&cli.email, &cli.secret) else {
                bail!("login needs --email and --secret");
            };
            print_json(&portal.authenticate(email, secret)?)?;
        }
        Command::Logout => portal.logout()?,
        Command::Register {
            name,
            account_email,
            account_secret,
            role,
            department,
        } => {
            let user = portal.register(UserDraft {
                name: name.clone(),
                email: account_email.clone(),
                secret: account_secret.clone(),
                role: *role,
                department_id: department.as_deref().map(DepartmentId::from),
                social_links: None,
                is_approved: false,
            })?;
            print_json(&user)?;
        }
        Command::Users { search, pending } => {
            let session = sign_in(&portal, &cli)?;
            let filter = UserFilter {
                search: search.clone(),
                pending_only: *pending,
            };
            print_json(&portal.list_users(&session, &filter)?)?;
        }
        Command::Approve { id } => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.approve_user(&session, &UserId::from(id.as_str()))?)?;
        }
        Command::DeleteUser { id } => {
            let session = sign_in(&portal, &cli)?;
            portal.delete_user(&session, &UserId::from(id.as_str()))?;
            info!(user = %id, "deleted");
        }
        Command::Departments => print_json(&portal.list_departments()?)?,
        Command::AddDepartment { name } => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.create_department(&session, name)?)?;
        }
        Command::Testimonials { public } => {
            if *public {
                let limit = portal.config().public_testimonial_limit;
                print_json(&portal.public_testimonials(limit)?)?;
            } else {
                let session = sign_in(&portal, &cli)?;
                print_json(&portal.list_testimonials(&session)?)?;
            }
        }
        Command::Moderate { id, approve, reject } => {
            if approve == reject {
                bail!("pass exactly one of --approve or --reject");
            }
            let session = sign_in(&portal, &cli)?;
            let outcome =
                portal.moderate_testimonial(&session, &TestimonialId::from(id.as_str()), *approve)?;
            print_json(&outcome)?;
        }
        Command::Threads => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.list_threads(&session)?)?;
        }
        Command::Post { title } => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.create_thread(&session, title)?)?;
        }
        Command::Reply { thread, text } => {
            let session = sign_in(&portal, &cli)?;
            let reply =
                portal.reply_to_thread(&session, &ThreadId::from(thread.as_str()), text)?;
            print_json(&reply)?;
        }
        Command::Contacts => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.list_contacts(&session)?)?;
        }
        Command::Send { peer, text } => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.send_message(&session, &UserId::from(peer.as_str()), text)?)?;
        }
        Command::Conversation { peer, follow } => {
            let session = sign_in(&portal, &cli)?;
            let peer = UserId::from(peer.as_str());
            if !*follow {
                print_json(&portal.list_conversation(&session, &peer)?)?;
                return Ok(());
            }

            let poller = portal.watch_conversation(&session, &peer)?;
            let mut rx = poller.subscribe();
            print_json(&*rx.borrow_and_update())?;
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = rx.borrow_and_update().clone();
                        print_json(&latest)?;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutting down");
                        break;
                    }
                }
            }
            poller.stop();
        }
        Command::Dashboard => {
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.dashboard_stats(&session)?)?;
        }
        Command::Export { out } => {
            let session = sign_in(&portal, &cli)?;
            let snapshot = portal.export_snapshot(&session)?;
            match out {
                Some(path) => {
                    let json = serde_json::to_vec_pretty(&snapshot)?;
                    std::fs::write(path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "snapshot written");
                }
                None => print_json(&snapshot)?,
            }
        }
        Command::Import { path } => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            let session = sign_in(&portal, &cli)?;
            print_json(&portal.import_snapshot(&session, &snapshot)?)?;
        }
    }

    Ok(())
}
