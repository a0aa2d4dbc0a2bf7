//! Command handlers behind the `wt` subcommands
//!
//! Each handler maps onto one session manager call, optionally followed by a
//! launcher call, and prints the user-facing summary.

use std::path::Path;

use tracing::instrument;

use crate::config::Config;
use crate::error::Result;
use crate::git::GitRepository;
use crate::launch::{Launcher, assistant_request, shell_request};
use crate::session::{
    RemovalSummary, Reporter, Session, SessionManager, generate_session_name,
};

/// Arguments of `wt new`
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    /// Session name; generated from the clock when absent
    pub name: Option<String>,
    /// Branch to start from; the current branch when absent
    pub source_branch: Option<String>,
}

/// What `wt rm` removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    Session(String),
    All,
}

/// Create a session and start the assistant in it
#[instrument(skip_all)]
pub async fn run_new<G, R, L>(
    manager: &SessionManager<G, R>,
    launcher: &L,
    config: &Config,
    options: NewOptions,
) -> Result<Session>
where
    G: GitRepository,
    R: Reporter,
    L: Launcher + ?Sized,
{
    let name = options.name.unwrap_or_else(generate_session_name);

    let source_branch = match options.source_branch {
        Some(branch) => branch,
        None => manager.git().current_branch().await?,
    };

    // Captured before the session exists so the assistant can see the original checkout
    let repo_root = manager.git().repo_root().await?;

    let session = manager.create(&name, &source_branch).await?;

    println!();
    println!("Session '{}' created successfully!", session.name);
    print_summary(&session);

    let request = assistant_request(
        &config.resolve_shell(),
        &config.program,
        &session.path,
        Some(&repo_root),
        false,
    );
    println!("Launching {} in {}...", config.program, session.path.display());
    launcher.launch(&request).await?;

    Ok(session)
}

/// Resume the assistant's last conversation in an existing session
#[instrument(skip_all, fields(query = %query))]
pub async fn run_fg<G, R, L>(
    manager: &SessionManager<G, R>,
    launcher: &L,
    config: &Config,
    query: &str,
) -> Result<Session>
where
    G: GitRepository,
    R: Reporter,
    L: Launcher + ?Sized,
{
    let session = manager.find(query).await?;

    println!("Resuming session '{}'...", session.name);
    print_summary(&session);

    let request = assistant_request(
        &config.resolve_shell(),
        &config.program,
        &session.path,
        None,
        true,
    );
    launcher.launch(&request).await?;

    Ok(session)
}

/// Print the sessions of the current repository as a table
#[instrument(skip_all)]
pub async fn run_ls<G, R>(manager: &SessionManager<G, R>) -> Result<Vec<Session>>
where
    G: GitRepository,
    R: Reporter,
{
    let sessions = manager.list().await?;

    if sessions.is_empty() {
        println!("No active sessions");
    } else {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        print!("{}", render_session_table(&sessions, home.as_deref()));
    }

    Ok(sessions)
}

/// Remove one session, or all of them
#[instrument(skip_all, fields(target = ?target))]
pub async fn run_rm<G, R>(
    manager: &SessionManager<G, R>,
    target: RemoveTarget,
) -> Result<RemovalSummary>
where
    G: GitRepository,
    R: Reporter,
{
    match target {
        RemoveTarget::All => {
            println!("Removing all sessions...");
            manager.remove_all().await
        }
        RemoveTarget::Session(query) => {
            let session = manager.remove(&query).await?;
            println!("Session '{}' removed", session.name);
            Ok(RemovalSummary {
                removed: vec![session.name],
                failed: Vec::new(),
            })
        }
    }
}

/// Open an interactive shell in a session's worktree
#[instrument(skip_all, fields(query = %query))]
pub async fn run_cd<G, R, L>(
    manager: &SessionManager<G, R>,
    launcher: &L,
    config: &Config,
    query: &str,
) -> Result<Session>
where
    G: GitRepository,
    R: Reporter,
    L: Launcher + ?Sized,
{
    let session = manager.find(query).await?;

    println!(
        "Opening shell in session '{}' ({})",
        session.name,
        session.path.display()
    );
    println!("Type 'exit' to return to your original location");
    println!();

    launcher
        .launch(&shell_request(&config.resolve_shell(), &session))
        .await?;

    Ok(session)
}

fn print_summary(session: &Session) {
    println!("  Branch: {}", session.branch);
    println!("  Path: {}", session.path.display());
    println!();
}

/// Render sessions as a left-aligned `Session / Branch / Path` table
///
/// Columns are separated by two spaces; paths under `home` are shown with `~`.
pub fn render_session_table(sessions: &[Session], home: Option<&Path>) -> String {
    let mut rows = vec![
        [
            "Session".to_string(),
            "Branch".to_string(),
            "Path".to_string(),
        ],
        ["-------".to_string(), "------".to_string(), "----".to_string()],
    ];
    rows.extend(sessions.iter().map(|s| {
        [
            s.name.clone(),
            s.branch.clone(),
            display_path(&s.path, home),
        ]
    }));

    let name_width = rows.iter().map(|r| r[0].chars().count()).max().unwrap_or(0);
    let branch_width = rows.iter().map(|r| r[1].chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for [name, branch, path] in rows {
        out.push_str(&format!(
            "{:<name_w$}  {:<branch_w$}  {}\n",
            name,
            branch,
            path,
            name_w = name_width,
            branch_w = branch_width
        ));
    }
    out
}

/// `path` with a leading `home` replaced by `~`
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn session(name: &str, path: &str) -> Session {
        Session {
            name: name.to_string(),
            branch: format!("wt-{name}"),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_render_session_table() {
        let sessions = vec![
            session("auth-feature", "/home/u/.wt/api-auth-feature"),
            session("x", "/srv/x"),
        ];

        let table = render_session_table(&sessions, Some(Path::new("/home/u")));
        let expected = "\
Session       Branch           Path
-------       ------           ----
auth-feature  wt-auth-feature  ~/.wt/api-auth-feature
x             wt-x             /srv/x
";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_render_detached_session() {
        let mut detached = session("d", "/tmp/d");
        detached.branch = String::new();

        let table = render_session_table(&[detached], None);
        assert_eq!(table.lines().nth(2), Some("d                /tmp/d"));
    }

    #[test]
    fn test_display_path() {
        let home = Some(Path::new("/home/u"));
        assert_eq!(display_path(Path::new("/home/u/.wt/a"), home), "~/.wt/a");
        assert_eq!(display_path(Path::new("/home/u"), home), "~");
        assert_eq!(display_path(Path::new("/home/user2/x"), home), "/home/user2/x");
        assert_eq!(display_path(Path::new("/home/u/x"), None), "/home/u/x");
    }
}
