//! Line-oriented console driving the client.

mod command;
mod presenter;

use std::io::Write;

use anyhow::Result;
use tasksync_app::{AuthState, Client, RemoteStore, SyncError, View};
use tasksync_core::{Credential, Task};
use time::format_description::well_known::Rfc3339;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub use command::{Command, ParseError, USAGE};
pub use presenter::ConsolePresenter;

/// Read commands from `input` until EOF or `quit`, writing results to `out`.
pub async fn run<R, I, W>(
    client: &Client<R, ConsolePresenter>,
    presenter: &ConsolePresenter,
    input: I,
    out: &mut W,
) -> Result<()>
where
    R: RemoteStore,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut view = View::Entry;

    loop {
        write!(out, "{}> ", view.path())?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(err @ ParseError::Unknown(_)) => {
                writeln!(out, "{err}\n{USAGE}")?;
                continue;
            }
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };

        debug!(?command, "console command");
        execute(client, command, out).await?;
        flush_alerts(presenter, out)?;

        while let Some(next) = presenter.take_navigation() {
            view = next;
            writeln!(out, "-> {}", view.path())?;
            if view == View::Tasks {
                match client.query().load_all().await {
                    Ok(tasks) => print_tasks(out, &tasks)?,
                    Err(err) => report(out, &err)?,
                }
                flush_alerts(presenter, out)?;
            }
        }
    }
    Ok(())
}

async fn execute<R, W>(
    client: &Client<R, ConsolePresenter>,
    command: Command,
    out: &mut W,
) -> Result<()>
where
    R: RemoteStore,
    W: Write,
{
    match command {
        Command::Login { email, password } => {
            if let Err(err) = client.session().login(&Credential::new(email, password)).await {
                report(out, &err)?;
            }
        }
        Command::Register { email, password } => {
            if let Err(err) = client.session().register(&Credential::new(email, password)).await {
                report(out, &err)?;
            }
        }
        Command::Logout => {
            if let Err(err) = client.session().logout().await {
                report(out, &err)?;
            }
        }
        Command::Ls => match client.query().load_all().await {
            Ok(tasks) => print_tasks(out, &tasks)?,
            Err(err) => report(out, &err)?,
        },
        Command::Edit(id) => match client.cache().get(id) {
            Some(task) => {
                client.edit().begin_edit(&task);
                writeln!(out, "editing #{id} \"{}\"", task.title)?;
            }
            None => writeln!(out, "no task #{id} in the list; run ls first")?,
        },
        Command::Title(title) => client.edit().set_title(title),
        Command::New => client.edit().reset(),
        Command::Submit => match client.tasks().submit().await {
            Ok(task) => writeln!(out, "saved {}", describe(&task))?,
            Err(err) => report(out, &err)?,
        },
        Command::Rm(id) => match client.tasks().delete(id).await {
            Ok(()) => writeln!(out, "removed #{id}")?,
            Err(err) => report(out, &err)?,
        },
        Command::Whoami => whoami(client, out)?,
        Command::Help => writeln!(out, "{USAGE}")?,
        Command::Quit => {}
    }
    Ok(())
}

/// Print local failures. Rejections were already reported through the presenter.
fn report<W: Write>(out: &mut W, err: &SyncError) -> std::io::Result<()> {
    match err {
        SyncError::Invalid(invalid) => writeln!(out, "error: {invalid}"),
        SyncError::Rejected(_) => Ok(()),
    }
}

fn whoami<R, W: Write>(client: &Client<R, ConsolePresenter>, out: &mut W) -> Result<()> {
    let session = match client.session().state().get() {
        AuthState::Anonymous => "anonymous",
        AuthState::Authenticated => "authenticated",
    };
    let edited = client.edit().get();
    writeln!(out, "session: {session}")?;
    if edited.is_sentinel() {
        writeln!(out, "composer: {} \"{}\"", edited.mode().label(), edited.title)?;
    } else {
        writeln!(
            out,
            "composer: {} #{} \"{}\"",
            edited.mode().label(),
            edited.id,
            edited.title
        )?;
    }
    Ok(())
}

fn flush_alerts<W: Write>(presenter: &ConsolePresenter, out: &mut W) -> Result<()> {
    for alert in presenter.take_alerts() {
        writeln!(out, "! {alert}")?;
    }
    Ok(())
}

fn print_tasks<W: Write>(out: &mut W, tasks: &[Task]) -> std::io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "(no tasks)");
    }
    for task in tasks {
        writeln!(out, "{}", describe(task))?;
    }
    Ok(())
}

fn describe(task: &Task) -> String {
    let updated = task
        .updated_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| task.updated_at.to_string());
    format!("#{:<4} {}  (updated {updated})", task.id, task.title)
}
