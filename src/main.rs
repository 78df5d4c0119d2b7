use anyhow::Result;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::Write;
use std::path::PathBuf;
use twig::areas::repository::Repository;
use twig::artifacts::core::PagerWriter;
use twig::commands::porcelain::checkout::CheckoutTarget;
use twig::errors::TwigError;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A tiny content-addressed version-control system",
    long_about = "twig tracks snapshots of a working directory in a local object store. \
    It supports branches, history inspection and three-way merges with conflict markers.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        path: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit from the staging area on top of the current branch."
    )]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: Option<String>,
    },
    #[command(name = "rm", about = "Unstage a file or stage its removal")]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: String,
    },
    #[command(name = "log", about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of the commits with the given message")]
    Find {
        #[arg(index = 1, help = "The exact commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the branches, staging area and working tree status")]
    Status,
    #[command(
        name = "checkout",
        about = "Switch branches or restore files",
        long_about = "checkout -- <file> restores a file from HEAD, \
        checkout <commit> -- <file> restores it from a commit \
        and checkout <branch> switches to a branch."
    )]
    Checkout {
        #[arg(index = 1, help = "A branch name or a commit id")]
        target: Option<String>,
        #[arg(index = 2, last = true, num_args = 1.., help = "The file to restore")]
        paths: Vec<String>,
    },
    #[command(name = "branch", about = "Create a new branch at HEAD")]
    Branch {
        #[arg(index = 1, help = "The name of the branch")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch")]
    RmBranch {
        #[arg(index = 1, help = "The name of the branch")]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Check out a commit and move the current branch to it"
    )]
    Reset {
        #[arg(index = 1, help = "The commit id, possibly abbreviated")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
}

#[tokio::main]
async fn main() {
    twig::logging::init_logging();
    colored::control::set_override(std::io::stdout().is_terminal());

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        match error.downcast_ref::<TwigError>() {
            Some(twig_error) => eprintln!("{twig_error}"),
            None => eprintln!("fatal: {error:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { path } => {
            let path = path.map(PathBuf::from).unwrap_or(pwd);
            let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init().await?
        }
        Commands::Add { path } => open(&pwd)?.add(&path).await?,
        Commands::Commit { message } => {
            open(&pwd)?
                .commit(message.as_deref().unwrap_or_default())
                .await?
        }
        Commands::Rm { path } => open(&pwd)?.rm(&path).await?,
        Commands::Log => with_pager(&pwd, Repository::log)?,
        Commands::GlobalLog => with_pager(&pwd, Repository::global_log)?,
        Commands::Find { message } => open(&pwd)?.find(&message)?,
        Commands::Status => open(&pwd)?.status().await?,
        Commands::Checkout { target, paths } => {
            let operands = checkout_operands(target, paths);
            let target = CheckoutTarget::try_parse(&operands)?;

            open(&pwd)?.checkout(&target).await?
        }
        Commands::Branch { name } => open(&pwd)?.branch(&name)?,
        Commands::RmBranch { name } => open(&pwd)?.rm_branch(&name)?,
        Commands::Reset { commit } => open(&pwd)?.reset(&commit).await?,
        Commands::Merge { branch } => open(&pwd)?.merge(&branch).await?,
    }

    Ok(())
}

fn open(pwd: &std::path::Path) -> Result<Repository> {
    Repository::open(pwd, Box::new(std::io::stdout()))
}

/// Rebuild the raw operand list; clap consumes the `--` separator
fn checkout_operands(target: Option<String>, paths: Vec<String>) -> Vec<String> {
    let separator = (!paths.is_empty()).then(|| "--".to_string());

    target.into_iter().chain(separator).chain(paths).collect()
}

/// Run a history command through the pager when stdout is an interactive terminal
fn with_pager(pwd: &std::path::Path, command: impl FnOnce(&Repository) -> Result<()>) -> Result<()> {
    let use_pager = std::env::var_os("NO_PAGER").is_none() && std::io::stdout().is_terminal();

    if !use_pager {
        return command(&open(pwd)?);
    }

    let pager = Pager::new();
    let writer = PagerWriter::new(pager.clone());
    let repository = Repository::open(pwd, Box::new(writer))?;

    command(&repository)?;
    std::io::stdout().flush()?;
    minus::page_all(pager)?;

    Ok(())
}
