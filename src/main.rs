mod args;

use std::{path::Path, process::ExitCode};

use args::{Args, CheckArgs, Commands, ListArgs, NewArgs};
use chrono::Utc;
use clap::Parser;
use logbar::{
    Collections, Config, LOG, LogErr, LogEntryMetadata,
    scaffold::{NewEntry, create_entry},
};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct Listed<'a> {
    id: &'a str,
    #[serde(flatten)]
    data: &'a LogEntryMetadata,
}

async fn check(args: CheckArgs) -> Result<ExitCode, LogErr> {
    let failed = count_failures(&args.path).await?;
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Loads every registered collection and prints each rejected document.
async fn count_failures(path: &Path) -> Result<usize, LogErr> {
    let config = Config::load(path.to_path_buf())?;
    let collections = Collections::from_config(&config)?;
    let mut failed = 0;
    for collection in collections.iter() {
        let loaded = collection.load(path).await?;
        for failure in loaded.failures.iter() {
            println!("{failure}");
        }
        failed += loaded.failures.len();
        println!(
            "{}: {} valid, {} invalid",
            collection.name(),
            loaded.entries.len(),
            loaded.failures.len()
        );
    }
    Ok(failed)
}

async fn list(args: ListArgs) -> Result<ExitCode, LogErr> {
    let config = Config::load(args.path.clone())?;
    let collections = Collections::from_config(&config)?;
    let entries = collections
        .get(&args.collection)?
        .load(&args.path)
        .await?
        .into_result()?;
    let listed: Vec<Listed> = entries
        .iter()
        .filter(|entry| args.drafts || !entry.data.draft)
        .map(|entry| Listed {
            id: &entry.id,
            data: &entry.data,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&listed)?);
    Ok(ExitCode::SUCCESS)
}

async fn new(args: NewArgs) -> Result<ExitCode, LogErr> {
    let config = Config::load(args.path.clone())?;
    let collections = Collections::from_config(&config)?;
    let entry = NewEntry::new(
        &args.title,
        &args.description,
        args.tags,
        Utc::now().date_naive(),
    );
    let path = create_entry(&args.path, collections.get(LOG)?, &entry, args.force).await?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .compact()
        .init();
    debug!("{args:?}");

    let result = match args.command {
        Some(Commands::Check(args)) => check(args).await,
        Some(Commands::List(args)) => list(args).await,
        Some(Commands::New(args)) => new(args).await,
        None => check(CheckArgs { path: ".".into() }).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use logbar::fs::write_file;

    use super::*;

    const VALID: &str =
        "---\ntitle: A\ndescription: B\npubDate: 2024-01-05\ntags: [x]\ndraft: false\n---\n";

    async fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for (name, content) in files {
            write_file(
                &root.path().join("src/data/logs").join(name),
                content.as_bytes(),
                false,
            )
            .await
            .unwrap();
        }
        root
    }

    fn check_args(root: &tempfile::TempDir) -> CheckArgs {
        CheckArgs {
            path: root.path().to_path_buf(),
        }
    }

    #[tokio::test]
    async fn check_succeeds_on_valid_collection() {
        let root = project(&[("a.md", VALID)]).await;
        assert_eq!(check(check_args(&root)).await.unwrap(), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn check_fails_on_invalid_document() {
        let root = project(&[("a.md", VALID), ("b.md", "---\ntitle: B\n---\n")]).await;
        assert_eq!(count_failures(root.path()).await.unwrap(), 1);
        assert_eq!(check(check_args(&root)).await.unwrap(), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn check_without_collection_directory_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(check(check_args(&root)).await.is_err());
    }

    #[tokio::test]
    async fn list_refuses_invalid_collections() {
        let root = project(&[("b.md", "no front matter")]).await;
        let args = ListArgs {
            path: root.path().to_path_buf(),
            collection: LOG.to_string(),
            drafts: false,
        };
        assert!(matches!(
            list(args).await,
            Err(LogErr::InvalidDocuments(failures)) if failures.len() == 1
        ));
    }

    #[tokio::test]
    async fn new_entry_passes_check() {
        let root = project(&[("a.md", VALID)]).await;
        let args = NewArgs {
            title: "Second entry".to_string(),
            description: String::new(),
            tags: vec!["rust".to_string()],
            path: root.path().to_path_buf(),
            force: false,
        };
        assert_eq!(new(args).await.unwrap(), ExitCode::SUCCESS);
        let created: PathBuf = root.path().join("src/data/logs/second-entry.md");
        assert!(created.exists());
        assert_eq!(count_failures(root.path()).await.unwrap(), 0);
    }
}
