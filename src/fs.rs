use std::path::{Path, PathBuf};

use tokio::{
    fs::{OpenOptions, create_dir_all, read_dir},
    io::AsyncWriteExt,
};

use crate::error::{ContextExt, LogErr};

/// Every regular file below `path`, sorted.
pub async fn get_files_deep(path: &Path) -> Result<Vec<PathBuf>, LogErr> {
    let mut files = Vec::new();
    let mut dirs = vec![path.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        let mut entries = read_dir(&dir)
            .await
            .with_context(|| format!("read directory: {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                dirs.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Writes `content` to `path`, creating parent directories. Fails if the file exists and
/// `overwrite` is false.
pub async fn write_file(path: &Path, content: &[u8], overwrite: bool) -> Result<(), LogErr> {
    if let Some(prefix) = path.parent() {
        create_dir_all(prefix)
            .await
            .with_context(|| format!("create directory: {}", prefix.display()))?;
    }
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("open file: {}", path.display()))?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}
