use crate::error::{Result, ShopFixError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub file_name: String,
    /// 拡張子を除いたファイル名（出力名に使う）
    pub stem: String,
}

const JSON_EXTENSIONS: &[&str] = &["json", "JSON"];

pub fn scan_folder(folder: &Path) -> Result<Vec<InputFile>> {
    if !folder.is_dir() {
        return Err(ShopFixError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_json = path
            .extension()
            .map(|ext| is_json_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !is_json {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        files.push(InputFile {
            path: path.to_path_buf(),
            file_name,
            stem,
        });
    }

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

fn is_json_extension(ext: &str) -> bool {
    JSON_EXTENSIONS.contains(&ext)
}
