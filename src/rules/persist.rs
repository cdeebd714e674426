//! Save compiled knowledge next to the task it belongs to

use crate::core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

fn task_stem(task_label: &str) -> &str {
    let task = task_label.trim();
    if task.is_empty() {
        "untitled"
    } else {
        task
    }
}

/// File name for a task's compiled knowledge: `<task>_knowledge.txt`
pub fn knowledge_file_name(task_label: &str) -> String {
    format!("{}_knowledge.txt", task_stem(task_label))
}

/// File name for a task's generated scene: `<task>_scene.xml`
pub fn scene_file_name(task_label: &str) -> String {
    format!("{}_scene.xml", task_stem(task_label))
}

fn write_into(dir: &Path, file_name: String, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Write compiled rule text into `dir`, returning the file's path
pub fn save_knowledge(dir: &Path, task_label: &str, text: &str) -> Result<PathBuf> {
    let path = write_into(dir, knowledge_file_name(task_label), text)?;
    tracing::info!("Saved knowledge to {}", path.display());
    Ok(path)
}

/// Write generated scene XML into `dir`, returning the file's path
pub fn save_scene(dir: &Path, task_label: &str, xml: &str) -> Result<PathBuf> {
    let path = write_into(dir, scene_file_name(task_label), xml)?;
    tracing::info!("Saved scene to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_file_name() {
        assert_eq!(knowledge_file_name("stacking"), "stacking_knowledge.txt");
        assert_eq!(knowledge_file_name("  "), "untitled_knowledge.txt");
    }

    #[test]
    fn test_save_knowledge_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_knowledge(dir.path(), "paint", "RULES { a() := b() }").unwrap();
        assert_eq!(path.file_name().unwrap(), "paint_knowledge.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "RULES { a() := b() }");
    }

    #[test]
    fn test_save_scene_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scenes").join("today");
        let path = save_scene(&out, "", "<tabletop/>").unwrap();
        assert_eq!(path, out.join("untitled_scene.xml"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<tabletop/>");
    }

    #[test]
    fn test_save_scene_reports_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();
        let err = save_scene(&blocker, "stack", "<tabletop/>").unwrap_err();
        assert!(matches!(err, crate::core::error::WizardError::IoError(_)));
    }
}
