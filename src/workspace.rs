use std::path::Path;

use walkdir::WalkDir;

const TOOL_MARKER_DIR: &str = ".evx";
const MAX_DISCOVERY_DEPTH: usize = 4;

/// Finds tool roots under `cwd` by looking for the marker directory. Hidden
/// directories other than the marker itself are skipped to keep the walk
/// cheap inside large checkouts.
pub fn find_tool_roots(cwd: &Path) -> Vec<String> {
    let mut roots = WalkDir::new(cwd)
        .max_depth(MAX_DISCOVERY_DEPTH)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || name == TOOL_MARKER_DIR || !name.starts_with('.')
        })
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_dir() && entry.file_name().to_string_lossy() == TOOL_MARKER_DIR
        })
        .filter_map(|entry| {
            entry
                .path()
                .parent()
                .map(|parent| parent.display().to_string())
        })
        .collect::<Vec<_>>();
    roots.sort();
    roots
}

/// Interactive selection the host shell provides when more than one root is
/// discovered. Returning `None` models the user dismissing the picker.
pub trait RootPicker {
    fn pick_root(&mut self, roots: &[String]) -> Option<String>;
}

pub fn pick_repo_root(cwd: &Path, picker: &mut dyn RootPicker) -> Option<String> {
    let roots = find_tool_roots(cwd);
    match roots.as_slice() {
        [] => None,
        [single] => Some(single.clone()),
        _ => picker.pick_root(&roots),
    }
}

pub fn delete_target(path: &Path) -> bool {
    std::fs::remove_file(path).is_ok()
}
