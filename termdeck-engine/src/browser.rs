/// Kind of entry shown by a file-browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Row of the simulated remote directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    pub name: &'static str,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub modified: Option<&'static str>,
    pub permissions: Option<&'static str>,
}

impl FileEntry {
    const fn directory(
        name: &'static str,
        modified: Option<&'static str>,
    ) -> Self {
        let permissions = match modified {
            Some(_) => Some("drwxr-xr-x"),
            None => None,
        };
        Self {
            name,
            kind: EntryKind::Directory,
            size: None,
            modified,
            permissions,
        }
    }

    const fn file(
        name: &'static str,
        size: u64,
        modified: &'static str,
        permissions: &'static str,
    ) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            size: Some(size),
            modified: Some(modified),
            permissions: Some(permissions),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Entry that moves a file-browser session one level up.
pub const PARENT_ENTRY: &str = "..";

const LISTING: [FileEntry; 7] = [
    FileEntry::directory(PARENT_ENTRY, None),
    FileEntry::directory("Documents", Some("2025-11-28 14:30")),
    FileEntry::directory("Downloads", Some("2025-11-29 09:15")),
    FileEntry::directory("Pictures", Some("2025-11-27 18:45")),
    FileEntry::file("config.json", 2048, "2025-11-30 10:20", "-rw-r--r--"),
    FileEntry::file("notes.txt", 512, "2025-11-29 16:30", "-rw-r--r--"),
    FileEntry::file("script.sh", 1024, "2025-11-28 12:00", "-rwxr-xr-x"),
];

/// Listing shown for every directory; no remote filesystem is queried.
pub fn listing() -> &'static [FileEntry] {
    &LISTING
}

/// Resolve the path reached by opening `entry` from `current`.
///
/// Returns `None` for files and for names missing from the listing.
pub fn resolve_entry(current: &str, entry: &str) -> Option<String> {
    if entry == PARENT_ENTRY {
        return Some(parent_path(current));
    }

    let found = listing().iter().find(|item| item.name == entry)?;
    if !found.is_dir() {
        return None;
    }

    let base = current.trim_end_matches('/');
    Some(format!("{base}/{}", found.name))
}

/// Parent directory of `path`; the root is its own parent.
pub fn parent_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return String::from("/");
    }
    match trimmed.rfind('/') {
        Some(0) | None => String::from("/"),
        Some(pos) => trimmed[..pos].to_string(),
    }
}

/// Format a byte count the way listing rows show it.
pub fn format_size(bytes: Option<u64>) -> String {
    let bytes = match bytes {
        Some(bytes) if bytes > 0 => bytes,
        _ => return String::from("-"),
    };

    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}
