use shared::domain::FileEntryId;

/// An accepted file as shown in the visible list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: FileEntryId,
    pub name: String,
    pub size_bytes: u64,
}

impl FileEntry {
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

#[derive(Debug, Default)]
pub struct FileList {
    entries: Vec<FileEntry>,
    next_id: u64,
}

impl FileList {
    pub fn push(&mut self, name: impl Into<String>, size_bytes: u64) -> FileEntryId {
        self.next_id += 1;
        let id = FileEntryId(self.next_id);
        self.entries.push(FileEntry {
            id,
            name: name.into(),
            size_bytes,
        });
        id
    }

    pub fn remove(&mut self, id: FileEntryId) -> Option<FileEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn has_files(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }
}
