//! Output formatting for listings and status.
//!
//! Pretty mode renders a borderless comfy-table for terminals; plain mode
//! prints one space-separated line per entry with no header.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::json;

use gitcloak_core::storage::FileEntry;
use gitcloak_core::{Listing, Scope, ScopeState};

/// Short form of a revision for display.
const REVISION_WIDTH: usize = 12;

fn kind_label(entry: &FileEntry) -> &'static str {
    if entry.is_directory() {
        "dir"
    } else if entry.is_artifact() {
        "key"
    } else if entry.is_encrypted() {
        "enc"
    } else {
        "file"
    }
}

fn short_revision(entry: &FileEntry) -> String {
    entry
        .revision
        .as_ref()
        .map(|r| r.as_str().chars().take(REVISION_WIDTH).collect())
        .unwrap_or_else(|| "-".to_string())
}

fn rows(listing: &Listing) -> Vec<Vec<String>> {
    listing
        .entries()
        .iter()
        .map(|entry| {
            vec![
                kind_label(entry).to_string(),
                entry.path.clone(),
                short_revision(entry),
            ]
        })
        .collect()
}

pub fn render_listing(listing: &Listing, pretty: bool) -> String {
    let rows = rows(listing);
    if !pretty {
        return rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("KIND"), Cell::new("PATH"), Cell::new("REVISION")]);
    for i in 0..3 {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn listing_json(listing: &Listing) -> serde_json::Value {
    json!({
        "scope": listing.scope().to_string(),
        "directory": listing.directory(),
        "entries": listing.entries(),
    })
}

pub fn status_json(scope: &Scope, state: ScopeState) -> serde_json::Value {
    json!({
        "scope": scope.to_string(),
        "state": state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitcloak_core::storage::EntryKind;
    use gitcloak_core::Revision;

    fn entry(path: &str, kind: EntryKind) -> FileEntry {
        FileEntry {
            name: path.rsplit('/').next().unwrap().to_string(),
            path: path.to_string(),
            kind,
            revision: match kind {
                EntryKind::File => Some(Revision::new("0123456789abcdef")),
                EntryKind::Directory => None,
            },
        }
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(kind_label(&entry("journal", EntryKind::Directory)), "dir");
        assert_eq!(kind_label(&entry(".gitcloak", EntryKind::File)), "key");
        assert_eq!(kind_label(&entry("a.md.age", EntryKind::File)), "enc");
        assert_eq!(kind_label(&entry("README.md", EntryKind::File)), "file");
    }

    #[test]
    fn test_short_revision() {
        assert_eq!(short_revision(&entry("a.md.age", EntryKind::File)), "0123456789ab");
        assert_eq!(short_revision(&entry("journal", EntryKind::Directory)), "-");
    }

    #[test]
    fn test_status_json() {
        let scope: Scope = "alice/notes".parse().unwrap();
        let value = status_json(&scope, ScopeState::NoArtifact);
        assert_eq!(value["scope"], "alice/notes");
        assert_eq!(value["state"], "no_artifact");
    }
}
