//! Recursive listing and dumps

use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::storage::results::{EntryKind, Listing};
use crate::storage::validation::join_path;
use crate::storage::Disklet;

/// Lists `path` and every folder beneath it.
///
/// Keys are paths relative to `path`, so `deep_list(d, "")` yields entries
/// such as `a` (folder) and `a/b.txt` (file).
pub fn deep_list<D: Disklet + ?Sized>(disklet: &D, path: &str) -> Result<Listing, StorageError> {
    let mut out = Listing::new();
    walk(disklet, path, "", &mut out)?;
    Ok(out)
}

fn walk<D: Disklet + ?Sized>(
    disklet: &D,
    base: &str,
    relative: &str,
    out: &mut Listing,
) -> Result<(), StorageError> {
    let listing = disklet.list(&join_path(base, relative))?;

    for (name, kind) in listing {
        let child = join_path(relative, &name);
        if kind == EntryKind::Folder {
            walk(disklet, base, &child, out)?;
        }
        out.insert(child, kind);
    }

    Ok(())
}

/// Dumps the tree under `path` as nested JSON objects.
///
/// Folders become objects keyed by child name. File text that parses as JSON
/// is embedded as that value; other text is kept as a string.
pub fn dump_data<D: Disklet + ?Sized>(disklet: &D, path: &str) -> Result<Value, StorageError> {
    let mut out = Map::new();

    for (name, kind) in disklet.list(path)? {
        let child = join_path(path, &name);
        let value = match kind {
            EntryKind::Folder => dump_data(disklet, &child)?,
            EntryKind::File => {
                let text = disklet.get_text(&child)?;
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            }
        };
        out.insert(name, value);
    }

    Ok(Value::Object(out))
}
