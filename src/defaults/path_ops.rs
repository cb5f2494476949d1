use toml::{Table, Value};

/// Splits a delimited key into its path segments.
///
/// An empty delimiter never splits, so the whole key becomes a single segment.
pub(super) fn split_key<'a>(key: &'a str, delim: &str) -> Vec<&'a str> {
    if delim.is_empty() {
        return vec![key];
    }

    key.split(delim).collect()
}

/// Sets `new_value` at the location named by `segments`, creating tables on the way.
///
/// Intermediate segments are always tables: a segment that currently holds a leaf
/// value is replaced by an empty table before the remaining path is created.
///
/// # Arguments
/// * `table` - The root table to modify
/// * `segments` - Path components, the last one naming the leaf
/// * `new_value` - The value to store at the leaf
pub(super) fn insert_at_path(table: &mut Table, segments: &[&str], new_value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    if let Some(parent) = search(table, parents) {
        parent.insert((*leaf).to_string(), new_value);
    }
}

/// Returns the table at the end of `segments`, creating tables on the way and
/// replacing anything that is not a table.
pub(super) fn search<'a>(table: &'a mut Table, segments: &[&str]) -> Option<&'a mut Table> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(table);
    };

    let slot = table
        .entry((*head).to_string())
        .or_insert(Value::Table(Table::new()));

    if !slot.is_table() {
        *slot = Value::Table(Table::new());
    }

    search(slot.as_table_mut()?, rest)
}

/// Navigates a table following `segments` and returns the value found there.
pub(super) fn navigate_path<'a>(table: &'a Table, segments: &[&str]) -> Option<&'a Value> {
    let (leaf, parents) = segments.split_last()?;
    let mut current = table;

    for segment in parents {
        current = current.get(*segment)?.as_table()?;
    }

    current.get(*leaf)
}
