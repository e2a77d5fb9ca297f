//! The checkpoint reader: reassembles actions out of one or more Parquet checkpoint parts whose
//! top-level schema is the union of action sub-records.
//!
//! This leans on the `parquet` crate's row-assembly API (`SerializedFileReader::get_row_iter`)
//! to do the Dremel-level definition-level reassembly: `get_row_iter` already walks row groups
//! in order and yields one fully materialized `Row` per logical record, rather than indexing
//! into a row group without tracking the row-group boundary.

use std::collections::HashMap;

use bytes::Bytes;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};

use crate::actions::{
    Action, Add, Format, Metadata, Protocol, Remove, Txn, ADD_NAME, METADATA_NAME, PROTOCOL_NAME,
    REMOVE_NAME, TXN_NAME,
};
use crate::error::{DeltaResult, Error};

const KNOWN_GROUP_NAMES: [&str; 5] =
    [ADD_NAME, REMOVE_NAME, METADATA_NAME, PROTOCOL_NAME, TXN_NAME];

/// Read every action out of a (possibly multipart) checkpoint. `parts` must already be in
/// index order — the caller (the driver, via [`crate::path::checkpoint_part_names`]) is
/// responsible for that ordering. Each part is read to exhaustion before the next is opened.
///
/// `expect_nonempty` should be `_last_checkpoint`'s advertised `size > 0`: when true, a part
/// whose schema names none of the recognized action groups is a [`Error::CorruptCheckpoint`]
/// rather than being silently treated as an empty part.
pub fn read_checkpoint(parts: &[Bytes], expect_nonempty: bool) -> DeltaResult<Vec<Action>> {
    let mut actions = Vec::new();
    for (part_index, part) in parts.iter().enumerate() {
        let reader = SerializedFileReader::new(part.clone())
            .map_err(|e| corrupt(part_index, format!("failed to open part: {e}")))?;

        let schema = reader.metadata().file_metadata().schema();
        let has_known_group = schema
            .get_fields()
            .iter()
            .any(|f| KNOWN_GROUP_NAMES.contains(&f.name()));
        if !has_known_group {
            if expect_nonempty {
                return Err(corrupt(
                    part_index,
                    "schema contains none of the recognized action groups (add/remove/metaData/protocol/txn)",
                ));
            }
            continue;
        }

        let row_iter = reader
            .get_row_iter(None)
            .map_err(|e| corrupt(part_index, format!("failed to iterate rows: {e}")))?;
        for row in row_iter {
            let row = row.map_err(|e| corrupt(part_index, format!("failed to read row: {e}")))?;
            if let Some(action) = materialize_row(&row)? {
                actions.push(action);
            }
        }
    }
    Ok(actions)
}

fn corrupt(part_index: usize, reason: impl std::fmt::Display) -> Error {
    Error::CorruptCheckpoint(format!("part {part_index}: {reason}"))
}

/// A row's columns are the union of every action sub-record; exactly one is non-null. Find
/// that one sub-record (a `Field::Group`) and build the corresponding [`Action`] from it. A
/// row where every sub-record is null is skipped — defensive, since a well-formed checkpoint
/// always sets exactly one.
fn materialize_row(row: &Row) -> DeltaResult<Option<Action>> {
    for (name, field) in row.get_column_iter() {
        let Field::Group(group) = field else {
            continue;
        };
        return Ok(Some(match name.as_str() {
            ADD_NAME => Action::Add(materialize_add(group)?),
            REMOVE_NAME => Action::Remove(materialize_remove(group)?),
            METADATA_NAME => Action::Metadata(materialize_metadata(group)?),
            PROTOCOL_NAME => Action::Protocol(materialize_protocol(group)?),
            TXN_NAME => Action::Txn(materialize_txn(group)?),
            _ => continue, // an unrecognized sub-record group; keep scanning
        }));
    }
    Ok(None)
}

fn field_by_name<'a>(group: &'a Row, name: &str) -> Option<&'a Field> {
    group
        .get_column_iter()
        .find(|(n, _)| n.as_str() == name)
        .map(|(_, f)| f)
}

fn require_field<'a>(group: &'a Row, name: &str, action: &str) -> DeltaResult<&'a Field> {
    field_by_name(group, name)
        .ok_or_else(|| Error::CorruptCheckpoint(format!("{action}: missing column `{name}`")))
}

fn as_string(field: &Field, name: &str) -> DeltaResult<String> {
    match field {
        Field::Str(s) => Ok(s.clone()),
        other => Err(Error::CorruptCheckpoint(format!(
            "expected string for `{name}`, got {other:?}"
        ))),
    }
}

fn as_opt_string(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        _ => None,
    }
}

fn as_long(field: &Field, name: &str) -> DeltaResult<i64> {
    match field {
        Field::Long(v) => Ok(*v),
        Field::Int(v) => Ok(*v as i64),
        other => Err(Error::CorruptCheckpoint(format!(
            "expected integer for `{name}`, got {other:?}"
        ))),
    }
}

fn as_opt_long(field: &Field) -> Option<i64> {
    match field {
        Field::Long(v) => Some(*v),
        Field::Int(v) => Some(*v as i64),
        _ => None,
    }
}

fn as_int(field: &Field, name: &str) -> DeltaResult<i32> {
    match field {
        Field::Int(v) => Ok(*v),
        other => Err(Error::CorruptCheckpoint(format!(
            "expected int32 for `{name}`, got {other:?}"
        ))),
    }
}

fn as_bool(field: &Field) -> bool {
    matches!(field, Field::Bool(true))
}

fn as_string_map(field: &Field) -> HashMap<String, String> {
    let Field::MapInternal(map) = field else {
        return HashMap::new();
    };
    map.entries()
        .iter()
        .filter_map(|(k, v)| match (k, v) {
            (Field::Str(k), Field::Str(v)) => Some((k.clone(), v.clone())),
            _ => None,
        })
        .collect()
}

fn as_nullable_string_map(field: &Field) -> HashMap<String, Option<String>> {
    let Field::MapInternal(map) = field else {
        return HashMap::new();
    };
    map.entries()
        .iter()
        .filter_map(|(k, v)| match k {
            Field::Str(k) => Some((k.clone(), as_opt_string(v))),
            _ => None,
        })
        .collect()
}

fn as_string_list(field: &Field) -> Vec<String> {
    let Field::ListInternal(list) = field else {
        return Vec::new();
    };
    list.elements()
        .iter()
        .filter_map(|f| as_opt_string(f))
        .collect()
}

fn materialize_add(group: &Row) -> DeltaResult<Add> {
    let path = as_string(require_field(group, "path", "add")?, "add.path")?;
    let partition_values = field_by_name(group, "partitionValues")
        .map(as_nullable_string_map)
        .unwrap_or_default();
    let size = as_long(require_field(group, "size", "add")?, "add.size")?;
    let modification_time = as_long(
        require_field(group, "modificationTime", "add")?,
        "add.modificationTime",
    )?;
    let data_change = field_by_name(group, "dataChange")
        .map(as_bool)
        .unwrap_or(false);
    let stats = field_by_name(group, "stats").and_then(as_opt_string);
    let tags = field_by_name(group, "tags").map(as_string_map).unwrap_or_default();

    Ok(Add {
        path,
        partition_values,
        size,
        modification_time,
        data_change,
        stats,
        tags,
    })
}

fn materialize_remove(group: &Row) -> DeltaResult<Remove> {
    let path = as_string(require_field(group, "path", "remove")?, "remove.path")?;
    let deletion_timestamp = field_by_name(group, "deletionTimestamp").and_then(as_opt_long);
    let data_change = field_by_name(group, "dataChange")
        .map(as_bool)
        .unwrap_or(false);
    let extended_file_metadata = field_by_name(group, "extendedFileMetadata")
        .map(as_bool)
        .unwrap_or(false);
    let partition_values = field_by_name(group, "partitionValues").map(as_nullable_string_map);
    let size = field_by_name(group, "size").and_then(as_opt_long);
    let tags = field_by_name(group, "tags").map(as_string_map);

    Ok(Remove {
        path,
        deletion_timestamp,
        data_change,
        extended_file_metadata,
        partition_values,
        size,
        tags,
    })
}

fn materialize_metadata(group: &Row) -> DeltaResult<Metadata> {
    let id = as_string(require_field(group, "id", "metaData")?, "metaData.id")?;
    let name = field_by_name(group, "name").and_then(as_opt_string);
    let description = field_by_name(group, "description").and_then(as_opt_string);
    let format = match field_by_name(group, "format") {
        Some(Field::Group(format_group)) => {
            let provider = field_by_name(format_group, "provider")
                .map(|f| as_string(f, "metaData.format.provider"))
                .transpose()?
                .unwrap_or_else(|| "parquet".to_string());
            let options = field_by_name(format_group, "options")
                .map(as_string_map)
                .unwrap_or_default();
            Format { provider, options }
        }
        _ => Format::default(),
    };
    let schema_string = as_string(
        require_field(group, "schemaString", "metaData")?,
        "metaData.schemaString",
    )?;
    let partition_columns = field_by_name(group, "partitionColumns")
        .map(as_string_list)
        .unwrap_or_default();
    let configuration = field_by_name(group, "configuration")
        .map(as_string_map)
        .unwrap_or_default();
    let created_time = field_by_name(group, "createdTime").and_then(as_opt_long);

    Ok(Metadata {
        id,
        name,
        description,
        format,
        schema_string,
        partition_columns,
        configuration,
        created_time,
    })
}

fn materialize_protocol(group: &Row) -> DeltaResult<Protocol> {
    let min_reader_version = as_int(
        require_field(group, "minReaderVersion", "protocol")?,
        "protocol.minReaderVersion",
    )?;
    let min_writer_version = as_int(
        require_field(group, "minWriterVersion", "protocol")?,
        "protocol.minWriterVersion",
    )?;
    Ok(Protocol {
        min_reader_version,
        min_writer_version,
    })
}

fn materialize_txn(group: &Row) -> DeltaResult<Txn> {
    let app_id = as_string(require_field(group, "appId", "txn")?, "txn.appId")?;
    let version = as_long(require_field(group, "version", "txn")?, "txn.version")?;
    let last_updated = field_by_name(group, "lastUpdated").and_then(as_opt_long);
    Ok(Txn {
        app_id,
        version,
        last_updated,
    })
}
