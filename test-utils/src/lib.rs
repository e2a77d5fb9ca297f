//! Test fixtures shared across `delta_log_kernel`'s test suite: building synthetic
//! `_delta_log` directories (commits as plain JSON, `_last_checkpoint`, checkpoint Parquet
//! files) without depending on a real Delta writer.

use std::path::Path;

use bytes::Bytes;
use parquet::data_type::{BoolType, ByteArray, ByteArrayType, Int32Type, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use parquet::schema::types::Type as SchemaType;

/// One synthetic checkpoint row: exactly one variant is `Some`.
#[derive(Debug, Clone, Default)]
pub struct CheckpointRow {
    pub add: Option<TestAdd>,
    pub remove: Option<TestRemove>,
    pub metadata: Option<TestMetadata>,
    pub protocol: Option<TestProtocol>,
    pub txn: Option<TestTxn>,
}

#[derive(Debug, Clone)]
pub struct TestAdd {
    pub path: String,
    pub size: i64,
    pub modification_time: i64,
    pub data_change: bool,
    pub stats: String,
}

#[derive(Debug, Clone)]
pub struct TestRemove {
    pub path: String,
    pub deletion_timestamp: i64,
    pub data_change: bool,
}

#[derive(Debug, Clone)]
pub struct TestMetadata {
    pub id: String,
    pub schema_string: String,
}

#[derive(Debug, Clone)]
pub struct TestProtocol {
    pub min_reader_version: i32,
    pub min_writer_version: i32,
}

#[derive(Debug, Clone)]
pub struct TestTxn {
    pub app_id: String,
    pub version: i64,
}

impl CheckpointRow {
    pub fn add(add: TestAdd) -> Self {
        CheckpointRow {
            add: Some(add),
            ..Default::default()
        }
    }

    pub fn remove(remove: TestRemove) -> Self {
        CheckpointRow {
            remove: Some(remove),
            ..Default::default()
        }
    }

    pub fn metadata(metadata: TestMetadata) -> Self {
        CheckpointRow {
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    pub fn protocol(protocol: TestProtocol) -> Self {
        CheckpointRow {
            protocol: Some(protocol),
            ..Default::default()
        }
    }

    pub fn txn(txn: TestTxn) -> Self {
        CheckpointRow {
            txn: Some(txn),
            ..Default::default()
        }
    }
}

/// The message type of the synthetic checkpoints this crate writes. Every sub-record is an
/// optional group; every attribute inside a sub-record is required — exactly one sub-record
/// is populated per row, while keeping the Parquet encoding to a single definition level
/// (no maps/lists) since
/// those optional/defaultable attributes are already covered by the commit-reader's unit
/// tests.
const CHECKPOINT_SCHEMA: &str = "
message checkpoint {
  OPTIONAL GROUP add {
    REQUIRED BINARY path (UTF8);
    REQUIRED INT64 size;
    REQUIRED INT64 modificationTime;
    REQUIRED BOOLEAN dataChange;
    REQUIRED BINARY stats (UTF8);
  }
  OPTIONAL GROUP remove {
    REQUIRED BINARY path (UTF8);
    REQUIRED INT64 deletionTimestamp;
    REQUIRED BOOLEAN dataChange;
  }
  OPTIONAL GROUP metaData {
    REQUIRED BINARY id (UTF8);
    REQUIRED BINARY schemaString (UTF8);
  }
  OPTIONAL GROUP protocol {
    REQUIRED INT32 minReaderVersion;
    REQUIRED INT32 minWriterVersion;
  }
  OPTIONAL GROUP txn {
    REQUIRED BINARY appId (UTF8);
    REQUIRED INT64 version;
  }
}
";

fn checkpoint_schema() -> std::sync::Arc<SchemaType> {
    std::sync::Arc::new(parse_message_type(CHECKPOINT_SCHEMA).expect("valid checkpoint schema"))
}

/// Column order: must match [`CHECKPOINT_SCHEMA`]'s leaf traversal exactly.
enum Col {
    AddPath,
    AddSize,
    AddModTime,
    AddDataChange,
    AddStats,
    RemovePath,
    RemoveDeletionTs,
    RemoveDataChange,
    MetadataId,
    MetadataSchemaString,
    ProtocolMinReader,
    ProtocolMinWriter,
    TxnAppId,
    TxnVersion,
}

const COLUMN_ORDER: [Col; 14] = [
    Col::AddPath,
    Col::AddSize,
    Col::AddModTime,
    Col::AddDataChange,
    Col::AddStats,
    Col::RemovePath,
    Col::RemoveDeletionTs,
    Col::RemoveDataChange,
    Col::MetadataId,
    Col::MetadataSchemaString,
    Col::ProtocolMinReader,
    Col::ProtocolMinWriter,
    Col::TxnAppId,
    Col::TxnVersion,
];

enum Value {
    Str(String),
    Long(i64),
    Int(i32),
    Bool(bool),
}

/// For one row and one column, the value present (def level 1) or absent (def level 0).
fn column_value(row: &CheckpointRow, col: &Col) -> Option<Value> {
    match col {
        Col::AddPath => row.add.as_ref().map(|a| Value::Str(a.path.clone())),
        Col::AddSize => row.add.as_ref().map(|a| Value::Long(a.size)),
        Col::AddModTime => row.add.as_ref().map(|a| Value::Long(a.modification_time)),
        Col::AddDataChange => row.add.as_ref().map(|a| Value::Bool(a.data_change)),
        Col::AddStats => row.add.as_ref().map(|a| Value::Str(a.stats.clone())),
        Col::RemovePath => row.remove.as_ref().map(|r| Value::Str(r.path.clone())),
        Col::RemoveDeletionTs => row
            .remove
            .as_ref()
            .map(|r| Value::Long(r.deletion_timestamp)),
        Col::RemoveDataChange => row.remove.as_ref().map(|r| Value::Bool(r.data_change)),
        Col::MetadataId => row.metadata.as_ref().map(|m| Value::Str(m.id.clone())),
        Col::MetadataSchemaString => row
            .metadata
            .as_ref()
            .map(|m| Value::Str(m.schema_string.clone())),
        Col::ProtocolMinReader => row
            .protocol
            .as_ref()
            .map(|p| Value::Int(p.min_reader_version)),
        Col::ProtocolMinWriter => row
            .protocol
            .as_ref()
            .map(|p| Value::Int(p.min_writer_version)),
        Col::TxnAppId => row.txn.as_ref().map(|t| Value::Str(t.app_id.clone())),
        Col::TxnVersion => row.txn.as_ref().map(|t| Value::Long(t.version)),
    }
}

/// Serialize `rows` as a single-part checkpoint Parquet file and return its bytes.
pub fn write_checkpoint_part(rows: &[CheckpointRow]) -> Bytes {
    let schema = checkpoint_schema();
    let props = std::sync::Arc::new(WriterProperties::builder().build());
    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = SerializedFileWriter::new(&mut buf, schema, props).expect("file writer");
        let mut row_group_writer = writer.next_row_group().expect("row group");
        for col in COLUMN_ORDER.iter() {
            let col_writer = row_group_writer
                .next_column()
                .expect("next column")
                .expect("column present");
            write_column(col_writer, rows, col);
        }
        row_group_writer.close().expect("close row group");
        writer.close().expect("close file");
    }
    Bytes::from(buf)
}

/// Every leaf in [`CHECKPOINT_SCHEMA`] is one of these four physical types; `col` alone
/// determines which, so the typed writer is always reached for with the matching marker type
/// rather than branching on a runtime-obtained `ColumnWriter` enum.
fn write_column(
    col_writer: parquet::file::writer::SerializedColumnWriter,
    rows: &[CheckpointRow],
    col: &Col,
) {
    let values: Vec<Option<Value>> = rows.iter().map(|row| column_value(row, col)).collect();
    let def_levels: Vec<i16> = values
        .iter()
        .map(|v| if v.is_some() { 1 } else { 0 })
        .collect();

    let mut col_writer = col_writer;
    match col {
        Col::AddPath | Col::AddStats | Col::RemovePath | Col::MetadataId | Col::MetadataSchemaString | Col::TxnAppId => {
            let present: Vec<ByteArray> = values
                .into_iter()
                .filter_map(|v| match v {
                    Some(Value::Str(s)) => Some(ByteArray::from(s.into_bytes())),
                    _ => None,
                })
                .collect();
            col_writer
                .typed::<ByteArrayType>()
                .write_batch(&present, Some(&def_levels), None)
                .expect("write byte array batch");
        }
        Col::AddSize | Col::AddModTime | Col::RemoveDeletionTs | Col::TxnVersion => {
            let present: Vec<i64> = values
                .into_iter()
                .filter_map(|v| match v {
                    Some(Value::Long(n)) => Some(n),
                    _ => None,
                })
                .collect();
            col_writer
                .typed::<Int64Type>()
                .write_batch(&present, Some(&def_levels), None)
                .expect("write int64 batch");
        }
        Col::ProtocolMinReader | Col::ProtocolMinWriter => {
            let present: Vec<i32> = values
                .into_iter()
                .filter_map(|v| match v {
                    Some(Value::Int(n)) => Some(n),
                    _ => None,
                })
                .collect();
            col_writer
                .typed::<Int32Type>()
                .write_batch(&present, Some(&def_levels), None)
                .expect("write int32 batch");
        }
        Col::AddDataChange | Col::RemoveDataChange => {
            let present: Vec<bool> = values
                .into_iter()
                .filter_map(|v| match v {
                    Some(Value::Bool(b)) => Some(b),
                    _ => None,
                })
                .collect();
            col_writer
                .typed::<BoolType>()
                .write_batch(&present, Some(&def_levels), None)
                .expect("write bool batch");
        }
    }
    col_writer.close().expect("close column");
}

/// Split `rows` into `num_parts` contiguous, non-empty-where-possible chunks and serialize each
/// as its own checkpoint Parquet part, in index order.
pub fn write_checkpoint_parts(rows: &[CheckpointRow], num_parts: usize) -> Vec<Bytes> {
    if num_parts <= 1 {
        return vec![write_checkpoint_part(rows)];
    }
    let chunk_size = rows.len().div_ceil(num_parts).max(1);
    rows.chunks(chunk_size)
        .map(write_checkpoint_part)
        .collect()
}

/// Write `_delta_log/{version:020}.json` under `table_root`, creating the directory if needed.
pub fn write_commit(table_root: &Path, version: i64, commit_text: &str) {
    let log_dir = table_root.join("_delta_log");
    std::fs::create_dir_all(&log_dir).expect("create _delta_log");
    std::fs::write(
        log_dir.join(delta_log_kernel::path::commit_file_name(version)),
        commit_text,
    )
    .expect("write commit");
}

/// Write `_delta_log/_last_checkpoint` under `table_root`.
pub fn write_last_checkpoint(table_root: &Path, version: i64, size: i64, parts: Option<u32>) {
    let log_dir = table_root.join("_delta_log");
    std::fs::create_dir_all(&log_dir).expect("create _delta_log");
    let pointer = serde_json::json!({ "version": version, "size": size, "parts": parts });
    std::fs::write(
        log_dir.join(delta_log_kernel::path::LAST_CHECKPOINT_NAME),
        pointer.to_string(),
    )
    .expect("write _last_checkpoint");
}

/// Write a checkpoint for `version` consisting of `rows`, split across `num_parts` parts
/// (`num_parts <= 1` writes a single-file checkpoint), plus a matching `_last_checkpoint`
/// pointer.
pub fn write_checkpoint(
    table_root: &Path,
    version: i64,
    rows: &[CheckpointRow],
    num_parts: u32,
) {
    let log_dir = table_root.join("_delta_log");
    std::fs::create_dir_all(&log_dir).expect("create _delta_log");
    let parts = write_checkpoint_parts(rows, num_parts as usize);
    let part_names = delta_log_kernel::path::checkpoint_part_names(
        version,
        if num_parts > 1 { Some(num_parts) } else { None },
    );
    assert_eq!(parts.len(), part_names.len());
    for (bytes, name) in parts.iter().zip(part_names.iter()) {
        std::fs::write(log_dir.join(name), bytes).expect("write checkpoint part");
    }
    write_last_checkpoint(
        table_root,
        version,
        rows.len() as i64,
        if num_parts > 1 { Some(num_parts) } else { None },
    );
}

/// A minimal, valid `metaData` + `protocol` + one `add` commit body, as newline-delimited JSON
/// lines, handy for "table has at least one file" fixtures.
pub fn simple_create_and_add_commit(table_id: &str, add_path: &str) -> String {
    format!(
        "{{\"protocol\":{{\"minReaderVersion\":1,\"minWriterVersion\":2}}}}\n\
         {{\"metaData\":{{\"id\":\"{table_id}\",\"format\":{{\"provider\":\"parquet\",\"options\":{{}}}},\
\"schemaString\":\"{{}}\",\"partitionColumns\":[],\"configuration\":{{}}}}}}\n\
         {{\"add\":{{\"path\":\"{add_path}\",\"partitionValues\":{{}},\"size\":100,\
\"modificationTime\":1,\"dataChange\":true}}}}"
    )
}
