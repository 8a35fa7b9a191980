use crate::error::MergeError;
use crate::table::Table;
use crate::value::Value;

/// Parse CSV text (header row required) into a table, inferring cell types.
pub fn load_csv_table(name: &str, csv_data: &str) -> Result<Table, MergeError> {
    let csv_err = |message: String| MergeError::Csv {
        table: name.into(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_err(e.to_string()))?;
        rows.push(record.iter().map(Value::parse_cell).collect());
    }

    Table::new(headers, rows).map_err(|e| csv_err(e.to_string()))
}

/// Render a table as CSV text. `Null` cells are written empty.
pub fn write_csv(table: &Table) -> Result<String, MergeError> {
    let csv_err = |e: csv::Error| MergeError::Csv {
        table: "output".into(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns()).map_err(csv_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(Value::to_csv_field))
            .map_err(csv_err)?;
    }
    let bytes = writer.into_inner().map_err(|e| MergeError::Csv {
        table: "output".into(),
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| MergeError::Csv {
        table: "output".into(),
        message: e.to_string(),
    })
}
