use crate::core::{
    ConfigProvider, LongRecord, Pipeline, RawTable, SourceCollection, SourceFile, Storage,
    TransformResult,
};
use crate::domain::model::{month_number, MONTHS};
use crate::utils::error::{EtlError, Result, SourceSkip};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of processing a single source: a record batch, or a recoverable
/// skip with the reason.
pub type SourceOutcome = std::result::Result<Vec<LongRecord>, SourceSkip>;

/// Derives the year from a source filename: last hyphen-separated segment,
/// minus a trailing `.csv`, parsed as a base-10 integer of at most four
/// digits. `"PP_Prices - 2013.csv"` gives 2013.
pub fn extract_year(identifier: &str) -> std::result::Result<i32, SourceSkip> {
    let segment = identifier.rsplit('-').next().unwrap_or(identifier).trim();
    let segment = segment.strip_suffix(".csv").unwrap_or(segment).trim();

    match segment.parse::<i32>() {
        Ok(year) if (0..=9999).contains(&year) => Ok(year),
        _ => Err(SourceSkip::YearExtraction {
            identifier: identifier.to_string(),
        }),
    }
}

/// Parses delimited text into a [`RawTable`], skipping `skip_rows` leading
/// metadata rows before the header row. No alternate skip counts are tried;
/// the count is configuration, not a retry ladder.
pub fn parse_table(data: &[u8], skip_rows: usize) -> std::result::Result<RawTable, SourceSkip> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceSkip::Load {
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    let mut remaining = records.into_iter().skip(skip_rows);
    let headers: Vec<String> = match remaining.next() {
        Some(header_row) => header_row.iter().map(|h| h.to_string()).collect(),
        None => {
            return Err(SourceSkip::Load {
                reason: "no header row found".to_string(),
            })
        }
    };

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SourceSkip::Load {
            reason: "header row has no columns".to_string(),
        });
    }

    // 補齊短行、截斷長行，讓每一行的欄位數一致
    let width = headers.len();
    let rows = remaining
        .map(|record| {
            let mut cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(RawTable { headers, rows })
}

/// Trims headers, applies the synonym rename table, and verifies a `Crop`
/// column exists. A table without crop identity is rejected outright.
pub fn normalize_schema(
    table: &mut RawTable,
    synonyms: &HashMap<String, String>,
) -> std::result::Result<(), SourceSkip> {
    for header in &mut table.headers {
        let trimmed = header.trim();
        *header = match synonyms.get(trimmed) {
            Some(canonical) => canonical.clone(),
            None => trimmed.to_string(),
        };
    }

    if table.column_index("Crop").is_none() {
        return Err(SourceSkip::SchemaRejected);
    }
    Ok(())
}

/// Reshapes a normalized wide table into `(crop, month name, raw price)`
/// tuples: one per data row × present month column, iterating months in
/// canonical order so downstream sorting is deterministic. Rows with an
/// empty crop cell contribute nothing.
pub fn unpivot(table: &RawTable) -> Vec<(String, &'static str, String)> {
    let Some(crop_idx) = table.column_index("Crop") else {
        return Vec::new();
    };

    let month_cols: Vec<(&'static str, usize)> = MONTHS
        .iter()
        .filter_map(|m| table.column_index(m).map(|idx| (*m, idx)))
        .collect();

    let mut tuples = Vec::new();
    for row in &table.rows {
        let crop = row[crop_idx].trim();
        if crop.is_empty() {
            continue;
        }
        for (month_name, idx) in &month_cols {
            tuples.push((crop.to_string(), *month_name, row[*idx].clone()));
        }
    }
    tuples
}

/// Attaches the year, maps month names to numbers, and drops tuples whose
/// price is empty or not a number. A month name outside the canonical set
/// cannot come out of [`unpivot`]; seeing one here is an internal invariant
/// violation and aborts the run.
pub fn assemble_records(
    year: i32,
    tuples: Vec<(String, &'static str, String)>,
) -> Result<Vec<LongRecord>> {
    let mut records = Vec::new();
    for (crop, month_name, raw_price) in tuples {
        let month = month_number(month_name).ok_or_else(|| EtlError::ProcessingError {
            message: format!("month name '{}' is not in the canonical set", month_name),
        })?;

        let raw_price = raw_price.trim();
        if raw_price.is_empty() {
            continue;
        }
        match raw_price.parse::<f64>() {
            Ok(price) => records.push(LongRecord {
                year,
                month,
                crop,
                price,
            }),
            Err(_) => continue,
        }
    }
    Ok(records)
}

/// Runs the full per-source chain. The outer error is fatal; the inner one
/// is a per-source skip handled at the orchestration boundary.
pub fn process_source(
    source: &SourceFile,
    skip_rows: usize,
    synonyms: &HashMap<String, String>,
) -> Result<SourceOutcome> {
    let year = match extract_year(&source.name) {
        Ok(year) => year,
        Err(skip) => return Ok(Err(skip)),
    };

    let mut table = match parse_table(&source.data, skip_rows) {
        Ok(table) => table,
        Err(skip) => return Ok(Err(skip)),
    };

    if let Err(skip) = normalize_schema(&mut table, synonyms) {
        return Ok(Err(skip));
    }

    let tuples = unpivot(&table);
    let records = assemble_records(year, tuples)?;
    Ok(Ok(records))
}

pub struct MergePipeline<S: SourceCollection, T: Storage, C: ConfigProvider> {
    collection: S,
    storage: T,
    config: C,
}

impl<S: SourceCollection, T: Storage, C: ConfigProvider> MergePipeline<S, T, C> {
    pub fn new(collection: S, storage: T, config: C) -> Self {
        Self {
            collection,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: SourceCollection, T: Storage, C: ConfigProvider> Pipeline for MergePipeline<S, T, C> {
    async fn extract(&self) -> Result<Vec<SourceFile>> {
        let names = self.collection.list_sources().await?;
        tracing::info!("Found {} files.", names.len());

        let mut sources = Vec::new();
        for name in names {
            // 單一檔案讀取失敗只跳過該檔，不影響其他來源
            match self.collection.read_source(&name).await {
                Ok(data) => sources.push(SourceFile { name, data }),
                Err(e) => tracing::warn!("⚠️ Skipping {} (read failed: {})", name, e),
            }
        }
        Ok(sources)
    }

    async fn transform(&self, sources: Vec<SourceFile>) -> Result<TransformResult> {
        let skip_rows = self.config.skip_rows();
        let synonyms = self.config.synonyms();
        let limit = self.config.concurrent_sources().max(1);

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut join_set = JoinSet::new();
        for (idx, source) in sources.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let synonyms = synonyms.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = process_source(&source, skip_rows, &synonyms);
                (idx, source.name, outcome)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let (idx, name, outcome) = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("source worker failed: {}", e),
            })?;
            outcomes.push((idx, name, outcome));
        }
        // 按來源順序合併，重跑才會得到相同輸出
        outcomes.sort_by_key(|(idx, _, _)| *idx);

        let mut records = Vec::new();
        let mut sources_processed = 0;
        let mut sources_skipped = 0;
        for (_, name, outcome) in outcomes {
            match outcome? {
                Ok(batch) => {
                    tracing::info!("Processing {}... {} records", name, batch.len());
                    sources_processed += 1;
                    records.extend(batch);
                }
                Err(skip) => {
                    tracing::warn!("⚠️ Skipping {} ({})", name, skip);
                    sources_skipped += 1;
                }
            }
        }

        if records.is_empty() {
            return Err(EtlError::EmptyResult);
        }

        // stable sort: duplicate (Crop, Year, Month) rows keep accumulation order
        records.sort_by(|a, b| {
            a.crop
                .cmp(&b.crop)
                .then_with(|| a.year.cmp(&b.year))
                .then_with(|| a.month.cmp(&b.month))
        });

        Ok(TransformResult {
            records,
            sources_processed,
            sources_skipped,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &result.records {
            writer.serialize(record)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| EtlError::ProcessingError {
                message: format!("failed to flush CSV output: {}", e),
            })?;

        tracing::debug!("Writing {} bytes to storage", data.len());
        self.storage
            .write_file(self.config.output_file(), &data)
            .await?;

        let output_path = format!(
            "{}/{}",
            self.config.output_path(),
            self.config.output_file()
        );
        tracing::info!(
            "✅ Success! Saved {} rows to {}",
            result.records.len(),
            output_path
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_synonyms() -> HashMap<String, String> {
        HashMap::from([("Item".to_string(), "Crop".to_string())])
    }

    #[test]
    fn test_extract_year_from_hyphenated_name() {
        assert_eq!(extract_year("Prices - 2019.csv").unwrap(), 2019);
        assert_eq!(extract_year("PP_Cereals and Pulses - 2013.csv").unwrap(), 2013);
    }

    #[test]
    fn test_extract_year_without_hyphen_fails() {
        assert_eq!(
            extract_year("Prices2019.csv"),
            Err(SourceSkip::YearExtraction {
                identifier: "Prices2019.csv".to_string()
            })
        );
    }

    #[test]
    fn test_extract_year_rejects_non_numeric_and_wide_values() {
        assert!(extract_year("Prices - final.csv").is_err());
        assert!(extract_year("Prices - .csv").is_err());
        assert!(extract_year("Prices - 20199.csv").is_err());
    }

    #[test]
    fn test_parse_table_skips_metadata_row() {
        let data = b"Produced by the ministry\nItem,Jan,Feb\nWheat,100,110\n";
        let table = parse_table(data, 1).unwrap();
        assert_eq!(table.headers, vec!["Item", "Jan", "Feb"]);
        assert_eq!(table.rows, vec![vec!["Wheat", "100", "110"]]);
    }

    #[test]
    fn test_parse_table_pads_short_rows() {
        let data = b"meta\nItem,Jan,Feb\nWheat,100\n";
        let table = parse_table(data, 1).unwrap();
        assert_eq!(table.rows, vec![vec!["Wheat", "100", ""]]);
    }

    #[test]
    fn test_parse_table_empty_input_is_load_failure() {
        assert!(matches!(parse_table(b"", 1), Err(SourceSkip::Load { .. })));
        assert!(matches!(
            parse_table(b"only one row\n", 1),
            Err(SourceSkip::Load { .. })
        ));
    }

    #[test]
    fn test_normalize_schema_renames_item_and_trims() {
        let mut table = RawTable {
            headers: vec![" Item ".to_string(), " Jan".to_string()],
            rows: vec![],
        };
        normalize_schema(&mut table, &default_synonyms()).unwrap();
        assert_eq!(table.headers, vec!["Crop", "Jan"]);
    }

    #[test]
    fn test_normalize_schema_rejects_table_without_crop() {
        let mut table = RawTable {
            headers: vec!["Commodity".to_string(), "Jan".to_string()],
            rows: vec![],
        };
        assert_eq!(
            normalize_schema(&mut table, &default_synonyms()),
            Err(SourceSkip::SchemaRejected)
        );
    }

    #[test]
    fn test_unpivot_emits_rows_times_present_months() {
        let table = RawTable {
            headers: vec![
                "Crop".to_string(),
                "Jan".to_string(),
                "Notes".to_string(),
                "Mar".to_string(),
            ],
            rows: vec![
                vec!["Wheat".to_string(), "100".to_string(), "x".to_string(), "105".to_string()],
                vec!["Maize".to_string(), "80".to_string(), "y".to_string(), "".to_string()],
            ],
        };
        let tuples = unpivot(&table);
        // 2 rows × 2 present month columns
        assert_eq!(tuples.len(), 4);
        // canonical month order, not table column order
        assert_eq!(tuples[0], ("Wheat".to_string(), "Jan", "100".to_string()));
        assert_eq!(tuples[1], ("Wheat".to_string(), "Mar", "105".to_string()));
    }

    #[test]
    fn test_unpivot_skips_rows_with_empty_crop() {
        let table = RawTable {
            headers: vec!["Crop".to_string(), "Jan".to_string()],
            rows: vec![
                vec!["".to_string(), "100".to_string()],
                vec!["Rice".to_string(), "90".to_string()],
            ],
        };
        assert_eq!(unpivot(&table).len(), 1);
    }

    #[test]
    fn test_unpivot_without_month_columns_is_empty() {
        let table = RawTable {
            headers: vec!["Crop".to_string(), "Notes".to_string()],
            rows: vec![vec!["Wheat".to_string(), "x".to_string()]],
        };
        assert!(unpivot(&table).is_empty());
    }

    #[test]
    fn test_assemble_records_drops_missing_and_unparseable_prices() {
        let tuples = vec![
            ("Wheat".to_string(), "Jan", "100".to_string()),
            ("Wheat".to_string(), "Feb", "".to_string()),
            ("Wheat".to_string(), "Mar", "n/a".to_string()),
            ("Wheat".to_string(), "Apr", " 101.5 ".to_string()),
        ];
        let records = assemble_records(2020, tuples).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].month, 1);
        assert_eq!(records[0].price, 100.0);
        assert_eq!(records[1].month, 4);
        assert_eq!(records[1].price, 101.5);
    }

    #[test]
    fn test_process_source_conserves_price_cells() {
        // 2 crops × 2 month columns, one missing price
        let source = SourceFile {
            name: "A - 2020.csv".to_string(),
            data: b"meta\nItem,Jan,Feb\nWheat,100,\nMaize,80,85\n".to_vec(),
        };
        let records = process_source(&source, 1, &default_synonyms())
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.year == 2020));
    }

    #[test]
    fn test_process_source_skips_on_bad_year() {
        let source = SourceFile {
            name: "nodate.csv".to_string(),
            data: b"meta\nItem,Jan\nWheat,100\n".to_vec(),
        };
        assert!(matches!(
            process_source(&source, 1, &default_synonyms()).unwrap(),
            Err(SourceSkip::YearExtraction { .. })
        ));
    }
}
