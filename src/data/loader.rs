use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{BookingDataset, Reservation, parse_flag};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the reservation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the `Hotel Bookings.csv` layout, one reservation per row
/// * `.json`    – `[{ "hotel": ..., "arrival_date_year": ..., ... }, ...]`
/// * `.parquet` – same columns as the CSV, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<BookingDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} reservations from {} ({} hotels, {} years, {} countries)",
        dataset.len(),
        path.display(),
        dataset.hotels.len(),
        dataset.years.len(),
        dataset.countries.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns (lead_time, meal, ...) are
/// ignored. Rows in error messages count data records from 1.
fn load_csv(path: &Path) -> Result<BookingDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut reservations = Vec::new();
    for (row_no, result) in reader.deserialize::<Reservation>().enumerate() {
        let reservation = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        reservations.push(reservation);
    }

    Ok(BookingDataset::from_reservations(reservations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<BookingDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let reservations: Vec<Reservation> =
        serde_json::from_str(&text).context("parsing JSON reservations")?;
    Ok(BookingDataset::from_reservations(reservations))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the booking columns.
///
/// Integer columns may be Int32 or Int64, `adr` Float32 or Float64, and
/// `children` may come through as a float with nulls (the Pandas export of a
/// column containing NaN).
fn load_parquet(path: &Path) -> Result<BookingDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut reservations = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let base = reservations.len();
        read_batch(&batch, base, &mut reservations)?;
    }

    Ok(BookingDataset::from_reservations(reservations))
}

fn column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn read_batch(batch: &RecordBatch, base: usize, out: &mut Vec<Reservation>) -> Result<()> {
    let col = |name: &str| column(batch, name);

    let hotel = col("hotel")?;
    let year = col("arrival_date_year")?;
    let month = col("arrival_date_month")?;
    let country = col("country")?;
    let customer_type = col("customer_type")?;
    let is_canceled = col("is_canceled")?;
    let adults = col("adults")?;
    let children = col("children")?;
    let babies = col("babies")?;
    let adr = col("adr")?;
    let weekend = col("stays_in_weekend_nights")?;
    let week = col("stays_in_week_nights")?;
    let repeated = col("is_repeated_guest")?;
    let reserved = col("reserved_room_type")?;
    let assigned = col("assigned_room_type")?;
    let channel = col("distribution_channel")?;

    for row in 0..batch.num_rows() {
        let row_no = base + row + 1;
        let reservation = (|| -> Result<Reservation> {
            Ok(Reservation {
                hotel: extract_string(hotel, row)?.parse()?,
                arrival_year: i32::try_from(extract_i64(year, row)?)?,
                arrival_month: extract_string(month, row)?.parse()?,
                country: extract_string(country, row)?,
                customer_type: extract_string(customer_type, row)?.parse()?,
                is_canceled: extract_flag(is_canceled, row)?,
                adults: extract_count(adults, row, row_no)?,
                children: extract_count(children, row, row_no)?,
                babies: extract_count(babies, row, row_no)?,
                adr: extract_f64(adr, row)?,
                stays_in_weekend_nights: extract_count(weekend, row, row_no)?,
                stays_in_week_nights: extract_count(week, row, row_no)?,
                is_repeated_guest: extract_flag(repeated, row)?,
                reserved_room_type: extract_string(reserved, row)?,
                assigned_room_type: extract_string(assigned, row)?,
                distribution_channel: extract_string(channel, row)?,
            })
        })()
        .with_context(|| format!("Parquet row {row_no}"))?;
        out.push(reservation);
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        // Country is NULL for a few hundred rows of the public dataset.
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(i64::from(arr.value(row)))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("Expected an integer column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    match col.data_type() {
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(f64::from(arr.value(row)))
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Int32 | DataType::Int64 => Ok(extract_i64(col, row)? as f64),
        other => bail!("Expected a numeric column, got {other:?}"),
    }
}

/// Non-negative count; null or NaN reads as zero. `row_no` is the
/// file-wide row number reported in the warning.
fn extract_count(col: &Arc<dyn Array>, row: usize, row_no: usize) -> Result<u32> {
    if col.is_null(row) {
        log::warn!("null count at row {row_no}, reading as 0");
        return Ok(0);
    }
    match col.data_type() {
        DataType::Float32 | DataType::Float64 => {
            let v = extract_f64(col, row)?;
            if v.is_nan() {
                return Ok(0);
            }
            if v < 0.0 {
                bail!("negative count {v}");
            }
            Ok(v as u32)
        }
        _ => Ok(u32::try_from(extract_i64(col, row)?)?),
    }
}

fn extract_flag(col: &Arc<dyn Array>, row: usize) -> Result<bool> {
    if col.is_null(row) {
        return Ok(false);
    }
    match col.data_type() {
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Ok(arr.value(row))
        }
        DataType::Utf8 | DataType::LargeUtf8 => Ok(parse_flag(&extract_string(col, row)?)?),
        _ => Ok(extract_i64(col, row)? != 0),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{CustomerType, Hotel, Month};

    const CSV: &str = "\
hotel,is_canceled,lead_time,arrival_date_year,arrival_date_month,stays_in_weekend_nights,stays_in_week_nights,adults,children,babies,country,distribution_channel,is_repeated_guest,reserved_room_type,assigned_room_type,customer_type,adr
Resort Hotel,0,342,2015,July,0,0,2,0,0,PRT,Direct,0,C,C,Transient,0
City Hotel,1,88,2016,March,2,4,2,NA,0,TUR,TA/TO,0,A,A,Transient-Party,76.5
Resort Hotel,0,14,2017,August,1,3,2,1,1,ITA,Corporate,1,D,E,Contract,120.25
";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_extra_columns_and_na_children() {
        let file = write_temp(".csv", CSV);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 3);

        let r = &ds.reservations[1];
        assert_eq!(r.hotel, Hotel::CityHotel);
        assert_eq!(r.arrival_month, Month::March);
        assert_eq!(r.customer_type, CustomerType::TransientParty);
        assert!(r.is_canceled);
        assert_eq!(r.children, 0);
        assert_eq!(r.adr, 76.5);
        assert_eq!(r.stays_in_week_nights, 4);

        assert_eq!(ds.reservations[2].family_size(), 4);
        assert!(ds.reservations[2].is_repeated_guest);
        assert_eq!(ds.hotels, vec![Hotel::ResortHotel, Hotel::CityHotel]);
        assert_eq!(ds.years, vec![2015, 2016, 2017]);
    }

    #[test]
    fn csv_unknown_hotel_names_the_row() {
        let bad = CSV.replace("City Hotel", "Hostel");
        let file = write_temp(".csv", &bad);
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 2"), "{err:#}");
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[{
            "hotel": "Resort Hotel", "arrival_date_year": 2015,
            "arrival_date_month": "July", "country": "PRT",
            "customer_type": "Group", "is_canceled": 0, "adults": 2,
            "children": 0.0, "babies": 0, "adr": 55.0,
            "stays_in_weekend_nights": 1, "stays_in_week_nights": 1,
            "is_repeated_guest": 1, "reserved_room_type": "A",
            "assigned_room_type": "A", "distribution_channel": "Direct"
        }]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.reservations[0].customer_type, CustomerType::Group);
        assert!(ds.reservations[0].is_repeated_guest);
    }

    /// Two-row Parquet file: a City Hotel row, then `second_hotel` with a null
    /// country and null children.
    fn parquet_file(second_hotel: &str) -> tempfile::NamedTempFile {
        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let utf8 = |name: &str| Field::new(name, DataType::Utf8, true);
        let int = |name: &str| Field::new(name, DataType::Int64, false);
        let schema = Arc::new(Schema::new(vec![
            utf8("hotel"),
            int("arrival_date_year"),
            utf8("arrival_date_month"),
            utf8("country"),
            utf8("customer_type"),
            int("is_canceled"),
            int("adults"),
            Field::new("children", DataType::Float64, true),
            int("babies"),
            Field::new("adr", DataType::Float64, false),
            int("stays_in_weekend_nights"),
            int("stays_in_week_nights"),
            int("is_repeated_guest"),
            utf8("reserved_room_type"),
            utf8("assigned_room_type"),
            utf8("distribution_channel"),
        ]));
        let strings = |v: [Option<&str>; 2]| Arc::new(StringArray::from(v.to_vec())) as Arc<dyn Array>;
        let ints = |v: [i64; 2]| Arc::new(Int64Array::from(v.to_vec())) as Arc<dyn Array>;
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                strings([Some("City Hotel"), Some(second_hotel)]),
                ints([2016, 2017]),
                strings([Some("May"), Some("December")]),
                strings([Some("RUS"), None]),
                strings([Some("Transient"), Some("Contract")]),
                ints([1, 0]),
                ints([2, 1]),
                Arc::new(Float64Array::from(vec![Some(1.0), None])) as Arc<dyn Array>,
                ints([0, 0]),
                Arc::new(Float64Array::from(vec![99.0, 45.5])) as Arc<dyn Array>,
                ints([2, 0]),
                ints([5, 1]),
                ints([0, 1]),
                strings([Some("A"), Some("B")]),
                strings([Some("A"), Some("B")]),
                strings([Some("TA/TO"), Some("Direct")]),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn loads_parquet_with_float_children() {
        let file = parquet_file("Resort Hotel");
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.reservations[0];
        assert_eq!(first.hotel, Hotel::CityHotel);
        assert_eq!(first.family_size(), 3);
        assert!(first.is_canceled);
        let second = &ds.reservations[1];
        assert_eq!(second.arrival_month, Month::December);
        assert_eq!(second.country, "");
        assert_eq!(second.children, 0);
        assert!(second.is_repeated_guest);
    }

    #[test]
    fn parquet_errors_count_rows_from_one() {
        let file = parquet_file("Hostel");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Parquet row 2"), "{err:#}");
    }

    #[test]
    fn csv_blank_country_and_missing_adr() {
        let csv = CSV
            .replace(",PRT,Direct,", ",,Direct,")
            .replace("Transient-Party,76.5", "Transient-Party,")
            .replace("Contract,120.25", "Contract,NA");
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.reservations[0].country, "");
        assert_eq!(ds.reservations[0].adr, 0.0);
        assert!(ds.reservations[1].adr.is_nan());
        assert!(ds.reservations[2].adr.is_nan());
        assert_eq!(ds.countries, vec!["".to_string(), "TUR".into(), "ITA".into()]);
    }

    #[test]
    fn json_null_country_and_adr() {
        let json = r#"[{
            "hotel": "City Hotel", "arrival_date_year": 2016,
            "arrival_date_month": "March", "country": null,
            "customer_type": "Transient", "is_canceled": 1, "adults": 1,
            "children": null, "babies": 0, "adr": null,
            "stays_in_weekend_nights": 0, "stays_in_week_nights": 2,
            "is_repeated_guest": 0, "reserved_room_type": "A",
            "assigned_room_type": "A", "distribution_channel": "TA/TO"
        }, {
            "hotel": "City Hotel", "arrival_date_year": 2016,
            "arrival_date_month": "March", "country": "",
            "customer_type": "Transient", "is_canceled": 0, "adults": 2,
            "children": 0, "babies": 0, "adr": 61,
            "stays_in_weekend_nights": 1, "stays_in_week_nights": 0,
            "is_repeated_guest": 0, "reserved_room_type": "A",
            "assigned_room_type": "A", "distribution_channel": "Direct"
        }]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.reservations[0].country, "");
        assert!(ds.reservations[0].adr.is_nan());
        assert_eq!(ds.reservations[1].country, "");
        assert_eq!(ds.reservations[1].adr, 61.0);
        assert_eq!(ds.countries, vec!["".to_string()]);
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/nonexistent/Hotel Bookings.csv")).is_err());
    }
}
