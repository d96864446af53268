use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use hotel_dashboard::{CustomerType, Hotel, Month};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a, T>(&mut self, items: &'a [(T, u32)]) -> &'a T {
        let total: u32 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.below(u64::from(total)) as u32;
        for (item, w) in items {
            if roll < *w {
                return item;
            }
            roll -= w;
        }
        &items[items.len() - 1].0
    }
}

#[derive(Default)]
struct Columns {
    hotel: Vec<&'static str>,
    year: Vec<i64>,
    month: Vec<&'static str>,
    country: Vec<&'static str>,
    customer_type: Vec<&'static str>,
    is_canceled: Vec<i64>,
    adults: Vec<i64>,
    children: Vec<Option<f64>>,
    babies: Vec<i64>,
    adr: Vec<f64>,
    weekend: Vec<i64>,
    week: Vec<i64>,
    repeated: Vec<i64>,
    reserved: Vec<&'static str>,
    assigned: Vec<&'static str>,
    channel: Vec<&'static str>,
}

const ROWS: usize = 2000;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let countries = [
        ("PRT", 40),
        ("GBR", 12),
        ("FRA", 10),
        ("ESP", 8),
        ("DEU", 7),
        ("ITA", 6),
        ("TUR", 4),
        ("RUS", 3),
        ("NLD", 3),
    ];
    let customer_types = [
        (CustomerType::Transient, 70),
        (CustomerType::TransientParty, 20),
        (CustomerType::Contract, 6),
        (CustomerType::Group, 4),
    ];
    let channels = [("TA/TO", 80), ("Direct", 12), ("Corporate", 6), ("GDS", 2)];
    let room_types = [("A", 70), ("D", 16), ("E", 7), ("F", 4), ("G", 3)];

    let mut c = Columns::default();
    for _ in 0..ROWS {
        let hotel = if rng.chance(0.66) {
            Hotel::CityHotel
        } else {
            Hotel::ResortHotel
        };
        let year = 2015 + rng.below(3) as i64;
        let month = Month::ALL[rng.below(12) as usize];

        // Summer arrivals book more weekend nights and pay more.
        let summer = matches!(month, Month::June | Month::July | Month::August);
        let adults = 1 + rng.below(3) as i64;
        let children = if rng.chance(0.002) {
            None
        } else if rng.chance(0.1) {
            Some(1.0 + rng.below(2) as f64)
        } else {
            Some(0.0)
        };
        let babies = i64::from(rng.chance(0.01));
        let base = match hotel {
            Hotel::CityHotel => 95.0,
            Hotel::ResortHotel => 80.0,
        };
        let season = if summer { 1.4 } else { 1.0 };
        let adr = base * season + rng.next_f64() * 60.0 - 30.0;

        let reserved = *rng.weighted(&room_types);
        let assigned = if rng.chance(0.85) {
            reserved
        } else {
            *rng.weighted(&room_types)
        };

        c.hotel.push(hotel.as_str());
        c.year.push(year);
        c.month.push(month.as_str());
        c.country.push(*rng.weighted(&countries));
        c.customer_type.push(rng.weighted(&customer_types).as_str());
        c.is_canceled.push(i64::from(rng.chance(0.37)));
        c.adults.push(adults);
        c.children.push(children);
        c.babies.push(babies);
        c.adr.push(adr.max(0.0));
        c.weekend.push(rng.below(if summer { 4 } else { 3 }) as i64);
        c.week.push(rng.below(6) as i64);
        c.repeated.push(i64::from(rng.chance(0.03)));
        c.reserved.push(reserved);
        c.assigned.push(assigned);
        c.channel.push(*rng.weighted(&channels));
    }

    let utf8 = |name: &str| Field::new(name, DataType::Utf8, false);
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let schema = Arc::new(Schema::new(vec![
        utf8("hotel"),
        int("is_canceled"),
        int("arrival_date_year"),
        utf8("arrival_date_month"),
        int("stays_in_weekend_nights"),
        int("stays_in_week_nights"),
        int("adults"),
        Field::new("children", DataType::Float64, true),
        int("babies"),
        utf8("country"),
        utf8("distribution_channel"),
        int("is_repeated_guest"),
        utf8("reserved_room_type"),
        utf8("assigned_room_type"),
        utf8("customer_type"),
        Field::new("adr", DataType::Float64, false),
    ]));

    let strings = |v: Vec<&'static str>| Arc::new(StringArray::from(v)) as ArrayRef;
    let ints = |v: Vec<i64>| Arc::new(Int64Array::from(v)) as ArrayRef;

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(c.hotel),
            ints(c.is_canceled),
            ints(c.year),
            strings(c.month),
            ints(c.weekend),
            ints(c.week),
            ints(c.adults),
            Arc::new(Float64Array::from(c.children)) as ArrayRef,
            ints(c.babies),
            strings(c.country),
            strings(c.channel),
            ints(c.repeated),
            strings(c.reserved),
            strings(c.assigned),
            strings(c.customer_type),
            Arc::new(Float64Array::from(c.adr)) as ArrayRef,
        ],
    )
    .context("building record batch")?;

    // Parquet
    let parquet_path = "sample_bookings.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    // CSV, same columns, `NA` for missing children like the public dataset
    let csv_path = "sample_bookings.csv";
    write_csv(csv_path, &batch)?;

    println!("Wrote {ROWS} reservations to {parquet_path} and {csv_path}");
    Ok(())
}

fn write_csv(path: &str, batch: &RecordBatch) -> Result<()> {
    use arrow::util::display::{ArrayFormatter, FormatOptions};

    let options = FormatOptions::default().with_null("NA");
    let formatters = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()
        .context("formatting columns")?;

    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    let schema = batch.schema();
    writer
        .write_record(schema.fields().iter().map(|f| f.name().as_str()))
        .context("writing CSV header")?;
    for row in 0..batch.num_rows() {
        let record: Vec<String> = formatters
            .iter()
            .map(|f| f.value(row).to_string())
            .collect();
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}
