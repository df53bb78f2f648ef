use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value};

const OBJECTS: usize = 2000;
const SOLAR_RADIUS_AU: f64 = 0.004_650_47;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn log_normal(&mut self, median: f64, sigma: f64) -> f64 {
        median * self.gauss(0.0, sigma).exp()
    }
}

/// Column-oriented synthetic KOI table.
#[derive(Default)]
struct KoiColumns {
    koi: Vec<f64>,
    a: Vec<f64>,
    rplanet: Vec<f64>,
    rstar: Vec<f64>,
    tplanet: Vec<f64>,
    mstar: Vec<f64>,
    tstar: Vec<f64>,
    ra: Vec<f64>,
    dec: Vec<f64>,
    per: Vec<f64>,
    kmag: Vec<f64>,
    row: Vec<i64>,
}

impl KoiColumns {
    fn generate(rng: &mut SimpleRng, n: usize) -> Self {
        let mut cols = KoiColumns::default();
        for i in 0..n {
            let rstar = rng.log_normal(1.0, 0.35).clamp(0.1, 60.0);
            let mstar = (rstar.powf(1.25) * rng.uniform(0.85, 1.15)).clamp(0.08, 20.0);
            let tstar = (5778.0 * mstar.powf(0.5) * rng.uniform(0.9, 1.1)).round();
            // Roughly 2% of rows carry an unusable period, as in the real catalog.
            let per = if rng.next_f64() < 0.02 {
                -1.0
            } else {
                rng.log_normal(12.0, 1.4).clamp(0.3, 1500.0)
            };
            // Kepler's third law in AU / years / solar masses.
            let a = (mstar * (per.max(0.0) / 365.25).powi(2)).cbrt();
            let tplanet = if a > 0.0 {
                (tstar * (rstar * SOLAR_RADIUS_AU / (2.0 * a)).sqrt() * 0.87).round()
            } else {
                0.0
            };
            let rplanet = rng.log_normal(2.2, 0.8).clamp(0.3, 60.0);

            cols.koi.push((i / 3 + 1) as f64 + ((i % 3) + 1) as f64 / 100.0);
            cols.a.push(a);
            cols.rplanet.push(rplanet);
            cols.rstar.push(rstar);
            cols.tplanet.push(tplanet);
            cols.mstar.push(mstar);
            cols.tstar.push(tstar);
            cols.ra.push(rng.uniform(280.0, 301.0));
            cols.dec.push(rng.uniform(36.5, 52.5));
            cols.per.push(per);
            cols.kmag.push(rng.gauss(14.0, 1.2));
            cols.row.push(i as i64 + 1);
        }
        cols
    }

    fn float_columns(&self) -> [(&'static str, &Vec<f64>); 11] {
        [
            ("KOI", &self.koi),
            ("A", &self.a),
            ("RPLANET", &self.rplanet),
            ("RSTAR", &self.rstar),
            ("TPLANET", &self.tplanet),
            ("MSTAR", &self.mstar),
            ("TSTAR", &self.tstar),
            ("RA", &self.ra),
            ("DEC", &self.dec),
            ("PER", &self.per),
            ("KMAG", &self.kmag),
        ]
    }

    fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields: Vec<Field> = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (name, values) in self.float_columns() {
            fields.push(Field::new(name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values.clone())));
        }
        fields.push(Field::new("ROW", DataType::Int64, false));
        arrays.push(Arc::new(Int64Array::from(self.row.clone())));

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .context("Failed to create RecordBatch")
    }

    /// Records-oriented JSON, the shape the asterank API returns.
    fn to_json(&self) -> Value {
        let records = (0..self.row.len())
            .map(|i| {
                let mut obj = Map::new();
                for (name, values) in self.float_columns() {
                    obj.insert(name.to_string(), Value::from(values[i]));
                }
                obj.insert("ROW".to_string(), Value::from(self.row[i]));
                Value::Object(obj)
            })
            .collect();
        Value::Array(records)
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = KoiColumns::generate(&mut rng, OBJECTS);
    let batch = cols.to_record_batch()?;

    // Write Parquet
    let parquet_path = "sample_koi.parquet";
    let file = std::fs::File::create(parquet_path).context("Failed to create output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    // Write JSON
    let json_path = "sample_koi.json";
    let text = serde_json::to_string_pretty(&cols.to_json()).context("Failed to encode JSON")?;
    std::fs::write(json_path, text).context("Failed to write JSON")?;

    let preview = pretty_format_batches(&[batch.slice(0, 5)]).context("Failed to format preview")?;
    println!("{preview}");
    println!("Wrote {OBJECTS} objects to {parquet_path} and {json_path}");
    Ok(())
}
