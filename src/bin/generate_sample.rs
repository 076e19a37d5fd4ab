//! Generate deterministic sample datasets for the two dashboards.
//!
//! Writes `avance.csv`, `avance.parquet` and `avance_real.csv` into the
//! directory given as the first argument (default: current directory).
//! A few records get an unparseable `S/R` ranking on purpose so the null
//! handling shows up in the UI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_EMPLOYEES: usize = 120;

const NOMBRES: &[&str] = &[
    "ROSA", "JUAN", "ANA", "LUIS", "MARIA", "CARLOS", "LUCIA", "JORGE", "ELENA", "PEDRO",
    "CARMEN", "DIEGO", "SOFIA", "MIGUEL", "VALERIA",
];
const APELLIDOS: &[&str] = &[
    "QUISPE", "PEREZ", "TORRES", "GARCIA", "RAMOS", "FLORES", "CASTILLO", "ROJAS", "VARGAS",
    "MENDOZA", "HUAMAN", "SALAZAR",
];
const DEPARTAMENTOS: &[&str] = &["LIMA", "AREQUIPA", "CUSCO", "TRUJILLO", "PIURA"];
const CANALES: &[&str] = &["TIENDA", "CALL CENTER", "DIGITAL"];
const CLUSTERS: &[&str] = &["ORO", "PLATA", "BRONCE"];

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

    /// Uniform float in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.uniform(0.0, 1.0) < p
    }
}

/// One synthetic employee; metric values are stored as 0–1.3 fractions and
/// scaled to percent where the first dashboard expects pre-scaled numbers.
struct Employee {
    hc: u64,
    nombre: String,
    departamento: &'static str,
    canal: &'static str,
    cluster: &'static str,
    pp: f64,
    ss: f64,
    eqv: f64,
    /// `None` renders as the unparseable `S/R` marker.
    ranking: Option<usize>,
    ganador: bool,
}

fn generate_employees(rng: &mut SimpleRng) -> Vec<Employee> {
    let mut employees: Vec<Employee> = (0..N_EMPLOYEES)
        .map(|i| {
            let nombre = format!("{} {}", rng.pick(NOMBRES), rng.pick(APELLIDOS));
            Employee {
                hc: 40 + i as u64 * 7 % 90000,
                nombre,
                departamento: rng.pick(DEPARTAMENTOS),
                canal: rng.pick(CANALES),
                cluster: rng.pick(CLUSTERS),
                pp: rng.uniform(0.2, 1.3),
                ss: rng.uniform(0.2, 1.3),
                eqv: rng.uniform(0.2, 1.3),
                ranking: None,
                ganador: false,
            }
        })
        .collect();

    // Rank by equivalent progress, best first.
    let mut order: Vec<usize> = (0..employees.len()).collect();
    order.sort_by(|&a, &b| employees[b].eqv.total_cmp(&employees[a].eqv));
    for (rank, &idx) in order.iter().enumerate() {
        employees[idx].ranking = Some(rank + 1);
        employees[idx].ganador = rank < 15;
    }

    // A handful of employees never got ranked.
    for emp in employees.iter_mut() {
        if rng.chance(0.04) {
            emp.ranking = None;
            emp.ganador = false;
        }
    }

    employees
}

fn ranking_text(ranking: Option<usize>) -> String {
    match ranking {
        Some(r) => r.to_string(),
        None => "S/R".to_string(),
    }
}

fn cumple(fraction: f64) -> &'static str {
    if fraction >= 1.0 {
        "SI"
    } else {
        "NO"
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// First dashboard: percent-scaled metrics, numeric HC.
fn write_avance_csv(path: &Path, employees: &[Employee]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating avance.csv")?;
    writer.write_record([
        "Ranking",
        "HC",
        "NOMBRE",
        "DEMPARTAMENTO",
        "CANAL",
        "Ganadores",
        "Avance PP Total",
        "Avance Eqv Total",
        "Cumple PP",
        "Cumple SS",
    ])?;
    for emp in employees {
        writer.write_record([
            ranking_text(emp.ranking),
            emp.hc.to_string(),
            emp.nombre.clone(),
            emp.departamento.to_string(),
            emp.canal.to_string(),
            (emp.ganador as u8).to_string(),
            format!("{:.1}", emp.pp * 100.0),
            format!("{:.1}", emp.eqv * 100.0),
            cumple(emp.pp).to_string(),
            cumple(emp.ss).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Second dashboard: fraction metrics, zero-padded HC, attainment counts.
fn write_avance_real_csv(path: &Path, employees: &[Employee]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating avance_real.csv")?;
    writer.write_record([
        "Ranking",
        "HC",
        "NOMBRE",
        "DEPARTAMENTO",
        "CLUSTER",
        "Ganadores",
        "Avance PP Ene",
        "Avance SS Ene",
        "Avance Eqv Ene",
        "AVANCE ENE PP",
        "AVANCE ENE SS",
    ])?;
    for emp in employees {
        writer.write_record([
            ranking_text(emp.ranking),
            format!("{:05}", emp.hc),
            emp.nombre.clone(),
            emp.departamento.to_string(),
            emp.cluster.to_string(),
            (emp.ganador as u8).to_string(),
            format!("{:.3}", emp.pp),
            format!("{:.3}", emp.ss),
            format!("{:.3}", emp.eqv),
            format!("{}/10", ((emp.pp * 10.0) as u64).min(10)),
            format!("{}/10", ((emp.ss * 10.0) as u64).min(10)),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Same data as `avance.csv`, as Parquet, with a proper nullable rank column.
fn write_avance_parquet(path: &Path, employees: &[Employee]) -> Result<()> {
    let schema = Schema::new(vec![
        Field::new("Ranking", DataType::Int64, true),
        Field::new("HC", DataType::Int64, false),
        Field::new("NOMBRE", DataType::Utf8, false),
        Field::new("DEMPARTAMENTO", DataType::Utf8, false),
        Field::new("CANAL", DataType::Utf8, false),
        Field::new("Ganadores", DataType::Int64, false),
        Field::new("Avance PP Total", DataType::Float64, false),
        Field::new("Avance Eqv Total", DataType::Float64, false),
        Field::new("Cumple PP", DataType::Utf8, false),
        Field::new("Cumple SS", DataType::Utf8, false),
    ]);

    let rankings: Int64Array = employees
        .iter()
        .map(|e| e.ranking.map(|r| r as i64))
        .collect();
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(rankings),
            Arc::new(Int64Array::from_iter_values(
                employees.iter().map(|e| e.hc as i64),
            )),
            Arc::new(StringArray::from_iter_values(
                employees.iter().map(|e| e.nombre.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                employees.iter().map(|e| e.departamento),
            )),
            Arc::new(StringArray::from_iter_values(
                employees.iter().map(|e| e.canal),
            )),
            Arc::new(Int64Array::from_iter_values(
                employees.iter().map(|e| e.ganador as i64),
            )),
            Arc::new(Float64Array::from_iter_values(
                employees.iter().map(|e| e.pp * 100.0),
            )),
            Arc::new(Float64Array::from_iter_values(
                employees.iter().map(|e| e.eqv * 100.0),
            )),
            Arc::new(StringArray::from_iter_values(
                employees.iter().map(|e| cumple(e.pp)),
            )),
            Arc::new(StringArray::from_iter_values(
                employees.iter().map(|e| cumple(e.ss)),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating avance.parquet")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(20260131);
    let employees = generate_employees(&mut rng);

    write_avance_csv(&out_dir.join("avance.csv"), &employees)?;
    write_avance_parquet(&out_dir.join("avance.parquet"), &employees)?;
    write_avance_real_csv(&out_dir.join("avance_real.csv"), &employees)?;

    println!(
        "Wrote {} employees to avance.csv, avance.parquet and avance_real.csv in {}",
        employees.len(),
        out_dir.display()
    );
    Ok(())
}
