//! Calor quickstart: build a medium, run both solvers, compare them.
//!
//! Demonstrates:
//!   1. Describing a material (conductance, air map, initial field)
//!   2. Running the sequential reference solver
//!   3. Running the distributed solver on four ranks with snapshots
//!   4. Verifying the two final fields and reading the snapshots back
//!
//! Run with:
//!   RUST_LOG=info cargo run --example quickstart

use calor_core::material::{AIR, CONDUCTOR};
use calor_core::MaterialProperties;
use calor_engine::{run_distributed, run_sequential, verify, IoMode, SimulationParams};
use calor_io::{derive_output_path, read_snapshots};

// ─── Grid parameters ────────────────────────────────────────────

const EDGE: usize = 64;
const AMBIENT: f32 = 20.0;
const HOT: f32 = 400.0;
const COOLER: f32 = 10.0;

// ─── Material: a hot plate with a cooled slot down the middle ───

fn build_material() -> Result<MaterialProperties, Box<dyn std::error::Error>> {
    let n = EDGE * EDGE;
    let mut temp = vec![AMBIENT; n];
    let mut map = vec![CONDUCTOR; n];
    let params = vec![1.0; n];
    for i in 0..EDGE {
        for j in 0..EDGE {
            let k = i * EDGE + j;
            if (24..40).contains(&i) && (8..24).contains(&j) {
                temp[k] = HOT;
            }
            if j == EDGE / 2 && (8..EDGE - 8).contains(&i) {
                map[k] = AIR;
            }
        }
    }
    Ok(MaterialProperties::new(EDGE, params, map, temp, COOLER)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let material = build_material()?;
    let base = std::env::temp_dir().join("calor-quickstart.snap");
    let params = SimulationParams {
        iterations: 200,
        disk_write_intensity: 50,
        process_count: 4,
        io_mode: IoMode::Parallel,
        output_path: Some(base.clone()),
        ..Default::default()
    };

    let seq = run_sequential(&material, &params)?;
    let par = run_distributed(&material, &params)?;
    println!(
        "sequential: avg {:.4} in {:?}; distributed ({}x{} tiles): avg {:.4} in {:?}",
        seq.middle_column_avg,
        seq.elapsed,
        par.partition.rows(),
        par.partition.cols(),
        par.middle_column_avg,
        par.elapsed
    );

    let seq_name = derive_output_path(&base, "seq");
    let par_name = derive_output_path(&base, "par");
    println!("{}", seq.summary(seq_name.display().to_string()));
    println!("{}", par.summary(par_name.display().to_string()));

    let report = verify(&seq.field, &par.field, params.tolerance);
    println!("{report}");

    let par_path = par_name;
    for (name, snapshot) in read_snapshots(&par_path)? {
        let peak = snapshot.data.iter().copied().fold(f32::MIN, f32::max);
        println!("{name}: time {} peak {peak:.2}", snapshot.time);
    }
    println!("snapshots in {}", par_path.display());
    Ok(())
}
