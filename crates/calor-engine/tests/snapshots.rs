//! Snapshot containers written by both solvers and every I/O mode.

use std::fs;
use std::path::PathBuf;

use calor_engine::{run_distributed, run_sequential, IoMode, RunError, SimulationParams};
use calor_io::{derive_output_path, read_snapshots, SnapshotError};
use calor_test_utils::{random_material, temp_output};

fn with_output(base: &PathBuf, mode: IoMode, ranks: usize) -> SimulationParams {
    SimulationParams {
        iterations: 7,
        disk_write_intensity: 3,
        process_count: ranks,
        io_mode: mode,
        batch_mode: true,
        output_path: Some(base.clone()),
        ..Default::default()
    }
}

fn cleanup(base: &PathBuf) {
    for variant in ["seq", "par"] {
        let _ = fs::remove_file(derive_output_path(base, variant));
    }
}

#[test]
fn every_io_mode_matches_the_sequential_file() {
    let material = random_material(16, 5);
    for mode in [IoMode::Serial, IoMode::SerialOverlapped, IoMode::Parallel] {
        let base = temp_output("modes");
        let p = with_output(&base, mode, 4);
        run_sequential(&material, &p).unwrap();
        run_distributed(&material, &p).unwrap();

        let seq = read_snapshots(derive_output_path(&base, "seq")).unwrap();
        let par = read_snapshots(derive_output_path(&base, "par")).unwrap();
        // Iterations 0, 3 and 6.
        let names: Vec<_> = par.keys().cloned().collect();
        assert_eq!(names, ["Timestep_0", "Timestep_1", "Timestep_2"], "{mode}");
        assert_eq!(seq, par, "{mode}");
        let times: Vec<_> = par.values().map(|s| s.time).collect();
        assert_eq!(times, [0.0, 3.0, 6.0]);
        cleanup(&base);
    }
}

#[test]
fn parallel_and_serial_files_are_byte_identical() {
    let material = random_material(12, 8);
    let serial = temp_output("bytes-serial");
    let parallel = temp_output("bytes-parallel");
    run_distributed(&material, &with_output(&serial, IoMode::Serial, 6)).unwrap();
    run_distributed(&material, &with_output(&parallel, IoMode::Parallel, 6)).unwrap();
    assert_eq!(
        fs::read(derive_output_path(&serial, "par")).unwrap(),
        fs::read(derive_output_path(&parallel, "par")).unwrap()
    );
    cleanup(&serial);
    cleanup(&parallel);
}

#[test]
fn zero_iterations_write_no_snapshots() {
    let material = random_material(8, 2);
    let base = temp_output("empty");
    let p = SimulationParams {
        iterations: 0,
        ..with_output(&base, IoMode::Parallel, 4)
    };
    run_distributed(&material, &p).unwrap();
    assert!(read_snapshots(derive_output_path(&base, "par")).unwrap().is_empty());
    cleanup(&base);
}

#[test]
fn unwritable_output_stops_every_rank() {
    let material = random_material(8, 2);
    let base = std::env::temp_dir()
        .join("calor-missing-dir")
        .join("nested")
        .join("run.snap");
    for mode in [IoMode::Serial, IoMode::Parallel] {
        match run_distributed(&material, &with_output(&base, mode, 4)) {
            Err(RunError::Snapshot(SnapshotError::Io(_))) => {}
            other => panic!("expected I/O error, got {other:?}"),
        }
    }
}

#[test]
fn invalid_config_creates_no_file() {
    let material = random_material(8, 2);
    let base = temp_output("invalid");
    let p = SimulationParams {
        disk_write_intensity: 0,
        ..with_output(&base, IoMode::Serial, 4)
    };
    match run_distributed(&material, &p) {
        Err(RunError::Config(_)) => {}
        other => panic!("expected config error, got {other:?}"),
    }
    assert!(!derive_output_path(&base, "par").exists());
}
