use ballsim::error::{Error, Result};
use ballsim::scenario::{FinalState, Scenario};
use std::io::Write;

fn write_temp(contents: &str) -> Result<tempfile::NamedTempFile> {
    let mut f = tempfile::NamedTempFile::new()?;
    f.write_all(contents.as_bytes())?;
    f.flush()?;
    Ok(f)
}

#[test]
fn loads_runs_and_reports_in_input_order() -> Result<()> {
    let file = write_temp(
        "100 10\n\
         80 50 -5 0 4 1\n\
         20 50 5 0 4 1\n\
         50 90 0 0 2 3\n",
    )?;
    let mut sim = Scenario::from_path(file.path())?.into_simulation()?;
    sim.run()?;
    let report = FinalState::capture(&sim);
    let text = report.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "100");
    assert_eq!(lines[1], "10");
    // The resting third disk is reported last and unchanged.
    assert_eq!(lines[4], "50 90 0 0 2 3");
    // Head-on pair met at t = 5.2 and swapped velocities.
    assert_eq!(report.particles[0].vx, 5.0);
    assert_eq!(report.particles[1].vx, -5.0);
    Ok(())
}

#[test]
fn malformed_file_fails_before_simulating() -> Result<()> {
    let file = write_temp("100 10\n80 50 -5 0 4 1\n20 50 5 zero 4 1\n")?;
    match Scenario::from_path(file.path()) {
        Err(Error::Parse { line, message }) => {
            assert_eq!(line, 3);
            assert!(message.contains("vy"), "{message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn overlapping_input_is_rejected_at_construction() -> Result<()> {
    let scenario = Scenario::parse("100 10\n50 50 0 0 5 1\n55 50 0 0 5 1\n")?;
    let err = scenario.into_simulation().unwrap_err();
    assert!(matches!(err, Error::InvalidParam(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Scenario::from_path("/definitely/not/here.txt").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn bundled_sample_runs_to_completion() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample.txt");
    let mut sim = Scenario::from_path(path)?.into_simulation()?;
    let e0 = sim.kinetic_energy();
    sim.run()?;
    assert_eq!(sim.time(), 30.0);
    assert_eq!(sim.num_particles(), 6);
    assert!(((sim.kinetic_energy() - e0) / e0).abs() < 1e-9);
    Ok(())
}
