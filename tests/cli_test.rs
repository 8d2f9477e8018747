use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn call_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type, caller, amount, first, second, active").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let file = call_file(&[
        "fund, 1, 100, , , ",
        "fund, 2, 100, , , ",
        "contribute, 2, 0, , , ",      // ValueError
        "set_active, 2, , , , true",   // AuthorizationError
        "contribute, 2, 10, , , ",     // held
        "contribute, 1, 10, , , ",     // StateError, not established
        "register, 1, , 3, 4, ",
        "contribute, 1, 10, , , ",     // 5 to each participant
    ]);

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(file.path()).arg("--admin").arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account,balance"))
        .stdout(predicate::str::contains("1,90\n"))
        .stdout(predicate::str::contains("2,90\n"))
        .stdout(predicate::str::contains("3,5\n"))
        .stdout(predicate::str::contains("4,5\n"))
        // The held external contribution is untouched by the administrator path.
        .stdout(predicate::str::contains("4294967295,10\n"))
        .stderr(predicate::str::contains("amount must exceed zero"))
        .stderr(predicate::str::contains("not the owner"))
        .stderr(predicate::str::contains("at least two participants required"));

    Ok(())
}

#[test]
fn test_cli_release_pending() {
    let file = call_file(&[
        "fund, 2, 20, , , ",
        "contribute, 2, 20, , , ",
        "register, 1, , 3, 4, ",
        "release, 1, , , , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("splitter"));
    cmd.arg(file.path())
        .arg("--admin")
        .arg("1")
        .arg("--mechanism-account")
        .arg("500");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("3,10\n"))
        .stdout(predicate::str::contains("4,10\n"))
        .stdout(predicate::str::contains("500,0\n"));
}

#[test]
fn test_cli_inactive_rejects_contributions() {
    let file = call_file(&[
        "fund, 2, 20, , , ",
        "set_active, 1, , , , false",
        "contribute, 2, 5, , , ",
        "set_active, 1, , , , true",
        "contribute, 2, 7, , , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("splitter"));
    cmd.arg(file.path()).arg("--admin").arg("1");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("mechanism is inactive"))
        .stdout(predicate::str::contains("2,13\n"))
        .stdout(predicate::str::contains("4294967295,7\n"));
}

#[test]
fn test_cli_rejects_invalid_configuration() {
    let file = call_file(&[]);

    let mut cmd = Command::new(cargo_bin!("splitter"));
    cmd.arg(file.path()).arg("--admin").arg("0");
    cmd.assert().failure();

    let mut cmd = Command::new(cargo_bin!("splitter"));
    cmd.arg(file.path())
        .arg("--admin")
        .arg("1")
        .arg("--remainder-policy")
        .arg("round-robin");
    cmd.assert().failure();
}
