use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 6] = ["type", "caller", "amount", "first", "second", "active"];

/// Writes a call file: external account 2 is funded and contributes `rows`
/// single units that end up in the pending pool.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;
    wtr.write_record(["fund", "2", &rows.to_string(), "", "", ""])?;

    for _ in 1..=rows {
        wtr.write_record(["contribute", "2", "1", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a call file of at least `size_mb` megabytes in which administrator
/// 1 splits two-unit contributions between accounts 3 and 4.
pub fn generate_large_csv(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;
    wtr.write_record(["fund", "1", &u64::MAX.to_string(), "", "", ""])?;
    wtr.write_record(["register", "1", "", "3", "4", ""])?;

    let target_size = (size_mb * 1024 * 1024) as u64;

    // Check size every 5000 rows to avoid syscall overhead
    loop {
        for _ in 0..5000 {
            wtr.write_record(["contribute", "1", "2", "", "", ""])?;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
