use chrono::Local;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::SieveConfig;

pub const PRIMES_TEXT_FILE: &str = "primes.txt";
pub const PRIMES_BINARY_FILE: &str = "primes.bin";
pub const EXECUTION_LOG_FILE: &str = "execution_log.txt";

const WRITE_BUFFER: usize = 256 * 1024; // 256KB

/// Read current process memory usage from /proc/self/status
/// Returns (VmRSS in MB, VmHWM in MB) or None if unable to read
pub fn get_process_memory_mb() -> Option<(f64, f64)> {
    let file = File::open("/proc/self/status").ok()?;
    let reader = BufReader::new(file);

    let mut vm_rss_kb = None;
    let mut vm_hwm_kb = None;

    for line in reader.lines().map_while(|line| line.ok()) {
        // Format: "VmRSS:     12345 kB"
        if line.starts_with("VmRSS:") {
            vm_rss_kb = line.split_whitespace().nth(1).and_then(|v| v.parse::<f64>().ok());
        } else if line.starts_with("VmHWM:") {
            vm_hwm_kb = line.split_whitespace().nth(1).and_then(|v| v.parse::<f64>().ok());
        }

        if vm_rss_kb.is_some() && vm_hwm_kb.is_some() {
            break;
        }
    }

    Some((vm_rss_kb? / 1024.0, vm_hwm_kb? / 1024.0))
}

/// $XDG_DATA_HOME/psieve, falling back to $HOME/.local/share/psieve
pub fn data_dir() -> io::Result<PathBuf> {
    let xdg_data_home = env::var("XDG_DATA_HOME")
        .ok()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share"))
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine data directory",
            )
        })?;

    Ok(xdg_data_home.join("psieve"))
}

/// Write one prime per line to `dir/primes.txt` (truncating)
pub fn save_primes_text(dir: &Path, primes: &[u64]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(PRIMES_TEXT_FILE);

    let file = File::create(&path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);

    // itoa avoids an allocation per prime
    let mut itoa_buf = itoa::Buffer::new();
    for &prime in primes {
        writer.write_all(itoa_buf.format(prime).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(path)
}

/// Write primes to `dir/primes.bin`, 8 bytes per prime, little-endian
pub fn save_primes_binary(dir: &Path, primes: &[u64]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(PRIMES_BINARY_FILE);

    let file = File::create(&path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);

    for &prime in primes {
        writer.write_all(&prime.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(path)
}

pub fn load_primes_text(path: &Path) -> io::Result<Vec<u64>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.trim()
                .parse::<u64>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        })
        .collect()
}

pub fn load_primes_binary(path: &Path) -> io::Result<Vec<u64>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    if bytes.len() % 8 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is not a multiple of 8 bytes", path.display()),
        ));
    }

    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0_u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect())
}

/// Append one line describing a run to `dir/execution_log.txt`
pub fn log_execution(
    dir: &Path,
    subcommand: &str,
    config: &SieveConfig,
    prime_count: usize,
    duration_us: u128,
) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let log_path = dir.join(EXECUTION_LOG_FILE);
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    writeln!(
        file,
        "{} | {} | {} | w{} | k{} | {} primes | {}us",
        timestamp,
        subcommand,
        config.limit,
        config.segment_width,
        config.workers,
        prime_count,
        duration_us
    )?;

    Ok(())
}
