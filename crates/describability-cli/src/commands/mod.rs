pub mod compare;
pub mod redundancy;
pub mod sweep;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use describability_core::{Error, Result, SweepConfig};

/// Print the error and exit with status 1.
pub fn exit_on_error<T>(result: Result<T>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Load a sweep config from `path`, or the reference defaults.
pub fn load_sweep_config(path: Option<&str>) -> Result<SweepConfig> {
    match path {
        Some(p) => SweepConfig::load(Path::new(p)),
        None => Ok(SweepConfig::default()),
    }
}

/// Parse a comma-separated list of fragment counts such as `1,2,4,8,16`.
pub fn parse_fragment_list(s: &str) -> Result<Vec<usize>> {
    let counts = s
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| Error::Config(format!("bad fragment count '{t}'")))
        })
        .collect::<Result<Vec<_>>>()?;
    if counts.is_empty() {
        return Err(Error::Config("empty fragment list".to_string()));
    }
    Ok(counts)
}

/// Create `path`'s parent directories and open it for buffered writing.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// `<out_dir>/data/<name>`.
pub fn data_path(out_dir: &str, name: &str) -> PathBuf {
    Path::new(out_dir).join("data").join(name)
}
