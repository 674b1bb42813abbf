use chrono::Local;
use csv::Writer;
use log::{LevelFilter, debug, info, warn};
use nalgebra::{DMatrix, DVector};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Terminal logger at `level`, plus a copy into `log_<date>_<time>.txt` when `log_to_file`.
/// A logger installed earlier in the process stays in place.
pub fn init_logger(level: LevelFilter, log_to_file: bool) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        match File::create(&name) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", name, e),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        debug!("keeping the logger installed earlier: {}", e);
    }
}

/// logs the elapsed time in convenient units and returns (units, value)
pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_millis();
    if time < 1000 {
        info!("Elapsed {} ms", time);
        ("ms".to_string(), time as f64)
    } else if time < 60_000 {
        info!("Elapsed {} s", elapsed.as_secs());
        ("s".to_string(), elapsed.as_secs_f64())
    } else if time < 3_600_000 {
        info!("Elapsed {} min", elapsed.as_secs() / 60);
        ("min".to_string(), elapsed.as_secs_f64() / 60.0)
    } else {
        info!("Elapsed {} h", elapsed.as_secs() / 3600);
        ("h".to_string(), elapsed.as_secs_f64() / 3600.0)
    }
}

/// Writes a trajectory as csv: the argument column `arg` followed by one column per state
/// component named by `headers`.
pub fn save_trajectory_to_csv<P: AsRef<Path>>(
    x: &DVector<f64>,
    y: &DMatrix<f64>,
    headers: &[String],
    arg: &str,
    path: P,
) -> Result<(), Box<dyn Error>> {
    if y.nrows() != x.len() || y.ncols() != headers.len() {
        return Err(format!(
            "trajectory of shape {:?} does not fit {} grid points and {} headers",
            y.shape(),
            x.len(),
            headers.len()
        )
        .into());
    }
    let mut writer = Writer::from_path(path.as_ref())?;
    let mut titles = Vec::with_capacity(headers.len() + 1);
    titles.push(arg.to_string());
    titles.extend(headers.iter().cloned());
    writer.write_record(&titles)?;
    for (i, row) in y.row_iter().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(x[i].to_string());
        record.extend(row.iter().map(|val| val.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    if x.is_empty() {
        warn!("empty trajectory saved to {}", path.as_ref().display());
    } else {
        info!("trajectory saved to {}", path.as_ref().display());
    }
    Ok(())
}

/// scalar trajectory, saved as a single state column
pub fn save_scalar_trajectory_to_csv<P: AsRef<Path>>(
    x: &DVector<f64>,
    y: &DVector<f64>,
    header: &str,
    arg: &str,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let column = DMatrix::from_column_slice(y.len(), 1, y.as_slice());
    save_trajectory_to_csv(x, &column, &[header.to_string()], arg, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::ODE_fixed_step::fixed_step_api::{runge_kutta_4, runge_kutta_4_vec};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_save_trajectory_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oscillator.csv");
        let y0 = DVector::from_vec(vec![1.0, 0.0]);
        let (x, Y) = runge_kutta_4_vec(
            |_t, y: &DVector<f64>| DVector::from_vec(vec![y[1], -y[0]]),
            0.0,
            1.0,
            0.25,
            &y0,
        )
        .unwrap();
        let headers = vec!["q".to_string(), "p".to_string()];
        save_trajectory_to_csv(&x, &Y, &headers, "t", &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let titles: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(titles, vec!["t", "q", "p"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][1].parse::<f64>().unwrap(), 1.0);
        assert_eq!(rows[4][0].parse::<f64>().unwrap(), x[4]);
        assert_eq!(rows[4][2].parse::<f64>().unwrap(), Y[(4, 1)]);
    }

    #[test]
    fn test_save_scalar_trajectory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decay.csv");
        let (x, y) = runge_kutta_4(|_t, y| -y, 0.0, 1.0, 0.5, 1.0).unwrap();
        save_scalar_trajectory_to_csv(&x, &y, "y", "t", &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "t,y");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let dir = tempdir().unwrap();
        let x = DVector::from_vec(vec![0.0, 1.0]);
        let y = DMatrix::zeros(3, 1);
        let result = save_trajectory_to_csv(&x, &y, &["y".to_string()], "t", dir.path().join("bad.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_elapsed_time_units() {
        assert_eq!(elapsed_time(Duration::from_millis(250)), ("ms".to_string(), 250.0));
        assert_eq!(elapsed_time(Duration::from_millis(2500)), ("s".to_string(), 2.5));
        assert_eq!(elapsed_time(Duration::from_secs(120)), ("min".to_string(), 2.0));
        assert_eq!(elapsed_time(Duration::from_secs(7200)), ("h".to_string(), 2.0));
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LevelFilter::Warn, false);
        init_logger(LevelFilter::Info, false);
        // the second call only reports the installed logger
    }
}
