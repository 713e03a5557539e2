use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Writer};
use geodist::{distance_one_to_many, distance_single, distance_vector};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "geodist")]
#[command(about = "Great-circle distances (km) between lon/lat points in degrees, for single pairs or CSV batches.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distance between two points
    Single {
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
    },
    /// Row-wise distances from a CSV with header lon1,lat1,lon2,lat2
    Pairs {
        /// Path to the input .csv file
        #[arg(short, long)]
        csv: String,

        /// Output CSV (lon1, lat1, lon2, lat2, distance_km). If omitted, prints a summary to stdout.
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Distances from one point to every row of a CSV with header lon,lat
    From {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Path to the input .csv file
        #[arg(short, long)]
        csv: String,

        /// Output CSV (lon, lat, distance_km). If omitted, prints a summary to stdout.
        #[arg(short, long)]
        out: Option<String>,
    },
}

#[derive(Debug, PartialEq)]
struct Summary {
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
}

fn summarize(distances: &[f64]) -> Option<Summary> {
    if distances.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = 0.0_f64;
    let mut sum = 0.0;
    for &d in distances {
        min = min.min(d);
        max = max.max(d);
        sum += d;
    }
    Some(Summary {
        count: distances.len(),
        min,
        max,
        mean: sum / distances.len() as f64,
    })
}

/// Reads the first `width` columns of every row as f64, column-major.
fn read_columns(path: &str, width: usize) -> Result<Vec<Vec<f64>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path))?;

    let mut columns = vec![Vec::new(); width];
    for (idx, result) in rdr.records().enumerate() {
        // 1-based, counting the header
        let line = idx + 2;
        let record = result.with_context(|| format!("reading {} line {}", path, line))?;
        if record.len() < width {
            bail!(
                "{} line {}: expected {} columns, found {}",
                path,
                line,
                width,
                record.len()
            );
        }
        for (col, column) in columns.iter_mut().enumerate() {
            let value: f64 = record[col].trim().parse().with_context(|| {
                format!(
                    "{} line {}: column {} is not a number: {:?}",
                    path,
                    line,
                    col + 1,
                    &record[col]
                )
            })?;
            column.push(value);
        }
    }
    Ok(columns)
}

fn write_columns(
    path: &str,
    header: &[&str],
    columns: &[Vec<f64>],
    distances: &[f64],
) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("creating CSV {}", path))?;
    wtr.write_record(header)?;
    for (i, d) in distances.iter().enumerate() {
        let mut row: Vec<String> = columns.iter().map(|c| c[i].to_string()).collect();
        row.push(format!("{:.6}", d));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn pairs(csv: &str) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let columns = read_columns(csv, 4)?;
    let n = i64::try_from(columns[0].len())?;
    let distances = distance_vector(&columns[0], &columns[1], &columns[2], &columns[3], n)?;
    Ok((columns, distances))
}

fn one_to_many(lon: f64, lat: f64, csv: &str) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let columns = read_columns(csv, 2)?;
    let n = i64::try_from(columns[0].len())?;
    let distances = distance_one_to_many(lon, lat, &columns[0], &columns[1], n)?;
    Ok((columns, distances))
}

fn report(
    columns: &[Vec<f64>],
    distances: &[f64],
    header: &[&str],
    out: Option<String>,
) -> Result<()> {
    if let Some(out_path) = out {
        write_columns(&out_path, header, columns, distances)?;
        info!(rows = distances.len(), out = %out_path, "wrote distances");
        return Ok(());
    }
    match summarize(distances) {
        Some(s) => {
            println!("Rows: {}", s.count);
            println!("Min distance (km): {:.3}", s.min);
            println!("Max distance (km): {:.3}", s.max);
            println!("Mean distance (km): {:.3}", s.mean);
        }
        None => println!("Rows: 0"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Single { lon1, lat1, lon2, lat2 } => {
            println!("{:.6}", distance_single(lon1, lat1, lon2, lat2));
        }
        Command::Pairs { csv, out } => {
            let (columns, distances) = pairs(&csv)?;
            info!(rows = distances.len(), csv = %csv, "computed pairwise distances");
            report(&columns, &distances, &["lon1", "lat1", "lon2", "lat2", "distance_km"], out)?;
        }
        Command::From { lon, lat, csv, out } => {
            let (columns, distances) = one_to_many(lon, lat, &csv)?;
            info!(rows = distances.len(), csv = %csv, lon, lat, "computed one-to-many distances");
            report(&columns, &distances, &["lon", "lat", "distance_km"], out)?;
        }
    }

    Ok(())
}
