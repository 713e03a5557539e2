use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use fnv::FnvHashMap;
use geodist::distance_one_to_many;
use ordered_float::OrderedFloat;
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader};
use std::fs::File;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Read an OSM .pbf and compute the great-circle distance (km) from a given node id to all nodes.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: String,

    /// Source node id to measure from
    #[arg(short, long)]
    source: i64,

    /// Output CSV (node_id, distance_km), nearest first. If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Keep only the K nearest nodes
    #[arg(short, long)]
    limit: Option<usize>,
}

/// Node coordinates in read order, as parallel columns.
#[derive(Default)]
struct NodeTable {
    ids: Vec<i64>,
    lons: Vec<f64>,
    lats: Vec<f64>,
    index: FnvHashMap<NodeId, usize>,
}

impl NodeTable {
    fn push(&mut self, id: NodeId, lon: f64, lat: f64) {
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.ids.len());
        self.ids.push(id.0);
        self.lons.push(lon);
        self.lats.push(lat);
    }

    fn position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.index.get(&id).map(|&i| (self.lons[i], self.lats[i]))
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

fn read_nodes(path: &str) -> Result<NodeTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path))?;
    let mut pbf = OsmPbfReader::new(file);

    let mut nodes = NodeTable::default();
    for obj in pbf.iter() {
        let obj = obj?;
        if let OsmObj::Node(n) = obj {
            nodes.push(n.id, n.lon(), n.lat());
        }
    }
    Ok(nodes)
}

/// Pairs every node id with its distance and sorts nearest first, keeping at most `limit`.
fn nearest(ids: &[i64], distances: &[f64], limit: Option<usize>) -> Vec<(i64, f64)> {
    let mut ranked: Vec<(OrderedFloat<f64>, i64)> = distances
        .iter()
        .zip(ids)
        .map(|(&d, &id)| (OrderedFloat(d), id))
        .collect();
    ranked.sort_unstable();
    if let Some(k) = limit {
        ranked.truncate(k);
    }
    ranked.into_iter().map(|(d, id)| (id, d.0)).collect()
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

    let nodes = read_nodes(&cli.pbf)?;
    info!(nodes = nodes.len(), pbf = %cli.pbf, "loaded node coordinates");

    let (src_lon, src_lat) = nodes
        .position(NodeId(cli.source))
        .with_context(|| format!("source node {} not found in {}", cli.source, cli.pbf))?;

    use std::time::SystemTime;
    let now = SystemTime::now();
    let n = i64::try_from(nodes.len())?;
    let dist = distance_one_to_many(src_lon, src_lat, &nodes.lons, &nodes.lats, n)?;
    if let Ok(elapsed) = now.elapsed() {
        info!(seconds = elapsed.as_secs_f64(), "computed distances");
    }

    let ranked = nearest(&nodes.ids, &dist, cli.limit);

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["node_id", "distance_km"])?;
        for (nid, d) in &ranked {
            wtr.write_record(&[nid.to_string(), format!("{:.6}", d)])?;
        }
        wtr.flush()?;
        info!(rows = ranked.len(), out = %out_path, "wrote distances");
    } else {
        println!("Nodes: {}", nodes.len());
        match ranked.iter().rev().find(|(nid, _)| *nid != cli.source) {
            Some((nid, d)) => println!(
                "Farthest listed node from {}: {} at {:.3} km",
                cli.source, nid, d
            ),
            None => warn!(source = cli.source, "no other nodes in extract"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_sorts_and_limits() {
        let ids = [10, 11, 12, 13];
        let dist = [5.0, 0.0, 2.5, 1.0];
        assert_eq!(
            nearest(&ids, &dist, None),
            vec![(11, 0.0), (13, 1.0), (12, 2.5), (10, 5.0)]
        );
        assert_eq!(nearest(&ids, &dist, Some(2)), vec![(11, 0.0), (13, 1.0)]);
    }

    #[test]
    fn test_node_table_keeps_first_position() {
        let mut nodes = NodeTable::default();
        nodes.push(NodeId(7), 1.0, 2.0);
        nodes.push(NodeId(8), 3.0, 4.0);
        nodes.push(NodeId(7), 9.0, 9.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.position(NodeId(7)), Some((1.0, 2.0)));
        assert_eq!(nodes.position(NodeId(9)), None);
    }

    #[test]
    fn test_one_to_many_over_table() {
        let mut nodes = NodeTable::default();
        nodes.push(NodeId(1), 0.0, 0.0);
        nodes.push(NodeId(2), 0.0, 90.0);
        let (lon, lat) = nodes.position(NodeId(1)).unwrap();
        let n = nodes.len() as i64;
        let dist = distance_one_to_many(lon, lat, &nodes.lons, &nodes.lats, n).unwrap();
        let ranked = nearest(&nodes.ids, &dist, None);
        assert_eq!(ranked[0], (1, 0.0));
        assert!((ranked[1].1 - 10007.5).abs() < 1.0);
    }
}
