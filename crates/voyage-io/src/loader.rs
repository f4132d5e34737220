//! CSV ingestion of location and road tables into a [`Graph`].
//!
//! Locations table columns:
//! `id,name,category,latitude,longitude,rating,visit_duration,entry_fee,popularity`.
//! The coordinate and attribute cells may be empty; an unparseable cell
//! reads as empty. Roads table columns: `from,to,weight`, where the
//! endpoints are location **names**.
//!
//! Malformed rows are skipped, counted in [`LoadReport`], and logged at
//! `warn`. Only I/O failures and missing header columns abort loading.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use voyage_engine::{Attributes, Coordinates, Graph, Location, LocationId};

/// Columns every locations table must have.
pub const LOCATION_COLUMNS: [&str; 5] = ["id", "name", "category", "latitude", "longitude"];

/// Columns every roads table must have.
pub const ROAD_COLUMNS: [&str; 3] = ["from", "to", "weight"];

/// Ingestion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Treat each road row as one-way (`from -> to`) instead of two-way.
    pub directed: bool,
}

/// Which table a row or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// The locations table.
    Locations,
    /// The roads table.
    Roads,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locations => "locations",
            Self::Roads => "roads",
        })
    }
}

/// Counts of accepted and skipped rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Location rows added to the graph.
    pub locations_loaded: usize,
    /// Location rows skipped as malformed or duplicate.
    pub locations_skipped: usize,
    /// Loaded locations without usable coordinates.
    pub locations_without_coordinates: usize,
    /// Road rows added to the graph.
    pub roads_loaded: usize,
    /// Road rows skipped as malformed.
    pub roads_skipped: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} locations ({} skipped, {} without coordinates), {} roads ({} skipped)",
            self.locations_loaded,
            self.locations_skipped,
            self.locations_without_coordinates,
            self.roads_loaded,
            self.roads_skipped,
        )
    }
}

/// Errors that abort loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A table file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The CSV reader failed on I/O or on the header row.
    #[error("failed to read {table} table: {source}")]
    Csv {
        /// Table being read.
        table: Table,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// The header row lacks a required column.
    #[error("{table} table is missing required column `{column}`")]
    MissingColumn {
        /// Table being read.
        table: Table,
        /// Name of the missing column.
        column: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    id: u32,
    name: String,
    category: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    visit_duration: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    entry_fee: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
}

impl LocationRow {
    fn into_location(self) -> Location {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };
        Location {
            id: LocationId(self.id),
            name: self.name,
            category: self.category,
            coordinates,
            attributes: Attributes {
                rating: self.rating,
                visit_duration: self.visit_duration,
                entry_fee: self.entry_fee,
                popularity: self.popularity,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoadRow {
    from: String,
    to: String,
    weight: f64,
}

fn csv_reader<R: io::Read>(
    input: R,
    table: Table,
    required: &[&'static str],
) -> Result<csv::Reader<R>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { table, source })?;
    if let Some(&column) = required.iter().find(|&&c| !headers.iter().any(|h| h == c)) {
        return Err(LoadError::MissingColumn { table, column });
    }
    Ok(reader)
}

/// Data line number of the `index`-th record (the header is line 1).
const fn line_of(index: usize) -> usize {
    index + 2
}

/// Read a locations table into `graph`.
///
/// Rows that fail to parse or have an empty name are skipped. So are rows
/// repeating an id or a name already in the graph; the first row wins.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] on I/O failure and
/// [`LoadError::MissingColumn`] if the header lacks a required column.
pub fn read_locations<R: io::Read>(
    input: R,
    graph: &mut Graph,
    report: &mut LoadReport,
) -> Result<(), LoadError> {
    let table = Table::Locations;
    let mut reader = csv_reader(input, table, &LOCATION_COLUMNS)?;

    for (index, row) in reader.deserialize::<LocationRow>().enumerate() {
        let line = line_of(index);
        let row = match row {
            Ok(row) => row,
            Err(source) if source.is_io_error() => return Err(LoadError::Csv { table, source }),
            Err(e) => {
                warn!(line, error = %e, "skipping malformed location row");
                report.locations_skipped += 1;
                continue;
            }
        };

        if row.name.is_empty() {
            warn!(line, id = row.id, "skipping location with empty name");
            report.locations_skipped += 1;
            continue;
        }
        if graph.contains(LocationId(row.id)) {
            warn!(line, id = row.id, "skipping duplicate location id");
            report.locations_skipped += 1;
            continue;
        }
        if let Some(existing) = graph.id_by_name(&row.name) {
            warn!(
                line,
                id = row.id,
                %existing,
                name = %row.name,
                "skipping duplicate location name",
            );
            report.locations_skipped += 1;
            continue;
        }

        let location = row.into_location();
        if location.valid_coordinates().is_none() {
            debug!(line, name = %location.name, "location has no usable coordinates");
            report.locations_without_coordinates += 1;
        }
        graph.add_location(location);
        report.locations_loaded += 1;
    }
    Ok(())
}

/// Read a roads table into `graph`, resolving endpoints by name.
///
/// Rows that fail to parse, name an unknown location, or carry a negative
/// or non-finite weight are skipped.
///
/// # Errors
///
/// Same as [`read_locations`].
pub fn read_roads<R: io::Read>(
    input: R,
    graph: &mut Graph,
    options: &LoadOptions,
    report: &mut LoadReport,
) -> Result<(), LoadError> {
    let table = Table::Roads;
    let mut reader = csv_reader(input, table, &ROAD_COLUMNS)?;

    for (index, row) in reader.deserialize::<RoadRow>().enumerate() {
        let line = line_of(index);
        let row = match row {
            Ok(row) => row,
            Err(source) if source.is_io_error() => return Err(LoadError::Csv { table, source }),
            Err(e) => {
                warn!(line, error = %e, "skipping malformed road row");
                report.roads_skipped += 1;
                continue;
            }
        };

        let (Some(from), Some(to)) = (graph.id_by_name(&row.from), graph.id_by_name(&row.to))
        else {
            warn!(line, from = %row.from, to = %row.to, "skipping road with unknown endpoint");
            report.roads_skipped += 1;
            continue;
        };

        let added = if options.directed {
            graph.add_edge(from, to, row.weight)
        } else {
            graph.add_undirected_edge(from, to, row.weight)
        };
        match added {
            Ok(()) => report.roads_loaded += 1,
            Err(e) => {
                warn!(line, error = %e, "skipping invalid road");
                report.roads_skipped += 1;
            }
        }
    }
    Ok(())
}

/// Build a graph from a locations table and a roads table.
///
/// # Errors
///
/// Same as [`read_locations`].
pub fn load_graph<L: io::Read, R: io::Read>(
    locations: L,
    roads: R,
    options: &LoadOptions,
) -> Result<(Graph, LoadReport), LoadError> {
    let mut graph = Graph::new();
    let mut report = LoadReport::default();
    read_locations(locations, &mut graph, &mut report)?;
    read_roads(roads, &mut graph, options, &mut report)?;
    debug!(%report, "graph loaded");
    Ok((graph, report))
}

/// [`load_graph`] from two files.
///
/// # Errors
///
/// Returns [`LoadError::Open`] if either file cannot be opened, otherwise
/// the same errors as [`load_graph`].
pub fn load_graph_from_paths(
    locations: &Path,
    roads: &Path,
    options: &LoadOptions,
) -> Result<(Graph, LoadReport), LoadError> {
    let open = |path: &Path| {
        File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })
    };
    load_graph(open(locations)?, open(roads)?, options)
}
