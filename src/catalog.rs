//! Catalog loading: read, deduplicate, scale, correct genres.
//!
//! Order matters. Deduplication runs on raw values, scaling is fitted on the
//! deduplicated rows, and genre corrections run last so they see final names.

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;
use crate::models::{Catalog, Feature, Track, FEATURE_COUNT};
use crate::normalize::{correct_genre, GenreCorrection, MinMaxScaler};
use crate::progress::CatalogSpinner;

// ============================================================================
// Schema
// ============================================================================

/// Accepted headers for the text columns: original dataset name first.
const NAME_COLUMNS: &[&str] = &["track_name", "name"];
const ARTIST_COLUMNS: &[&str] = &["track_artist", "artist"];
const GENRE_COLUMNS: &[&str] = &["playlist_genre", "genre"];
const POPULARITY_COLUMNS: &[&str] = &["track_popularity", "popularity"];

/// Header positions of the retained columns.
struct Schema {
    name: usize,
    artist: usize,
    genre: usize,
    features: [usize; FEATURE_COUNT], // indexed by Feature::index
    feature_headers: [String; FEATURE_COUNT],
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Result<usize, LoadError> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.trim() == *c))
        .ok_or_else(|| LoadError::MissingColumn(candidates[0].to_string()))
}

impl Schema {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let mut features = [0usize; FEATURE_COUNT];
        let mut feature_headers: [String; FEATURE_COUNT] = Default::default();
        for feature in Feature::ALL {
            let idx = match feature {
                Feature::Popularity => find_column(headers, POPULARITY_COLUMNS)?,
                other => find_column(headers, &[other.column()])?,
            };
            features[feature.index()] = idx;
            feature_headers[feature.index()] = headers.get(idx).unwrap_or("").trim().to_string();
        }

        Ok(Self {
            name: find_column(headers, NAME_COLUMNS)?,
            artist: find_column(headers, ARTIST_COLUMNS)?,
            genre: find_column(headers, GENRE_COLUMNS)?,
            features,
            feature_headers,
        })
    }
}

// ============================================================================
// Row Parsing
// ============================================================================

/// Dedup key: text columns plus numeric columns compared by value.
type RowKey = (String, String, String, [u64; FEATURE_COUNT]);

fn row_key(track: &Track) -> RowKey {
    let mut bits = [0u64; FEATURE_COUNT];
    for (b, v) in bits.iter_mut().zip(track.features.iter()) {
        // + 0.0 folds -0.0 into 0.0
        *b = (v + 0.0).to_bits();
    }
    (
        track.name.clone(),
        track.artist.clone(),
        track.genre.clone(),
        bits,
    )
}

fn parse_track(record: &StringRecord, schema: &Schema) -> Result<Track, LoadError> {
    let text = |idx: usize| record.get(idx).unwrap_or("").to_string();
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let mut features = [0.0; FEATURE_COUNT];
    for feature in Feature::ALL {
        let raw = record.get(schema.features[feature.index()]).unwrap_or("");
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LoadError::InvalidNumber {
                line,
                column: schema.feature_headers[feature.index()].clone(),
                value: raw.to_string(),
            })?;
        features[feature.index()] = value;
    }

    Ok(Track {
        name: text(schema.name),
        artist: text(schema.artist),
        genre: text(schema.genre),
        features,
    })
}

// ============================================================================
// Loading
// ============================================================================

/// Load statistics, logged once the catalog is built.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub name_overrides: usize,
    pub genre_remaps: usize,
}

/// Load the catalog from a CSV file on disk.
pub fn load_catalog<P: AsRef<Path>>(
    path: P,
) -> Result<(Catalog, &'static [Feature]), LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let spinner = CatalogSpinner::start(path);
    let result = load_catalog_from_reader(file);
    match &result {
        Ok((catalog, _)) => spinner.loaded(catalog.len()),
        Err(_) => spinner.failed(),
    }
    result
}

/// Load the catalog from any CSV byte source.
pub fn load_catalog_from_reader<R: Read>(
    reader: R,
) -> Result<(Catalog, &'static [Feature]), LoadError> {
    let (catalog, stats) = build_catalog(reader)?;
    info!(
        "Catalog ready: {} tracks ({} rows read, {} duplicates dropped, {} name overrides, {} genre remaps)",
        catalog.len(),
        stats.rows_read,
        stats.duplicates_dropped,
        stats.name_overrides,
        stats.genre_remaps
    );
    let features: &'static [Feature] = &Feature::ALL;
    Ok((catalog, features))
}

fn build_catalog<R: Read>(reader: R) -> Result<(Catalog, LoadStats), LoadError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let schema = Schema::resolve(rdr.headers()?)?;
    let mut stats = LoadStats::default();

    // Steps 1-2: read retained columns, drop exact duplicates (first wins)
    let mut seen: FxHashSet<RowKey> = FxHashSet::default();
    let mut tracks = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let track = parse_track(&record, &schema)?;
        stats.rows_read += 1;
        if seen.insert(row_key(&track)) {
            tracks.push(track);
        } else {
            stats.duplicates_dropped += 1;
        }
    }
    drop(seen);

    // Step 3: min-max scale over the deduplicated rows
    let scaler = MinMaxScaler::fit(tracks.iter().map(|t| &t.features));
    for track in tracks.iter_mut() {
        scaler.transform(&mut track.features);
    }

    // Steps 4-5: name override, then genre remap
    for track in tracks.iter_mut() {
        match correct_genre(track) {
            GenreCorrection::NameOverride => stats.name_overrides += 1,
            GenreCorrection::Remapped => stats.genre_remaps += 1,
            GenreCorrection::Unchanged => {}
        }
    }

    debug!("Fitted scaler: {:?}", scaler);
    Ok((Catalog::new(tracks, scaler), stats))
}
