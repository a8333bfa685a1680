//! Dataset sources.
//!
//! Two sources provide the same Agribalyse synthesis table:
//!
//! - a spreadsheet export on disk (`local`): Windows-1252, `;`-separated, with
//!   a few title lines above the header
//! - the ADEME data-fair API (`agribalyse`): UTF-8, `,`-separated
//!
//! `acquire` tries them in that order.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::{JobConfig, SourceSelection};
use crate::error::AppError;
use crate::io::ingest::SourceSchema;

pub mod agribalyse;
pub mod local;

pub use agribalyse::{AgribalyseClient, DEFAULT_URL};
pub use local::{DEFAULT_LOCAL_PATH, HEADER_MARKER, HEADER_SCAN_LINES, read_local_dataset};

/// Default bound on blocking I/O.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const LOCAL_SCHEMA: SourceSchema = SourceSchema {
    name_columns: &["Nom du Produit en Français", "Nom du produit", "LIB_FR"],
    co2_columns: &[
        "Changement climatique (kg CO2 eq/kg de produit)",
        "Changement climatique",
    ],
};

const REMOTE_SCHEMA: SourceSchema = SourceSchema {
    name_columns: &["Nom du Produit en Français", "nom_du_produit_en_francais"],
    co2_columns: &["Changement climatique", "changement_climatique"],
};

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

impl SourceKind {
    /// Human-readable label used in provenance strings.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Local => "Agribalyse 3.1 (fichier local)",
            SourceKind::Remote => "Moyenne Agribalyse Auto",
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            SourceKind::Local => b';',
            SourceKind::Remote => b',',
        }
    }

    pub fn schema(self) -> &'static SourceSchema {
        match self {
            SourceKind::Local => &LOCAL_SCHEMA,
            SourceKind::Remote => &REMOTE_SCHEMA,
        }
    }
}

/// Decoded dataset text, starting at its header row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: SourceKind,
    pub text: String,
    /// `true` when the local file was tried and unusable.
    pub fell_back: bool,
}

impl Dataset {
    pub fn new(kind: SourceKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            fell_back: false,
        }
    }
}

/// Obtain the dataset according to `config.source`.
///
/// In `auto` mode a local failure is only a warning. A remote failure is
/// always fatal for the run.
pub fn acquire(config: &JobConfig) -> Result<Dataset, AppError> {
    match config.source {
        SourceSelection::Local => read_local_dataset(&config.local_csv),
        SourceSelection::Remote => fetch_remote(config),
        SourceSelection::Auto => match read_local_dataset(&config.local_csv) {
            Ok(dataset) => Ok(dataset),
            Err(e) => {
                warn!(path = %config.local_csv.display(), "local dataset unusable: {e}; falling back to API");
                let mut dataset = fetch_remote(config)?;
                dataset.fell_back = true;
                Ok(dataset)
            }
        },
    }
}

fn fetch_remote(config: &JobConfig) -> Result<Dataset, AppError> {
    info!(url = %config.remote_url, "fetching dataset from ADEME API");
    let client = AgribalyseClient::new(&config.remote_url, config.timeout)?;
    client.fetch_dataset().inspect_err(|e| {
        error!(url = %config.remote_url, "failed to download dataset: {e}");
    })
}
