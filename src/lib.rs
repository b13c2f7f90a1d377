// Relocation Radar - Core Library
//
// Ingests yearly business-registry extracts, reconstructs per-company
// address/employee timelines, derives change events and statistics, and
// groups recent movers into risk clusters.

pub mod analysis;
pub mod clustering;
pub mod encoding;
pub mod error;
pub mod export;
pub mod parser;
pub mod risk;
pub mod timeline;

// Re-export commonly used types
pub use analysis::{
    analyze, Analysis, AddressChangeEvent, ChangeDirection, DatasetStatistics,
    EmployeeChangeSummary, MoverEvent, PercentDelta,
};
pub use clustering::{
    cluster_by_tier, cluster_movers, kmeans, Cluster, ClusterLabel, ClusterStats, RiskTier,
    FEATURE_DIM, MAX_ITERATIONS,
};
pub use encoding::{decode_registry_bytes, EncodingTable};
pub use error::AnalysisError;
pub use export::{ExportRow, ExportSnapshot};
pub use parser::{extract_year, parse_extract, parse_extract_bytes, ParsedFile, RawRow};
pub use risk::{high_risk_movers, risk_score, ScoredMover};
pub use timeline::{
    build_timelines, ingest_files, Company, CompanyRegistry, SourceFile, TimelineEntry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
