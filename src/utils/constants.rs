/// Granule layout
pub const IST_GROUP: &str = "IST_Data";
pub const IST_VARIABLE: &str = "IST";
pub const PRODUCTION_TIME_ATTR: &str = "ProductionTime";

/// Length of the `YYYY-MM-DD` prefix of a production timestamp
pub const DAY_KEY_LEN: usize = 10;
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// File extensions
pub const GRANULE_EXTENSION: &str = "nc";
pub const SIDECAR_EXTENSION: &str = "xml";
pub const SERIES_EXTENSION: &str = "csv";

/// Directory layout under the project root
pub const RAW_DATA_DIR: &str = "data/raw";
pub const INTERIM_DATA_DIR: &str = "data/interim";
pub const STAGING_DIR: &str = "utils";

/// Reserved codes in the IST field (see the VNP30 user guide)
pub const SENTINEL_VALUES: [f64; 7] = [0.0, 100.0, 1100.0, 2500.0, 3700.0, 3900.0, 65533.0];

/// Physically plausible ceiling for ice surface temperature, in kelvin
pub const MAX_VALID_IST: f64 = 300.0;

/// Decimal places kept in reported series
pub const SERIES_DECIMALS: i32 = 2;

/// Retrieval defaults
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_RETRIEVAL_SCRIPT: &str = "nsidc-download_VNP30.001_2022-07-05.py";

/// Configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "ist-processor.toml";
pub const ENV_PREFIX: &str = "IST";
