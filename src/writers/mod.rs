pub mod csv_writer;

pub use csv_writer::{get_file_info, read_series, CsvSeriesWriter, SeriesFileInfo, SeriesSink};
