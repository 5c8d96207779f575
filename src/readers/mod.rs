pub mod memory;
#[cfg(feature = "netcdf")]
pub mod netcdf_reader;

use crate::error::Result;
use crate::models::{Granule, GranuleMetadata};
use std::path::Path;

pub use memory::MemoryGranuleSource;
#[cfg(feature = "netcdf")]
pub use netcdf_reader::NetcdfGranuleReader;

/// Anything that can open a granule by path.
///
/// `read_metadata` must only touch what is needed for the production time;
/// the deduplicator calls it for every file in the raw directory.
pub trait GranuleSource {
    fn read_metadata(&self, path: &Path) -> Result<GranuleMetadata>;

    fn read_granule(&self, path: &Path) -> Result<Granule>;
}

impl<T: GranuleSource + ?Sized> GranuleSource for &T {
    fn read_metadata(&self, path: &Path) -> Result<GranuleMetadata> {
        (**self).read_metadata(path)
    }

    fn read_granule(&self, path: &Path) -> Result<Granule> {
        (**self).read_granule(path)
    }
}
