use crate::model::fs::FsError;

/// Alias table mapping short region codes to canonical COS region
/// identifiers. Lookup is exact; there is no fallback region.
const REGION_MAP: &[(&str, &str)] = &[
    ("cn-east", "ap-shanghai"),
    ("cn-sorth", "ap-guangzhou"),
    ("cn-north", "ap-beijing-1"),
    ("cn-south-2", "ap-guangzhou-2"),
    ("cn-southwest", "ap-chengdu"),
    ("sg", "ap-singapore"),
    ("tj", "ap-beijing-1"),
    ("bj", "ap-beijing"),
    ("sh", "ap-shanghai"),
    ("gz", "ap-guangzhou"),
    ("cd", "ap-chengdu"),
    ("sgp", "ap-singapore"),
];

pub fn resolve(alias: &str) -> Result<&'static str, FsError> {
    REGION_MAP
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, region)| *region)
        .ok_or_else(|| FsError::UnknownRegion {
            alias: alias.to_string(),
        })
}
