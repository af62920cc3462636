//! Physical channel naming.
//!
//! Every cluster exposes its write path as a fixed number of physical
//! channels named `<cluster_id>-rootcoord-dml_<index>`.

/// Channel count used by a default deployment.
pub const DEFAULT_PCHANNEL_COUNT: usize = 16;

const PCHANNEL_INFIX: &str = "-rootcoord-dml_";

/// Name of the physical channel at `index` for `cluster_id`.
pub fn pchannel_name(cluster_id: &str, index: usize) -> String {
    format!("{}{}{}", cluster_id, PCHANNEL_INFIX, index)
}

/// Names of the first `count` physical channels of `cluster_id`, in index order.
///
/// A count of zero yields an empty list; the configuration builder rejects
/// clusters without channels.
pub fn pchannel_names(cluster_id: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| pchannel_name(cluster_id, i)).collect()
}
