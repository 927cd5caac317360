// ── Repository / cache layer ──
//
// Lazily populated lookup tables over the Device42 list endpoints, plus
// uncached lookups for the resources nobody needs memoized.

mod collection;
mod inventory;

pub use inventory::{Inventory, RackFilter};
