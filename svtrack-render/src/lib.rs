/*!
# svtrack Rendering Pipeline

Geometry construction for structural-variant tracks: packed segments in,
upload-ready vertex/color/index buffers out.

## Architecture

- [`track`]: per-chromosome store, working set, and repack triggers
- [`geometry`]: cull, cap, dedup, quad emission
- [`arena`]: reusable per-thread geometry buffers
- [`color`]: indexed color table shared with the host shader
- [`worker`]: background build thread with stale-response filtering

The crate draws nothing itself; the host owns the surface and uploads the
buffers a [`geometry::GeometryBatch`] exposes as byte slices.
*/

pub mod arena;
pub mod color;
pub mod geometry;
pub mod track;
pub mod worker;

pub use arena::GeometryArena;
pub use color::{ColorIx, ColorTable};
pub use geometry::{
    build_geometry, GeometryBatch, LinearScale, PlacedSegment, RenderOptions, ROW_GAP,
};
pub use track::{SvTrack, Track, Viewport};
pub use worker::{GeometryRequest, GeometryResponse, GeometryWorker, RequestTracker};

/// Version information for the svtrack render library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
