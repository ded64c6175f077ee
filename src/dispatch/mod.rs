//! Provider fan-out for source and related-URL lookups.

mod coordinator;

pub use coordinator::{
    dispatch_related, dispatch_sources, DispatchMode, DispatchOptions, DispatchReport, RelatedUrl,
};
