//! Selection controls for FieldOps forms: a paginated search-select list,
//! pincode-driven location resolution and debounced area-name suggestions.

pub mod debounce;
pub mod dropdown;
pub mod location;
pub mod matching;
pub mod suggest;

pub use debounce::Debouncer;
pub use dropdown::{
    DisplayOption, FetchKind, LabelFormatter, ListStatus, LoadState, SearchSelect, SelectEvent,
    SelectOptions, Selection,
};
pub use location::{
    sanitize_pincode, LocationResolution, LocationResolver, Notice, PincodeOutcome, PincodeUpdate,
};
pub use matching::{match_city, CityMatch, MatchTier};
pub use suggest::{AreaSuggester, SuggestEvent};
