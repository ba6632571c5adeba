mod url;

pub use url::{
    ErrorResponse, HealthResponse, MappingResponse, MappingView, StatsResponse, UrlPayload,
};
