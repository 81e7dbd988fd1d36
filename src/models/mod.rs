mod api;
mod options;

pub use api::{
    AnalysisRequest, AnalysisResponse, HealthResponse, RootResponse, StreamEvent, TodoItem,
    TodoListQuery, TodoListResponse,
};
pub use options::{AnalysisOptions, OptionValue};
