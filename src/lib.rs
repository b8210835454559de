//! Client-side toolkit for the garden app: analysis backend client, local
//! plant persistence and date/id helpers.

pub mod api;
pub mod config;
pub mod error;
pub mod plants;
pub mod storage;
pub mod types;
pub mod util;

pub use api::ReportClient;
pub use error::{ApiError, StorageError};
pub use plants::PlantStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Storage};
pub use types::{
    ChatContext, ChatQueryArgs, ChatQueryResponse, ConversationTurn, GenerateArgs, Plant,
    ReportResponse,
};
