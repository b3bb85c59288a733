pub mod autosave;
pub mod components;
pub mod export;
pub mod list_utils;
pub mod storage;
