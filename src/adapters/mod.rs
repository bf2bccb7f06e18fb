// Adapters layer: concrete implementations for external systems (file storage, exports, XNAT over HTTP).

pub mod export;
pub mod storage;
pub mod xnat;
